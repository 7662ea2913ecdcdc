// merchforge/app/src/web/handlers/mod.rs

pub mod generator_handlers;
pub mod listing_handlers;
