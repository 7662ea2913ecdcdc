// merchforge/app/src/web/mod.rs

pub mod handlers;
pub mod routes;

pub use routes::{configure_generator_routes, configure_listing_routes};
