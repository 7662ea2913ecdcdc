// merchforge/src/models/mod.rs

pub mod draft;
pub mod publish;
pub mod record;

pub use draft::ProductDraft;
pub use publish::{CommerceReceipt, CommerceStatus, EnrichedProduct};
pub use record::PublishedRecord;
