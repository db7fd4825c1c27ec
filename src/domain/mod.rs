pub mod fingerprint;
pub mod snapshot;

pub use snapshot::{ListingFields, ListingSnapshot, PersistedRow};
