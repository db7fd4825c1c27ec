pub mod connection;
pub mod snapshots;

pub use connection::{init_db, Database};
