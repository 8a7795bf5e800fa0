//! Local replica store

mod connection;
mod migrations;
mod store;

pub use connection::{Database, StoreLocation};
pub use migrations::CURRENT_VERSION;
pub use store::{Collection, Index, IndexKey, Record, Store, WriteBatch};
