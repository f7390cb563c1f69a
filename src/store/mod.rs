//! Document store access: the SQLite adapter and the read-through facade.

pub mod cached;
pub mod db;

pub use cached::CachedStore;
pub use db::{Db, SessionRecord, StoreError};
