//! Storage layer: store contract, Postgres and in-memory implementations.

mod memory;
mod pool;
mod positions;
mod store;

pub use memory::MemoryStore;
pub use pool::connect_and_migrate;
pub use positions::PgPositionStore;
pub use sqlx::PgPool;
pub use store::{PositionStore, StoreError};
