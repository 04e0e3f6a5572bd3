pub mod client;
pub mod memory;
mod record;

pub use client::{DbClient, DbError};
pub use memory::MemoryStore;
