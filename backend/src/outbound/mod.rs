//! Outbound adapters: concrete implementations of the domain's ports.

pub mod argon2_hasher;
pub mod memory;
pub mod persistence;

pub use argon2_hasher::Argon2PasswordHasher;
pub use memory::MemoryStore;
pub use persistence::{DbPool, PoolConfig, PoolError};
