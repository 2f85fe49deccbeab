//! Pool manager service

mod locks;
mod manager;

pub use manager::{BlockListing, PoolManager, PoolManagerConfig};
