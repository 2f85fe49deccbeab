//! Error types for pool management

use crate::models::PoolId;
use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pool manager errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // CIDR errors
    #[error("Invalid CIDR: {0}")]
    InvalidCidr(String),

    #[error("CIDR {child} is not a strict subset of parent {parent}")]
    Containment { child: String, parent: String },

    #[error("CIDR {cidr} overlaps with pool {conflicting_id} ({conflicting_cidr})")]
    Overlap {
        cidr: String,
        conflicting_id: PoolId,
        conflicting_cidr: String,
    },

    #[error("CIDR {cidr} already exists in this scope as pool {conflicting_id}")]
    DuplicateCidr { cidr: String, conflicting_id: PoolId },

    // Pool errors
    #[error("Pool not found: {0}")]
    NotFound(PoolId),

    #[error("Parent pool not found: {0}")]
    ParentNotFound(PoolId),

    #[error("Pool {id} has {children} child pools")]
    Conflict { id: PoolId, children: usize },

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<ipnet::AddrParseError> for Error {
    fn from(e: ipnet::AddrParseError) -> Self {
        Error::InvalidCidr(e.to_string())
    }
}

impl From<ipnet::PrefixLenError> for Error {
    fn from(e: ipnet::PrefixLenError) -> Self {
        Error::InvalidCidr(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
