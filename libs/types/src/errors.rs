//! Error types shared by the pool vocabulary

use thiserror::Error;

/// Errors raised while constructing identities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address must not be empty")]
    Empty,

    #[error("Address contains whitespace: {0:?}")]
    Whitespace(String),
}
