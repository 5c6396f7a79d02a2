//! Parse errors for textual forms of the core types

use thiserror::Error;

/// Errors produced when parsing positions or tiers from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid position '{0}': expected x,y,z")]
    InvalidPosition(String),

    #[error("unknown permission tier: {0}")]
    UnknownTier(String),
}
