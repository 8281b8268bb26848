//! Error types for configuration and input parsing.
//!
//! Packing itself never fails with an error: pieces that do not fit are
//! reported as unplaced and strategies that cannot pack everything yield
//! `None`, which the solver turns into a fallback.

use thiserror::Error;

use crate::types::{Dim, MAX_DIM};

/// Rejected [`Config`](crate::types::Config) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    BoardDimensions { width: Dim, height: Dim },

    #[error("board sides must not exceed {max} mm, got {width}x{height}", max = MAX_DIM)]
    BoardTooLarge { width: Dim, height: Dim },

    #[error("kerf must not be negative, got {0}")]
    NegativeKerf(Dim),

    #[error("kerf must not exceed {max} mm, got {0}", max = MAX_DIM)]
    KerfTooLarge(Dim),
}

/// Malformed user input at the CLI or HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid dimensions '{0}', expected WxH")]
    Dimensions(String),

    #[error("invalid piece '{0}', expected [ID:]WxH:QTY")]
    Piece(String),

    #[error("invalid quantity in '{0}'")]
    Quantity(String),

    #[error("unknown objective '{0}', expected: waste, cuts, or balanced")]
    UnknownObjective(String),

    #[error("unknown strategy '{0}', expected: shelf-column, two-column, multi-column, or full-width")]
    UnknownStrategy(String),

    #[error("unknown unit '{0}', expected: mm, cm, m, or in")]
    UnknownUnit(String),
}
