//! Two-dimensional guillotine cutting-stock optimization.
//!
//! Rectangular pieces are packed onto rectangular boards using only
//! full-span cuts. Several shelf-based heuristics are available; the
//! [`Solver`] picks one according to the [`Config`] and falls back to
//! full-width shelves when a single-board strategy cannot place everything.
//!
//! ```
//! use stockcut::{optimize, Config, PieceSpec};
//!
//! let config = Config { board_width: 1500, board_height: 5000, ..Config::default() };
//! let result = optimize(&config, &[PieceSpec::new("A", 930, 750, 5)]);
//! assert_eq!(result.placed.len(), 5);
//! ```

pub mod cuts;
pub mod error;
pub mod guillotine;
pub mod input;
pub mod multi_column;
pub mod render;
pub mod shelf;
pub mod solver;
pub mod split;
pub mod strategy;
pub mod types;
pub mod units;

pub use error::{ConfigError, InputError};
pub use solver::{Solver, optimize};
pub use strategy::StrategyKind;
pub use types::{
    BoardLayout, Config, Cut, CutOrientation, Objective, OptimizeResult, PieceSpec, PlacedPiece,
    RunSummary, Shelf, UnplacedPiece, UnplacedReason,
};
pub use units::Unit;
