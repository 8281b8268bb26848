use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::strategy::StrategyKind;
use crate::units::deserialize_dim;

/// Millimetres. Signed so non-positive input can be detected and discarded.
pub type Dim = i64;

/// Longest board side or kerf accepted (100 km). Keeps every area and
/// coordinate sum well inside `i64`.
pub const MAX_DIM: Dim = 100_000_000;

/// Largest quantity one spec may request; instances are numbered in `u32`.
pub const MAX_QUANTITY: i64 = u32::MAX as i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub w: Dim,
    pub h: Dim,
}

impl Rect {
    pub fn new(w: Dim, h: Dim) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> i64 {
        self.w * self.h
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    pub fn max_side(&self) -> Dim {
        self.w.max(self.h)
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.w <= other.w && self.h <= other.h
    }

    pub fn is_square(&self) -> bool {
        self.w == self.h
    }

    /// Orientations allowed for this rectangle: `(placed, rotated)`.
    pub fn orientations(self, allow_rotate: bool) -> impl Iterator<Item = (Rect, bool)> {
        let rotated = (allow_rotate && !self.is_square()).then(|| (self.rotated(), true));
        std::iter::once((self, false)).chain(rotated)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// A requested piece type. Immutable input of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub id: String,
    #[serde(deserialize_with = "deserialize_dim")]
    pub width: Dim,
    #[serde(deserialize_with = "deserialize_dim")]
    pub height: Dim,
    pub quantity: i64,
}

impl PieceSpec {
    pub fn new(id: impl Into<String>, width: Dim, height: Dim, quantity: i64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            quantity,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && (1..=MAX_QUANTITY).contains(&self.quantity)
    }
}

/// One physical instance of a [`PieceSpec`] waiting to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub spec_id: String,
    /// 1-based instance number within its spec.
    pub instance: u32,
    pub rect: Rect,
}

impl Item {
    pub fn instance_id(&self) -> String {
        format!("{}-{}", self.spec_id, self.instance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub id: String,
    pub spec_id: String,
    pub width: Dim,
    pub height: Dim,
    pub rotated: bool,
    pub x: Dim,
    pub y: Dim,
    pub board: usize,
    pub shelf: usize,
}

impl PlacedPiece {
    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn right(&self) -> Dim {
        self.x + self.width
    }

    pub fn bottom(&self) -> Dim {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width * self.height
    }
}

/// A horizontal band within one column. Its height is the tallest piece it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub x: Dim,
    pub width: Dim,
    pub y: Dim,
    pub height: Dim,
    pub pieces: Vec<PlacedPiece>,
    /// Distance from `x` to the rightmost occupied edge.
    pub used_width: Dim,
}

impl Shelf {
    pub fn new(x: Dim, width: Dim, y: Dim, height: Dim) -> Self {
        Self {
            x,
            width,
            y,
            height,
            pieces: Vec::new(),
            used_width: 0,
        }
    }

    pub fn right(&self) -> Dim {
        self.x + self.width
    }

    pub fn bottom(&self) -> Dim {
        self.y + self.height
    }

    pub fn slack(&self) -> Dim {
        self.width - self.used_width
    }

    /// Width still available for a piece, after the kerf gap it would need.
    pub fn remaining(&self, kerf: Dim) -> Dim {
        if self.pieces.is_empty() {
            self.width
        } else {
            self.width - self.used_width - kerf
        }
    }

    pub fn fits(&self, rect: Rect, kerf: Dim) -> bool {
        rect.h <= self.height && rect.w <= self.remaining(kerf)
    }

    /// Appends a piece at the next free x position. The caller checks [`Shelf::fits`].
    pub fn push(&mut self, item: &Item, placed: Rect, rotated: bool, kerf: Dim) {
        let x = if self.pieces.is_empty() {
            self.x
        } else {
            self.x + self.used_width + kerf
        };
        self.pieces.push(PlacedPiece {
            id: item.instance_id(),
            spec_id: item.spec_id.clone(),
            width: placed.w,
            height: placed.h,
            rotated,
            x,
            y: self.y,
            board: 0,
            shelf: 0,
        });
        self.used_width = x + placed.w - self.x;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub index: usize,
    pub width: Dim,
    pub height: Dim,
    pub shelves: Vec<Shelf>,
    /// x positions of vertical column splits (left edge of the kerf gap).
    pub column_splits: Vec<Dim>,
    pub utilization: f64,
}

impl BoardLayout {
    /// Finalizes a board: stamps board and shelf indices on every piece and
    /// computes utilization.
    pub fn new(index: usize, stock: Rect, mut shelves: Vec<Shelf>, column_splits: Vec<Dim>) -> Self {
        for (si, shelf) in shelves.iter_mut().enumerate() {
            for piece in &mut shelf.pieces {
                piece.board = index;
                piece.shelf = si;
            }
        }
        let used: i64 = shelves
            .iter()
            .flat_map(|s| &s.pieces)
            .map(|p| p.area())
            .sum();
        let utilization = if stock.area() > 0 {
            used as f64 / stock.area() as f64
        } else {
            0.0
        };
        Self {
            index,
            width: stock.w,
            height: stock.h,
            shelves,
            column_splits,
            utilization,
        }
    }

    pub fn stock(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &PlacedPiece> {
        self.shelves.iter().flat_map(|s| s.pieces.iter())
    }

    pub fn piece_count(&self) -> usize {
        self.shelves.iter().map(|s| s.pieces.len()).sum()
    }

    pub fn used_area(&self) -> i64 {
        self.pieces().map(|p| p.area()).sum()
    }

    pub fn total_slack(&self) -> Dim {
        self.shelves.iter().map(|s| s.slack()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutOrientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geometric identity of a cut. Coordinates are doubled so half-kerf
/// positions stay exact.
pub type CutKey = (usize, CutOrientation, [i64; 4]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub id: usize,
    pub orientation: CutOrientation,
    pub start: Point,
    pub end: Point,
    pub board: usize,
}

impl Cut {
    pub fn key(&self) -> CutKey {
        let half = |v: f64| (v * 2.0).round() as i64;
        (
            self.board,
            self.orientation,
            [
                half(self.start.x),
                half(self.start.y),
                half(self.end.x),
                half(self.end.y),
            ],
        )
    }

    pub fn length(&self) -> f64 {
        (self.end.x - self.start.x).abs() + (self.end.y - self.start.y).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    MinimizeWaste,
    MinimizeCuts,
    Balanced,
}

impl std::str::FromStr for Objective {
    type Err = crate::error::InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waste" | "minimize_waste" => Ok(Objective::MinimizeWaste),
            "cuts" | "minimize_cuts" => Ok(Objective::MinimizeCuts),
            "balanced" => Ok(Objective::Balanced),
            _ => Err(crate::error::InputError::UnknownObjective(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_dim")]
    pub board_width: Dim,
    #[serde(deserialize_with = "deserialize_dim")]
    pub board_height: Dim,
    #[serde(deserialize_with = "deserialize_dim")]
    pub kerf: Dim,
    pub allow_rotation: bool,
    pub force_two_columns: bool,
    pub objective: Objective,
    pub use_advanced_optimizer: bool,
    /// Seed of the shuffled order tried by the multi-start optimizer.
    pub seed: u64,
    /// Strategy to try first, overriding the default selection policy.
    pub strategy: Option<StrategyKind>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board_width: 2800,
            board_height: 2070,
            kerf: 3,
            allow_rotation: true,
            force_two_columns: false,
            objective: Objective::default(),
            use_advanced_optimizer: false,
            seed: 42,
            strategy: None,
        }
    }
}

impl Config {
    pub fn stock(&self) -> Rect {
        Rect::new(self.board_width, self.board_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width <= 0 || self.board_height <= 0 {
            return Err(ConfigError::BoardDimensions {
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.board_width > MAX_DIM || self.board_height > MAX_DIM {
            return Err(ConfigError::BoardTooLarge {
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.kerf < 0 {
            return Err(ConfigError::NegativeKerf(self.kerf));
        }
        if self.kerf > MAX_DIM {
            return Err(ConfigError::KerfTooLarge(self.kerf));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedReason {
    /// Larger than the board in every allowed orientation.
    DoesNotFit,
    /// The configuration was rejected before packing.
    InvalidConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedPiece {
    pub spec_id: String,
    pub width: Dim,
    pub height: Dim,
    pub quantity: i64,
    pub reason: UnplacedReason,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub boards: Vec<BoardLayout>,
    pub placed: Vec<PlacedPiece>,
    pub unplaced: Vec<UnplacedPiece>,
    pub cuts: Vec<Cut>,
    pub utilization: f64,
    pub strategy: Option<StrategyKind>,
}

impl OptimizeResult {
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn placed_count(&self, spec_id: &str) -> usize {
        self.placed.iter().filter(|p| p.spec_id == spec_id).count()
    }

    pub fn unplaced_count(&self, spec_id: &str) -> i64 {
        self.unplaced
            .iter()
            .filter(|u| u.spec_id == spec_id)
            .map(|u| u.quantity)
            .sum()
    }

    pub fn waste_percent(&self) -> f64 {
        if self.boards.is_empty() {
            return 0.0;
        }
        (1.0 - self.utilization) * 100.0
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            utilization: self.utilization,
            board_count: self.boards.len(),
            cut_count: self.cuts.len(),
            piece_count: self.placed.len(),
        }
    }
}

/// Headline metrics of a run, stored next to `(config, specs)` by callers
/// that keep a history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub utilization: f64,
    pub board_count: usize,
    pub cut_count: usize,
    pub piece_count: usize,
}
