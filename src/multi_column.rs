use std::cmp::Reverse;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cuts;
use crate::types::{BoardLayout, Dim, Item, Rect, Shelf};

/// Item orders tried independently by the multi-start optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Height,
    Width,
    Area,
    MaxSide,
    Shuffled,
}

impl SortOrder {
    pub const ALL: [SortOrder; 5] = [
        SortOrder::Height,
        SortOrder::Width,
        SortOrder::Area,
        SortOrder::MaxSide,
        SortOrder::Shuffled,
    ];

    /// Reorders a private copy of the items. All orders are decreasing.
    pub fn apply(self, items: &[Item], seed: u64) -> Vec<Item> {
        let mut order = items.to_vec();
        match self {
            SortOrder::Height => order.sort_by_key(|i| Reverse(i.rect.h)),
            SortOrder::Width => order.sort_by_key(|i| Reverse(i.rect.w)),
            SortOrder::Area => order.sort_by_key(|i| Reverse(i.rect.area())),
            SortOrder::MaxSide => order.sort_by_key(|i| Reverse(i.rect.max_side())),
            SortOrder::Shuffled => order.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
        order
    }
}

/// A vertical band of the board, as wide as the piece that opened it.
#[derive(Debug, Clone)]
struct Column {
    x: Dim,
    width: Dim,
    shelves: Vec<Shelf>,
}

impl Column {
    fn right(&self) -> Dim {
        self.x + self.width
    }

    /// Places the item on the current shelf, else on a new shelf below it.
    fn try_place(&mut self, item: &Item, allow_rotate: bool, kerf: Dim, board_h: Dim) -> bool {
        let width = self.width;
        let fitting = || {
            item.rect
                .orientations(allow_rotate)
                .filter(move |(r, _)| r.w <= width)
        };

        if let Some(shelf) = self.shelves.last_mut() {
            let same = fitting()
                .filter(|&(r, _)| shelf.fits(r, kerf))
                .reduce(|best, cand| if cand.0.h > best.0.h { cand } else { best });
            if let Some((placed, rotated)) = same {
                shelf.push(item, placed, rotated, kerf);
                return true;
            }
        }

        let y = self
            .shelves
            .last()
            .map(|s| s.bottom() + kerf)
            .unwrap_or(0);
        let fresh = fitting()
            .filter(|(r, _)| y + r.h <= board_h)
            .min_by_key(|(r, _)| r.h);
        match fresh {
            Some((placed, rotated)) => {
                let mut shelf = Shelf::new(self.x, self.width, y, placed.h);
                shelf.push(item, placed, rotated, kerf);
                self.shelves.push(shelf);
                true
            }
            None => false,
        }
    }
}

/// Outcome ranking of one run; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunScore {
    /// Utilization, descending. Every run fills the same single board.
    pub used_area: Reverse<i64>,
    pub cuts: usize,
}

/// Packs one board into dynamically opened columns, trying several item
/// orders and keeping the best complete run.
#[derive(Debug, Clone, Copy)]
pub struct MultiColumnOptimizer {
    stock: Rect,
    kerf: Dim,
    allow_rotate: bool,
    seed: u64,
}

impl MultiColumnOptimizer {
    pub fn new(stock: Rect, kerf: Dim, allow_rotate: bool, seed: u64) -> Self {
        Self {
            stock,
            kerf,
            allow_rotate,
            seed,
        }
    }

    /// Opens a column at the next free x for the item, in its narrowest
    /// orientation that fits the board.
    fn open_column(&self, columns: &mut Vec<Column>, item: &Item) -> bool {
        let x = columns.last().map(|c| c.right() + self.kerf).unwrap_or(0);
        let space = Rect::new(self.stock.w - x, self.stock.h);
        let narrowest = item
            .rect
            .orientations(self.allow_rotate)
            .filter(|(r, _)| r.fits_in(&space))
            .min_by_key(|(r, _)| r.w);
        let Some((placed, rotated)) = narrowest else {
            return false;
        };
        let mut shelf = Shelf::new(x, placed.w, 0, placed.h);
        shelf.push(item, placed, rotated, self.kerf);
        columns.push(Column {
            x,
            width: placed.w,
            shelves: vec![shelf],
        });
        true
    }

    /// One complete run for `order`, or `None` if some item found no room.
    pub fn run(&self, order: SortOrder, items: &[Item]) -> Option<BoardLayout> {
        let mut columns: Vec<Column> = Vec::new();
        for item in order.apply(items, self.seed) {
            let placed = columns.iter_mut().any(|c| {
                c.try_place(&item, self.allow_rotate, self.kerf, self.stock.h)
            });
            if !placed && !self.open_column(&mut columns, &item) {
                debug!(?order, piece = %item.instance_id(), "multi-column run failed");
                return None;
            }
        }

        let splits = columns
            .iter()
            .map(Column::right)
            .filter(|&right| right < self.stock.w)
            .collect();
        let shelves = columns.into_iter().flat_map(|c| c.shelves).collect();
        Some(BoardLayout::new(0, self.stock, shelves, splits))
    }

    pub fn evaluate(&self, order: SortOrder, items: &[Item]) -> Option<RunScore> {
        let board = self.run(order, items)?;
        Some(RunScore {
            used_area: Reverse(board.used_area()),
            cuts: cuts::count(std::slice::from_ref(&board), self.kerf),
        })
    }

    /// Best run over all sort orders. Ties go to the earlier order in
    /// [`SortOrder::ALL`].
    pub fn optimize(&self, items: &[Item]) -> Option<BoardLayout> {
        let scored: Vec<(RunScore, usize)> = SortOrder::ALL
            .par_iter()
            .enumerate()
            .filter_map(|(rank, &order)| self.evaluate(order, items).map(|s| (s, rank)))
            .collect();
        debug!(runs = SortOrder::ALL.len(), complete = scored.len(), "multi-start runs");

        let (score, rank) = scored.into_iter().min()?;
        let order = SortOrder::ALL[rank];
        debug!(?order, cuts = score.cuts, "selected multi-start run");
        self.run(order, items)
    }
}
