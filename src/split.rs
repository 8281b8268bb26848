use std::cmp::Reverse;

use rayon::prelude::*;
use tracing::debug;

use crate::cuts;
use crate::shelf::ShelfPacker;
use crate::types::{BoardLayout, Dim, Item, Rect};

/// Splits closer than this to the right board edge are not tried.
const SPLIT_MARGIN: Dim = 50;

/// Ranking of a split candidate; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitScore {
    pub cuts: usize,
    pub slack: Dim,
    /// Stands in for utilization: every valid candidate uses the same board.
    pub used_area: Reverse<i64>,
}

/// Two-stage layout search: one vertical split, NFDH shelves on either side.
#[derive(Debug, Clone, Copy)]
pub struct SplitSearch {
    stock: Rect,
    kerf: Dim,
    allow_rotate: bool,
}

/// Running shelf state of one column during greedy allocation.
#[derive(Debug, Clone, Copy)]
struct SimColumn {
    packer: ShelfPacker,
    closed_height: Dim,
    shelf_h: Dim,
    remaining: Dim,
    open: bool,
}

impl SimColumn {
    fn new(packer: ShelfPacker) -> Self {
        Self {
            packer,
            closed_height: 0,
            shelf_h: 0,
            remaining: packer.width,
            open: false,
        }
    }

    fn total(&self) -> Dim {
        self.closed_height + self.shelf_h
    }

    /// State after adding `r` to the current shelf, or to a new one.
    fn with(&self, r: Rect) -> Self {
        let kerf = self.packer.kerf;
        let mut next = *self;
        if self.open && r.h <= self.shelf_h && r.w + kerf <= self.remaining {
            next.remaining -= r.w + kerf;
        } else {
            if self.open {
                next.closed_height += self.shelf_h + kerf;
            }
            next.shelf_h = r.h;
            next.remaining = self.packer.width - r.w;
            next.open = true;
        }
        next
    }
}

impl SplitSearch {
    pub fn new(stock: Rect, kerf: Dim, allow_rotate: bool) -> Self {
        Self {
            stock,
            kerf,
            allow_rotate,
        }
    }

    /// Split positions drawn from every piece side, ascending.
    pub fn candidates(&self, items: &[Item]) -> Vec<Dim> {
        let mut xs: Vec<Dim> = items
            .iter()
            .flat_map(|i| [i.rect.w, i.rect.h])
            .filter(|&x| x > 0 && x < self.stock.w - SPLIT_MARGIN && x + self.kerf < self.stock.w)
            .collect();
        xs.sort_unstable();
        xs.dedup();
        xs
    }

    fn columns(&self, split: Dim) -> (ShelfPacker, ShelfPacker) {
        let right_x = split + self.kerf;
        (
            ShelfPacker::new(0, split, self.stock.h, self.kerf, self.allow_rotate),
            ShelfPacker::new(
                right_x,
                self.stock.w - right_x,
                self.stock.h,
                self.kerf,
                self.allow_rotate,
            ),
        )
    }

    /// Greedy left/right assignment without placing anything. Each item goes
    /// to the column it fits, or to the one whose predicted height stays lower.
    pub fn allocate(&self, split: Dim, items: &[Item]) -> Option<(Vec<Item>, Vec<Item>)> {
        let mut order = items.to_vec();
        order.sort_by(|a, b| {
            b.rect
                .max_side()
                .cmp(&a.rect.max_side())
                .then_with(|| b.rect.area().cmp(&a.rect.area()))
        });

        let (left_packer, right_packer) = self.columns(split);
        let mut left = SimColumn::new(left_packer);
        let mut right = SimColumn::new(right_packer);
        let mut left_items = Vec::new();
        let mut right_items = Vec::new();

        for item in order {
            let in_left = left_packer.orient(item.rect).map(|(r, _)| left.with(r));
            let in_right = right_packer.orient(item.rect).map(|(r, _)| right.with(r));
            match (in_left, in_right) {
                (Some(l), Some(r)) if l.total() <= r.total() => {
                    left = l;
                    left_items.push(item);
                }
                (Some(_), Some(r)) | (None, Some(r)) => {
                    right = r;
                    right_items.push(item);
                }
                (Some(l), None) => {
                    left = l;
                    left_items.push(item);
                }
                (None, None) => return None,
            }
        }
        Some((left_items, right_items))
    }

    /// Builds the single-board layout for `split`, or `None` if either column
    /// cannot hold its share.
    pub fn materialize(&self, split: Dim, items: &[Item]) -> Option<BoardLayout> {
        let (left_items, right_items) = self.allocate(split, items)?;
        let (left_packer, right_packer) = self.columns(split);
        let left = left_packer.pack(&left_items)?;
        let right = right_packer.pack(&right_items)?;

        let mut shelves = left.shelves;
        shelves.extend(right.shelves);
        Some(BoardLayout::new(0, self.stock, shelves, vec![split]))
    }

    pub fn evaluate(&self, split: Dim, items: &[Item]) -> Option<SplitScore> {
        let board = self.materialize(split, items)?;
        Some(self.score(&board))
    }

    fn score(&self, board: &BoardLayout) -> SplitScore {
        SplitScore {
            cuts: cuts::count(std::slice::from_ref(board), self.kerf),
            slack: board.total_slack(),
            used_area: Reverse(board.used_area()),
        }
    }

    /// Best split over all candidates. Ties go to the leftmost split.
    pub fn search(&self, items: &[Item]) -> Option<BoardLayout> {
        let candidates = self.candidates(items);
        let total = candidates.len();
        let scored: Vec<(SplitScore, Dim)> = candidates
            .into_par_iter()
            .filter_map(|x| self.evaluate(x, items).map(|score| (score, x)))
            .collect();
        debug!(candidates = total, valid = scored.len(), "two-column split search");

        let (score, split) = scored.into_iter().min()?;
        debug!(split, cuts = score.cuts, slack = score.slack, "selected column split");
        self.materialize(split, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(spec: &[(&str, Dim, Dim, u32)]) -> Vec<Item> {
        spec.iter()
            .flat_map(|&(id, w, h, qty)| {
                (1..=qty).map(move |n| Item {
                    spec_id: id.to_string(),
                    instance: n,
                    rect: Rect::new(w, h),
                })
            })
            .collect()
    }

    #[test]
    fn test_candidates_filtered_and_sorted() {
        let search = SplitSearch::new(Rect::new(1000, 2000), 3, true);
        let list = items(&[("A", 600, 1200, 1), ("B", 300, 960, 1), ("C", 300, 40, 1)]);
        assert_eq!(search.candidates(&list), vec![40, 300, 600]);
    }

    #[test]
    fn test_allocate_respects_column_widths() {
        let search = SplitSearch::new(Rect::new(1000, 1000), 0, false);
        let list = items(&[("W", 600, 100, 1), ("N", 200, 100, 1)]);
        let (left, right) = search.allocate(300, &list).unwrap();
        // W only fits the 700 wide right column; N then balances to the left
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].spec_id, "W");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].spec_id, "N");
    }

    #[test]
    fn test_allocate_fails_when_no_column_fits() {
        let search = SplitSearch::new(Rect::new(1000, 1000), 0, false);
        let list = items(&[("W", 800, 100, 1)]);
        assert!(search.allocate(300, &list).is_none());
    }

    #[test]
    fn test_four_squares_fill_board() {
        let search = SplitSearch::new(Rect::new(1000, 1000), 0, false);
        let list = items(&[("Q", 500, 500, 4)]);
        let board = search.search(&list).unwrap();

        assert_eq!(board.column_splits, vec![500]);
        assert_eq!(board.piece_count(), 4);
        assert!((board.utilization - 1.0).abs() < 1e-9);
        assert_eq!(search.evaluate(500, &list).unwrap().cuts, 3);
        for p in board.pieces() {
            assert!(p.right() <= 1000 && p.bottom() <= 1000);
        }
    }

    #[test]
    fn test_right_column_starts_after_kerf() {
        let search = SplitSearch::new(Rect::new(1000, 1000), 4, false);
        let list = items(&[("Q", 400, 400, 4)]);
        let board = search.search(&list).unwrap();
        let split = board.column_splits[0];
        for p in board.pieces() {
            assert!(p.right() <= split || p.x >= split + 4, "piece {p:?} crosses split {split}");
        }
        assert_eq!(board.piece_count(), 4);
    }

    #[test]
    fn test_no_valid_candidate() {
        let search = SplitSearch::new(Rect::new(1000, 1000), 0, false);
        // 990 is past the split margin, so no split is tried at all
        assert!(search.search(&items(&[("A", 990, 990, 1)])).is_none());
        // Too much material for one board
        assert!(search.search(&items(&[("B", 500, 500, 5)])).is_none());
    }

    #[test]
    fn test_score_ranks_cuts_before_slack() {
        let fewer_cuts = SplitScore {
            cuts: 3,
            slack: 900,
            used_area: Reverse(100),
        };
        let less_slack = SplitScore {
            cuts: 4,
            slack: 0,
            used_area: Reverse(900),
        };
        assert!(fewer_cuts < less_slack);
        let fuller = SplitScore {
            used_area: Reverse(200),
            ..fewer_cuts
        };
        assert!(fuller < fewer_cuts);
    }

    #[test]
    fn test_search_picks_lowest_scoring_split() {
        let search = SplitSearch::new(Rect::new(1000, 1000), 0, false);
        let list = items(&[("A", 400, 400, 2), ("B", 300, 300, 2)]);
        let candidates = search.candidates(&list);
        assert_eq!(candidates, vec![300, 400]);

        // Both splits hold every piece, so the score alone decides
        let scored: Vec<(SplitScore, Dim)> = candidates
            .iter()
            .filter_map(|&x| search.evaluate(x, &list).map(|score| (score, x)))
            .collect();
        assert_eq!(scored.len(), 2);
        let best = scored.iter().map(|&(score, _)| score).min().unwrap();

        let board = search.search(&list).unwrap();
        let chosen = board.column_splits[0];
        assert_eq!(search.evaluate(chosen, &list), Some(best));
        assert_eq!(board.piece_count(), 4);
    }

    #[test]
    fn test_search_is_deterministic() {
        let search = SplitSearch::new(Rect::new(1500, 5000), 3, true);
        let list = items(&[
            ("A", 930, 750, 5),
            ("B", 300, 800, 3),
            ("C", 450, 600, 4),
            ("D", 200, 300, 6),
        ]);
        let first = search.search(&list).unwrap();
        let second = search.search(&list).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.piece_count(), 18);
    }
}
