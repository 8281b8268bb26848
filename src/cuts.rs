//! Derives the guillotine cut list from finished board layouts.
//!
//! Cuts run along the middle of the kerf gap they consume. A trailing cut
//! (below the last shelf, right of the last piece) is emitted only when
//! material is left over, and is clamped to the boundary it would cross.

use std::collections::HashSet;

use crate::types::{BoardLayout, Cut, CutOrientation, Dim, Point};

/// Cut lines of every board, each physical line reported once.
pub fn reconstruct(boards: &[BoardLayout], kerf: Dim) -> Vec<Cut> {
    let mut seen = HashSet::new();
    let mut cuts = Vec::new();
    for board in boards {
        for cut in board_cuts(board, kerf) {
            if seen.insert(cut.key()) {
                cuts.push(Cut {
                    id: cuts.len(),
                    ..cut
                });
            }
        }
    }
    cuts
}

pub fn count(boards: &[BoardLayout], kerf: Dim) -> usize {
    reconstruct(boards, kerf).len()
}

fn board_cuts(board: &BoardLayout, kerf: Dim) -> Vec<Cut> {
    let half = kerf as f64 / 2.0;
    let height = board.height as f64;
    let vertical = |x: f64, y0: f64, y1: f64| Cut {
        id: 0,
        orientation: CutOrientation::Vertical,
        start: Point::new(x, y0),
        end: Point::new(x, y1),
        board: board.index,
    };
    let horizontal = |y: f64, x0: f64, x1: f64| Cut {
        id: 0,
        orientation: CutOrientation::Horizontal,
        start: Point::new(x0, y),
        end: Point::new(x1, y),
        board: board.index,
    };

    let mut cuts = Vec::new();

    // Stage one: full-height column splits
    for &split in &board.column_splits {
        let x = (split as f64 + half).min(board.width as f64);
        cuts.push(vertical(x, 0.0, height));
    }

    for shelf in &board.shelves {
        let (top, bottom) = (shelf.y as f64, shelf.bottom() as f64);

        if shelf.bottom() < board.height {
            let y = (bottom + half).min(height);
            cuts.push(horizontal(y, shelf.x as f64, shelf.right() as f64));
        }

        for pair in shelf.pieces.windows(2) {
            let x = (pair[0].right() + pair[1].x) as f64 / 2.0;
            cuts.push(vertical(x, top, bottom));
        }

        if let Some(last) = shelf.pieces.last()
            && last.right() < shelf.right()
        {
            let x = (last.right() as f64 + half).min(shelf.right() as f64);
            cuts.push(vertical(x, top, bottom));
        }
    }

    cuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, Rect, Shelf};

    fn shelf(x: Dim, width: Dim, y: Dim, height: Dim, pieces: &[Dim], kerf: Dim) -> Shelf {
        let mut shelf = Shelf::new(x, width, y, height);
        for (i, &w) in pieces.iter().enumerate() {
            let item = Item {
                spec_id: "P".to_string(),
                instance: i as u32 + 1,
                rect: Rect::new(w, height),
            };
            shelf.push(&item, item.rect, false, kerf);
        }
        shelf
    }

    fn find(cuts: &[Cut], orientation: CutOrientation, a: (f64, f64), b: (f64, f64)) -> bool {
        cuts.iter().any(|c| {
            c.orientation == orientation
                && c.start == Point::new(a.0, a.1)
                && c.end == Point::new(b.0, b.1)
        })
    }

    #[test]
    fn test_single_shelf_cuts() {
        // Two pieces 100 + 3 + 100 on a 300 wide board, shelf 50 of 200 high
        let board = BoardLayout::new(
            0,
            Rect::new(300, 200),
            vec![shelf(0, 300, 0, 50, &[100, 100], 3)],
            vec![],
        );
        let cuts = reconstruct(&[board], 3);
        assert_eq!(cuts.len(), 3);
        assert!(find(&cuts, CutOrientation::Horizontal, (0.0, 51.5), (300.0, 51.5)));
        assert!(find(&cuts, CutOrientation::Vertical, (101.5, 0.0), (101.5, 50.0)));
        assert!(find(&cuts, CutOrientation::Vertical, (204.5, 0.0), (204.5, 50.0)));
    }

    #[test]
    fn test_full_shelf_needs_no_trailing_cuts() {
        let board = BoardLayout::new(
            0,
            Rect::new(200, 100),
            vec![shelf(0, 200, 0, 100, &[100, 100], 0)],
            vec![],
        );
        let cuts = reconstruct(&[board], 0);
        // Only the cut between the two pieces
        assert_eq!(cuts.len(), 1);
        assert_eq!(cuts[0].orientation, CutOrientation::Vertical);
        assert_eq!(cuts[0].start.x, 100.0);
    }

    #[test]
    fn test_column_split_spans_board_height() {
        let board = BoardLayout::new(
            0,
            Rect::new(400, 300),
            vec![
                shelf(0, 200, 0, 300, &[200], 2),
                shelf(202, 198, 0, 100, &[198], 2),
            ],
            vec![200],
        );
        let cuts = reconstruct(&[board], 2);
        assert!(find(&cuts, CutOrientation::Vertical, (201.0, 0.0), (201.0, 300.0)));
        assert!(find(&cuts, CutOrientation::Horizontal, (202.0, 101.0), (400.0, 101.0)));
        assert_eq!(cuts.len(), 2);
    }

    #[test]
    fn test_duplicates_removed_and_ids_sequential() {
        let board = BoardLayout::new(
            1,
            Rect::new(400, 300),
            vec![shelf(0, 200, 0, 300, &[200], 0)],
            vec![200, 200],
        );
        let cuts = reconstruct(&[board.clone(), board], 0);
        assert_eq!(cuts.len(), 1);
        assert_eq!(cuts[0].id, 0);
        assert_eq!(cuts[0].board, 1);

        let keys: HashSet<_> = cuts.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), cuts.len());
    }

    #[test]
    fn test_same_line_on_different_boards_is_kept() {
        let a = BoardLayout::new(0, Rect::new(100, 100), vec![shelf(0, 100, 0, 50, &[60], 0)], vec![]);
        let b = BoardLayout::new(1, Rect::new(100, 100), vec![shelf(0, 100, 0, 50, &[60], 0)], vec![]);
        let cuts = reconstruct(&[a, b], 0);
        assert_eq!(cuts.len(), 4);
        assert_eq!(count(&[], 0), 0);
    }
}
