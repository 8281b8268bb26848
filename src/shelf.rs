use crate::types::{Dim, Item, PlacedPiece, Rect, Shelf};

/// Next-Fit Decreasing Height packer for a single vertical column.
#[derive(Debug, Clone, Copy)]
pub struct ShelfPacker {
    pub x: Dim,
    pub width: Dim,
    pub board_height: Dim,
    pub kerf: Dim,
    pub allow_rotate: bool,
    pub y_offset: Dim,
}

#[derive(Debug, Clone)]
pub struct ColumnPacking {
    pub shelves: Vec<Shelf>,
    pub used_height: Dim,
}

impl ColumnPacking {
    pub fn pieces(&self) -> impl Iterator<Item = &PlacedPiece> {
        self.shelves.iter().flat_map(|s| s.pieces.iter())
    }
}

impl ShelfPacker {
    pub fn new(x: Dim, width: Dim, board_height: Dim, kerf: Dim, allow_rotate: bool) -> Self {
        Self {
            x,
            width,
            board_height,
            kerf,
            allow_rotate,
            y_offset: 0,
        }
    }

    pub fn with_y_offset(mut self, y_offset: Dim) -> Self {
        self.y_offset = y_offset;
        self
    }

    /// Tallest-fit orientation: among orientations that fit the column, the
    /// one with the greatest height.
    pub fn orient(&self, rect: Rect) -> Option<(Rect, bool)> {
        let column = Rect::new(self.width, self.board_height - self.y_offset);
        rect.orientations(self.allow_rotate)
            .filter(|(r, _)| r.fits_in(&column))
            .reduce(|best, cand| {
                if (cand.0.h, cand.0.max_side()) > (best.0.h, best.0.max_side()) {
                    cand
                } else {
                    best
                }
            })
    }

    /// Packs every item or nothing. Returns `None` if any item has no
    /// orientation that fits the column or the shelves overflow the board.
    pub fn pack(&self, items: &[Item]) -> Option<ColumnPacking> {
        let mut remaining = items
            .iter()
            .map(|item| self.orient(item.rect).map(|(r, rot)| (item, r, rot)))
            .collect::<Option<Vec<_>>>()?;
        remaining.sort_by(|a, b| {
            b.1.h
                .cmp(&a.1.h)
                .then_with(|| b.1.max_side().cmp(&a.1.max_side()))
        });

        let mut shelves = Vec::new();
        let mut y = self.y_offset;
        while let Some(&(_, head, _)) = remaining.first() {
            let shelf_h = head.h;
            if y + shelf_h > self.board_height {
                return None;
            }
            let mut shelf = Shelf::new(self.x, self.width, y, shelf_h);
            let (pulled, taller): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|(_, r, _)| r.h <= shelf_h);

            let mut deferred = Vec::new();
            for (item, placed, rotated) in pulled {
                if shelf.fits(placed, self.kerf) {
                    shelf.push(item, placed, rotated, self.kerf);
                } else {
                    deferred.push((item, placed, rotated));
                }
            }
            deferred.extend(taller);
            remaining = deferred;

            y = shelf.bottom() + self.kerf;
            shelves.push(shelf);
        }

        let used_height = shelves
            .last()
            .map(|s| s.bottom() - self.y_offset)
            .unwrap_or(0);
        Some(ColumnPacking {
            shelves,
            used_height,
        })
    }
}
