use tracing::debug;

use crate::types::{BoardLayout, Dim, Item, Objective, Rect, Shelf};

/// One board being filled with full-width shelves, top to bottom.
#[derive(Debug, Clone)]
pub struct StripBin {
    stock: Rect,
    kerf: Dim,
    pub shelves: Vec<Shelf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShelfFit {
    pub shelf_idx: usize,
    pub placed: Rect,
    pub rotated: bool,
    /// Width left on the shelf after the piece, then height left above it.
    pub score: (Dim, Dim),
}

impl StripBin {
    pub fn new(stock: Rect, kerf: Dim) -> Self {
        Self {
            stock,
            kerf,
            shelves: Vec::new(),
        }
    }

    /// Top of the next shelf this board could open.
    pub fn next_y(&self) -> Dim {
        self.shelves
            .last()
            .map(|s| s.bottom() + self.kerf)
            .unwrap_or(0)
    }

    /// First shelf tall enough to take the piece, in the orientation that
    /// leaves the least width behind.
    pub fn find_best(&self, piece: Rect, allow_rotate: bool) -> Option<ShelfFit> {
        self.shelves.iter().enumerate().find_map(|(idx, shelf)| {
            piece
                .orientations(allow_rotate)
                .filter(|&(r, _)| shelf.fits(r, self.kerf))
                .map(|(r, rotated)| ShelfFit {
                    shelf_idx: idx,
                    placed: r,
                    rotated,
                    score: (shelf.remaining(self.kerf) - r.w, shelf.height - r.h),
                })
                .min_by_key(|fit| fit.score)
        })
    }

    pub fn place(&mut self, fit: ShelfFit, item: &Item) {
        self.shelves[fit.shelf_idx].push(item, fit.placed, fit.rotated, self.kerf);
    }

    /// Opens a full-width shelf for the piece if the board has the height
    /// left. The flattest orientation is used so the shelf wastes least.
    pub fn open_shelf(&mut self, item: &Item, allow_rotate: bool) -> bool {
        let y = self.next_y();
        let space = Rect::new(self.stock.w, self.stock.h - y);
        let best = item
            .rect
            .orientations(allow_rotate)
            .filter(|(r, _)| r.fits_in(&space))
            .min_by_key(|(r, _)| r.h);
        let Some((placed, rotated)) = best else {
            return false;
        };
        let mut shelf = Shelf::new(0, self.stock.w, y, placed.h);
        shelf.push(item, placed, rotated, self.kerf);
        self.shelves.push(shelf);
        true
    }

    pub fn into_layout(self, index: usize) -> BoardLayout {
        BoardLayout::new(index, self.stock, self.shelves, Vec::new())
    }
}

/// Greedy single-pass packer into full-board-width shelves across as many
/// boards as needed.
#[derive(Debug, Clone, Copy)]
pub struct FullWidthPacker {
    stock: Rect,
    kerf: Dim,
    allow_rotate: bool,
    objective: Objective,
}

impl FullWidthPacker {
    pub fn new(stock: Rect, kerf: Dim, allow_rotate: bool, objective: Objective) -> Self {
        Self {
            stock,
            kerf,
            allow_rotate,
            objective,
        }
    }

    /// Orders items for the objective: area first to cut waste, longest side
    /// first to cut fewer shelves, an even blend of both for balance.
    pub fn sort_items(&self, items: &mut [Item]) {
        match self.objective {
            Objective::MinimizeWaste => items.sort_by(|a, b| {
                b.rect
                    .area()
                    .cmp(&a.rect.area())
                    .then_with(|| b.rect.max_side().cmp(&a.rect.max_side()))
            }),
            Objective::MinimizeCuts => items.sort_by(|a, b| {
                b.rect
                    .max_side()
                    .cmp(&a.rect.max_side())
                    .then_with(|| b.rect.area().cmp(&a.rect.area()))
            }),
            Objective::Balanced => {
                let max_area = items.iter().map(|i| i.rect.area()).max().unwrap_or(1).max(1);
                let max_side = items.iter().map(|i| i.rect.max_side()).max().unwrap_or(1).max(1);
                let key = |r: Rect| {
                    0.5 * r.area() as f64 / max_area as f64
                        + 0.5 * r.max_side() as f64 / max_side as f64
                };
                items.sort_by(|a, b| {
                    key(b.rect)
                        .total_cmp(&key(a.rect))
                        .then_with(|| b.rect.area().cmp(&a.rect.area()))
                });
            }
        }
    }

    /// Returns `None` only if some item fits no empty board.
    pub fn pack(&self, items: &[Item]) -> Option<Vec<BoardLayout>> {
        let mut order = items.to_vec();
        self.sort_items(&mut order);

        let mut bins: Vec<StripBin> = Vec::new();
        for item in &order {
            let fit = bins
                .iter()
                .enumerate()
                .find_map(|(bi, bin)| bin.find_best(item.rect, self.allow_rotate).map(|f| (bi, f)));
            if let Some((bi, fit)) = fit {
                bins[bi].place(fit, item);
                continue;
            }

            if let Some(bin) = bins.last_mut()
                && bin.open_shelf(item, self.allow_rotate)
            {
                continue;
            }

            let mut bin = StripBin::new(self.stock, self.kerf);
            if !bin.open_shelf(item, self.allow_rotate) {
                debug!(piece = %item.instance_id(), size = %item.rect, "piece fits no empty board");
                return None;
            }
            bins.push(bin);
        }

        debug!(boards = bins.len(), pieces = order.len(), "full-width packing done");
        Some(
            bins.into_iter()
                .enumerate()
                .map(|(i, bin)| bin.into_layout(i))
                .collect(),
        )
    }
}
