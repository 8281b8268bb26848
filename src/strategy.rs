use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::guillotine::FullWidthPacker;
use crate::multi_column::MultiColumnOptimizer;
use crate::shelf::ShelfPacker;
use crate::split::SplitSearch;
use crate::types::{BoardLayout, Config, Dim, Item, Objective, Rect};

/// The guillotine packing strategies. Each packs every item it is given or
/// reports failure with `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// NFDH shelves across one full-width column of a single board.
    ShelfColumn,
    /// One vertical split with NFDH shelves on either side.
    TwoColumnSplit,
    /// Columns opened on demand, best of several item orders.
    DynamicMultiColumn,
    /// Full-width shelves over as many boards as needed. Never fails for
    /// items that fit an empty board.
    FullWidthFallback,
}

/// Everything a strategy needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackContext {
    pub stock: Rect,
    pub kerf: Dim,
    pub allow_rotate: bool,
    pub objective: Objective,
    pub seed: u64,
}

impl From<&Config> for PackContext {
    fn from(config: &Config) -> Self {
        Self {
            stock: config.stock(),
            kerf: config.kerf,
            allow_rotate: config.allow_rotation,
            objective: config.objective,
            seed: config.seed,
        }
    }
}

impl StrategyKind {
    pub fn pack(self, ctx: &PackContext, items: &[Item]) -> Option<Vec<BoardLayout>> {
        match self {
            StrategyKind::ShelfColumn => {
                let packer = ShelfPacker::new(0, ctx.stock.w, ctx.stock.h, ctx.kerf, ctx.allow_rotate);
                let packing = packer.pack(items)?;
                Some(vec![BoardLayout::new(0, ctx.stock, packing.shelves, Vec::new())])
            }
            StrategyKind::TwoColumnSplit => SplitSearch::new(ctx.stock, ctx.kerf, ctx.allow_rotate)
                .search(items)
                .map(|board| vec![board]),
            StrategyKind::DynamicMultiColumn => {
                MultiColumnOptimizer::new(ctx.stock, ctx.kerf, ctx.allow_rotate, ctx.seed)
                    .optimize(items)
                    .map(|board| vec![board])
            }
            StrategyKind::FullWidthFallback => {
                FullWidthPacker::new(ctx.stock, ctx.kerf, ctx.allow_rotate, ctx.objective)
                    .pack(items)
            }
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StrategyKind::ShelfColumn => "shelf-column",
            StrategyKind::TwoColumnSplit => "two-column",
            StrategyKind::DynamicMultiColumn => "multi-column",
            StrategyKind::FullWidthFallback => "full-width",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shelf-column" => Ok(StrategyKind::ShelfColumn),
            "two-column" => Ok(StrategyKind::TwoColumnSplit),
            "multi-column" => Ok(StrategyKind::DynamicMultiColumn),
            "full-width" => Ok(StrategyKind::FullWidthFallback),
            _ => Err(InputError::UnknownStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PackContext {
        PackContext::from(&Config {
            board_width: 1000,
            board_height: 1000,
            kerf: 0,
            allow_rotation: false,
            ..Config::default()
        })
    }

    fn squares(n: u32) -> Vec<Item> {
        (1..=n)
            .map(|i| Item {
                spec_id: "Q".to_string(),
                instance: i,
                rect: Rect::new(500, 500),
            })
            .collect()
    }

    #[test]
    fn test_every_strategy_packs_four_squares_on_one_board() {
        let kinds = [
            StrategyKind::ShelfColumn,
            StrategyKind::TwoColumnSplit,
            StrategyKind::DynamicMultiColumn,
            StrategyKind::FullWidthFallback,
        ];
        for kind in kinds {
            let boards = kind.pack(&ctx(), &squares(4)).unwrap();
            assert_eq!(boards.len(), 1, "{kind}");
            assert_eq!(boards[0].piece_count(), 4, "{kind}");
        }
    }

    #[test]
    fn test_only_fallback_spills_onto_more_boards() {
        let items = squares(6);
        assert!(StrategyKind::ShelfColumn.pack(&ctx(), &items).is_none());
        assert!(StrategyKind::TwoColumnSplit.pack(&ctx(), &items).is_none());
        assert!(StrategyKind::DynamicMultiColumn.pack(&ctx(), &items).is_none());
        let boards = StrategyKind::FullWidthFallback.pack(&ctx(), &items).unwrap();
        assert_eq!(boards.len(), 2);
    }

    #[test]
    fn test_parse_round_trips_display() {
        for kind in [StrategyKind::ShelfColumn, StrategyKind::FullWidthFallback] {
            assert_eq!(kind.to_string().parse::<StrategyKind>().unwrap(), kind);
        }
        assert!("diagonal".parse::<StrategyKind>().is_err());
    }
}
