use tracing::{debug, info, warn};

use crate::cuts;
use crate::strategy::{PackContext, StrategyKind};
use crate::types::{
    BoardLayout, Config, Item, OptimizeResult, PieceSpec, PlacedPiece, UnplacedPiece,
    UnplacedReason,
};

/// Picks and runs packing strategies for one `(config, specs)` pair.
pub struct Solver {
    config: Config,
    specs: Vec<PieceSpec>,
}

/// Runs the engine. Pure: the same inputs always give the same result.
pub fn optimize(config: &Config, specs: &[PieceSpec]) -> OptimizeResult {
    Solver::new(config.clone(), specs.to_vec()).solve()
}

impl Solver {
    pub fn new(config: Config, specs: Vec<PieceSpec>) -> Self {
        Self { config, specs }
    }

    pub fn solve(&self) -> OptimizeResult {
        let specs: Vec<&PieceSpec> = self.specs.iter().filter(|s| s.is_valid()).collect();
        if specs.len() < self.specs.len() {
            debug!(discarded = self.specs.len() - specs.len(), "discarded invalid piece specs");
        }

        if let Err(e) = self.config.validate() {
            warn!(error = %e, "invalid configuration, nothing packed");
            return OptimizeResult {
                unplaced: specs
                    .iter()
                    .map(|s| unplaced(s, UnplacedReason::InvalidConfig))
                    .collect(),
                ..OptimizeResult::default()
            };
        }

        let (items, mut unplaced_pieces) = self.expand(&specs);
        if items.is_empty() {
            return OptimizeResult {
                unplaced: unplaced_pieces,
                ..OptimizeResult::default()
            };
        }

        let ctx = PackContext::from(&self.config);
        for kind in self.plan() {
            match kind.pack(&ctx, &items) {
                Some(boards) if placed_all(&boards, items.len()) => {
                    return self.assemble(kind, boards, unplaced_pieces);
                }
                _ => debug!(strategy = %kind, "strategy failed, falling back"),
            }
        }

        // Every item fits an empty board, so the fallback cannot get here.
        warn!(pieces = items.len(), "no strategy placed the pieces");
        for spec in specs {
            let count = items.iter().filter(|i| i.spec_id == spec.id).count() as i64;
            if count > 0 {
                unplaced_pieces.push(UnplacedPiece {
                    quantity: count,
                    ..unplaced(spec, UnplacedReason::DoesNotFit)
                });
            }
        }
        OptimizeResult {
            unplaced: unplaced_pieces,
            ..OptimizeResult::default()
        }
    }

    /// Strategies to try in order. The full-width fallback always comes last.
    pub fn plan(&self) -> Vec<StrategyKind> {
        let mut plan = Vec::new();
        match self.config.strategy {
            Some(kind) => plan.push(kind),
            None => {
                if self.config.use_advanced_optimizer {
                    plan.push(StrategyKind::DynamicMultiColumn);
                }
                if self.config.force_two_columns {
                    plan.push(StrategyKind::TwoColumnSplit);
                }
            }
        }
        if plan.last() != Some(&StrategyKind::FullWidthFallback) {
            plan.push(StrategyKind::FullWidthFallback);
        }
        plan
    }

    /// One item per requested instance. Specs that fit the board in no
    /// allowed orientation are reported unplaced instead.
    fn expand(&self, specs: &[&PieceSpec]) -> (Vec<Item>, Vec<UnplacedPiece>) {
        let stock = self.config.stock();
        let mut items = Vec::new();
        let mut rejected = Vec::new();
        for spec in specs {
            let fits = spec
                .rect()
                .orientations(self.config.allow_rotation)
                .any(|(r, _)| r.fits_in(&stock));
            if !fits {
                debug!(piece = %spec.id, size = %spec.rect(), board = %stock, "piece does not fit board");
                rejected.push(unplaced(spec, UnplacedReason::DoesNotFit));
                continue;
            }
            // Valid specs request at most `MAX_QUANTITY`, so every instance number fits.
            let instances = (1..=spec.quantity).map_while(|n| u32::try_from(n).ok());
            items.extend(instances.map(|instance| Item {
                spec_id: spec.id.clone(),
                instance,
                rect: spec.rect(),
            }));
        }
        (items, rejected)
    }

    fn assemble(
        &self,
        kind: StrategyKind,
        boards: Vec<BoardLayout>,
        unplaced: Vec<UnplacedPiece>,
    ) -> OptimizeResult {
        let cuts = cuts::reconstruct(&boards, self.config.kerf);
        let placed: Vec<PlacedPiece> = boards.iter().flat_map(|b| b.pieces().cloned()).collect();
        let used: f64 = boards.iter().map(|b| b.used_area() as f64).sum();
        let consumed = self.config.stock().area() as f64 * boards.len() as f64;
        let utilization = if consumed > 0.0 {
            used / consumed
        } else {
            0.0
        };

        info!(
            strategy = %kind,
            boards = boards.len(),
            pieces = placed.len(),
            cuts = cuts.len(),
            utilization,
            "optimization finished"
        );

        OptimizeResult {
            boards,
            placed,
            unplaced,
            cuts,
            utilization,
            strategy: Some(kind),
        }
    }
}

fn placed_all(boards: &[BoardLayout], expected: usize) -> bool {
    boards.iter().map(|b| b.piece_count()).sum::<usize>() == expected && expected > 0
}

fn unplaced(spec: &PieceSpec, reason: UnplacedReason) -> UnplacedPiece {
    UnplacedPiece {
        spec_id: spec.id.clone(),
        width: spec.width,
        height: spec.height,
        quantity: spec.quantity,
        reason,
    }
}
