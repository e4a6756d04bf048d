use crate::{
    io::error::InvariantViolation,
    spatial::{grid::Grid, tiles::TileSet},
};
use tracing::debug;

/// Resolved cells in the `index`-th group, and the first cell past its cap
fn resolved_in_group(grid: &Grid, tileset: &TileSet, index: usize) -> (usize, Option<usize>) {
    let Some(limit) = tileset.count_limits().get(index) else {
        return (0, None);
    };
    let mut resolved = 0;
    for cell in 0..grid.cell_count() {
        if grid.domain_size(cell) != 1 || !limit.group.iter().any(|id| grid.contains(cell, id)) {
            continue;
        }
        resolved += 1;
        if resolved > limit.max {
            return (resolved, Some(cell));
        }
    }
    (resolved, None)
}

/// Apply every count limit of the tileset once
///
/// A limit whose group already fills `max` resolved cells is banned from
/// every cell that is still undecided. Returns the cells that changed, or a
/// cell proving the limits cannot hold: one resolved past a cap, or one the
/// ban left without candidates.
///
/// Bans go through [`Grid::restrict`], so they sit on the removal trail and
/// are undone with the decision that caused them.
///
/// # Errors
///
/// Returns an [`InvariantViolation`] if the grid rejects a restriction.
pub fn enforce_count_limits(
    grid: &mut Grid,
    tileset: &TileSet,
) -> Result<Result<Vec<usize>, usize>, InvariantViolation> {
    let mut changed = Vec::new();
    for (index, limit) in tileset.count_limits().iter().enumerate() {
        let (resolved, overflow) = resolved_in_group(grid, tileset, index);
        if let Some(cell) = overflow {
            debug!(cell, max = limit.max, "count limit exceeded");
            return Ok(Err(cell));
        }
        if resolved < limit.max {
            continue;
        }

        let before = changed.len();
        for cell in 0..grid.cell_count() {
            if grid.domain_size(cell) <= 1 {
                continue;
            }
            let mut narrowed = grid.domain(cell);
            for candidate in limit.group.iter() {
                narrowed.remove(candidate);
            }
            if grid.restrict(cell, &narrowed)? {
                changed.push(cell);
            }
            if narrowed.is_empty() {
                debug!(cell, max = limit.max, "count limit left a cell without candidates");
                return Ok(Err(cell));
            }
        }
        if changed.len() > before {
            debug!(limit = index, max = limit.max, cells = changed.len() - before, "count limit reached");
        }
    }
    Ok(Ok(changed))
}
