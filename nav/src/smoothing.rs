//! Line-of-sight path smoothing.
//!
//! Raw A* output follows cell centers and carries the staircase artifacts of
//! 8-directional grid movement. Smoothing greedily removes intermediate
//! waypoints whenever a straight stepped traversal between two non-adjacent
//! waypoints crosses only walkable cells, leaving fewer, longer segments for
//! agents to follow. The first and last waypoints always survive.

use glam::Vec2;
use spire_defence_core::CellCoord;

use crate::NavGrid;

/// Prunes redundant waypoints from a raw path.
///
/// From each kept waypoint the furthest later waypoint with clear line of
/// sight becomes the next anchor; when no skip is possible the immediate
/// successor is kept, so the result always remains a connected subsequence
/// of the input.
pub(crate) fn smooth(grid: &NavGrid, waypoints: &[Vec2]) -> Vec<Vec2> {
    if waypoints.len() <= 2 {
        return waypoints.to_vec();
    }

    let mut result = Vec::with_capacity(waypoints.len());
    let Some(&first) = waypoints.first() else {
        return Vec::new();
    };
    result.push(first);

    let mut anchor = 0;
    while anchor + 1 < waypoints.len() {
        let mut next = anchor + 1;
        for candidate in ((anchor + 2)..waypoints.len()).rev() {
            if sight_between(grid, waypoints[anchor], waypoints[candidate]) {
                next = candidate;
                break;
            }
        }
        result.push(waypoints[next]);
        anchor = next;
    }

    result
}

/// Reports whether two world positions see each other across walkable cells.
fn sight_between(grid: &NavGrid, from: Vec2, to: Vec2) -> bool {
    let (Some(from_cell), Some(to_cell)) = (grid.cell_at(from), grid.cell_at(to)) else {
        return false;
    };
    line_of_sight(grid, from_cell, to_cell)
}

/// Bresenham-style stepped traversal between two cells.
///
/// Every visited cell, endpoints included, must be walkable for the
/// traversal to count as clear.
pub(crate) fn line_of_sight(grid: &NavGrid, from: CellCoord, to: CellCoord) -> bool {
    let mut column = i64::from(from.column());
    let mut row = i64::from(from.row());
    let end_column = i64::from(to.column());
    let end_row = i64::from(to.row());

    let column_span = (end_column - column).abs();
    let row_span = -(end_row - row).abs();
    let column_step = if column < end_column { 1 } else { -1 };
    let row_step = if row < end_row { 1 } else { -1 };
    let mut error = column_span + row_span;

    loop {
        let (Ok(current_column), Ok(current_row)) = (u32::try_from(column), u32::try_from(row))
        else {
            return false;
        };
        if !grid.is_walkable(CellCoord::new(current_column, current_row)) {
            return false;
        }
        if column == end_column && row == end_row {
            return true;
        }

        let doubled = 2 * error;
        if doubled >= row_span {
            error += row_span;
            column += column_step;
        }
        if doubled <= column_span {
            error += column_span;
            row += row_step;
        }
    }
}
