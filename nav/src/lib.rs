#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative navigation grid for Spire Defence.
//!
//! [`NavGrid`] maintains a dense walkability map over the playable area and
//! answers shortest-path queries between world positions. Obstacles are
//! pulled from the caller on every query: the walkability map is fully
//! rebuilt from the provided tower snapshot before each search, so results
//! always reflect the latest layout without invalidation hooks.
//!
//! Queries never fail. Every call resolves to *some* path, degrading through
//! three tiers: a proper A* route, a route to the nearest walkable stand-in
//! when the goal cell is blocked, and finally a straight two-point line when
//! the search cannot run at all.

mod search;
mod smoothing;

use glam::Vec2;
use spire_defence_core::{CellCoord, GridSpec, Path, TowerSnapshot};

use crate::search::SearchScratch;

/// Width of the permanently unwalkable ring around the grid edge, in cells.
const BORDER_WIDTH_IN_CELLS: u32 = 1;

/// Largest square-ring radius inspected when retargeting a blocked goal.
const NEAREST_WALKABLE_MAX_RADIUS: u32 = 10;

/// Dense walkability grid with reusable A* search state.
///
/// The grid is created once per session from a [`GridSpec`] and its
/// dimensions never change afterwards. Cells are only mutated, never
/// reallocated: walkability is recomputed per query and the search
/// bookkeeping lives in flat scratch buffers invalidated by a generation
/// counter rather than cleared cell by cell.
#[derive(Debug)]
pub struct NavGrid {
    columns: u32,
    rows: u32,
    cell_length: f32,
    walkable: Vec<bool>,
    scratch: SearchScratch,
}

impl NavGrid {
    /// Creates a navigation grid sized from the provided specification.
    ///
    /// All cells start walkable. A degenerate specification produces a
    /// zero-cell grid whose queries all take the direct-path fallback.
    #[must_use]
    pub fn new(spec: &GridSpec) -> Self {
        let columns = spec.columns();
        let rows = spec.rows();
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cell_length: spec.cell_length(),
            walkable: vec![true; capacity],
            scratch: SearchScratch::new(),
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Cell containing the provided world position, if it lies on the grid.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / self.cell_length).floor();
        let row = (position.y / self.cell_length).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }

    /// World-space center of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.cell_length + self.cell_length * 0.5,
            cell.row() as f32 * self.cell_length + self.cell_length * 0.5,
        )
    }

    /// Reports whether the cell can be routed through.
    ///
    /// Walkability reflects the tower snapshot supplied to the most recent
    /// query; out-of-bounds cells are always unwalkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.walkable.get(index).copied().unwrap_or(false))
    }

    /// Reports whether a straight traversal between two cells crosses only
    /// walkable cells.
    #[must_use]
    pub fn line_of_sight(&self, from: CellCoord, to: CellCoord) -> bool {
        smoothing::line_of_sight(self, from, to)
    }

    /// Finds a walkable route between two world positions.
    ///
    /// The walkability map is fully rebuilt from `towers` before the search
    /// runs. The returned path always holds at least two points and starts
    /// at the exact `start` position. It ends at the exact `goal` position
    /// unless the goal cell is blocked, in which case it ends at the center
    /// of the nearest walkable cell within [`NEAREST_WALKABLE_MAX_RADIUS`]
    /// rings. Out-of-bounds endpoints and exhausted searches degrade to the
    /// straight two-point line instead of failing.
    pub fn find_path(&mut self, towers: &[TowerSnapshot], start: Vec2, goal: Vec2) -> Path {
        self.refresh_walkability(towers);

        let (Some(start_cell), Some(goal_cell)) = (self.cell_at(start), self.cell_at(goal)) else {
            return Path::direct(start, goal);
        };

        let target_cell = if self.is_walkable(goal_cell) {
            goal_cell
        } else {
            match self.nearest_walkable(goal_cell) {
                Some(cell) => cell,
                None => return Path::direct(start, goal),
            }
        };

        // The search target carries the exact goal position only when it is
        // the goal's own cell; a retargeted goal ends at the cell center.
        let end_position = if target_cell == goal_cell {
            goal
        } else {
            self.cell_center(target_cell)
        };

        if start_cell == target_cell {
            return Path::direct(start, end_position);
        }

        let Some(cells) =
            self.scratch
                .run(&self.walkable, self.columns, self.rows, start_cell, target_cell)
        else {
            log::warn!(
                "path search exhausted before reaching ({:.1}, {:.1}); returning direct line",
                goal.x,
                goal.y
            );
            return Path::direct(start, goal);
        };

        let mut waypoints: Vec<Vec2> = cells.iter().map(|cell| self.cell_center(*cell)).collect();
        if let Some(first) = waypoints.first_mut() {
            *first = start;
        }
        if let Some(last) = waypoints.last_mut() {
            *last = end_position;
        }

        Path::from_waypoints(waypoints)
    }

    /// Convenience wrapper around [`NavGrid::find_path`] with optional
    /// smoothing.
    ///
    /// Smoothing prunes intermediate waypoints that a straight line of sight
    /// makes redundant. It only runs when requested and when the raw path
    /// carries more than two points; a degenerate smoothing result falls
    /// back to the unsmoothed path.
    pub fn get_path(
        &mut self,
        towers: &[TowerSnapshot],
        start: Vec2,
        goal: Vec2,
        smooth: bool,
    ) -> Path {
        let raw = self.find_path(towers, start, goal);
        if !smooth || raw.len() <= 2 {
            return raw;
        }

        let smoothed = smoothing::smooth(self, raw.waypoints());
        if smoothed.len() >= 2 {
            Path::from_waypoints(smoothed)
        } else {
            raw
        }
    }

    /// Rebuilds the walkability map from scratch for the provided towers.
    ///
    /// Every cell resets to walkable, then the border ring and each tower's
    /// circular footprint are marked unwalkable. Towers whose occupying cell
    /// lies outside the grid contribute nothing.
    fn refresh_walkability(&mut self, towers: &[TowerSnapshot]) {
        self.walkable.fill(true);
        self.mark_border();
        for tower in towers {
            let Some(center) = self.cell_at(tower.position) else {
                continue;
            };
            self.mark_footprint(center, tower.kind.footprint_radius_in_cells());
        }
    }

    fn mark_border(&mut self) {
        let border = BORDER_WIDTH_IN_CELLS;
        for row in 0..self.rows {
            for column in 0..self.columns {
                let on_border = row < border
                    || column < border
                    || row >= self.rows.saturating_sub(border)
                    || column >= self.columns.saturating_sub(border);
                if on_border {
                    self.set_unwalkable(CellCoord::new(column, row));
                }
            }
        }
    }

    fn mark_footprint(&mut self, center: CellCoord, radius: u32) {
        let radius_squared = u64::from(radius) * u64::from(radius);
        let min_column = center.column().saturating_sub(radius);
        let max_column = center.column().saturating_add(radius).min(self.columns.saturating_sub(1));
        let min_row = center.row().saturating_sub(radius);
        let max_row = center.row().saturating_add(radius).min(self.rows.saturating_sub(1));

        for row in min_row..=max_row {
            for column in min_column..=max_column {
                let cell = CellCoord::new(column, row);
                if cell.euclidean_distance_squared(center) <= radius_squared {
                    self.set_unwalkable(cell);
                }
            }
        }
    }

    fn set_unwalkable(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.walkable.get_mut(index) {
                *slot = false;
            }
        }
    }

    /// Searches expanding square rings around a blocked goal cell for the
    /// nearest walkable replacement.
    ///
    /// Each ring is scanned exhaustively and the walkable cell closest to
    /// the goal by Euclidean distance wins, with row-major order breaking
    /// ties so repeated queries retarget identically.
    fn nearest_walkable(&self, goal: CellCoord) -> Option<CellCoord> {
        for radius in 1..=NEAREST_WALKABLE_MAX_RADIUS {
            let mut best: Option<(u64, CellCoord)> = None;
            for cell in self.ring_cells(goal, radius) {
                if !self.is_walkable(cell) {
                    continue;
                }
                let distance = cell.euclidean_distance_squared(goal);
                let replace = match best {
                    None => true,
                    Some((best_distance, _)) => distance < best_distance,
                };
                if replace {
                    best = Some((distance, cell));
                }
            }
            if let Some((_, cell)) = best {
                return Some(cell);
            }
        }
        None
    }

    fn ring_cells(&self, center: CellCoord, radius: u32) -> Vec<CellCoord> {
        let center_column = i64::from(center.column());
        let center_row = i64::from(center.row());
        let radius = i64::from(radius);
        let mut cells = Vec::new();

        for row in (center_row - radius)..=(center_row + radius) {
            for column in (center_column - radius)..=(center_column + radius) {
                let on_ring =
                    (row - center_row).abs() == radius || (column - center_column).abs() == radius;
                if !on_ring {
                    continue;
                }
                let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                    continue;
                };
                if column < self.columns && row < self.rows {
                    cells.push(CellCoord::new(column, row));
                }
            }
        }

        cells
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
