#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Spire Defence navigation stack.
//!
//! This crate defines the typed surface that connects the authoritative
//! navigation grid, the pure steering system, and the adapters. The
//! pathfinder consumes [`TowerSnapshot`] values describing the obstacles
//! placed in the world, sizes itself from a [`GridSpec`], and answers every
//! query with an owned [`Path`] whose waypoints belong entirely to the
//! caller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Location of a single navigation cell expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Computes the squared Euclidean distance between two cells, measured in
    /// whole cells.
    ///
    /// Obstacle footprints are circular on the square grid, so inclusion
    /// checks compare this value against a squared radius to avoid square
    /// roots.
    #[must_use]
    pub fn euclidean_distance_squared(self, other: CellCoord) -> u64 {
        let column_diff = u64::from(self.column.abs_diff(other.column));
        let row_diff = u64::from(self.row.abs_diff(other.row));
        column_diff * column_diff + row_diff * row_diff
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of towers that can be placed in the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Basic tower with the default footprint.
    Basic,
}

impl TowerKind {
    /// Radius of the unwalkable neighborhood centered on the tower's cell,
    /// measured in whole cells.
    ///
    /// Cells whose Euclidean distance-in-cells from the tower's occupying
    /// cell does not exceed this radius are excluded from routing, which
    /// approximates a circular footprint on the square grid.
    #[must_use]
    pub const fn footprint_radius_in_cells(self) -> u32 {
        match self {
            Self::Basic => 2,
        }
    }
}

/// Snapshot of a placed tower passed to the pathfinder as an obstacle.
///
/// The pathfinder is pull-based: callers hand it the complete set of
/// currently placed towers on every query, and the walkability map is rebuilt
/// from that snapshot before the search runs. No change notifications flow
/// in the other direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was placed.
    pub kind: TowerKind,
    /// World-space position of the tower's center.
    pub position: Vec2,
}

/// Sizing parameters for the navigation grid.
///
/// The grid is dimensioned once per session by dividing the playable world's
/// extent by the cell length, rounding up so the final partial column or row
/// still receives a cell. Degenerate inputs collapse to a zero-cell grid
/// instead of failing; every query against such a grid degrades to the
/// direct-path fallback.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    world_width: f32,
    world_height: f32,
    cell_length: f32,
}

impl GridSpec {
    /// Creates a new grid specification from world dimensions and cell size.
    #[must_use]
    pub const fn new(world_width: f32, world_height: f32, cell_length: f32) -> Self {
        Self {
            world_width,
            world_height,
            cell_length,
        }
    }

    /// Width of the playable world measured in world units.
    #[must_use]
    pub const fn world_width(&self) -> f32 {
        self.world_width
    }

    /// Height of the playable world measured in world units.
    #[must_use]
    pub const fn world_height(&self) -> f32 {
        self.world_height
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Number of columns in the grid, rounding partial columns up.
    #[must_use]
    pub fn columns(&self) -> u32 {
        cell_count(self.world_width, self.cell_length)
    }

    /// Number of rows in the grid, rounding partial rows up.
    #[must_use]
    pub fn rows(&self) -> u32 {
        cell_count(self.world_height, self.cell_length)
    }
}

fn cell_count(extent: f32, cell_length: f32) -> u32 {
    if !extent.is_finite() || !cell_length.is_finite() {
        return 0;
    }
    if extent <= 0.0 || cell_length <= 0.0 {
        return 0;
    }

    let scaled = (extent / cell_length).ceil();
    if scaled >= u32::MAX as f32 {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Ordered sequence of world-space waypoints produced by a path query.
///
/// Paths are value objects created fresh per call; the pathfinder retains no
/// reference to them. Every query resolves to a path with at least two
/// points: the caller's starting position and either the requested goal, the
/// nearest walkable stand-in for it, or the goal again as part of the
/// degraded straight-line fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Creates a path from the provided waypoint sequence.
    #[must_use]
    pub fn from_waypoints(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    /// Creates the degraded two-point straight-line path between the
    /// caller's start and goal positions.
    #[must_use]
    pub fn direct(start: Vec2, goal: Vec2) -> Self {
        Self {
            waypoints: vec![start, goal],
        }
    }

    /// Waypoints in start-to-goal order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Number of waypoints in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path carries no waypoints at all.
    ///
    /// The pathfinder never returns such a path; the predicate exists for
    /// defensive checks on post-processed sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// First waypoint of the path, if any.
    #[must_use]
    pub fn first(&self) -> Option<Vec2> {
        self.waypoints.first().copied()
    }

    /// Last waypoint of the path, if any.
    #[must_use]
    pub fn last(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    /// Sum of the segment lengths between consecutive waypoints.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    /// Consumes the path, yielding the underlying waypoints.
    #[must_use]
    pub fn into_waypoints(self) -> Vec<Vec2> {
        self.waypoints
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, GridSpec, Path, TowerId, TowerKind, TowerSnapshot};
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn euclidean_distance_squared_is_symmetric() {
        let origin = CellCoord::new(2, 2);
        let destination = CellCoord::new(5, 6);
        assert_eq!(origin.euclidean_distance_squared(destination), 25);
        assert_eq!(destination.euclidean_distance_squared(origin), 25);
    }

    #[test]
    fn grid_spec_rounds_partial_cells_up() {
        let spec = GridSpec::new(1024.0, 768.0, 32.0);
        assert_eq!(spec.columns(), 32);
        assert_eq!(spec.rows(), 24);

        let ragged = GridSpec::new(1000.0, 700.0, 32.0);
        assert_eq!(ragged.columns(), 32);
        assert_eq!(ragged.rows(), 22);
    }

    #[test]
    fn grid_spec_collapses_degenerate_inputs() {
        assert_eq!(GridSpec::new(0.0, 768.0, 32.0).columns(), 0);
        assert_eq!(GridSpec::new(1024.0, -1.0, 32.0).rows(), 0);
        assert_eq!(GridSpec::new(1024.0, 768.0, 0.0).columns(), 0);
        assert_eq!(GridSpec::new(f32::NAN, 768.0, 32.0).columns(), 0);
    }

    #[test]
    fn basic_tower_footprint_radius_is_two_cells() {
        assert_eq!(TowerKind::Basic.footprint_radius_in_cells(), 2);
    }

    #[test]
    fn path_reports_endpoints_and_length() {
        let path = Path::from_waypoints(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(3.0, 10.0),
        ]);

        assert_eq!(path.len(), 3);
        assert!(!path.is_empty());
        assert_eq!(path.first(), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(path.last(), Some(Vec2::new(3.0, 10.0)));
        assert!((path.total_length() - 11.0).abs() < f32::EPSILON);
    }

    #[test]
    fn direct_path_spans_exactly_two_points() {
        let start = Vec2::new(5.0, 6.0);
        let goal = Vec2::new(-40.0, 12.5);
        let path = Path::direct(start, goal);

        assert_eq!(path.waypoints(), &[start, goal]);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn tower_kind_round_trips_through_bincode() {
        assert_round_trip(&TowerKind::Basic);
    }

    #[test]
    fn tower_snapshot_round_trips_through_bincode() {
        assert_round_trip(&TowerSnapshot {
            id: TowerId::new(3),
            kind: TowerKind::Basic,
            position: Vec2::new(500.0, 400.0),
        });
    }

    #[test]
    fn grid_spec_round_trips_through_bincode() {
        assert_round_trip(&GridSpec::new(1024.0, 768.0, 32.0));
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(7, 11));
    }
}
