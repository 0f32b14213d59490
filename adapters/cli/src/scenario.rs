//! TOML scenario loading for the route planner.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use glam::Vec2;
use serde::Deserialize;
use spire_defence_core::{GridSpec, TowerId, TowerKind, TowerSnapshot};
use thiserror::Error;

/// Validation failures for a parsed scenario.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ScenarioError {
    /// The grid section names a world with a non-positive extent.
    #[error("world extent must be positive, got {width}x{height}")]
    InvalidWorldExtent {
        /// Configured world width.
        width: f32,
        /// Configured world height.
        height: f32,
    },
    /// The grid section names a non-positive cell length.
    #[error("cell length must be positive, got {cell_length}")]
    InvalidCellLength {
        /// Configured cell length.
        cell_length: f32,
    },
}

/// Declarative description of a route-planning run.
#[derive(Debug, Deserialize)]
pub(crate) struct Scenario {
    /// Grid sizing parameters.
    pub(crate) grid: GridSpec,
    /// Towers placed before the query runs.
    #[serde(default)]
    pub(crate) towers: Vec<TowerSection>,
    /// The path query to answer.
    pub(crate) query: QuerySection,
}

impl Scenario {
    /// Reads and parses a scenario file, then validates its grid section.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let scenario: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> std::result::Result<(), ScenarioError> {
        let width = self.grid.world_width();
        let height = self.grid.world_height();
        if !(width > 0.0 && height > 0.0) {
            return Err(ScenarioError::InvalidWorldExtent { width, height });
        }
        let cell_length = self.grid.cell_length();
        if !(cell_length > 0.0) {
            return Err(ScenarioError::InvalidCellLength { cell_length });
        }
        Ok(())
    }

    /// Converts the tower sections into snapshots with sequential ids.
    pub(crate) fn tower_snapshots(&self) -> Vec<TowerSnapshot> {
        self.towers
            .iter()
            .enumerate()
            .map(|(index, tower)| TowerSnapshot {
                id: TowerId::new(index as u32),
                kind: tower.kind,
                position: Vec2::new(tower.x, tower.y),
            })
            .collect()
    }
}

/// A single placed tower.
#[derive(Debug, Deserialize)]
pub(crate) struct TowerSection {
    /// World-space X coordinate of the tower center.
    pub(crate) x: f32,
    /// World-space Y coordinate of the tower center.
    pub(crate) y: f32,
    /// Kind of tower; controls the blocked footprint radius.
    #[serde(default = "default_tower_kind")]
    pub(crate) kind: TowerKind,
}

/// The start/goal query answered against the grid.
#[derive(Debug, Deserialize)]
pub(crate) struct QuerySection {
    /// World-space start position.
    pub(crate) start: [f32; 2],
    /// World-space goal position.
    pub(crate) goal: [f32; 2],
    /// Whether line-of-sight smoothing applies to the result.
    #[serde(default = "default_smooth")]
    pub(crate) smooth: bool,
}

fn default_tower_kind() -> TowerKind {
    TowerKind::Basic
}

fn default_smooth() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [grid]
        world_width = 1024.0
        world_height = 768.0
        cell_length = 32.0

        [query]
        start = [100.0, 100.0]
        goal = [900.0, 700.0]
    "#;

    #[test]
    fn minimal_scenario_parses_with_defaults() {
        let scenario: Scenario = toml::from_str(MINIMAL).expect("parse");
        assert!(scenario.towers.is_empty());
        assert!(scenario.query.smooth);
        assert_eq!(scenario.grid.columns(), 32);
        assert_eq!(scenario.grid.rows(), 24);
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn towers_default_to_the_basic_kind() {
        let contents = format!(
            "{MINIMAL}\n[[towers]]\nx = 500.0\ny = 400.0\n\n[[towers]]\nx = 300.0\ny = 250.0\nkind = \"basic\"\n"
        );
        let scenario: Scenario = toml::from_str(&contents).expect("parse");

        let snapshots = scenario.tower_snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].id, TowerId::new(0));
        assert_eq!(snapshots[0].kind, TowerKind::Basic);
        assert_eq!(snapshots[1].id, TowerId::new(1));
        assert_eq!(snapshots[1].position, Vec2::new(300.0, 250.0));
    }

    #[test]
    fn non_positive_extent_is_rejected() {
        let contents = MINIMAL.replace("world_width = 1024.0", "world_width = 0.0");
        let scenario: Scenario = toml::from_str(&contents).expect("parse");
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::InvalidWorldExtent {
                width: 0.0,
                height: 768.0,
            })
        );
    }

    #[test]
    fn non_positive_cell_length_is_rejected() {
        let contents = MINIMAL.replace("cell_length = 32.0", "cell_length = -4.0");
        let scenario: Scenario = toml::from_str(&contents).expect("parse");
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::InvalidCellLength { cell_length: -4.0 })
        );
    }
}
