#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Waypoint-following steering for Spire Defence agents.
//!
//! The navigation grid answers path queries; this system owns the consumer
//! side of that contract. Each [`Agent`] carries its own position, speed,
//! queued waypoints, and replan clock, and [`Steering::update`] drives the
//! whole crowd one tick at a time: agents whose cadence elapsed (or whose
//! queue ran dry) request a fresh smoothed path against the current tower
//! snapshot, then everyone advances along their queue by `speed * dt`.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use spire_defence_core::{Path, TowerSnapshot};
use spire_defence_nav::NavGrid;

/// Default interval between periodic replans.
const REPLAN_INTERVAL: Duration = Duration::from_secs(5);

/// Distance in world units at which a waypoint counts as reached.
const ARRIVAL_EPSILON: f32 = 0.5;

/// A single moving agent walking waypoints toward the crowd goal.
#[derive(Clone, Debug)]
pub struct Agent {
    position: Vec2,
    speed: f32,
    waypoints: VecDeque<Vec2>,
    replan_clock: Duration,
}

impl Agent {
    /// Creates an agent at the provided position with a speed in world units
    /// per second.
    ///
    /// The agent starts without a path, which forces a plan on its first
    /// update.
    #[must_use]
    pub fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            speed,
            waypoints: VecDeque::new(),
            replan_clock: Duration::ZERO,
        }
    }

    /// Current world-space position of the agent.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Speed of the agent in world units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Next waypoint the agent is walking toward, if any remain queued.
    #[must_use]
    pub fn next_waypoint(&self) -> Option<Vec2> {
        self.waypoints.front().copied()
    }

    /// Number of waypoints still queued.
    #[must_use]
    pub fn remaining_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    fn assign_path(&mut self, path: Path) {
        self.waypoints = path.into_waypoints().into();
    }

    /// Walks the waypoint queue, spending the movement budget for this tick.
    ///
    /// Waypoints within [`ARRIVAL_EPSILON`] are consumed outright, so the
    /// leading waypoint (which echoes the agent's own position) never stalls
    /// the walk.
    fn advance(&mut self, dt: Duration) {
        let mut budget = self.speed * dt.as_secs_f32();

        while let Some(waypoint) = self.waypoints.front().copied() {
            let offset = waypoint - self.position;
            let distance = offset.length();

            if distance <= ARRIVAL_EPSILON {
                self.position = waypoint;
                let _ = self.waypoints.pop_front();
                continue;
            }
            if budget <= 0.0 {
                break;
            }

            if distance <= budget {
                self.position = waypoint;
                budget -= distance;
                let _ = self.waypoints.pop_front();
            } else {
                self.position += offset / distance * budget;
                break;
            }
        }
    }
}

/// System that replans and advances a crowd of agents against the grid.
#[derive(Debug)]
pub struct Steering {
    replan_interval: Duration,
}

impl Steering {
    /// Creates a steering system with a custom replan cadence.
    #[must_use]
    pub const fn with_replan_interval(replan_interval: Duration) -> Self {
        Self { replan_interval }
    }

    /// Interval between periodic replans.
    #[must_use]
    pub const fn replan_interval(&self) -> Duration {
        self.replan_interval
    }

    /// Advances every agent by one tick.
    ///
    /// Agents replan when their cadence elapsed or their waypoint queue ran
    /// dry; each replan pulls a fresh smoothed path from the grid against
    /// the provided tower snapshot. Movement happens after replanning so a
    /// newly planned agent starts walking within the same tick.
    pub fn update(
        &self,
        agents: &mut [Agent],
        goal: Vec2,
        towers: &[TowerSnapshot],
        nav: &mut NavGrid,
        dt: Duration,
    ) {
        for agent in agents.iter_mut() {
            agent.replan_clock = agent.replan_clock.saturating_add(dt);

            let due = agent.replan_clock >= self.replan_interval;
            if due || agent.waypoints.is_empty() {
                let path = nav.get_path(towers, agent.position, goal, true);
                agent.assign_path(path);
                agent.replan_clock = Duration::ZERO;
            }

            agent.advance(dt);
        }
    }
}

impl Default for Steering {
    fn default() -> Self {
        Self {
            replan_interval: REPLAN_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_has_no_queued_waypoints() {
        let agent = Agent::new(Vec2::new(100.0, 100.0), 50.0);
        assert_eq!(agent.next_waypoint(), None);
        assert_eq!(agent.remaining_waypoints(), 0);
        assert_eq!(agent.position(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn advance_moves_toward_the_next_waypoint() {
        let mut agent = Agent::new(Vec2::new(0.0, 0.0), 10.0);
        agent.assign_path(Path::from_waypoints(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
        ]));

        agent.advance(Duration::from_secs(1));

        // The leading waypoint mirrors the start position and is consumed
        // for free; the budget moves the agent ten units along the segment.
        assert_eq!(agent.position(), Vec2::new(10.0, 0.0));
        assert_eq!(agent.remaining_waypoints(), 1);
    }

    #[test]
    fn advance_consumes_waypoints_across_segments() {
        let mut agent = Agent::new(Vec2::new(0.0, 0.0), 30.0);
        agent.assign_path(Path::from_waypoints(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 40.0),
        ]));

        agent.advance(Duration::from_secs(1));

        // Ten units reach the corner, the remaining twenty climb the second
        // segment.
        assert_eq!(agent.position(), Vec2::new(10.0, 20.0));
        assert_eq!(agent.remaining_waypoints(), 1);
    }

    #[test]
    fn advance_without_budget_leaves_the_agent_in_place() {
        let mut agent = Agent::new(Vec2::new(5.0, 5.0), 25.0);
        agent.assign_path(Path::from_waypoints(vec![
            Vec2::new(5.0, 5.0),
            Vec2::new(50.0, 5.0),
        ]));

        agent.advance(Duration::ZERO);
        assert_eq!(agent.position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn default_cadence_matches_the_replan_interval() {
        let steering = Steering::default();
        assert_eq!(steering.replan_interval(), REPLAN_INTERVAL);
    }
}
