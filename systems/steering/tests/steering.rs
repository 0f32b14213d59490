use std::time::Duration;

use glam::Vec2;
use spire_defence_core::{GridSpec, TowerId, TowerKind, TowerSnapshot};
use spire_defence_nav::NavGrid;
use spire_defence_system_steering::{Agent, Steering};

fn grid_32_by_24() -> NavGrid {
    NavGrid::new(&GridSpec::new(1024.0, 768.0, 32.0))
}

fn tower_at(x: f32, y: f32) -> TowerSnapshot {
    TowerSnapshot {
        id: TowerId::new(0),
        kind: TowerKind::Basic,
        position: Vec2::new(x, y),
    }
}

#[test]
fn agent_walks_an_open_grid_to_the_goal() {
    let mut nav = grid_32_by_24();
    let steering = Steering::default();
    let goal = Vec2::new(900.0, 700.0);
    let mut agents = vec![Agent::new(Vec2::new(100.0, 100.0), 400.0)];
    let dt = Duration::from_millis(250);

    // Start to goal measures 1000 world units; 100 units per tick should
    // finish comfortably inside twenty ticks.
    for _ in 0..20 {
        steering.update(&mut agents, goal, &[], &mut nav, dt);
    }

    assert!(
        agents[0].position().distance(goal) < 1.0,
        "agent should reach the goal, ended at {:?}",
        agents[0].position(),
    );
}

#[test]
fn first_update_plans_immediately() {
    let mut nav = grid_32_by_24();
    let steering = Steering::default();
    let goal = Vec2::new(900.0, 700.0);
    let start = Vec2::new(100.0, 100.0);
    let mut agents = vec![Agent::new(start, 400.0)];

    steering.update(&mut agents, goal, &[], &mut nav, Duration::from_millis(250));

    assert!(
        agents[0].position().distance(start) > 0.0,
        "fresh agent must plan and start walking within one tick",
    );
    assert!(agents[0].next_waypoint().is_some());
}

#[test]
fn replanning_routes_around_a_new_tower() {
    let mut nav = grid_32_by_24();
    let steering = Steering::with_replan_interval(Duration::from_millis(250));
    let goal = Vec2::new(900.0, 400.0);
    let tower_center = Vec2::new(500.0, 400.0);
    let mut agents = vec![Agent::new(Vec2::new(100.0, 400.0), 400.0)];
    let dt = Duration::from_millis(250);

    // One open tick, then the tower lands on the straight lane.
    steering.update(&mut agents, goal, &[], &mut nav, dt);
    let towers = [tower_at(tower_center.x, tower_center.y)];

    for _ in 0..40 {
        steering.update(&mut agents, goal, &towers, &mut nav, dt);
        let clearance = agents[0].position().distance(tower_center);
        assert!(
            clearance > 40.0,
            "agent rode through the tower footprint at clearance {clearance}",
        );
    }

    assert!(
        agents[0].position().distance(goal) < 1.0,
        "agent should still reach the goal around the tower, ended at {:?}",
        agents[0].position(),
    );
}

#[test]
fn stationary_goal_keeps_an_arrived_agent_in_place() {
    let mut nav = grid_32_by_24();
    let steering = Steering::default();
    let goal = Vec2::new(900.0, 700.0);
    let mut agents = vec![Agent::new(goal, 400.0)];
    let dt = Duration::from_millis(250);

    for _ in 0..8 {
        steering.update(&mut agents, goal, &[], &mut nav, dt);
    }

    assert!(agents[0].position().distance(goal) < 1.0);
}
