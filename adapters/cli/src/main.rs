#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line route planner for the Spire Defence navigation grid.
//!
//! Loads a TOML scenario, answers the path query it describes, and prints
//! the waypoints alongside an ASCII rendering of the walkability map.
//! Optionally scatters extra towers deterministically and walks an agent
//! along the route.

mod scenario;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spire_defence_core::{CellCoord, GridSpec, Path, TowerId, TowerKind, TowerSnapshot};
use spire_defence_nav::NavGrid;
use spire_defence_system_steering::{Agent, Steering};

use crate::scenario::Scenario;

/// Simulation step used when walking an agent along the planned route.
const SIMULATION_DT: Duration = Duration::from_millis(100);

/// Upper bound on simulation ticks before the walk gives up.
const SIMULATION_TICK_LIMIT: u32 = 10_000;

#[derive(Debug, Parser)]
#[command(
    name = "spire-defence",
    about = "Plans routes across a tower-defence navigation grid"
)]
struct Args {
    /// Path to the TOML scenario describing the grid, towers, and query.
    scenario: PathBuf,

    /// Disable line-of-sight smoothing regardless of the scenario setting.
    #[arg(long)]
    no_smooth: bool,

    /// Override the scenario's start position, written as "X,Y".
    #[arg(long, value_parser = parse_point)]
    start: Option<Vec2>,

    /// Override the scenario's goal position, written as "X,Y".
    #[arg(long, value_parser = parse_point)]
    goal: Option<Vec2>,

    /// Scatter this many additional towers across the playfield.
    #[arg(long, default_value_t = 0)]
    scatter: u32,

    /// Seed for the scattered tower layout.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Walk an agent along the route and report the tick count.
    #[arg(long)]
    simulate: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let scenario = Scenario::load(&args.scenario)?;

    let spec = scenario.grid;
    let mut towers = scenario.tower_snapshots();
    towers.extend(scatter_towers(&spec, args.scatter, args.seed, towers.len()));

    let start = args
        .start
        .unwrap_or_else(|| Vec2::new(scenario.query.start[0], scenario.query.start[1]));
    let goal = args
        .goal
        .unwrap_or_else(|| Vec2::new(scenario.query.goal[0], scenario.query.goal[1]));
    let smooth = scenario.query.smooth && !args.no_smooth;

    let mut nav = NavGrid::new(&spec);
    let path = nav.get_path(&towers, start, goal, smooth);

    println!(
        "grid {}x{} cells ({} towers), query ({:.1}, {:.1}) -> ({:.1}, {:.1})",
        nav.columns(),
        nav.rows(),
        towers.len(),
        start.x,
        start.y,
        goal.x,
        goal.y,
    );
    for (index, waypoint) in path.waypoints().iter().enumerate() {
        println!("  [{index}] ({:.1}, {:.1})", waypoint.x, waypoint.y);
    }
    println!(
        "{} waypoints, {:.1} world units",
        path.len(),
        path.total_length()
    );
    println!("{}", render(&nav, &path, start, goal));

    if args.simulate {
        walk(&mut nav, &towers, &path, start, goal);
    }

    Ok(())
}

/// Parses a world position written as "X,Y".
fn parse_point(input: &str) -> std::result::Result<Vec2, String> {
    let (x, y) = input
        .split_once(',')
        .ok_or_else(|| format!("expected \"X,Y\", got {input:?}"))?;
    let x: f32 = x
        .trim()
        .parse()
        .map_err(|_| format!("invalid X coordinate {x:?}"))?;
    let y: f32 = y
        .trim()
        .parse()
        .map_err(|_| format!("invalid Y coordinate {y:?}"))?;
    Ok(Vec2::new(x, y))
}

/// Places `count` deterministic extra towers inside the playfield margins.
fn scatter_towers(spec: &GridSpec, count: u32, seed: u64, id_offset: usize) -> Vec<TowerSnapshot> {
    let margin = spec.cell_length() * 2.0;
    if spec.world_width() <= margin * 2.0 || spec.world_height() <= margin * 2.0 {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|index| TowerSnapshot {
            id: TowerId::new((id_offset + index as usize) as u32),
            kind: TowerKind::Basic,
            position: Vec2::new(
                rng.gen_range(margin..spec.world_width() - margin),
                rng.gen_range(margin..spec.world_height() - margin),
            ),
        })
        .collect()
}

/// Renders the walkability map with the path overlaid.
///
/// Blocked cells print as `#`, free cells as `.`, the route as `*`, and the
/// start/goal cells as `S`/`G`.
fn render(nav: &NavGrid, path: &Path, start: Vec2, goal: Vec2) -> String {
    let columns = nav.columns();
    let rows = nav.rows();
    let mut marks = vec!['.'; (columns as usize) * (rows as usize)];

    for row in 0..rows {
        for column in 0..columns {
            if !nav.is_walkable(CellCoord::new(column, row)) {
                marks[(row as usize) * (columns as usize) + column as usize] = '#';
            }
        }
    }

    for pair in path.waypoints().windows(2) {
        mark_segment(nav, pair[0], pair[1], &mut marks);
    }
    mark_cell(nav, start, 'S', &mut marks);
    mark_cell(nav, goal, 'G', &mut marks);

    let mut output = String::with_capacity(marks.len() + rows as usize);
    for row in 0..rows {
        for column in 0..columns {
            output.push(marks[(row as usize) * (columns as usize) + column as usize]);
        }
        output.push('\n');
    }
    output
}

/// Stamps `*` along a path segment by sampling at quarter-cell steps.
fn mark_segment(nav: &NavGrid, from: Vec2, to: Vec2, marks: &mut [char]) {
    let length = from.distance(to);
    let step = nav.cell_length() * 0.25;
    if step <= 0.0 {
        return;
    }

    let samples = (length / step).ceil().max(1.0) as u32;
    for sample in 0..=samples {
        let t = sample as f32 / samples as f32;
        mark_cell(nav, from.lerp(to, t), '*', marks);
    }
}

fn mark_cell(nav: &NavGrid, position: Vec2, mark: char, marks: &mut [char]) {
    let Some(cell) = nav.cell_at(position) else {
        return;
    };
    let index = (cell.row() as usize) * (nav.columns() as usize) + cell.column() as usize;
    if let Some(slot) = marks.get_mut(index) {
        *slot = mark;
    }
}

/// Walks an agent along the planned route and reports its progress.
fn walk(nav: &mut NavGrid, towers: &[TowerSnapshot], path: &Path, start: Vec2, goal: Vec2) {
    let Some(end) = path.last() else {
        return;
    };

    let steering = Steering::default();
    let speed = nav.cell_length() * 4.0;
    let mut agents = vec![Agent::new(start, speed)];

    for tick in 1..=SIMULATION_TICK_LIMIT {
        steering.update(&mut agents, goal, towers, nav, SIMULATION_DT);
        let position = agents[0].position();
        if position.distance(end) < 1.0 {
            println!(
                "agent reached ({:.1}, {:.1}) in {tick} ticks of {:?}",
                position.x, position.y, SIMULATION_DT,
            );
            return;
        }
    }

    let position = agents[0].position();
    println!(
        "agent settled at ({:.1}, {:.1}) after {SIMULATION_TICK_LIMIT} ticks",
        position.x, position.y,
    );
}
