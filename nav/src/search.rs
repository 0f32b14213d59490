//! A* search over the walkability grid.
//!
//! Search bookkeeping lives in flat arrays indexed by `row * columns +
//! column` and is invalidated with a generation counter instead of being
//! cleared between queries, so repeated searches on the session-lived grid
//! allocate nothing after the first call.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use spire_defence_core::CellCoord;

/// Cost of a step between orthogonally adjacent cells.
const ORTHOGONAL_STEP_COST: u32 = 10;

/// Cost of a diagonal step, the usual integer approximation of sqrt(2)
/// scaled by ten.
const DIAGONAL_STEP_COST: u32 = 14;

/// Scale applied to the Manhattan heuristic so it ranks against step costs.
///
/// Manhattan distance overestimates once diagonal steps cost 14 instead of
/// 20, which makes the heuristic inadmissible in the strict sense. Grids
/// this small tolerate the slightly off ordering, so it stays as is.
const HEURISTIC_WEIGHT: u32 = 10;

/// Reusable A* state: costs, parent links, generation stamps, and the open
/// list heap.
#[derive(Debug)]
pub(crate) struct SearchScratch {
    cost_from_start: Vec<u32>,
    parent: Vec<u32>,
    opened: Vec<u32>,
    closed: Vec<u32>,
    generation: u32,
    heap: BinaryHeap<OpenEntry>,
}

impl SearchScratch {
    pub(crate) fn new() -> Self {
        Self {
            cost_from_start: Vec::new(),
            parent: Vec::new(),
            opened: Vec::new(),
            closed: Vec::new(),
            generation: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Runs A* from `start` to `goal` and returns the cell sequence in
    /// start-to-goal order, or `None` when the open list empties first.
    ///
    /// Eight neighbors are expanded per cell. The start cell itself is not
    /// required to be walkable so an agent standing inside a freshly placed
    /// footprint can still route out of it; every other cell on the path
    /// must be walkable.
    pub(crate) fn run(
        &mut self,
        walkable: &[bool],
        columns: u32,
        rows: u32,
        start: CellCoord,
        goal: CellCoord,
    ) -> Option<Vec<CellCoord>> {
        let node_count = walkable.len();
        if node_count == 0 {
            return None;
        }
        let width = usize::try_from(columns).ok()?;

        self.ensure_capacity(node_count);
        let generation = self.next_generation();
        self.heap.clear();

        let start_index = flat_index(start, columns, rows, width)?;
        let goal_index = flat_index(goal, columns, rows, width)?;

        self.cost_from_start[start_index] = 0;
        // A self-referential parent marks the root of the search tree.
        self.parent[start_index] = start_index as u32;
        self.opened[start_index] = generation;
        let start_estimate = heuristic(start, goal);
        self.heap.push(OpenEntry {
            total_estimate: start_estimate,
            remaining_estimate: start_estimate,
            index: start_index as u32,
        });

        while let Some(entry) = self.heap.pop() {
            let index = entry.index as usize;
            if self.closed[index] == generation {
                continue;
            }
            self.closed[index] = generation;

            if index == goal_index {
                return Some(self.reconstruct(index, width));
            }

            let cell = cell_of(index, width);
            let cost_here = self.cost_from_start[index];

            for row_step in -1_i64..=1 {
                for column_step in -1_i64..=1 {
                    if row_step == 0 && column_step == 0 {
                        continue;
                    }

                    let column = i64::from(cell.column()) + column_step;
                    let row = i64::from(cell.row()) + row_step;
                    let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row))
                    else {
                        continue;
                    };
                    if column >= columns || row >= rows {
                        continue;
                    }

                    let neighbor = CellCoord::new(column, row);
                    let neighbor_index = row as usize * width + column as usize;
                    if !walkable.get(neighbor_index).copied().unwrap_or(false) {
                        continue;
                    }
                    if self.closed[neighbor_index] == generation {
                        continue;
                    }

                    let step = if row_step != 0 && column_step != 0 {
                        DIAGONAL_STEP_COST
                    } else {
                        ORTHOGONAL_STEP_COST
                    };
                    let tentative = cost_here.saturating_add(step);

                    let improves = self.opened[neighbor_index] != generation
                        || tentative < self.cost_from_start[neighbor_index];
                    if improves {
                        self.cost_from_start[neighbor_index] = tentative;
                        self.parent[neighbor_index] = index as u32;
                        self.opened[neighbor_index] = generation;
                        let remaining = heuristic(neighbor, goal);
                        self.heap.push(OpenEntry {
                            total_estimate: tentative.saturating_add(remaining),
                            remaining_estimate: remaining,
                            index: neighbor_index as u32,
                        });
                    }
                }
            }
        }

        None
    }

    /// Accumulated cost recorded for a finalized cell in the latest search.
    #[cfg(test)]
    pub(crate) fn cost_of(&self, index: usize) -> Option<u32> {
        if self.closed.get(index).copied() == Some(self.generation) {
            self.cost_from_start.get(index).copied()
        } else {
            None
        }
    }

    fn ensure_capacity(&mut self, node_count: usize) {
        if self.cost_from_start.len() < node_count {
            self.cost_from_start.resize(node_count, 0);
            self.parent.resize(node_count, 0);
            self.opened.resize(node_count, 0);
            self.closed.resize(node_count, 0);
        }
    }

    fn next_generation(&mut self) -> u32 {
        if self.generation == u32::MAX {
            self.opened.fill(0);
            self.closed.fill(0);
            self.generation = 0;
        }
        self.generation += 1;
        self.generation
    }

    fn reconstruct(&self, goal_index: usize, width: usize) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        let mut index = goal_index;
        loop {
            cells.push(cell_of(index, width));
            let parent = self.parent[index] as usize;
            if parent == index {
                break;
            }
            index = parent;
        }
        cells.reverse();
        cells
    }
}

/// Entry on the open list, ordered so the heap pops the lowest total
/// estimate first with deterministic tie-breaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    total_estimate: u32,
    remaining_estimate: u32,
    index: u32,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap behaves as a min-heap; ties fall back to
        // the smaller heuristic and then the smaller cell index so repeated
        // queries expand cells in an identical order.
        other
            .total_estimate
            .cmp(&self.total_estimate)
            .then_with(|| other.remaining_estimate.cmp(&self.remaining_estimate))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: CellCoord, to: CellCoord) -> u32 {
    HEURISTIC_WEIGHT.saturating_mul(from.manhattan_distance(to))
}

fn flat_index(cell: CellCoord, columns: u32, rows: u32, width: usize) -> Option<usize> {
    if cell.column() >= columns || cell.row() >= rows {
        return None;
    }
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    Some(row * width + column)
}

fn cell_of(index: usize, width: usize) -> CellCoord {
    CellCoord::new((index % width) as u32, (index / width) as u32)
}
