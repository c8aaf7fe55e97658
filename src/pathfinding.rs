use std::collections::{HashSet, VecDeque};

use crate::grid::GridQuery;
use crate::types::{Direction, Vec2};

/// Next cell on a shortest walkable path from `start` toward `target`.
///
/// Only walls block. Entities are transient and the caller checks occupancy
/// before committing the step.
pub fn find_next_step(
    start: Vec2,
    target: Vec2,
    grid: &impl GridQuery,
    max_distance: i32,
) -> Option<Vec2> {
    if start.manhattan(target) <= 1 {
        return None;
    }
    if let Some(step) = direct_step(start, target, grid) {
        return Some(step);
    }
    bfs_first_step(start, target, grid, max_distance)
}

fn walkable(grid: &impl GridQuery, cell: Vec2) -> bool {
    grid.in_bounds(cell.x, cell.y) && !grid.is_wall(cell.x, cell.y)
}

/// Greedy step along the longer axis first, then the other one.
pub(crate) fn greedy_candidates(start: Vec2, target: Vec2) -> Vec<Vec2> {
    let diff_x = target.x - start.x;
    let diff_y = target.y - start.y;
    let (dx, dy) = (diff_x.signum(), diff_y.signum());

    let mut out = Vec::with_capacity(3);
    if diff_x.abs() > diff_y.abs() && dx != 0 {
        out.push(Vec2::new(start.x + dx, start.y));
    }
    if dy != 0 {
        out.push(Vec2::new(start.x, start.y + dy));
    }
    if dx != 0 {
        out.push(Vec2::new(start.x + dx, start.y));
    }
    out
}

fn direct_step(start: Vec2, target: Vec2, grid: &impl GridQuery) -> Option<Vec2> {
    greedy_candidates(start, target)
        .into_iter()
        .find(|cell| walkable(grid, *cell))
}

fn bfs_first_step(
    start: Vec2,
    target: Vec2,
    grid: &impl GridQuery,
    max_distance: i32,
) -> Option<Vec2> {
    let mut queue: VecDeque<(Vec2, Option<Vec2>)> = VecDeque::new();
    let mut visited = HashSet::new();
    visited.insert(start);
    queue.push_back((start, None));

    while let Some((current, first_step)) = queue.pop_front() {
        if current == target {
            return first_step;
        }
        if current.manhattan(start) >= max_distance {
            continue;
        }

        let mut neighbors: Vec<Vec2> = Direction::ALL
            .iter()
            .map(|dir| current.offset(*dir))
            .collect();
        neighbors.sort_by_key(|cell| cell.manhattan(target));

        for next in neighbors {
            if !walkable(grid, next) || !visited.insert(next) {
                continue;
            }
            queue.push_back((next, first_step.or(Some(next))));
        }
    }
    None
}
