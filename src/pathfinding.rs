use crate::maze::{Dir, Grid, Pos};
use std::collections::VecDeque;

/// Neighbor expansion order: +x, -x, +z, -z. Only affects tie-breaks between equally
/// short routes.
const EXPANSION: [Dir; 4] = [Dir::East, Dir::West, Dir::South, Dir::North];

/// Breadth-first shortest route over passages, both endpoints included.
///
/// The start cell may itself be a wall, so an agent caught inside one still gets a
/// route out; every cell after it must be a passage. Returns `None` when either end is
/// off the grid, the goal is a wall, or the goal cannot be reached.
pub fn find_path(grid: &Grid, start: Pos, goal: Pos) -> Option<Vec<Pos>> {
    grid.tile(start)?;
    if !grid.is_passage(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut prev: Vec<Vec<Option<Pos>>> = vec![vec![None; grid.width()]; grid.height()];
    let mut q = VecDeque::new();
    prev[start.z][start.x] = Some(start);
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        if pos == goal {
            break;
        }
        for dir in EXPANSION {
            let Some(next) = grid.neighbor(pos, dir) else {
                continue;
            };
            if prev[next.z][next.x].is_some() || !grid.is_passage(next) {
                continue;
            }
            prev[next.z][next.x] = Some(pos);
            q.push_back(next);
        }
    }

    prev[goal.z][goal.x]?;
    let mut path = vec![goal];
    let mut cur = goal;
    while cur != start {
        cur = prev[cur.z][cur.x]?;
        path.push(cur);
    }
    path.reverse();
    Some(path)
}
