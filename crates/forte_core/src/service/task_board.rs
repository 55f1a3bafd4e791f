//! Weekly board projection of a task list.
//!
//! # Invariants
//! - Every `DayOfWeek` column is present, even when empty.
//! - Tasks with an unrecognized day key appear in no column.
//! - Column order: incomplete before completed, newest first within each.

use crate::model::task::{DayOfWeek, Task};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Groups `tasks` into Monday..Saturday columns.
pub fn group_by_day(tasks: &[Task]) -> BTreeMap<DayOfWeek, Vec<Task>> {
    let mut board: BTreeMap<DayOfWeek, Vec<Task>> = DayOfWeek::ALL
        .into_iter()
        .map(|day| (day, Vec::new()))
        .collect();

    for task in tasks {
        if let Some(column) = task.day_of_week().and_then(|day| board.get_mut(&day)) {
            column.push(task.clone());
        }
    }

    for column in board.values_mut() {
        column.sort_by(board_order);
    }
    board
}

/// Column ordering: pending first, then descending creation time.
fn board_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.created_at.cmp(&a.created_at))
}
