//! Progress roll-ups: tasks into a phase, phases into a project
//!
//! Both aggregators return `None` for an empty input so the caller leaves the
//! stored value untouched instead of writing an undefined ratio.

use crate::model::{Phase, PhaseStatus, Task, TaskStatus};

/// Derived values written back to a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRollup {
    pub progress: u8,
    pub status: PhaseStatus,
}

/// Percentage of complete tasks, rounded, plus the derived status
pub fn phase_rollup(tasks: &[Task]) -> Option<PhaseRollup> {
    if tasks.is_empty() {
        return None;
    }
    let complete = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Complete)
        .count();
    Some(PhaseRollup {
        progress: percent(complete, tasks.len()),
        status: derive_phase_status(tasks.iter().map(|t| t.status)),
    })
}

/// First match wins: all complete, any blocked, any started, else not started.
/// Blocked outranks completion count.
pub fn derive_phase_status(statuses: impl IntoIterator<Item = TaskStatus>) -> PhaseStatus {
    let mut all_complete = true;
    let mut any_blocked = false;
    let mut any_started = false;

    for status in statuses {
        match status {
            TaskStatus::Complete => any_started = true,
            TaskStatus::InProgress => {
                all_complete = false;
                any_started = true;
            }
            TaskStatus::Blocked => {
                all_complete = false;
                any_blocked = true;
            }
            TaskStatus::NotStarted => all_complete = false,
        }
    }

    if all_complete {
        PhaseStatus::Complete
    } else if any_blocked {
        PhaseStatus::Blocked
    } else if any_started {
        PhaseStatus::InProgress
    } else {
        PhaseStatus::NotStarted
    }
}

/// Unweighted mean of phase percentages, rounded. A one-task phase counts
/// the same as a fifty-task phase.
pub fn project_progress(phases: &[Phase]) -> Option<u8> {
    if phases.is_empty() {
        return None;
    }
    let total: u32 = phases.iter().map(|p| u32::from(p.progress)).sum();
    Some((f64::from(total) / phases.len() as f64).round() as u8)
}

/// round(100 * part / whole); `whole` must be non-zero
pub(crate) fn percent(part: usize, whole: usize) -> u8 {
    (100.0 * part as f64 / whole as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskRole;
    use chrono::Utc;

    fn tasks(statuses: &[TaskStatus]) -> Vec<Task> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Task {
                id: format!("t{}", i),
                phase_id: "ph".into(),
                project_id: "p".into(),
                title: format!("Task {}", i),
                description: None,
                status: *status,
                role: TaskRole::Contractor,
                assignee: None,
                estimated_days: None,
                critical_path: false,
                order_index: i as i64,
                depends_on: vec![],
                actual_start: None,
                actual_end: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    fn phase(progress: u8) -> Phase {
        Phase {
            id: format!("ph{}", progress),
            project_id: "p".into(),
            name: "Phase".into(),
            description: None,
            order_index: 0,
            status: PhaseStatus::InProgress,
            progress,
        }
    }

    use crate::model::TaskStatus::*;

    #[test]
    fn test_empty_phase_is_left_alone() {
        assert_eq!(phase_rollup(&[]), None);
    }

    #[test]
    fn test_two_of_three_complete_with_blocker() {
        let rollup = phase_rollup(&tasks(&[Complete, Complete, Blocked])).unwrap();
        assert_eq!(rollup.progress, 67);
        assert_eq!(rollup.status, PhaseStatus::Blocked);
    }

    #[test]
    fn test_blocked_outranks_completion() {
        let rollup = phase_rollup(&tasks(&[Complete, Complete, Complete, Blocked])).unwrap();
        assert_eq!(rollup.progress, 75);
        assert_eq!(rollup.status, PhaseStatus::Blocked);
    }

    #[test]
    fn test_status_precedence() {
        assert_eq!(derive_phase_status([Complete, Complete]), PhaseStatus::Complete);
        assert_eq!(derive_phase_status([Complete, NotStarted]), PhaseStatus::InProgress);
        assert_eq!(derive_phase_status([InProgress, NotStarted]), PhaseStatus::InProgress);
        assert_eq!(derive_phase_status([NotStarted, NotStarted]), PhaseStatus::NotStarted);
        assert_eq!(derive_phase_status([Blocked, InProgress]), PhaseStatus::Blocked);
    }

    #[test]
    fn test_progress_rounding() {
        assert_eq!(phase_rollup(&tasks(&[Complete, NotStarted, NotStarted])).unwrap().progress, 33);
        assert_eq!(phase_rollup(&tasks(&[Complete, NotStarted])).unwrap().progress, 50);
        assert_eq!(phase_rollup(&tasks(&[Complete])).unwrap().progress, 100);
    }

    #[test]
    fn test_project_progress_is_unweighted_mean() {
        assert_eq!(project_progress(&[phase(0), phase(100)]), Some(50));
        assert_eq!(project_progress(&[phase(33), phase(34)]), Some(34));
        assert_eq!(project_progress(&[phase(67), phase(0), phase(0)]), Some(22));
        assert_eq!(project_progress(&[]), None);
    }
}
