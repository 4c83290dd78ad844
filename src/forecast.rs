//! Schedule and cost forecast
//!
//! An additive penalty model over the current task and phase state:
//!
//! - every blocked task pushes completion out by 3 days
//! - low velocity (under half the tasks done, fewer than 3 in flight) adds 7 days
//! - more than 2 blocked tasks turns into a CAPEX overrun of 5% + 2% per blocker
//!
//! The result is a pure function of its inputs. Snapshots are appended and
//! the two most recent are diffed for the "what changed" view.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::{
    Driver, DriverImpact, ForecastSnapshot, Phase, PhaseStatus, Priority, Project,
    RecommendedAction, Task, TaskStatus,
};

pub const SLIP_DAYS_PER_BLOCKED_TASK: i64 = 3;
pub const LOW_VELOCITY_SLIP_DAYS: i64 = 7;
const LOW_VELOCITY_MAX_IN_PROGRESS: usize = 3;

const OVERRUN_BLOCKED_THRESHOLD: usize = 2;
const OVERRUN_BASE_PCT: f64 = 5.0;
const OVERRUN_PCT_PER_BLOCKED_TASK: f64 = 2.0;

const BASE_CONFIDENCE: u8 = 50;
const CONFIDENCE_STEP: u8 = 10;
pub const MAX_CONFIDENCE: u8 = 85;

/// Forecast values before they are stamped into a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub baseline: NaiveDate,
    pub projected_completion: NaiveDate,
    pub schedule_slip_days: i64,
    pub capex_overrun_pct: f64,
    pub confidence_pct: u8,
    pub drivers: Vec<Driver>,
    pub actions: Vec<RecommendedAction>,
    pub input_fingerprint: String,
}

impl Forecast {
    pub fn into_snapshot(self, project_id: &str, generated_at: DateTime<Utc>) -> ForecastSnapshot {
        ForecastSnapshot {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            generated_at,
            projected_completion: self.projected_completion,
            schedule_slip_days: self.schedule_slip_days,
            capex_overrun_pct: self.capex_overrun_pct,
            confidence_pct: self.confidence_pct,
            drivers: self.drivers,
            actions: self.actions,
            input_fingerprint: self.input_fingerprint,
        }
    }
}

/// Project the completion date and cost overrun.
///
/// Without a target end date the baseline is `today + default_horizon_days`.
pub fn project_forecast(
    project: &Project,
    tasks: &[Task],
    phases: &[Phase],
    today: NaiveDate,
    default_horizon_days: u64,
) -> Forecast {
    let baseline = project
        .planned_end
        .unwrap_or_else(|| add_days(today, default_horizon_days as i64));

    let total = tasks.len();
    let blocked = count_tasks(tasks, TaskStatus::Blocked);
    let in_progress = count_tasks(tasks, TaskStatus::InProgress);
    let completed = count_tasks(tasks, TaskStatus::Complete);
    let completed_phases = phases
        .iter()
        .filter(|p| p.status == PhaseStatus::Complete)
        .count();

    let mut slip_days = 0;
    let mut drivers = Vec::new();
    let mut actions = Vec::new();

    if blocked > 0 {
        let contribution = blocked as i64 * SLIP_DAYS_PER_BLOCKED_TASK;
        slip_days += contribution;
        drivers.push(Driver {
            name: "Blocked tasks".to_string(),
            impact: DriverImpact::Negative,
            detail: format!("{} blocked task(s) add {} days", blocked, contribution),
        });
        actions.push(RecommendedAction {
            priority: Priority::High,
            title: "Clear blocked tasks".to_string(),
            detail: format!(
                "Resolving {} blocker(s) recovers up to {} days",
                blocked, contribution
            ),
        });
    }

    if total > 0 && completed * 2 < total && in_progress < LOW_VELOCITY_MAX_IN_PROGRESS {
        slip_days += LOW_VELOCITY_SLIP_DAYS;
        drivers.push(Driver {
            name: "Low velocity".to_string(),
            impact: DriverImpact::Negative,
            detail: format!(
                "{}/{} tasks complete with {} in progress adds {} days",
                completed, total, in_progress, LOW_VELOCITY_SLIP_DAYS
            ),
        });
    }

    if completed_phases > 0 {
        drivers.push(Driver {
            name: "Phases complete".to_string(),
            impact: DriverImpact::Positive,
            detail: format!("{} phase(s) complete on schedule", completed_phases),
        });
    }

    let capex_overrun_pct = if blocked > OVERRUN_BLOCKED_THRESHOLD {
        OVERRUN_BASE_PCT + OVERRUN_PCT_PER_BLOCKED_TASK * blocked as f64
    } else {
        0.0
    };

    let mut confidence = BASE_CONFIDENCE;
    if total > 0 {
        confidence += CONFIDENCE_STEP;
    }
    if !phases.is_empty() {
        confidence += CONFIDENCE_STEP;
    }
    if project.planned_end.is_some() {
        confidence += CONFIDENCE_STEP;
    }

    if !drivers.iter().any(|d| d.impact == DriverImpact::Negative) {
        drivers.push(Driver {
            name: "On track".to_string(),
            impact: DriverImpact::Positive,
            detail: "No blockers or velocity concerns".to_string(),
        });
        actions.push(RecommendedAction {
            priority: Priority::Low,
            title: "Keep monitoring".to_string(),
            detail: "Regenerate the forecast after the next round of status updates".to_string(),
        });
    }

    Forecast {
        baseline,
        projected_completion: add_days(baseline, slip_days),
        schedule_slip_days: slip_days,
        capex_overrun_pct,
        confidence_pct: confidence.min(MAX_CONFIDENCE),
        drivers,
        actions,
        input_fingerprint: fingerprint(baseline, tasks, phases),
    }
}

/// Change between two consecutive snapshots, later minus earlier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDelta {
    pub slip_days: i64,
    pub overrun_pct: f64,
    pub confidence_pct: i32,
    pub completion_days: i64,
    pub inputs_changed: bool,
}

impl ForecastDelta {
    pub fn between(previous: &ForecastSnapshot, latest: &ForecastSnapshot) -> Self {
        Self {
            slip_days: latest.schedule_slip_days - previous.schedule_slip_days,
            overrun_pct: latest.capex_overrun_pct - previous.capex_overrun_pct,
            confidence_pct: i32::from(latest.confidence_pct) - i32::from(previous.confidence_pct),
            completion_days: (latest.projected_completion - previous.projected_completion)
                .num_days(),
            inputs_changed: latest.input_fingerprint != previous.input_fingerprint,
        }
    }

    /// Diff the two most recent snapshots of a newest-first history
    pub fn from_history(history: &[ForecastSnapshot]) -> Option<Self> {
        match history {
            [latest, previous, ..] => Some(Self::between(previous, latest)),
            _ => None,
        }
    }
}

fn count_tasks(tasks: &[Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// SHA-256 over the baseline and the id/status of every task and phase,
/// independent of input order
fn fingerprint(baseline: NaiveDate, tasks: &[Task], phases: &[Phase]) -> String {
    let mut lines: Vec<String> = tasks
        .iter()
        .map(|t| format!("task:{}:{}", t.id, t.status))
        .chain(phases.iter().map(|p| format!("phase:{}:{}", p.id, p.status)))
        .collect();
    lines.sort();

    let mut hasher = Sha256::new();
    hasher.update(format!("baseline:{}\n", baseline));
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectStatus, TaskRole};
    use crate::model::TaskStatus::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project(planned_end: Option<NaiveDate>) -> Project {
        Project {
            id: "p".into(),
            owner_id: "alex".into(),
            name: "Pecos North".into(),
            capacity_mw: Some(50.0),
            cooling_type: None,
            utility: None,
            location: None,
            planned_start: None,
            planned_end,
            actual_start: None,
            actual_end: None,
            progress: 0,
            status: ProjectStatus::InProgress,
            created_at: Utc::now(),
        }
    }

    fn tasks(statuses: &[TaskStatus]) -> Vec<Task> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Task {
                id: format!("t{}", i),
                phase_id: "ph0".into(),
                project_id: "p".into(),
                title: format!("Task {}", i),
                description: None,
                status: *status,
                role: TaskRole::Engineer,
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

    fn phases(statuses: &[PhaseStatus]) -> Vec<Phase> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Phase {
                id: format!("ph{}", i),
                project_id: "p".into(),
                name: format!("Phase {}", i),
                description: None,
                order_index: i as i64,
                status: *status,
                progress: 0,
            })
            .collect()
    }

    #[test]
    fn test_blockers_and_low_velocity_slip() {
        // 10 tasks: 4 complete, 3 blocked, 3 not started
        let tasks = tasks(&[
            Complete, Complete, Complete, Complete, Blocked, Blocked, Blocked, NotStarted,
            NotStarted, NotStarted,
        ]);
        let phases = phases(&[PhaseStatus::Blocked]);
        let forecast = project_forecast(
            &project(Some(date(2025, 6, 1))),
            &tasks,
            &phases,
            date(2025, 3, 1),
            180,
        );

        assert_eq!(forecast.schedule_slip_days, 16);
        assert_eq!(forecast.projected_completion, date(2025, 6, 17));
        assert_eq!(forecast.capex_overrun_pct, 11.0);
        assert_eq!(forecast.confidence_pct, 80);
        assert_eq!(forecast.drivers.len(), 2);
        assert!(forecast
            .drivers
            .iter()
            .all(|d| d.impact == DriverImpact::Negative));
        assert_eq!(forecast.actions[0].priority, Priority::High);
        assert!(forecast.actions[0].detail.contains("9 days"));
    }

    #[test]
    fn test_overrun_needs_more_than_two_blockers() {
        let forecast = project_forecast(
            &project(Some(date(2025, 6, 1))),
            &tasks(&[Blocked, Blocked, InProgress, InProgress, InProgress, Complete]),
            &[],
            date(2025, 3, 1),
            180,
        );
        assert_eq!(forecast.capex_overrun_pct, 0.0);
        assert_eq!(forecast.schedule_slip_days, 6);
    }

    #[test]
    fn test_clean_project_gets_on_track_driver() {
        let forecast = project_forecast(
            &project(Some(date(2025, 6, 1))),
            &tasks(&[Complete, Complete, InProgress]),
            &phases(&[PhaseStatus::Complete, PhaseStatus::InProgress]),
            date(2025, 3, 1),
            180,
        );
        assert_eq!(forecast.schedule_slip_days, 0);
        assert_eq!(forecast.projected_completion, date(2025, 6, 1));
        let names: Vec<&str> = forecast.drivers.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Phases complete", "On track"]);
        assert_eq!(forecast.actions.len(), 1);
        assert_eq!(forecast.actions[0].priority, Priority::Low);
    }

    #[test]
    fn test_default_horizon_without_target_date() {
        let forecast = project_forecast(&project(None), &[], &[], date(2025, 1, 1), 30);
        assert_eq!(forecast.baseline, date(2025, 1, 31));
        assert_eq!(forecast.projected_completion, date(2025, 1, 31));
        assert_eq!(forecast.confidence_pct, 50);
    }

    #[test]
    fn test_confidence_grows_with_available_inputs() {
        let today = date(2025, 3, 1);
        let t = tasks(&[InProgress]);
        let ph = phases(&[PhaseStatus::InProgress]);

        let none = project_forecast(&project(None), &[], &[], today, 180).confidence_pct;
        let with_tasks = project_forecast(&project(None), &t, &[], today, 180).confidence_pct;
        let with_phases = project_forecast(&project(None), &t, &ph, today, 180).confidence_pct;
        let all = project_forecast(&project(Some(today)), &t, &ph, today, 180).confidence_pct;

        assert!(none <= with_tasks && with_tasks <= with_phases && with_phases <= all);
        assert!(all <= MAX_CONFIDENCE);
    }

    #[test]
    fn test_repeated_generation_is_identical() {
        let p = project(Some(date(2025, 6, 1)));
        let t = tasks(&[Blocked, NotStarted, Complete]);
        let ph = phases(&[PhaseStatus::Blocked]);
        let a = project_forecast(&p, &t, &ph, date(2025, 3, 1), 180);
        let b = project_forecast(&p, &t, &ph, date(2025, 3, 1), 180);
        assert_eq!(a, b);

        let mut reversed = t.clone();
        reversed.reverse();
        let c = project_forecast(&p, &reversed, &ph, date(2025, 3, 1), 180);
        assert_eq!(a.input_fingerprint, c.input_fingerprint);
    }

    #[test]
    fn test_delta_between_latest_two() {
        let p = project(Some(date(2025, 6, 1)));
        let ph = phases(&[PhaseStatus::InProgress]);
        let earlier = project_forecast(&p, &tasks(&[InProgress, Complete]), &ph, date(2025, 3, 1), 180)
            .into_snapshot("p", Utc::now());
        let later = project_forecast(
            &p,
            &tasks(&[Blocked, Blocked, Blocked, NotStarted]),
            &ph,
            date(2025, 3, 1),
            180,
        )
        .into_snapshot("p", Utc::now());

        let delta = ForecastDelta::from_history(&[later.clone(), earlier.clone()]).unwrap();
        assert_eq!(delta.slip_days, 16);
        assert_eq!(delta.completion_days, 16);
        assert_eq!(delta.overrun_pct, 11.0);
        assert_eq!(delta.confidence_pct, 0);
        assert!(delta.inputs_changed);

        assert!(ForecastDelta::from_history(&[later]).is_none());
    }
}
