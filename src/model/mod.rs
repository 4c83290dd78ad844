//! Domain records and closed status enums
//!
//! Every status, role and severity value is a closed enum stored as snake_case
//! TEXT. Derivations match on them exhaustively so a new state cannot slip
//! through unhandled.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Defines a closed enum backed by a fixed snake_case string per variant,
/// with `Display`, `FromStr` and SQLite conversions.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::error::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

pub(crate) use text_enum;

pub mod field;

text_enum! {
    /// Lifecycle of a project, edited by the user
    pub enum ProjectStatus ("project status") {
        Planning => "planning",
        InProgress => "in_progress",
        Delayed => "delayed",
        Complete => "complete",
    }
}

text_enum! {
    /// Derived from the phase's tasks, see [`crate::rollup`]
    pub enum PhaseStatus ("phase status") {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Blocked => "blocked",
        Complete => "complete",
    }
}

text_enum! {
    pub enum TaskStatus ("task status") {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Blocked => "blocked",
        Complete => "complete",
    }
}

text_enum! {
    /// Party responsible for a task
    pub enum TaskRole ("task role") {
        Owner => "owner",
        Engineer => "engineer",
        Contractor => "contractor",
        Utility => "utility",
    }
}

text_enum! {
    /// Shared by risks, punch items, alerts and safety incidents
    pub enum Severity ("severity") {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

text_enum! {
    pub enum RiskStatus ("risk status") {
        Open => "open",
        Mitigated => "mitigated",
        Closed => "closed",
    }
}

text_enum! {
    pub enum CoolingType ("cooling type") {
        Air => "air",
        Hydro => "hydro",
        Immersion => "immersion",
    }
}

text_enum! {
    /// Urgency of a recommended action
    pub enum Priority ("priority") {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

text_enum! {
    pub enum DriverImpact ("driver impact") {
        Positive => "positive",
        Negative => "negative",
    }
}

// ============================================
// PROJECTS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub capacity_mw: Option<f64>,
    pub cooling_type: Option<CoolingType>,
    /// Utility or grid operator
    pub utility: Option<String>,
    pub location: Option<String>,
    pub planned_start: Option<NaiveDate>,
    /// Target end date used by the forecast
    pub planned_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    /// 0-100, written only by the project roll-up
    pub progress: u8,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the user when creating a project
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub owner_id: String,
    pub name: String,
    pub capacity_mw: Option<f64>,
    pub cooling_type: Option<CoolingType>,
    pub utility: Option<String>,
    pub location: Option<String>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
}

/// Date edits for an existing project; `None` keeps the stored value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectDates {
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
}

// ============================================
// PHASES & TASKS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub status: PhaseStatus,
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub phase_id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub role: TaskRole,
    pub assignee: Option<String>,
    pub estimated_days: Option<i64>,
    pub critical_path: bool,
    pub order_index: i64,
    /// Ids of other tasks. Stored and displayed only, never traversed.
    pub depends_on: Vec<String>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Move to `status`, stamping the actual start/end dates on first entry
    /// into `in_progress` / `complete`. Returns false when nothing changed.
    pub fn transition(&mut self, status: TaskStatus, today: NaiveDate) -> bool {
        if self.status == status {
            return false;
        }
        match status {
            TaskStatus::InProgress => {
                self.actual_start.get_or_insert(today);
            }
            TaskStatus::Complete => {
                self.actual_end.get_or_insert(today);
            }
            TaskStatus::NotStarted | TaskStatus::Blocked => {}
        }
        self.status = status;
        true
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub role: TaskRole,
    pub assignee: Option<String>,
    pub estimated_days: Option<i64>,
    pub critical_path: bool,
    pub depends_on: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, role: TaskRole) -> Self {
        Self {
            title: title.into(),
            description: None,
            role,
            assignee: None,
            estimated_days: None,
            critical_path: false,
            depends_on: Vec::new(),
        }
    }
}

// ============================================
// RISKS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    pub project_id: String,
    pub phase_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub status: RiskStatus,
    pub mitigation: Option<String>,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// FORECASTS
// ============================================

/// Named factor that moved the forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub impact: DriverImpact,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub priority: Priority,
    pub title: String,
    pub detail: String,
}

/// Immutable point-in-time projection. Appended, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub id: String,
    pub project_id: String,
    pub generated_at: DateTime<Utc>,
    pub projected_completion: NaiveDate,
    pub schedule_slip_days: i64,
    pub capex_overrun_pct: f64,
    pub confidence_pct: u8,
    pub drivers: Vec<Driver>,
    pub actions: Vec<RecommendedAction>,
    /// SHA-256 of the task/phase state the snapshot was computed from
    pub input_fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus) -> Task {
        Task {
            id: "t1".into(),
            phase_id: "p1".into(),
            project_id: "proj".into(),
            title: "Pour foundations".into(),
            description: None,
            status,
            role: TaskRole::Contractor,
            assignee: None,
            estimated_days: Some(5),
            critical_path: true,
            order_index: 0,
            depends_on: vec![],
            actual_start: None,
            actual_end: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_enum_round_trip_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), *status);
        }
        assert_eq!(ProjectStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_unknown_enum_value_lists_choices() {
        let err = "paused".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err.kind, "task status");
        assert!(err.expected.contains("not_started"));
        assert!(err.to_string().contains("paused"));
    }

    #[test]
    fn test_transition_stamps_start_once() {
        let day1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let mut t = task(TaskStatus::NotStarted);

        assert!(t.transition(TaskStatus::InProgress, day1));
        assert_eq!(t.actual_start, Some(day1));

        t.transition(TaskStatus::Blocked, day2);
        t.transition(TaskStatus::InProgress, day2);
        assert_eq!(t.actual_start, Some(day1));
        assert_eq!(t.actual_end, None);

        t.transition(TaskStatus::Complete, day2);
        assert_eq!(t.actual_end, Some(day2));
    }

    #[test]
    fn test_transition_to_same_status_is_noop() {
        let mut t = task(TaskStatus::InProgress);
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(!t.transition(TaskStatus::InProgress, today));
        assert_eq!(t.actual_start, None);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&PhaseStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }
}
