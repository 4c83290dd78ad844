//! Secondary project records: field logs, documents, safety and utility tracking
//!
//! These carry no aggregation logic beyond counting for display.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;

text_enum! {
    pub enum PunchStatus ("punch status") {
        Open => "open",
        InProgress => "in_progress",
        Closed => "closed",
    }
}

text_enum! {
    pub enum RfiStatus ("rfi status") {
        Open => "open",
        Answered => "answered",
        Closed => "closed",
    }
}

text_enum! {
    pub enum SubcontractorStatus ("subcontractor status") {
        Active => "active",
        Inactive => "inactive",
    }
}

text_enum! {
    pub enum SafetyKind ("safety record kind") {
        Talk => "talk",
        Incident => "incident",
        Permit => "permit",
    }
}

text_enum! {
    pub enum SafetyStatus ("safety status") {
        Open => "open",
        Closed => "closed",
    }
}

text_enum! {
    /// Utility interconnection milestone state
    pub enum MilestoneStatus ("milestone status") {
        Pending => "pending",
        InProgress => "in_progress",
        Complete => "complete",
        Delayed => "delayed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub project_id: String,
    pub task_id: Option<String>,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Reference to a file held by the SecureShare document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub project_id: String,
    pub task_id: Option<String>,
    /// Id in the external document store
    pub external_id: String,
    pub filename: String,
    pub attached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: String,
    pub project_id: String,
    pub log_date: NaiveDate,
    pub weather: Option<String>,
    pub crew_count: Option<i64>,
    pub work_summary: String,
    pub issues: Option<String>,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborEntry {
    pub id: String,
    pub project_id: String,
    pub phase_id: Option<String>,
    pub worker: String,
    pub trade: Option<String>,
    pub hours: f64,
    pub work_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchItem {
    pub id: String,
    pub project_id: String,
    pub phase_id: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub priority: Severity,
    pub status: PunchStatus,
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rfi {
    pub id: String,
    pub project_id: String,
    /// Sequential per project, starting at 1
    pub number: i64,
    pub subject: String,
    pub question: String,
    pub answer: Option<String>,
    pub status: RfiStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcontractor {
    pub id: String,
    pub project_id: String,
    pub company: String,
    pub trade: String,
    pub contact: Option<String>,
    pub status: SubcontractorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCheckin {
    pub id: String,
    pub project_id: String,
    pub worker: String,
    pub location: Option<String>,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
}

/// Toolbox talk, incident report or work permit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRecord {
    pub id: String,
    pub project_id: String,
    pub kind: SafetyKind,
    pub title: String,
    pub details: Option<String>,
    /// Only meaningful for incidents
    pub severity: Option<Severity>,
    pub status: SafetyStatus,
    pub record_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityMilestone {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub order_index: i64,
    pub status: MilestoneStatus,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityAlert {
    pub id: String,
    pub project_id: String,
    pub severity: Severity,
    pub message: String,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

/// Display counts for the field records of one project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldSummary {
    pub open_punch_items: usize,
    pub open_rfis: usize,
    pub labor_hours: f64,
    pub open_incidents: usize,
    pub unacknowledged_alerts: usize,
    pub active_subcontractors: usize,
    pub milestones_complete: usize,
    pub milestones_total: usize,
}
