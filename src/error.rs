//! Typed domain errors

use thiserror::Error;

/// Lookup failures surfaced by the dashboard service
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("phase not found: {0}")]
    PhaseNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("risk not found: {0}")]
    RiskNotFound(String),

    #[error("{kind} not found: {id}")]
    RecordNotFound { kind: &'static str, id: String },

    #[error("{kind} {id} does not belong to project {project}")]
    OutsideProject {
        kind: &'static str,
        id: String,
        project: String,
    },

    #[error("{0} id must not be empty")]
    EmptyLookup(&'static str),

    #[error("{kind} id prefix '{query}' matches more than one record")]
    AmbiguousId { kind: &'static str, query: String },
}

/// Raised when a stored or user-supplied string names no enum variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}
