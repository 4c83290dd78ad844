//! Project health advisor
//!
//! Health score is the completion percentage minus 5 points per blocked task,
//! clamped to 0..=100. The critical path excerpt only reads the per-task flag;
//! no dependency graph is walked.

use serde::Serialize;

use crate::model::{
    Phase, Priority, Project, RecommendedAction, Risk, RiskStatus, Severity, Task, TaskStatus,
};
use crate::rollup::percent;

const BLOCKED_TASK_PENALTY: i64 = 5;
const CRITICAL_PATH_EXCERPT: usize = 5;
const TOP_ITEMS: usize = 3;
const EARLY_PROGRESS_PCT: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    OnTrack,
    AtRisk,
    Delayed,
}

impl HealthStatus {
    /// Delayed is checked first, then At Risk. One blocked task is enough
    /// for At Risk whatever the score.
    pub fn classify(health_score: u8, blocked: usize) -> Self {
        if health_score < 50 || blocked > 2 {
            HealthStatus::Delayed
        } else if health_score < 75 || blocked > 0 {
            HealthStatus::AtRisk
        } else {
            HealthStatus::OnTrack
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::OnTrack => "On Track",
            HealthStatus::AtRisk => "At Risk",
            HealthStatus::Delayed => "Delayed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalTask {
    pub task_id: String,
    pub title: String,
    pub phase_name: Option<String>,
    pub status: TaskStatus,
    /// Illustrative days at risk: 10 blocked, 5 not started, else 0
    pub risk_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorRisk {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorReport {
    pub health_score: u8,
    pub status: HealthStatus,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub blocked_tasks: usize,
    pub in_progress_tasks: usize,
    pub critical_path: Vec<CriticalTask>,
    pub top_actions: Vec<RecommendedAction>,
    pub top_risks: Vec<AdvisorRisk>,
}

pub fn health_score(completed: usize, total: usize, blocked: usize) -> u8 {
    let completion = if total == 0 { 0 } else { i64::from(percent(completed, total)) };
    (completion - BLOCKED_TASK_PENALTY * blocked as i64).clamp(0, 100) as u8
}

pub fn risk_days(status: TaskStatus) -> u32 {
    match status {
        TaskStatus::Blocked => 10,
        TaskStatus::NotStarted => 5,
        TaskStatus::InProgress | TaskStatus::Complete => 0,
    }
}

/// Build the advisor view. `tasks` are expected in phase then task order.
pub fn advise(project: &Project, phases: &[Phase], tasks: &[Task], risks: &[Risk]) -> AdvisorReport {
    let total = tasks.len();
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
    let completed = count(TaskStatus::Complete);
    let blocked = count(TaskStatus::Blocked);
    let in_progress = count(TaskStatus::InProgress);

    let score = health_score(completed, total, blocked);

    let critical_path: Vec<CriticalTask> = tasks
        .iter()
        .filter(|t| t.critical_path)
        .take(CRITICAL_PATH_EXCERPT)
        .map(|t| CriticalTask {
            task_id: t.id.clone(),
            title: t.title.clone(),
            phase_name: phases
                .iter()
                .find(|p| p.id == t.phase_id)
                .map(|p| p.name.clone()),
            status: t.status,
            risk_days: risk_days(t.status),
        })
        .collect();

    let critical_not_started = tasks
        .iter()
        .filter(|t| t.critical_path && t.status == TaskStatus::NotStarted)
        .count();
    let stalled = in_progress == 0 && completed < total;
    let early = project.progress < EARLY_PROGRESS_PCT;

    let mut actions = Vec::new();
    let mut derived_risks = Vec::new();

    if blocked > 0 {
        actions.push(RecommendedAction {
            priority: Priority::High,
            title: format!("Unblock {} task(s)", blocked),
            detail: "Each blocked task pushes the forecast out by about 3 days".to_string(),
        });
        derived_risks.push(AdvisorRisk {
            severity: Severity::High,
            title: "Schedule slip from blockers".to_string(),
            detail: format!("{} task(s) blocked", blocked),
        });
    }
    if critical_not_started > 0 {
        actions.push(RecommendedAction {
            priority: Priority::High,
            title: "Start critical path work".to_string(),
            detail: format!("{} critical task(s) not started", critical_not_started),
        });
        derived_risks.push(AdvisorRisk {
            severity: Severity::Medium,
            title: "Critical path exposure".to_string(),
            detail: format!("{} critical task(s) idle", critical_not_started),
        });
    }
    if stalled {
        actions.push(RecommendedAction {
            priority: Priority::Medium,
            title: "Resume field work".to_string(),
            detail: "No tasks are in progress".to_string(),
        });
        derived_risks.push(AdvisorRisk {
            severity: Severity::Medium,
            title: "Stalled execution".to_string(),
            detail: format!("{} of {} tasks remain open", total - completed, total),
        });
    }
    if early {
        actions.push(RecommendedAction {
            priority: Priority::Medium,
            title: "Accelerate early phases".to_string(),
            detail: format!("Project is {}% complete", project.progress),
        });
        derived_risks.push(AdvisorRisk {
            severity: Severity::Low,
            title: "Early-stage progress lag".to_string(),
            detail: format!("Progress below {}%", EARLY_PROGRESS_PCT),
        });
    }

    let recorded = risks
        .iter()
        .filter(|r| r.status == RiskStatus::Open && r.severity == Severity::High)
        .map(|r| AdvisorRisk {
            severity: r.severity,
            title: r.title.clone(),
            detail: r.mitigation.clone().unwrap_or_default(),
        });

    AdvisorReport {
        health_score: score,
        status: HealthStatus::classify(score, blocked),
        total_tasks: total,
        completed_tasks: completed,
        blocked_tasks: blocked,
        in_progress_tasks: in_progress,
        critical_path,
        top_actions: actions.into_iter().take(TOP_ITEMS).collect(),
        top_risks: derived_risks.into_iter().chain(recorded).take(TOP_ITEMS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PhaseStatus, ProjectStatus, TaskRole};
    use chrono::Utc;
    use crate::model::TaskStatus::*;

    fn project(progress: u8) -> Project {
        Project {
            id: "p".into(),
            owner_id: "alex".into(),
            name: "Pecos North".into(),
            capacity_mw: None,
            cooling_type: None,
            utility: None,
            location: None,
            planned_start: None,
            planned_end: None,
            actual_start: None,
            actual_end: None,
            progress,
            status: ProjectStatus::InProgress,
            created_at: Utc::now(),
        }
    }

    fn tasks(statuses: &[TaskStatus], critical: &[usize]) -> Vec<Task> {
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
                critical_path: critical.contains(&i),
                order_index: i as i64,
                depends_on: vec![],
                actual_start: None,
                actual_end: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    fn phases() -> Vec<Phase> {
        vec![Phase {
            id: "ph".into(),
            project_id: "p".into(),
            name: "Electrical".into(),
            description: None,
            order_index: 0,
            status: PhaseStatus::InProgress,
            progress: 0,
        }]
    }

    #[test]
    fn test_one_blocker_is_at_risk() {
        let t = tasks(
            &[
                Complete, Complete, Complete, Complete, Complete, Complete, Blocked, InProgress,
                NotStarted, NotStarted,
            ],
            &[],
        );
        let report = advise(&project(60), &phases(), &t, &[]);
        assert_eq!(report.health_score, 55);
        assert_eq!(report.status, HealthStatus::AtRisk);
        assert_eq!(report.status.label(), "At Risk");
    }

    #[test]
    fn test_score_is_clamped_at_zero() {
        assert_eq!(health_score(0, 25, 25), 0);
        assert_eq!(health_score(0, 0, 0), 0);
        assert_eq!(health_score(10, 10, 0), 100);
    }

    #[test]
    fn test_classification_precedence() {
        assert_eq!(HealthStatus::classify(90, 3), HealthStatus::Delayed);
        assert_eq!(HealthStatus::classify(49, 0), HealthStatus::Delayed);
        assert_eq!(HealthStatus::classify(95, 1), HealthStatus::AtRisk);
        assert_eq!(HealthStatus::classify(74, 0), HealthStatus::AtRisk);
        assert_eq!(HealthStatus::classify(75, 0), HealthStatus::OnTrack);
    }

    #[test]
    fn test_critical_path_excerpt() {
        let t = tasks(
            &[Blocked, NotStarted, InProgress, Complete, NotStarted, NotStarted, NotStarted],
            &[0, 1, 2, 3, 4, 5, 6],
        );
        let report = advise(&project(10), &phases(), &t, &[]);
        assert_eq!(report.critical_path.len(), 5);
        let days: Vec<u32> = report.critical_path.iter().map(|c| c.risk_days).collect();
        assert_eq!(days, vec![10, 5, 0, 0, 5]);
        assert_eq!(report.critical_path[0].phase_name.as_deref(), Some("Electrical"));
    }

    #[test]
    fn test_actions_and_risks_capped() {
        let t = tasks(&[Blocked, NotStarted, NotStarted], &[1]);
        let risk = Risk {
            id: "r".into(),
            project_id: "p".into(),
            phase_id: None,
            title: "Transformer lead time".into(),
            description: None,
            severity: Severity::High,
            status: RiskStatus::Open,
            mitigation: Some("Order early".into()),
            owner: None,
            created_at: Utc::now(),
        };
        let report = advise(&project(0), &phases(), &t, &[risk]);

        let titles: Vec<&str> = report.top_actions.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Unblock 1 task(s)", "Start critical path work", "Resume field work"]
        );
        assert_eq!(report.top_risks.len(), 3);
        assert_eq!(report.top_risks[0].severity, Severity::High);
    }

    #[test]
    fn test_recorded_high_risks_fill_remaining_slots() {
        let t = tasks(&[Complete, InProgress], &[]);
        let risk = Risk {
            id: "r".into(),
            project_id: "p".into(),
            phase_id: None,
            title: "Transformer lead time".into(),
            description: None,
            severity: Severity::High,
            status: RiskStatus::Open,
            mitigation: None,
            owner: None,
            created_at: Utc::now(),
        };
        let report = advise(&project(50), &phases(), &t, &[risk]);
        assert!(report.top_actions.is_empty());
        assert_eq!(report.top_risks.len(), 1);
        assert_eq!(report.top_risks[0].title, "Transformer lead time");
        assert_eq!(report.health_score, 50);
        assert_eq!(report.status, HealthStatus::AtRisk);
    }
}
