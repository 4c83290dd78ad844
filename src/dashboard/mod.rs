//! Project dashboard service
//!
//! Every mutation runs in one SQLite transaction together with the roll-ups
//! it triggers (task -> phase -> project). The query cache is only
//! invalidated after the commit succeeds, so a failed write never leaves
//! local state ahead of the database.

mod field;

pub use field::NewDailyLog;

use anyhow::{ensure, Result};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::advisor::{self, AdvisorReport};
use crate::cache::{EntityKind, QueryCache, QueryKey};
use crate::error::DashboardError;
use crate::forecast::{self, ForecastDelta};
use crate::model::field::{MilestoneStatus, UtilityMilestone};
use crate::model::{
    ForecastSnapshot, NewProject, NewTask, Phase, PhaseStatus, Project, ProjectDates,
    ProjectStatus, Risk, RiskStatus, Severity, Task, TaskStatus,
};
use crate::rollup::{self, PhaseRollup};
use crate::store::ProjectStore;
use crate::template::{DEFAULT_TEMPLATE, DEFAULT_UTILITY_MILESTONES};

/// Result of a task status change after the cascade has been written
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub task: Task,
    /// `None` when the status did not change
    pub phase: Option<PhaseRollup>,
    pub project_progress: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct NewRisk {
    pub project_id: String,
    pub phase_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub mitigation: Option<String>,
    pub owner: Option<String>,
}

pub struct Dashboard {
    store: ProjectStore,
    cache: QueryCache,
    horizon_days: u64,
}

impl Dashboard {
    pub fn new(store: ProjectStore, horizon_days: u64) -> Self {
        Self {
            store,
            cache: QueryCache::new(),
            horizon_days,
        }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ============================================
    // PROJECTS
    // ============================================

    /// Create a project, optionally seeded with the default phases, tasks
    /// and utility milestones
    pub fn create_project(&mut self, new: NewProject, seed_template: bool) -> Result<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            owner_id: new.owner_id,
            name: new.name,
            capacity_mw: new.capacity_mw,
            cooling_type: new.cooling_type,
            utility: new.utility,
            location: new.location,
            planned_start: new.planned_start,
            planned_end: new.planned_end,
            actual_start: None,
            actual_end: None,
            progress: 0,
            status: ProjectStatus::Planning,
            created_at: Utc::now(),
        };

        let result = self.store.transaction(|store| {
            store.insert_project(&project)?;
            if seed_template {
                seed_default_template(store, &project.id)?;
            }
            Ok(())
        });
        logged("create project", result)?;

        self.cache.invalidate_kind(EntityKind::Projects);
        info!(project = %project.id, name = %project.name, seeded = seed_template, "project created");
        Ok(project)
    }

    /// Look up a project by id, id prefix or name
    pub fn project(&self, query: &str) -> Result<Project> {
        self.store
            .find_project(query)?
            .ok_or_else(|| DashboardError::ProjectNotFound(query.to_string()).into())
    }

    pub fn projects(&mut self, owner_id: Option<&str>) -> Result<Vec<Project>> {
        let key = match owner_id {
            Some(owner) => QueryKey::new(EntityKind::Projects, owner),
            None => QueryKey::root(EntityKind::Projects),
        };
        let store = &self.store;
        self.cache.get_or_load(key, || store.list_projects(owner_id))
    }

    pub fn set_project_status(&mut self, project_id: &str, status: ProjectStatus) -> Result<()> {
        let changed = logged(
            "update project status",
            self.store.update_project_status(project_id, status),
        )?;
        if changed == 0 {
            return Err(DashboardError::ProjectNotFound(project_id.to_string()).into());
        }
        self.cache.invalidate_kind(EntityKind::Projects);
        Ok(())
    }

    /// Apply user date edits. Fields left `None` keep their stored value.
    pub fn set_project_dates(&mut self, project_id: &str, dates: ProjectDates) -> Result<Project> {
        let mut project = self.require_project(project_id)?;
        project.planned_start = dates.planned_start.or(project.planned_start);
        project.planned_end = dates.planned_end.or(project.planned_end);
        project.actual_start = dates.actual_start.or(project.actual_start);
        project.actual_end = dates.actual_end.or(project.actual_end);
        if let (Some(start), Some(end)) = (project.planned_start, project.planned_end) {
            ensure!(start <= end, "planned end {} is before planned start {}", end, start);
        }

        logged(
            "update project dates",
            self.store.update_project_dates(
                &project.id,
                project.planned_start,
                project.planned_end,
                project.actual_start,
                project.actual_end,
            ),
        )?;
        self.cache.invalidate_kind(EntityKind::Projects);
        debug!(project = %project.id, "project dates updated");
        Ok(project)
    }

    // ============================================
    // PHASES
    // ============================================

    pub fn add_phase(
        &mut self,
        project_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Phase> {
        self.require_project(project_id)?;
        let result = self.store.transaction(|store| {
            let phase = Phase {
                id: Uuid::new_v4().to_string(),
                project_id: project_id.to_string(),
                name: name.to_string(),
                description: description.map(String::from),
                order_index: store.next_phase_order(project_id)?,
                status: PhaseStatus::NotStarted,
                progress: 0,
            };
            store.insert_phase(&phase)?;
            rollup_project(store, project_id)?;
            Ok(phase)
        });
        let phase = logged("add phase", result)?;

        self.invalidate_project(project_id, None);
        Ok(phase)
    }

    pub fn phases(&mut self, project_id: &str) -> Result<Vec<Phase>> {
        let store = &self.store;
        self.cache
            .get_or_load(QueryKey::new(EntityKind::Phases, project_id), || {
                store.list_phases(project_id)
            })
    }

    /// Look up a phase by id or id prefix
    pub fn phase(&self, query: &str) -> Result<Phase> {
        self.store
            .find_phase(query)?
            .ok_or_else(|| DashboardError::PhaseNotFound(query.to_string()).into())
    }

    /// Recompute one phase from its tasks and cascade into the project.
    /// Returns `None` when the phase has no tasks and was left unchanged.
    pub fn recompute_phase(&mut self, phase_id: &str) -> Result<Option<PhaseRollup>> {
        let phase = self.phase(phase_id)?;
        let result = self.store.transaction(|store| {
            let rollup = rollup_phase(store, &phase.id)?;
            rollup_project(store, &phase.project_id)?;
            Ok(rollup)
        });
        let rollup = logged("recompute phase", result)?;

        self.invalidate_project(&phase.project_id, Some(&phase.id));
        Ok(rollup)
    }

    // ============================================
    // TASKS
    // ============================================

    pub fn add_task(&mut self, phase_id: &str, new: NewTask) -> Result<Task> {
        let phase = self.phase(phase_id)?;
        let result = self.store.transaction(|store| {
            let task = Task {
                id: Uuid::new_v4().to_string(),
                phase_id: phase.id.clone(),
                project_id: phase.project_id.clone(),
                title: new.title,
                description: new.description,
                status: TaskStatus::NotStarted,
                role: new.role,
                assignee: new.assignee,
                estimated_days: new.estimated_days,
                critical_path: new.critical_path,
                order_index: store.next_task_order(&phase.id)?,
                depends_on: new.depends_on,
                actual_start: None,
                actual_end: None,
                created_at: Utc::now(),
            };
            store.insert_task(&task)?;
            rollup_phase(store, &phase.id)?;
            rollup_project(store, &phase.project_id)?;
            Ok(task)
        });
        let task = logged("add task", result)?;

        self.invalidate_project(&phase.project_id, Some(&phase.id));
        debug!(task = %task.id, phase = %phase.id, "task added");
        Ok(task)
    }

    pub fn task(&self, query: &str) -> Result<Task> {
        self.store
            .find_task(query)?
            .ok_or_else(|| DashboardError::TaskNotFound(query.to_string()).into())
    }

    pub fn tasks(&mut self, phase_id: &str) -> Result<Vec<Task>> {
        let store = &self.store;
        self.cache
            .get_or_load(QueryKey::new(EntityKind::Tasks, phase_id), || {
                store.list_tasks(phase_id)
            })
    }

    pub fn project_tasks(&mut self, project_id: &str) -> Result<Vec<Task>> {
        let store = &self.store;
        self.cache
            .get_or_load(QueryKey::new(EntityKind::ProjectTasks, project_id), || {
                store.list_project_tasks(project_id)
            })
    }

    /// Change a task's status, stamping actual dates, then recompute its
    /// phase and project in the same transaction
    pub fn update_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        today: NaiveDate,
    ) -> Result<TaskUpdate> {
        let mut task = self.task(task_id)?;
        if !task.transition(status, today) {
            return Ok(TaskUpdate {
                task,
                phase: None,
                project_progress: None,
            });
        }

        let result = self.store.transaction(|store| {
            store.update_task_status(&task.id, task.status, task.actual_start, task.actual_end)?;
            let phase = rollup_phase(store, &task.phase_id)?;
            let project_progress = rollup_project(store, &task.project_id)?;
            Ok((phase, project_progress))
        });
        let (phase, project_progress) = logged("update task status", result)?;

        self.invalidate_project(&task.project_id, Some(&task.phase_id));
        info!(task = %task.id, status = %task.status, "task status updated");
        Ok(TaskUpdate {
            task,
            phase,
            project_progress,
        })
    }

    pub fn assign_task(&mut self, task_id: &str, assignee: Option<&str>) -> Result<Task> {
        let mut task = self.task(task_id)?;
        logged("assign task", self.store.assign_task(&task.id, assignee))?;
        task.assignee = assignee.map(String::from);
        self.invalidate_project(&task.project_id, Some(&task.phase_id));
        Ok(task)
    }

    // ============================================
    // RISKS
    // ============================================

    pub fn add_risk(&mut self, new: NewRisk) -> Result<Risk> {
        self.require_project(&new.project_id)?;
        self.require_phase_in(&new.project_id, new.phase_id.as_deref())?;
        let risk = Risk {
            id: Uuid::new_v4().to_string(),
            project_id: new.project_id,
            phase_id: new.phase_id,
            title: new.title,
            description: new.description,
            severity: new.severity,
            status: RiskStatus::Open,
            mitigation: new.mitigation,
            owner: new.owner,
            created_at: Utc::now(),
        };
        logged("add risk", self.store.insert_risk(&risk))?;
        self.cache
            .invalidate(&QueryKey::new(EntityKind::Risks, risk.project_id.as_str()));
        Ok(risk)
    }

    pub fn risks(&mut self, project_id: &str) -> Result<Vec<Risk>> {
        let store = &self.store;
        self.cache
            .get_or_load(QueryKey::new(EntityKind::Risks, project_id), || {
                store.list_risks(project_id)
            })
    }

    pub fn set_risk_status(&mut self, risk_id: &str, status: RiskStatus) -> Result<()> {
        let changed = logged("update risk status", self.store.update_risk_status(risk_id, status))?;
        if changed == 0 {
            return Err(DashboardError::RiskNotFound(risk_id.to_string()).into());
        }
        self.cache.invalidate_kind(EntityKind::Risks);
        Ok(())
    }

    // ============================================
    // FORECASTS & ADVISOR
    // ============================================

    /// Compute a forecast from the current state and append it
    pub fn generate_forecast(&mut self, project_id: &str, today: NaiveDate) -> Result<ForecastSnapshot> {
        let project = self.require_project(project_id)?;
        let tasks = self.project_tasks(project_id)?;
        let phases = self.phases(project_id)?;

        let snapshot = forecast::project_forecast(&project, &tasks, &phases, today, self.horizon_days)
            .into_snapshot(project_id, Utc::now());
        logged("save forecast", self.store.insert_forecast(&snapshot))?;

        self.cache
            .invalidate(&QueryKey::new(EntityKind::Forecasts, project_id));
        info!(
            project = %project_id,
            slip_days = snapshot.schedule_slip_days,
            confidence = snapshot.confidence_pct,
            "forecast generated"
        );
        Ok(snapshot)
    }

    /// Snapshot history, newest first
    pub fn forecasts(&mut self, project_id: &str) -> Result<Vec<ForecastSnapshot>> {
        let store = &self.store;
        self.cache
            .get_or_load(QueryKey::new(EntityKind::Forecasts, project_id), || {
                store.list_forecasts(project_id, None)
            })
    }

    /// Difference between the two most recent snapshots
    pub fn forecast_delta(&mut self, project_id: &str) -> Result<Option<ForecastDelta>> {
        let history = self.forecasts(project_id)?;
        Ok(ForecastDelta::from_history(&history))
    }

    pub fn advise(&mut self, project_id: &str) -> Result<AdvisorReport> {
        let project = self.require_project(project_id)?;
        let phases = self.phases(project_id)?;
        let tasks = self.project_tasks(project_id)?;
        let risks = self.risks(project_id)?;
        Ok(advisor::advise(&project, &phases, &tasks, &risks))
    }

    // ============================================
    // HELPERS
    // ============================================

    fn require_project(&self, project_id: &str) -> Result<Project> {
        self.store
            .get_project(project_id)?
            .ok_or_else(|| DashboardError::ProjectNotFound(project_id.to_string()).into())
    }

    /// Look up a task by id or prefix, requiring it to belong to `project_id`
    pub fn project_task(&self, project_id: &str, query: &str) -> Result<Task> {
        let task = self.task(query)?;
        ensure_in_project("task", &task.id, &task.project_id, project_id)?;
        Ok(task)
    }

    /// Look up a phase by id or prefix, requiring it to belong to `project_id`
    pub fn project_phase(&self, project_id: &str, query: &str) -> Result<Phase> {
        let phase = self.phase(query)?;
        ensure_in_project("phase", &phase.id, &phase.project_id, project_id)?;
        Ok(phase)
    }

    fn require_task_in(&self, project_id: &str, task_id: Option<&str>) -> Result<()> {
        if let Some(id) = task_id {
            let task = self
                .store
                .get_task(id)?
                .ok_or_else(|| DashboardError::TaskNotFound(id.to_string()))?;
            ensure_in_project("task", &task.id, &task.project_id, project_id)?;
        }
        Ok(())
    }

    fn require_phase_in(&self, project_id: &str, phase_id: Option<&str>) -> Result<()> {
        if let Some(id) = phase_id {
            let phase = self
                .store
                .get_phase(id)?
                .ok_or_else(|| DashboardError::PhaseNotFound(id.to_string()))?;
            ensure_in_project("phase", &phase.id, &phase.project_id, project_id)?;
        }
        Ok(())
    }

    /// Drop cached rows touched by a write to the project's phases or tasks
    fn invalidate_project(&mut self, project_id: &str, phase_id: Option<&str>) {
        self.cache
            .invalidate(&QueryKey::new(EntityKind::Phases, project_id));
        self.cache
            .invalidate(&QueryKey::new(EntityKind::ProjectTasks, project_id));
        if let Some(phase_id) = phase_id {
            self.cache
                .invalidate(&QueryKey::new(EntityKind::Tasks, phase_id));
        }
        self.cache.invalidate_kind(EntityKind::Projects);
    }
}

/// Write the phase roll-up; leaves the phase untouched when it has no tasks
fn rollup_phase(store: &ProjectStore, phase_id: &str) -> Result<Option<PhaseRollup>> {
    let tasks = store.list_tasks(phase_id)?;
    let rollup = rollup::phase_rollup(&tasks);
    if let Some(r) = rollup {
        store.set_phase_rollup(phase_id, r.progress, r.status)?;
    }
    Ok(rollup)
}

/// Write the project progress; leaves it untouched when there are no phases
fn rollup_project(store: &ProjectStore, project_id: &str) -> Result<Option<u8>> {
    let phases = store.list_phases(project_id)?;
    let progress = rollup::project_progress(&phases);
    if let Some(p) = progress {
        store.set_project_progress(project_id, p)?;
    }
    Ok(progress)
}

fn seed_default_template(store: &ProjectStore, project_id: &str) -> Result<()> {
    let now = Utc::now();
    for (phase_index, template) in DEFAULT_TEMPLATE.iter().enumerate() {
        let phase = Phase {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            name: template.name.to_string(),
            description: Some(template.description.to_string()),
            order_index: phase_index as i64,
            status: PhaseStatus::NotStarted,
            progress: 0,
        };
        store.insert_phase(&phase)?;

        for (task_index, t) in template.tasks.iter().enumerate() {
            store.insert_task(&Task {
                id: Uuid::new_v4().to_string(),
                phase_id: phase.id.clone(),
                project_id: project_id.to_string(),
                title: t.title.to_string(),
                description: None,
                status: TaskStatus::NotStarted,
                role: t.role,
                assignee: None,
                estimated_days: Some(t.estimated_days),
                critical_path: t.critical_path,
                order_index: task_index as i64,
                depends_on: Vec::new(),
                actual_start: None,
                actual_end: None,
                created_at: now,
            })?;
        }
    }

    for (index, name) in DEFAULT_UTILITY_MILESTONES.iter().enumerate() {
        store.insert_milestone(&UtilityMilestone {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            order_index: index as i64,
            status: MilestoneStatus::Pending,
            expected_date: None,
            notes: None,
        })?;
    }
    Ok(())
}

fn ensure_in_project(kind: &'static str, id: &str, owner: &str, project_id: &str) -> Result<()> {
    if owner != project_id {
        return Err(DashboardError::OutsideProject {
            kind,
            id: id.to_string(),
            project: project_id.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Log a failed write before handing the error back to the caller
fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(ref e) = result {
        warn!(operation, error = %e, "write failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskRole;

    fn dashboard() -> Dashboard {
        Dashboard::new(ProjectStore::open_in_memory().unwrap(), 180)
    }

    fn new_project(planned_end: Option<NaiveDate>) -> NewProject {
        NewProject {
            owner_id: "alex".to_string(),
            name: "Pecos North".to_string(),
            capacity_mw: Some(50.0),
            planned_end,
            ..Default::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_seeded_project_has_template() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), true).unwrap();

        let phases = dash.phases(&project.id).unwrap();
        assert_eq!(phases.len(), DEFAULT_TEMPLATE.len());
        assert_eq!(phases[0].name, DEFAULT_TEMPLATE[0].name);

        let expected: usize = DEFAULT_TEMPLATE.iter().map(|p| p.tasks.len()).sum();
        assert_eq!(dash.project_tasks(&project.id).unwrap().len(), expected);
        assert_eq!(
            dash.store().list_milestones(&project.id).unwrap().len(),
            DEFAULT_UTILITY_MILESTONES.len()
        );
    }

    #[test]
    fn test_task_status_cascades_to_phase_and_project() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), false).unwrap();
        let phase_a = dash.add_phase(&project.id, "Permitting", None).unwrap();
        let phase_b = dash.add_phase(&project.id, "Electrical", None).unwrap();

        let t1 = dash.add_task(&phase_a.id, NewTask::new("Zoning", TaskRole::Owner)).unwrap();
        let t2 = dash.add_task(&phase_a.id, NewTask::new("Permit", TaskRole::Engineer)).unwrap();
        let t3 = dash.add_task(&phase_a.id, NewTask::new("Survey", TaskRole::Engineer)).unwrap();
        dash.add_task(&phase_b.id, NewTask::new("Transformers", TaskRole::Owner)).unwrap();

        let today = date(2025, 3, 1);
        dash.update_task_status(&t1.id, TaskStatus::Complete, today).unwrap();
        dash.update_task_status(&t2.id, TaskStatus::Complete, today).unwrap();
        let update = dash.update_task_status(&t3.id, TaskStatus::Blocked, today).unwrap();

        let rollup = update.phase.unwrap();
        assert_eq!(rollup.progress, 67);
        assert_eq!(rollup.status, PhaseStatus::Blocked);
        // (67 + 0) / 2
        assert_eq!(update.project_progress, Some(34));

        let phases = dash.phases(&project.id).unwrap();
        assert_eq!(phases[0].progress, 67);
        assert_eq!(phases[0].status, PhaseStatus::Blocked);
        assert_eq!(dash.project(&project.id).unwrap().progress, 34);

        let stored = dash.task(&t1.id).unwrap();
        assert_eq!(stored.actual_end, Some(today));
    }

    #[test]
    fn test_cache_is_refreshed_after_write() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), false).unwrap();
        let phase = dash.add_phase(&project.id, "Permitting", None).unwrap();
        let task = dash.add_task(&phase.id, NewTask::new("Zoning", TaskRole::Owner)).unwrap();

        assert_eq!(dash.tasks(&phase.id).unwrap()[0].status, TaskStatus::NotStarted);
        assert!(dash.cache().contains(&QueryKey::new(EntityKind::Tasks, phase.id.as_str())));

        dash.update_task_status(&task.id, TaskStatus::InProgress, date(2025, 3, 1)).unwrap();
        assert!(!dash.cache().contains(&QueryKey::new(EntityKind::Tasks, phase.id.as_str())));
        assert_eq!(dash.tasks(&phase.id).unwrap()[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_unchanged_status_writes_nothing() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), false).unwrap();
        let phase = dash.add_phase(&project.id, "Permitting", None).unwrap();
        let task = dash.add_task(&phase.id, NewTask::new("Zoning", TaskRole::Owner)).unwrap();

        let update = dash
            .update_task_status(&task.id, TaskStatus::NotStarted, date(2025, 3, 1))
            .unwrap();
        assert!(update.phase.is_none());
        assert!(update.project_progress.is_none());
    }

    #[test]
    fn test_empty_phase_recompute_keeps_values() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), false).unwrap();
        let phase = dash.add_phase(&project.id, "Permitting", None).unwrap();
        assert_eq!(dash.recompute_phase(&phase.id).unwrap(), None);
        assert_eq!(dash.phase(&phase.id).unwrap().progress, 0);
    }

    #[test]
    fn test_forecast_history_and_delta() {
        let mut dash = dashboard();
        let project = dash
            .create_project(new_project(Some(date(2025, 6, 1))), false)
            .unwrap();
        let phase = dash.add_phase(&project.id, "Electrical", None).unwrap();
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(
                dash.add_task(&phase.id, NewTask::new(format!("Task {}", i), TaskRole::Contractor))
                    .unwrap()
                    .id,
            );
        }

        let today = date(2025, 3, 1);
        let first = dash.generate_forecast(&project.id, today).unwrap();
        let again = dash.generate_forecast(&project.id, today).unwrap();
        assert_eq!(first.schedule_slip_days, again.schedule_slip_days);
        assert_eq!(first.input_fingerprint, again.input_fingerprint);
        assert_ne!(first.id, again.id);

        for id in &ids[..3] {
            dash.update_task_status(id, TaskStatus::Blocked, today).unwrap();
        }
        let blocked = dash.generate_forecast(&project.id, today).unwrap();
        assert_eq!(blocked.schedule_slip_days, 16);
        assert_eq!(blocked.capex_overrun_pct, 11.0);

        assert_eq!(dash.forecasts(&project.id).unwrap().len(), 3);
        let delta = dash.forecast_delta(&project.id).unwrap().unwrap();
        assert_eq!(delta.slip_days, 9);
        assert!(delta.inputs_changed);
    }

    #[test]
    fn test_advisor_uses_recorded_risks() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), true).unwrap();
        dash.add_risk(NewRisk {
            project_id: project.id.clone(),
            phase_id: None,
            title: "Transformer lead time".to_string(),
            description: None,
            severity: Severity::High,
            mitigation: Some("Reserve factory slot".to_string()),
            owner: None,
        })
        .unwrap();

        let report = dash.advise(&project.id).unwrap();
        assert_eq!(report.health_score, 0);
        assert_eq!(report.status, advisor::HealthStatus::Delayed);
        assert_eq!(report.critical_path.len(), 5);
        assert!(!report.top_actions.is_empty());
    }

    #[test]
    fn test_empty_or_ambiguous_task_query_changes_nothing() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), false).unwrap();
        let phase = dash.add_phase(&project.id, "Permitting", None).unwrap();
        let a = dash.add_task(&phase.id, NewTask::new("Zoning", TaskRole::Owner)).unwrap();
        let b = dash.add_task(&phase.id, NewTask::new("Permit", TaskRole::Owner)).unwrap();

        let today = date(2025, 3, 1);
        assert!(dash.update_task_status("", TaskStatus::Complete, today).is_err());
        assert!(dash.update_task_status("%", TaskStatus::Complete, today).is_err());
        assert!(dash.recompute_phase("").is_err());
        assert!(dash.project("").is_err());

        for task in [&a, &b] {
            assert_eq!(dash.task(&task.id).unwrap().status, TaskStatus::NotStarted);
        }
        assert_eq!(dash.project(&project.id).unwrap().progress, 0);
    }

    #[test]
    fn test_project_dates_move_forecast_baseline() {
        let mut dash = dashboard();
        let project = dash
            .create_project(new_project(Some(date(2025, 6, 1))), false)
            .unwrap();
        let today = date(2025, 3, 1);
        let before = dash.generate_forecast(&project.id, today).unwrap();

        let updated = dash
            .set_project_dates(
                &project.id,
                ProjectDates {
                    planned_end: Some(date(2025, 9, 1)),
                    actual_start: Some(date(2025, 2, 3)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.planned_end, Some(date(2025, 9, 1)));

        let stored = dash.project(&project.id).unwrap();
        assert_eq!(stored.planned_end, Some(date(2025, 9, 1)));
        assert_eq!(stored.actual_start, Some(date(2025, 2, 3)));

        let after = dash.generate_forecast(&project.id, today).unwrap();
        assert_eq!(after.schedule_slip_days, before.schedule_slip_days);
        assert_eq!(
            (after.projected_completion - before.projected_completion).num_days(),
            92
        );
        assert_ne!(after.input_fingerprint, before.input_fingerprint);
    }

    #[test]
    fn test_project_dates_reject_end_before_start() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), false).unwrap();
        let dates = ProjectDates {
            planned_start: Some(date(2025, 5, 1)),
            planned_end: Some(date(2025, 4, 1)),
            ..Default::default()
        };
        assert!(dash.set_project_dates(&project.id, dates).is_err());
        assert_eq!(dash.project(&project.id).unwrap().planned_start, None);
        assert!(dash
            .set_project_dates("missing", ProjectDates::default())
            .is_err());
    }

    #[test]
    fn test_risk_phase_must_belong_to_project() {
        let mut dash = dashboard();
        let project = dash.create_project(new_project(None), false).unwrap();
        let other = dash.create_project(new_project(None), false).unwrap();
        let foreign = dash.add_phase(&other.id, "Civil", None).unwrap();

        let err = dash
            .add_risk(NewRisk {
                project_id: project.id.clone(),
                phase_id: Some(foreign.id.clone()),
                title: "Soil report late".to_string(),
                description: None,
                severity: Severity::Medium,
                mitigation: None,
                owner: None,
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::OutsideProject { kind: "phase", .. })
        ));
        assert!(dash.risks(&project.id).unwrap().is_empty());
    }

    #[test]
    fn test_missing_records_are_typed_errors() {
        let mut dash = dashboard();
        let err = dash.project("nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::ProjectNotFound(_))
        ));
        let err = dash
            .update_task_status("nope", TaskStatus::Complete, date(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::TaskNotFound(_))
        ));
        assert!(dash.set_risk_status("nope", RiskStatus::Closed).is_err());
    }
}
