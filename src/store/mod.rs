//! Project storage with SQLite
//!
//! - Projects, phases, tasks, risks and forecast snapshots live here
//! - Field records (logs, punch lists, RFIs, safety, utility) are in `field`
//! - Writes are single statements; callers group them with [`ProjectStore::transaction`]

mod field;
mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use crate::error::DashboardError;
use crate::model::{
    ForecastSnapshot, Phase, PhaseStatus, Project, ProjectStatus, Risk, RiskStatus, Task,
    TaskStatus,
};

pub use schema::SCHEMA;

pub struct ProjectStore {
    conn: Connection,
}

impl ProjectStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;
        debug!(path = %path.display(), "database opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Run `f` inside one SQLite transaction. Any error rolls back every
    /// write made through this store while `f` ran.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Rows whose `id_column` starts with `prefix`, compared literally
    fn find_by_prefix<T, F>(
        &self,
        kind: &'static str,
        select: &str,
        id_column: &str,
        prefix: &str,
        map: F,
    ) -> Result<Option<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let sql = format!(
            "{} WHERE substr({col}, 1, length(?1)) = ?1 LIMIT 2",
            select,
            col = id_column
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![prefix], map)?
            .collect::<Result<Vec<_>, _>>()?;
        single_match(kind, prefix, rows)
    }

    // ============================================
    // PROJECTS
    // ============================================

    pub fn insert_project(&self, project: &Project) -> Result<()> {
        self.conn.execute(
            "INSERT INTO projects (id, owner_id, name, capacity_mw, cooling_type, utility, location,
                                   planned_start, planned_end, actual_start, actual_end,
                                   progress, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                project.id,
                project.owner_id,
                project.name,
                project.capacity_mw,
                project.cooling_type,
                project.utility,
                project.location,
                project.planned_start,
                project.planned_end,
                project.actual_start,
                project.actual_end,
                project.progress,
                project.status,
                project.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let query = format!("{} WHERE id = ?", PROJECT_SELECT);
        self.conn
            .query_row(&query, params![id], project_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Find a project by exact id, exact name or unique id prefix
    pub fn find_project(&self, query: &str) -> Result<Option<Project>> {
        require_query("project", query)?;
        if let Some(project) = self.get_project(query)? {
            return Ok(Some(project));
        }

        let sql = format!("{} WHERE name = ?1 LIMIT 2", PROJECT_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let named = stmt
            .query_map(params![query], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(project) = single_match("project", query, named)? {
            return Ok(Some(project));
        }

        self.find_by_prefix("project", PROJECT_SELECT, "id", query, project_from_row)
    }

    pub fn list_projects(&self, owner_id: Option<&str>) -> Result<Vec<Project>> {
        let rows = match owner_id {
            Some(owner) => {
                let sql = format!("{} WHERE owner_id = ? ORDER BY created_at DESC", PROJECT_SELECT);
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![owner], project_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!("{} ORDER BY created_at DESC", PROJECT_SELECT);
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], project_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    pub fn update_project_status(&self, id: &str, status: ProjectStatus) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE projects SET status = ? WHERE id = ?",
            params![status, id],
        )?;
        Ok(changed)
    }

    pub fn update_project_dates(
        &self,
        id: &str,
        planned_start: Option<NaiveDate>,
        planned_end: Option<NaiveDate>,
        actual_start: Option<NaiveDate>,
        actual_end: Option<NaiveDate>,
    ) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE projects SET planned_start = ?, planned_end = ?, actual_start = ?, actual_end = ?
             WHERE id = ?",
            params![planned_start, planned_end, actual_start, actual_end, id],
        )?;
        Ok(changed)
    }

    pub fn set_project_progress(&self, id: &str, progress: u8) -> Result<()> {
        self.conn.execute(
            "UPDATE projects SET progress = ? WHERE id = ?",
            params![progress, id],
        )?;
        Ok(())
    }

    // ============================================
    // PHASES
    // ============================================

    pub fn insert_phase(&self, phase: &Phase) -> Result<()> {
        self.conn.execute(
            "INSERT INTO phases (id, project_id, name, description, order_index, status, progress)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                phase.id,
                phase.project_id,
                phase.name,
                phase.description,
                phase.order_index,
                phase.status,
                phase.progress,
            ],
        )?;
        Ok(())
    }

    pub fn get_phase(&self, id: &str) -> Result<Option<Phase>> {
        let sql = format!("{} WHERE id = ?", PHASE_SELECT);
        self.conn
            .query_row(&sql, params![id], phase_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Find a phase by exact id or unique id prefix
    pub fn find_phase(&self, query: &str) -> Result<Option<Phase>> {
        require_query("phase", query)?;
        if let Some(phase) = self.get_phase(query)? {
            return Ok(Some(phase));
        }
        self.find_by_prefix("phase", PHASE_SELECT, "id", query, phase_from_row)
    }

    pub fn list_phases(&self, project_id: &str) -> Result<Vec<Phase>> {
        let sql = format!("{} WHERE project_id = ? ORDER BY order_index", PHASE_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id], phase_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Next free order index for a new phase in the project
    pub fn next_phase_order(&self, project_id: &str) -> Result<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM phases WHERE project_id = ?",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    pub fn set_phase_rollup(&self, id: &str, progress: u8, status: PhaseStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE phases SET progress = ?, status = ? WHERE id = ?",
            params![progress, status, id],
        )?;
        Ok(())
    }

    // ============================================
    // TASKS
    // ============================================

    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, phase_id, project_id, title, description, status, role, assignee,
                                estimated_days, critical_path, order_index, depends_on,
                                actual_start, actual_end, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                task.id,
                task.phase_id,
                task.project_id,
                task.title,
                task.description,
                task.status,
                task.role,
                task.assignee,
                task.estimated_days,
                task.critical_path,
                task.order_index,
                serde_json::to_string(&task.depends_on)?,
                task.actual_start,
                task.actual_end,
                task.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let sql = format!("{} WHERE t.id = ?", TASK_SELECT);
        self.conn
            .query_row(&sql, params![id], task_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Find a task by exact id or unique id prefix
    pub fn find_task(&self, query: &str) -> Result<Option<Task>> {
        require_query("task", query)?;
        if let Some(task) = self.get_task(query)? {
            return Ok(Some(task));
        }
        self.find_by_prefix("task", TASK_SELECT, "t.id", query, task_from_row)
    }

    pub fn list_tasks(&self, phase_id: &str) -> Result<Vec<Task>> {
        let sql = format!("{} WHERE t.phase_id = ? ORDER BY t.order_index", TASK_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![phase_id], task_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// All tasks of a project in phase order, then task order
    pub fn list_project_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let sql = format!(
            "{} JOIN phases ph ON ph.id = t.phase_id
             WHERE t.project_id = ?
             ORDER BY ph.order_index, t.order_index",
            TASK_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id], task_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn next_task_order(&self, phase_id: &str) -> Result<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM tasks WHERE phase_id = ?",
            params![phase_id],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    pub fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
        actual_start: Option<NaiveDate>,
        actual_end: Option<NaiveDate>,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE tasks SET status = ?, actual_start = ?, actual_end = ? WHERE id = ?",
            params![status, actual_start, actual_end, id],
        )?;
        Ok(())
    }

    pub fn assign_task(&self, id: &str, assignee: Option<&str>) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE tasks SET assignee = ? WHERE id = ?",
            params![assignee, id],
        )?;
        Ok(changed)
    }

    // ============================================
    // RISKS
    // ============================================

    pub fn insert_risk(&self, risk: &Risk) -> Result<()> {
        self.conn.execute(
            "INSERT INTO risks (id, project_id, phase_id, title, description, severity, status,
                                mitigation, owner, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                risk.id,
                risk.project_id,
                risk.phase_id,
                risk.title,
                risk.description,
                risk.severity,
                risk.status,
                risk.mitigation,
                risk.owner,
                risk.created_at,
            ],
        )?;
        Ok(())
    }

    /// Risks of a project, most severe first
    pub fn list_risks(&self, project_id: &str) -> Result<Vec<Risk>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, phase_id, title, description, severity, status,
                      mitigation, owner, created_at
               FROM risks
               WHERE project_id = ?
               ORDER BY CASE severity WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                        created_at"#,
        )?;

        let rows = stmt.query_map(params![project_id], |row| {
            Ok(Risk {
                id: row.get(0)?,
                project_id: row.get(1)?,
                phase_id: row.get(2)?,
                title: row.get(3)?,
                description: row.get(4)?,
                severity: row.get(5)?,
                status: row.get(6)?,
                mitigation: row.get(7)?,
                owner: row.get(8)?,
                created_at: row.get(9)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn update_risk_status(&self, id: &str, status: RiskStatus) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE risks SET status = ? WHERE id = ?",
            params![status, id],
        )?;
        Ok(changed)
    }

    // ============================================
    // FORECASTS
    // ============================================

    pub fn insert_forecast(&self, snapshot: &ForecastSnapshot) -> Result<()> {
        self.conn.execute(
            "INSERT INTO forecasts (id, project_id, generated_at, projected_completion,
                                    schedule_slip_days, capex_overrun_pct, confidence_pct,
                                    drivers, actions, input_fingerprint)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                snapshot.id,
                snapshot.project_id,
                snapshot.generated_at,
                snapshot.projected_completion,
                snapshot.schedule_slip_days,
                snapshot.capex_overrun_pct,
                snapshot.confidence_pct,
                serde_json::to_string(&snapshot.drivers)?,
                serde_json::to_string(&snapshot.actions)?,
                snapshot.input_fingerprint,
            ],
        )?;
        Ok(())
    }

    /// Snapshots newest first, optionally limited
    pub fn list_forecasts(&self, project_id: &str, limit: Option<usize>) -> Result<Vec<ForecastSnapshot>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, generated_at, projected_completion, schedule_slip_days,
                      capex_overrun_pct, confidence_pct, drivers, actions, input_fingerprint
               FROM forecasts
               WHERE project_id = ?
               ORDER BY generated_at DESC, rowid DESC
               LIMIT ?"#,
        )?;

        let rows = stmt.query_map(params![project_id, limit], |row| {
            Ok(ForecastSnapshot {
                id: row.get(0)?,
                project_id: row.get(1)?,
                generated_at: row.get(2)?,
                projected_completion: row.get(3)?,
                schedule_slip_days: row.get(4)?,
                capex_overrun_pct: row.get(5)?,
                confidence_pct: row.get(6)?,
                drivers: json_column(row, 7)?,
                actions: json_column(row, 8)?,
                input_fingerprint: row.get(9)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

// ============================================
// ROW MAPPING
// ============================================

const PROJECT_SELECT: &str = r#"SELECT id, owner_id, name, capacity_mw, cooling_type, utility,
       location, planned_start, planned_end, actual_start, actual_end, progress, status, created_at
FROM projects"#;

const PHASE_SELECT: &str = r#"SELECT id, project_id, name, description, order_index, status, progress
FROM phases"#;

const TASK_SELECT: &str = r#"SELECT t.id, t.phase_id, t.project_id, t.title, t.description, t.status,
       t.role, t.assignee, t.estimated_days, t.critical_path, t.order_index, t.depends_on,
       t.actual_start, t.actual_end, t.created_at
FROM tasks t"#;

fn require_query(kind: &'static str, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(DashboardError::EmptyLookup(kind).into());
    }
    Ok(())
}

fn single_match<T>(kind: &'static str, query: &str, mut rows: Vec<T>) -> Result<Option<T>> {
    if rows.len() > 1 {
        return Err(DashboardError::AmbiguousId {
            kind,
            query: query.to_string(),
        }
        .into());
    }
    Ok(rows.pop())
}

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        capacity_mw: row.get(3)?,
        cooling_type: row.get(4)?,
        utility: row.get(5)?,
        location: row.get(6)?,
        planned_start: row.get(7)?,
        planned_end: row.get(8)?,
        actual_start: row.get(9)?,
        actual_end: row.get(10)?,
        progress: row.get(11)?,
        status: row.get(12)?,
        created_at: row.get::<_, DateTime<Utc>>(13)?,
    })
}

fn phase_from_row(row: &Row) -> rusqlite::Result<Phase> {
    Ok(Phase {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        order_index: row.get(4)?,
        status: row.get(5)?,
        progress: row.get(6)?,
    })
}

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        phase_id: row.get(1)?,
        project_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: row.get(5)?,
        role: row.get(6)?,
        assignee: row.get(7)?,
        estimated_days: row.get(8)?,
        critical_path: row.get(9)?,
        order_index: row.get(10)?,
        depends_on: json_column(row, 11)?,
        actual_start: row.get(12)?,
        actual_end: row.get(13)?,
        created_at: row.get(14)?,
    })
}

/// Decode a TEXT column holding serde_json
fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoolingType, Driver, DriverImpact, Severity, TaskRole};

    fn sample_project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            owner_id: "alex".to_string(),
            name: name.to_string(),
            capacity_mw: Some(50.0),
            cooling_type: Some(CoolingType::Immersion),
            utility: Some("ERCOT".to_string()),
            location: Some("Reeves County, TX".to_string()),
            planned_start: NaiveDate::from_ymd_opt(2025, 1, 6),
            planned_end: NaiveDate::from_ymd_opt(2025, 6, 1),
            actual_start: None,
            actual_end: None,
            progress: 0,
            status: ProjectStatus::Planning,
            created_at: Utc::now(),
        }
    }

    fn sample_phase(id: &str, project_id: &str, order: i64) -> Phase {
        Phase {
            id: id.to_string(),
            project_id: project_id.to_string(),
            name: format!("Phase {}", order),
            description: None,
            order_index: order,
            status: PhaseStatus::NotStarted,
            progress: 0,
        }
    }

    fn sample_task(id: &str, phase_id: &str, order: i64) -> Task {
        Task {
            id: id.to_string(),
            phase_id: phase_id.to_string(),
            project_id: "p1".to_string(),
            title: format!("Task {}", id),
            description: None,
            status: TaskStatus::NotStarted,
            role: TaskRole::Engineer,
            assignee: None,
            estimated_days: Some(3),
            critical_path: order == 0,
            order_index: order,
            depends_on: vec!["other".to_string()],
            actual_start: None,
            actual_end: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_project_round_trip_and_lookup() {
        let store = ProjectStore::open_in_memory().unwrap();
        let project = sample_project("a1b2c3d4-0000", "Pecos North");
        store.insert_project(&project).unwrap();

        let loaded = store.get_project(&project.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Pecos North");
        assert_eq!(loaded.cooling_type, Some(CoolingType::Immersion));
        assert_eq!(loaded.planned_end, project.planned_end);

        assert!(store.find_project("a1b2").unwrap().is_some());
        assert!(store.find_project("Pecos North").unwrap().is_some());
        assert!(store.find_project("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_projects_filters_by_owner() {
        let store = ProjectStore::open_in_memory().unwrap();
        store.insert_project(&sample_project("p1", "One")).unwrap();
        let mut other = sample_project("p2", "Two");
        other.owner_id = "sam".to_string();
        store.insert_project(&other).unwrap();

        assert_eq!(store.list_projects(None).unwrap().len(), 2);
        let mine = store.list_projects(Some("sam")).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Two");
    }

    #[test]
    fn test_tasks_keep_phase_then_task_order() {
        let store = ProjectStore::open_in_memory().unwrap();
        store.insert_project(&sample_project("p1", "One")).unwrap();
        store.insert_phase(&sample_phase("ph2", "p1", 1)).unwrap();
        store.insert_phase(&sample_phase("ph1", "p1", 0)).unwrap();
        store.insert_task(&sample_task("b", "ph2", 0)).unwrap();
        store.insert_task(&sample_task("a2", "ph1", 1)).unwrap();
        store.insert_task(&sample_task("a1", "ph1", 0)).unwrap();

        let ids: Vec<String> = store
            .list_project_tasks("p1")
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["a1", "a2", "b"]);
        assert_eq!(store.next_task_order("ph1").unwrap(), 2);
        assert_eq!(store.next_phase_order("p1").unwrap(), 2);

        let task = store.get_task("a1").unwrap().unwrap();
        assert_eq!(task.depends_on, vec!["other".to_string()]);
        assert!(task.critical_path);
    }

    #[test]
    fn test_lookup_rejects_empty_wildcard_and_ambiguous_queries() {
        let store = ProjectStore::open_in_memory().unwrap();
        store.insert_project(&sample_project("p1", "One")).unwrap();
        store.insert_phase(&sample_phase("ph1", "p1", 0)).unwrap();
        store.insert_task(&sample_task("a1", "ph1", 0)).unwrap();
        store.insert_task(&sample_task("a2", "ph1", 1)).unwrap();

        let err = store.find_task("").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::EmptyLookup("task"))
        ));
        assert!(store.find_project("  ").is_err());

        assert!(store.find_task("%").unwrap().is_none());
        assert!(store.find_task("_1").unwrap().is_none());
        assert!(store.find_phase("ph%").unwrap().is_none());

        let err = store.find_task("a").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashboardError>(),
            Some(DashboardError::AmbiguousId { kind: "task", .. })
        ));
        assert_eq!(store.find_task("a2").unwrap().unwrap().id, "a2");
        assert_eq!(store.find_phase("ph").unwrap().unwrap().id, "ph1");
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let store = ProjectStore::open_in_memory().unwrap();
        store.insert_project(&sample_project("p1", "One")).unwrap();

        let result: Result<()> = store.transaction(|s| {
            s.set_project_progress("p1", 40)?;
            anyhow::bail!("backend write failed")
        });
        assert!(result.is_err());
        assert_eq!(store.get_project("p1").unwrap().unwrap().progress, 0);

        store
            .transaction(|s| s.set_project_progress("p1", 40))
            .unwrap();
        assert_eq!(store.get_project("p1").unwrap().unwrap().progress, 40);
    }

    #[test]
    fn test_risks_sorted_by_severity() {
        let store = ProjectStore::open_in_memory().unwrap();
        store.insert_project(&sample_project("p1", "One")).unwrap();
        for (id, severity) in [("r1", Severity::Low), ("r2", Severity::High), ("r3", Severity::Medium)] {
            store
                .insert_risk(&Risk {
                    id: id.to_string(),
                    project_id: "p1".to_string(),
                    phase_id: None,
                    title: id.to_string(),
                    description: None,
                    severity,
                    status: RiskStatus::Open,
                    mitigation: None,
                    owner: None,
                    created_at: Utc::now(),
                })
                .unwrap();
        }
        let order: Vec<Severity> = store
            .list_risks("p1")
            .unwrap()
            .iter()
            .map(|r| r.severity)
            .collect();
        assert_eq!(order, vec![Severity::High, Severity::Medium, Severity::Low]);
        assert_eq!(store.update_risk_status("r1", RiskStatus::Closed).unwrap(), 1);
    }

    #[test]
    fn test_forecasts_newest_first() {
        let store = ProjectStore::open_in_memory().unwrap();
        store.insert_project(&sample_project("p1", "One")).unwrap();
        let base = Utc::now();
        for (i, id) in ["f1", "f2", "f3"].iter().enumerate() {
            store
                .insert_forecast(&ForecastSnapshot {
                    id: id.to_string(),
                    project_id: "p1".to_string(),
                    generated_at: base + chrono::Duration::seconds(i as i64),
                    projected_completion: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                    schedule_slip_days: i as i64,
                    capex_overrun_pct: 0.0,
                    confidence_pct: 70,
                    drivers: vec![Driver {
                        name: "On track".to_string(),
                        impact: DriverImpact::Positive,
                        detail: String::new(),
                    }],
                    actions: vec![],
                    input_fingerprint: "abc".to_string(),
                })
                .unwrap();
        }
        let latest = store.list_forecasts("p1", Some(2)).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, "f3");
        assert_eq!(latest[1].id, "f2");
        assert_eq!(latest[0].drivers[0].impact, DriverImpact::Positive);
        assert_eq!(store.list_forecasts("p1", None).unwrap().len(), 3);
    }
}
