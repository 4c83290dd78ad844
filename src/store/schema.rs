//! SQLite schema definition
//!
//! Tables mirror the project-tracking entities. Enum columns hold the
//! snake_case strings produced by the model types; JSON columns hold
//! serde_json text.

pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- ============================================
-- PROJECTS
-- ============================================

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,                   -- UUID
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    capacity_mw REAL,
    cooling_type TEXT,                     -- 'air', 'hydro', 'immersion'
    utility TEXT,                          -- utility / grid operator
    location TEXT,
    planned_start DATE,
    planned_end DATE,
    actual_start DATE,
    actual_end DATE,
    progress INTEGER NOT NULL DEFAULT 0,   -- 0-100, derived from phases
    status TEXT NOT NULL DEFAULT 'planning',
    created_at DATETIME NOT NULL
);

-- ============================================
-- PHASES & TASKS
-- ============================================

CREATE TABLE IF NOT EXISTS phases (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    order_index INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'not_started',
    progress INTEGER NOT NULL DEFAULT 0,   -- 0-100, derived from tasks
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    phase_id TEXT NOT NULL,
    project_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'not_started',
    role TEXT NOT NULL,                    -- 'owner', 'engineer', 'contractor', 'utility'
    assignee TEXT,
    estimated_days INTEGER,
    critical_path BOOLEAN NOT NULL DEFAULT FALSE,
    order_index INTEGER NOT NULL,
    depends_on TEXT NOT NULL DEFAULT '[]', -- JSON array of task ids, not enforced
    actual_start DATE,
    actual_end DATE,
    created_at DATETIME NOT NULL,
    FOREIGN KEY(phase_id) REFERENCES phases(id) ON DELETE CASCADE,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

-- ============================================
-- RISKS & FORECASTS
-- ============================================

CREATE TABLE IF NOT EXISTS risks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    phase_id TEXT,
    title TEXT NOT NULL,
    description TEXT,
    severity TEXT NOT NULL,                -- 'low', 'medium', 'high'
    status TEXT NOT NULL DEFAULT 'open',   -- 'open', 'mitigated', 'closed'
    mitigation TEXT,
    owner TEXT,
    created_at DATETIME NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY(phase_id) REFERENCES phases(id) ON DELETE SET NULL
);

-- Append-only
CREATE TABLE IF NOT EXISTS forecasts (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    generated_at DATETIME NOT NULL,
    projected_completion DATE NOT NULL,
    schedule_slip_days INTEGER NOT NULL,
    capex_overrun_pct REAL NOT NULL,
    confidence_pct INTEGER NOT NULL,
    drivers TEXT NOT NULL,                 -- JSON
    actions TEXT NOT NULL,                 -- JSON
    input_fingerprint TEXT NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

-- ============================================
-- FIELD RECORDS
-- ============================================

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    task_id TEXT,
    author TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY(task_id) REFERENCES tasks(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    task_id TEXT,
    external_id TEXT NOT NULL,             -- SecureShare document id
    filename TEXT NOT NULL,
    attached_at DATETIME NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY(task_id) REFERENCES tasks(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS daily_logs (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    log_date DATE NOT NULL,
    weather TEXT,
    crew_count INTEGER,
    work_summary TEXT NOT NULL,
    issues TEXT,
    author TEXT NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS labor_entries (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    phase_id TEXT,
    worker TEXT NOT NULL,
    trade TEXT,
    hours REAL NOT NULL,
    work_date DATE NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY(phase_id) REFERENCES phases(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS punch_items (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    phase_id TEXT,
    description TEXT NOT NULL,
    location TEXT,
    priority TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'open',   -- 'open', 'in_progress', 'closed'
    assignee TEXT,
    created_at DATETIME NOT NULL,
    closed_at DATETIME,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE,
    FOREIGN KEY(phase_id) REFERENCES phases(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS rfis (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    number INTEGER NOT NULL,
    subject TEXT NOT NULL,
    question TEXT NOT NULL,
    answer TEXT,
    status TEXT NOT NULL DEFAULT 'open',   -- 'open', 'answered', 'closed'
    due_date DATE,
    created_at DATETIME NOT NULL,
    UNIQUE(project_id, number),
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS subcontractors (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    company TEXT NOT NULL,
    trade TEXT NOT NULL,
    contact TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS field_checkins (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    worker TEXT NOT NULL,
    location TEXT,
    checked_in_at DATETIME NOT NULL,
    checked_out_at DATETIME,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS safety_records (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    kind TEXT NOT NULL,                    -- 'talk', 'incident', 'permit'
    title TEXT NOT NULL,
    details TEXT,
    severity TEXT,
    status TEXT NOT NULL DEFAULT 'open',
    record_date DATE NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS utility_milestones (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    name TEXT NOT NULL,
    order_index INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    expected_date DATE,
    notes TEXT,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS utility_alerts (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    acknowledged BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME NOT NULL,
    FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_id);
CREATE INDEX IF NOT EXISTS idx_phases_project ON phases(project_id, order_index);
CREATE INDEX IF NOT EXISTS idx_tasks_phase ON tasks(phase_id, order_index);
CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_risks_project ON risks(project_id);
CREATE INDEX IF NOT EXISTS idx_forecasts_project ON forecasts(project_id, generated_at DESC);
CREATE INDEX IF NOT EXISTS idx_comments_project ON comments(project_id);
CREATE INDEX IF NOT EXISTS idx_documents_project ON documents(project_id);
CREATE INDEX IF NOT EXISTS idx_daily_logs_project ON daily_logs(project_id, log_date DESC);
CREATE INDEX IF NOT EXISTS idx_labor_project ON labor_entries(project_id);
CREATE INDEX IF NOT EXISTS idx_punch_open ON punch_items(project_id) WHERE status != 'closed';
CREATE INDEX IF NOT EXISTS idx_rfis_project ON rfis(project_id, number);
CREATE INDEX IF NOT EXISTS idx_safety_project ON safety_records(project_id, kind);
CREATE INDEX IF NOT EXISTS idx_alerts_unack ON utility_alerts(project_id) WHERE acknowledged = FALSE;
"#;
