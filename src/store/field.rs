//! Field record storage: comments, documents, logs, punch lists, RFIs,
//! subcontractors, check-ins, safety and utility tracking

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use super::ProjectStore;
use crate::model::field::{
    Comment, DailyLog, Document, FieldCheckin, FieldSummary, LaborEntry, MilestoneStatus,
    PunchItem, PunchStatus, Rfi, RfiStatus, SafetyRecord, SafetyStatus, Subcontractor,
    SubcontractorStatus, UtilityAlert, UtilityMilestone,
};

impl ProjectStore {
    // ============================================
    // COMMENTS & DOCUMENTS
    // ============================================

    pub fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.conn.execute(
            "INSERT INTO comments (id, project_id, task_id, author, body, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                comment.id,
                comment.project_id,
                comment.task_id,
                comment.author,
                comment.body,
                comment.created_at,
            ],
        )?;
        Ok(())
    }

    /// Comments on a project, or on a single task when `task_id` is given
    pub fn list_comments(&self, project_id: &str, task_id: Option<&str>) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, task_id, author, body, created_at
               FROM comments
               WHERE project_id = ?1 AND (?2 IS NULL OR task_id = ?2)
               ORDER BY created_at"#,
        )?;
        let rows = stmt.query_map(params![project_id, task_id], |row| {
            Ok(Comment {
                id: row.get(0)?,
                project_id: row.get(1)?,
                task_id: row.get(2)?,
                author: row.get(3)?,
                body: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn insert_document(&self, doc: &Document) -> Result<()> {
        self.conn.execute(
            "INSERT INTO documents (id, project_id, task_id, external_id, filename, attached_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                doc.id,
                doc.project_id,
                doc.task_id,
                doc.external_id,
                doc.filename,
                doc.attached_at,
            ],
        )?;
        Ok(())
    }

    pub fn list_documents(&self, project_id: &str, task_id: Option<&str>) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, task_id, external_id, filename, attached_at
               FROM documents
               WHERE project_id = ?1 AND (?2 IS NULL OR task_id = ?2)
               ORDER BY attached_at"#,
        )?;
        let rows = stmt.query_map(params![project_id, task_id], |row| {
            Ok(Document {
                id: row.get(0)?,
                project_id: row.get(1)?,
                task_id: row.get(2)?,
                external_id: row.get(3)?,
                filename: row.get(4)?,
                attached_at: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // DAILY LOGS & LABOR
    // ============================================

    pub fn insert_daily_log(&self, log: &DailyLog) -> Result<()> {
        self.conn.execute(
            "INSERT INTO daily_logs (id, project_id, log_date, weather, crew_count, work_summary, issues, author)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                log.id,
                log.project_id,
                log.log_date,
                log.weather,
                log.crew_count,
                log.work_summary,
                log.issues,
                log.author,
            ],
        )?;
        Ok(())
    }

    /// Daily logs, most recent day first
    pub fn list_daily_logs(&self, project_id: &str) -> Result<Vec<DailyLog>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, log_date, weather, crew_count, work_summary, issues, author
               FROM daily_logs
               WHERE project_id = ?
               ORDER BY log_date DESC"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(DailyLog {
                id: row.get(0)?,
                project_id: row.get(1)?,
                log_date: row.get(2)?,
                weather: row.get(3)?,
                crew_count: row.get(4)?,
                work_summary: row.get(5)?,
                issues: row.get(6)?,
                author: row.get(7)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn insert_labor_entry(&self, entry: &LaborEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO labor_entries (id, project_id, phase_id, worker, trade, hours, work_date)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id,
                entry.project_id,
                entry.phase_id,
                entry.worker,
                entry.trade,
                entry.hours,
                entry.work_date,
            ],
        )?;
        Ok(())
    }

    pub fn list_labor_entries(&self, project_id: &str) -> Result<Vec<LaborEntry>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, phase_id, worker, trade, hours, work_date
               FROM labor_entries
               WHERE project_id = ?
               ORDER BY work_date DESC, worker"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(LaborEntry {
                id: row.get(0)?,
                project_id: row.get(1)?,
                phase_id: row.get(2)?,
                worker: row.get(3)?,
                trade: row.get(4)?,
                hours: row.get(5)?,
                work_date: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // PUNCH LIST
    // ============================================

    pub fn insert_punch_item(&self, item: &PunchItem) -> Result<()> {
        self.conn.execute(
            "INSERT INTO punch_items (id, project_id, phase_id, description, location, priority,
                                      status, assignee, created_at, closed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                item.id,
                item.project_id,
                item.phase_id,
                item.description,
                item.location,
                item.priority,
                item.status,
                item.assignee,
                item.created_at,
                item.closed_at,
            ],
        )?;
        Ok(())
    }

    pub fn list_punch_items(&self, project_id: &str) -> Result<Vec<PunchItem>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, phase_id, description, location, priority, status,
                      assignee, created_at, closed_at
               FROM punch_items
               WHERE project_id = ?
               ORDER BY CASE status WHEN 'closed' THEN 1 ELSE 0 END,
                        CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                        created_at"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(PunchItem {
                id: row.get(0)?,
                project_id: row.get(1)?,
                phase_id: row.get(2)?,
                description: row.get(3)?,
                location: row.get(4)?,
                priority: row.get(5)?,
                status: row.get(6)?,
                assignee: row.get(7)?,
                created_at: row.get(8)?,
                closed_at: row.get(9)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Closing stamps `closed_at`; reopening clears it
    pub fn update_punch_status(
        &self,
        id: &str,
        status: PunchStatus,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let closed_at = match status {
            PunchStatus::Closed => Some(now),
            PunchStatus::Open | PunchStatus::InProgress => None,
        };
        let changed = self.conn.execute(
            "UPDATE punch_items SET status = ?, closed_at = ? WHERE id = ?",
            params![status, closed_at, id],
        )?;
        Ok(changed)
    }

    // ============================================
    // RFIS
    // ============================================

    pub fn next_rfi_number(&self, project_id: &str) -> Result<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(number), 0) + 1 FROM rfis WHERE project_id = ?",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    pub fn insert_rfi(&self, rfi: &Rfi) -> Result<()> {
        self.conn.execute(
            "INSERT INTO rfis (id, project_id, number, subject, question, answer, status, due_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                rfi.id,
                rfi.project_id,
                rfi.number,
                rfi.subject,
                rfi.question,
                rfi.answer,
                rfi.status,
                rfi.due_date,
                rfi.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn list_rfis(&self, project_id: &str) -> Result<Vec<Rfi>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, number, subject, question, answer, status, due_date, created_at
               FROM rfis
               WHERE project_id = ?
               ORDER BY number"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(Rfi {
                id: row.get(0)?,
                project_id: row.get(1)?,
                number: row.get(2)?,
                subject: row.get(3)?,
                question: row.get(4)?,
                answer: row.get(5)?,
                status: row.get(6)?,
                due_date: row.get(7)?,
                created_at: row.get(8)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn answer_rfi(&self, project_id: &str, number: i64, answer: &str) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE rfis SET answer = ?, status = ? WHERE project_id = ? AND number = ?",
            params![answer, RfiStatus::Answered, project_id, number],
        )?;
        Ok(changed)
    }

    pub fn update_rfi_status(&self, project_id: &str, number: i64, status: RfiStatus) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE rfis SET status = ? WHERE project_id = ? AND number = ?",
            params![status, project_id, number],
        )?;
        Ok(changed)
    }

    // ============================================
    // SUBCONTRACTORS & CHECK-INS
    // ============================================

    pub fn insert_subcontractor(&self, sub: &Subcontractor) -> Result<()> {
        self.conn.execute(
            "INSERT INTO subcontractors (id, project_id, company, trade, contact, status)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![sub.id, sub.project_id, sub.company, sub.trade, sub.contact, sub.status],
        )?;
        Ok(())
    }

    pub fn list_subcontractors(&self, project_id: &str) -> Result<Vec<Subcontractor>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, company, trade, contact, status
               FROM subcontractors
               WHERE project_id = ?
               ORDER BY company"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(Subcontractor {
                id: row.get(0)?,
                project_id: row.get(1)?,
                company: row.get(2)?,
                trade: row.get(3)?,
                contact: row.get(4)?,
                status: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn update_subcontractor_status(&self, id: &str, status: SubcontractorStatus) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE subcontractors SET status = ? WHERE id = ?",
            params![status, id],
        )?;
        Ok(changed)
    }

    pub fn insert_checkin(&self, checkin: &FieldCheckin) -> Result<()> {
        self.conn.execute(
            "INSERT INTO field_checkins (id, project_id, worker, location, checked_in_at, checked_out_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                checkin.id,
                checkin.project_id,
                checkin.worker,
                checkin.location,
                checkin.checked_in_at,
                checkin.checked_out_at,
            ],
        )?;
        Ok(())
    }

    /// Stamp the check-out time on the worker's open check-in
    pub fn check_out(&self, project_id: &str, worker: &str, now: DateTime<Utc>) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE field_checkins SET checked_out_at = ?1
             WHERE project_id = ?2 AND worker = ?3 AND checked_out_at IS NULL",
            params![now, project_id, worker],
        )?;
        Ok(changed)
    }

    pub fn list_checkins(&self, project_id: &str) -> Result<Vec<FieldCheckin>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, worker, location, checked_in_at, checked_out_at
               FROM field_checkins
               WHERE project_id = ?
               ORDER BY checked_in_at DESC"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(FieldCheckin {
                id: row.get(0)?,
                project_id: row.get(1)?,
                worker: row.get(2)?,
                location: row.get(3)?,
                checked_in_at: row.get(4)?,
                checked_out_at: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // SAFETY
    // ============================================

    pub fn insert_safety_record(&self, record: &SafetyRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO safety_records (id, project_id, kind, title, details, severity, status, record_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                record.project_id,
                record.kind,
                record.title,
                record.details,
                record.severity,
                record.status,
                record.record_date,
            ],
        )?;
        Ok(())
    }

    pub fn list_safety_records(&self, project_id: &str) -> Result<Vec<SafetyRecord>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, kind, title, details, severity, status, record_date
               FROM safety_records
               WHERE project_id = ?
               ORDER BY record_date DESC"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(SafetyRecord {
                id: row.get(0)?,
                project_id: row.get(1)?,
                kind: row.get(2)?,
                title: row.get(3)?,
                details: row.get(4)?,
                severity: row.get(5)?,
                status: row.get(6)?,
                record_date: row.get(7)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn update_safety_status(&self, id: &str, status: SafetyStatus) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE safety_records SET status = ? WHERE id = ?",
            params![status, id],
        )?;
        Ok(changed)
    }

    // ============================================
    // UTILITY INTERCONNECTION
    // ============================================

    pub fn insert_milestone(&self, milestone: &UtilityMilestone) -> Result<()> {
        self.conn.execute(
            "INSERT INTO utility_milestones (id, project_id, name, order_index, status, expected_date, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                milestone.id,
                milestone.project_id,
                milestone.name,
                milestone.order_index,
                milestone.status,
                milestone.expected_date,
                milestone.notes,
            ],
        )?;
        Ok(())
    }

    pub fn list_milestones(&self, project_id: &str) -> Result<Vec<UtilityMilestone>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, name, order_index, status, expected_date, notes
               FROM utility_milestones
               WHERE project_id = ?
               ORDER BY order_index"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(UtilityMilestone {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                order_index: row.get(3)?,
                status: row.get(4)?,
                expected_date: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn next_milestone_order(&self, project_id: &str) -> Result<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM utility_milestones WHERE project_id = ?",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    pub fn update_milestone_status(&self, id: &str, status: MilestoneStatus) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE utility_milestones SET status = ? WHERE id = ?",
            params![status, id],
        )?;
        Ok(changed)
    }

    pub fn insert_alert(&self, alert: &UtilityAlert) -> Result<()> {
        self.conn.execute(
            "INSERT INTO utility_alerts (id, project_id, severity, message, acknowledged, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                alert.id,
                alert.project_id,
                alert.severity,
                alert.message,
                alert.acknowledged,
                alert.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn list_alerts(&self, project_id: &str) -> Result<Vec<UtilityAlert>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, severity, message, acknowledged, created_at
               FROM utility_alerts
               WHERE project_id = ?
               ORDER BY acknowledged, created_at DESC"#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(UtilityAlert {
                id: row.get(0)?,
                project_id: row.get(1)?,
                severity: row.get(2)?,
                message: row.get(3)?,
                acknowledged: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn acknowledge_alert(&self, id: &str) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE utility_alerts SET acknowledged = TRUE WHERE id = ?",
            params![id],
        )?;
        Ok(changed)
    }

    // ============================================
    // SUMMARY
    // ============================================

    pub fn field_summary(&self, project_id: &str) -> Result<FieldSummary> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, params![project_id], |row| row.get(0))?;
            Ok(n as usize)
        };

        let labor_hours: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(hours), 0.0) FROM labor_entries WHERE project_id = ?",
            params![project_id],
            |row| row.get(0),
        )?;

        Ok(FieldSummary {
            open_punch_items: count(
                "SELECT COUNT(*) FROM punch_items WHERE project_id = ? AND status != 'closed'",
            )?,
            open_rfis: count("SELECT COUNT(*) FROM rfis WHERE project_id = ? AND status = 'open'")?,
            labor_hours,
            open_incidents: count(
                "SELECT COUNT(*) FROM safety_records
                 WHERE project_id = ? AND kind = 'incident' AND status = 'open'",
            )?,
            unacknowledged_alerts: count(
                "SELECT COUNT(*) FROM utility_alerts WHERE project_id = ? AND acknowledged = FALSE",
            )?,
            active_subcontractors: count(
                "SELECT COUNT(*) FROM subcontractors WHERE project_id = ? AND status = 'active'",
            )?,
            milestones_complete: count(
                "SELECT COUNT(*) FROM utility_milestones WHERE project_id = ? AND status = 'complete'",
            )?,
            milestones_total: count("SELECT COUNT(*) FROM utility_milestones WHERE project_id = ?")?,
        })
    }
}
