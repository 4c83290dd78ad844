//! Field records: comments, documents, logs, labor, punch list, RFIs,
//! subcontractors, check-ins, safety and utility tracking

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{logged, Dashboard};
use crate::error::DashboardError;
use crate::model::field::{
    Comment, DailyLog, Document, FieldCheckin, FieldSummary, LaborEntry, MilestoneStatus,
    PunchItem, PunchStatus, Rfi, RfiStatus, SafetyKind, SafetyRecord, SafetyStatus,
    Subcontractor, SubcontractorStatus, UtilityAlert, UtilityMilestone,
};
use crate::model::Severity;

#[derive(Debug, Clone)]
pub struct NewDailyLog {
    pub log_date: NaiveDate,
    pub work_summary: String,
    pub weather: Option<String>,
    pub crew_count: Option<i64>,
    pub issues: Option<String>,
    pub author: String,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Map a zero-row update onto a typed not-found error
fn expect_one(changed: usize, kind: &'static str, id: impl Into<String>) -> Result<()> {
    if changed == 0 {
        return Err(DashboardError::RecordNotFound { kind, id: id.into() }.into());
    }
    Ok(())
}

impl Dashboard {
    pub fn add_comment(
        &self,
        project_id: &str,
        task_id: Option<&str>,
        author: &str,
        body: &str,
    ) -> Result<Comment> {
        self.require_project(project_id)?;
        self.require_task_in(project_id, task_id)?;
        let comment = Comment {
            id: new_id(),
            project_id: project_id.to_string(),
            task_id: task_id.map(String::from),
            author: author.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        logged("add comment", self.store.insert_comment(&comment))?;
        Ok(comment)
    }

    /// Record a reference to a file held in the external document store
    pub fn attach_document(
        &self,
        project_id: &str,
        task_id: Option<&str>,
        external_id: &str,
        filename: &str,
    ) -> Result<Document> {
        self.require_project(project_id)?;
        self.require_task_in(project_id, task_id)?;
        let doc = Document {
            id: new_id(),
            project_id: project_id.to_string(),
            task_id: task_id.map(String::from),
            external_id: external_id.to_string(),
            filename: filename.to_string(),
            attached_at: Utc::now(),
        };
        logged("attach document", self.store.insert_document(&doc))?;
        Ok(doc)
    }

    pub fn add_daily_log(&self, project_id: &str, new: NewDailyLog) -> Result<DailyLog> {
        self.require_project(project_id)?;
        let log = DailyLog {
            id: new_id(),
            project_id: project_id.to_string(),
            log_date: new.log_date,
            weather: new.weather,
            crew_count: new.crew_count,
            work_summary: new.work_summary,
            issues: new.issues,
            author: new.author,
        };
        logged("add daily log", self.store.insert_daily_log(&log))?;
        Ok(log)
    }

    pub fn log_labor(
        &self,
        project_id: &str,
        phase_id: Option<&str>,
        worker: &str,
        trade: Option<&str>,
        hours: f64,
        work_date: NaiveDate,
    ) -> Result<LaborEntry> {
        self.require_project(project_id)?;
        self.require_phase_in(project_id, phase_id)?;
        anyhow::ensure!(hours > 0.0, "labor hours must be positive, got {}", hours);
        let entry = LaborEntry {
            id: new_id(),
            project_id: project_id.to_string(),
            phase_id: phase_id.map(String::from),
            worker: worker.to_string(),
            trade: trade.map(String::from),
            hours,
            work_date,
        };
        logged("log labor", self.store.insert_labor_entry(&entry))?;
        Ok(entry)
    }

    pub fn add_punch_item(
        &self,
        project_id: &str,
        phase_id: Option<&str>,
        description: &str,
        location: Option<&str>,
        priority: Severity,
        assignee: Option<&str>,
    ) -> Result<PunchItem> {
        self.require_project(project_id)?;
        self.require_phase_in(project_id, phase_id)?;
        let item = PunchItem {
            id: new_id(),
            project_id: project_id.to_string(),
            phase_id: phase_id.map(String::from),
            description: description.to_string(),
            location: location.map(String::from),
            priority,
            status: PunchStatus::Open,
            assignee: assignee.map(String::from),
            created_at: Utc::now(),
            closed_at: None,
        };
        logged("add punch item", self.store.insert_punch_item(&item))?;
        Ok(item)
    }

    pub fn set_punch_status(&self, id: &str, status: PunchStatus) -> Result<()> {
        let changed = logged(
            "update punch item",
            self.store.update_punch_status(id, status, Utc::now()),
        )?;
        expect_one(changed, "punch item", id)
    }

    /// Open an RFI with the next sequential number for the project
    pub fn open_rfi(
        &self,
        project_id: &str,
        subject: &str,
        question: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Rfi> {
        self.require_project(project_id)?;
        let result = self.store.transaction(|store| {
            let rfi = Rfi {
                id: new_id(),
                project_id: project_id.to_string(),
                number: store.next_rfi_number(project_id)?,
                subject: subject.to_string(),
                question: question.to_string(),
                answer: None,
                status: RfiStatus::Open,
                due_date,
                created_at: Utc::now(),
            };
            store.insert_rfi(&rfi)?;
            Ok(rfi)
        });
        logged("open rfi", result)
    }

    pub fn answer_rfi(&self, project_id: &str, number: i64, answer: &str) -> Result<()> {
        let changed = logged("answer rfi", self.store.answer_rfi(project_id, number, answer))?;
        expect_one(changed, "rfi", format!("#{}", number))
    }

    pub fn set_rfi_status(&self, project_id: &str, number: i64, status: RfiStatus) -> Result<()> {
        let changed = logged(
            "update rfi",
            self.store.update_rfi_status(project_id, number, status),
        )?;
        expect_one(changed, "rfi", format!("#{}", number))
    }

    pub fn add_subcontractor(
        &self,
        project_id: &str,
        company: &str,
        trade: &str,
        contact: Option<&str>,
    ) -> Result<Subcontractor> {
        self.require_project(project_id)?;
        let sub = Subcontractor {
            id: new_id(),
            project_id: project_id.to_string(),
            company: company.to_string(),
            trade: trade.to_string(),
            contact: contact.map(String::from),
            status: SubcontractorStatus::Active,
        };
        logged("add subcontractor", self.store.insert_subcontractor(&sub))?;
        Ok(sub)
    }

    pub fn set_subcontractor_status(&self, id: &str, status: SubcontractorStatus) -> Result<()> {
        let changed = logged(
            "update subcontractor",
            self.store.update_subcontractor_status(id, status),
        )?;
        expect_one(changed, "subcontractor", id)
    }

    pub fn check_in(&self, project_id: &str, worker: &str, location: Option<&str>) -> Result<FieldCheckin> {
        self.require_project(project_id)?;
        let checkin = FieldCheckin {
            id: new_id(),
            project_id: project_id.to_string(),
            worker: worker.to_string(),
            location: location.map(String::from),
            checked_in_at: Utc::now(),
            checked_out_at: None,
        };
        logged("check in", self.store.insert_checkin(&checkin))?;
        Ok(checkin)
    }

    pub fn check_out(&self, project_id: &str, worker: &str) -> Result<()> {
        let changed = logged(
            "check out",
            self.store.check_out(project_id, worker, Utc::now()),
        )?;
        expect_one(changed, "open check-in", worker)
    }

    pub fn add_safety_record(
        &self,
        project_id: &str,
        kind: SafetyKind,
        title: &str,
        details: Option<&str>,
        severity: Option<Severity>,
        record_date: NaiveDate,
    ) -> Result<SafetyRecord> {
        self.require_project(project_id)?;
        let record = SafetyRecord {
            id: new_id(),
            project_id: project_id.to_string(),
            kind,
            title: title.to_string(),
            details: details.map(String::from),
            severity,
            status: SafetyStatus::Open,
            record_date,
        };
        logged("add safety record", self.store.insert_safety_record(&record))?;
        Ok(record)
    }

    pub fn set_safety_status(&self, id: &str, status: SafetyStatus) -> Result<()> {
        let changed = logged(
            "update safety record",
            self.store.update_safety_status(id, status),
        )?;
        expect_one(changed, "safety record", id)
    }

    pub fn add_milestone(
        &self,
        project_id: &str,
        name: &str,
        expected_date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<UtilityMilestone> {
        self.require_project(project_id)?;
        let result = self.store.transaction(|store| {
            let milestone = UtilityMilestone {
                id: new_id(),
                project_id: project_id.to_string(),
                name: name.to_string(),
                order_index: store.next_milestone_order(project_id)?,
                status: MilestoneStatus::Pending,
                expected_date,
                notes: notes.map(String::from),
            };
            store.insert_milestone(&milestone)?;
            Ok(milestone)
        });
        logged("add milestone", result)
    }

    pub fn set_milestone_status(&self, id: &str, status: MilestoneStatus) -> Result<()> {
        let changed = logged(
            "update milestone",
            self.store.update_milestone_status(id, status),
        )?;
        expect_one(changed, "milestone", id)
    }

    pub fn raise_alert(&self, project_id: &str, severity: Severity, message: &str) -> Result<UtilityAlert> {
        self.require_project(project_id)?;
        let alert = UtilityAlert {
            id: new_id(),
            project_id: project_id.to_string(),
            severity,
            message: message.to_string(),
            acknowledged: false,
            created_at: Utc::now(),
        };
        logged("raise alert", self.store.insert_alert(&alert))?;
        Ok(alert)
    }

    pub fn acknowledge_alert(&self, id: &str) -> Result<()> {
        let changed = logged("acknowledge alert", self.store.acknowledge_alert(id))?;
        expect_one(changed, "alert", id)
    }

    pub fn field_summary(&self, project_id: &str) -> Result<FieldSummary> {
        self.require_project(project_id)?;
        self.store.field_summary(project_id)
    }
}
