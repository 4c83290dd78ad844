//! Field record commands: `voltbuild field <project> <command>`

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::{or_dash, resolve, short_id, today, truncate};
use crate::dashboard::{Dashboard, NewDailyLog};
use crate::model::field::{
    MilestoneStatus, PunchStatus, RfiStatus, SafetyKind, SafetyStatus, SubcontractorStatus,
};
use crate::model::Severity;

#[derive(Subcommand)]
pub enum FieldCommand {
    /// Comment on the project or one of its tasks
    Comment {
        body: String,
        #[arg(short, long)]
        task: Option<String>,
    },
    /// List comments
    Comments {
        #[arg(short, long)]
        task: Option<String>,
    },
    /// Attach a document by its document store id
    Attach {
        external_id: String,
        filename: String,
        #[arg(short, long)]
        task: Option<String>,
    },
    /// List attached documents
    Documents {
        #[arg(short, long)]
        task: Option<String>,
    },
    /// Write a daily log entry
    Log {
        summary: String,
        /// Log date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        weather: Option<String>,
        #[arg(long)]
        crew: Option<i64>,
        #[arg(long)]
        issues: Option<String>,
    },
    /// List daily logs
    Logs,
    /// Record labor hours
    Labor {
        worker: String,
        hours: f64,
        #[arg(long)]
        trade: Option<String>,
        #[arg(long)]
        phase: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List labor entries
    Timesheet,
    /// Add a punch list item
    Punch {
        description: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: Severity,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        phase: Option<String>,
    },
    /// List punch items
    Punchlist,
    /// Change a punch item's status (open, in_progress, closed)
    PunchStatus { id: String, status: PunchStatus },
    /// Open a request for information
    Rfi {
        subject: String,
        question: String,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List RFIs
    Rfis,
    /// Answer an RFI by number
    Answer { number: i64, answer: String },
    /// Close an RFI by number
    CloseRfi { number: i64 },
    /// Add a subcontractor
    Sub {
        company: String,
        trade: String,
        #[arg(long)]
        contact: Option<String>,
    },
    /// List subcontractors
    Subs,
    /// Change a subcontractor's status (active, inactive)
    SubStatus {
        id: String,
        status: SubcontractorStatus,
    },
    /// Check a worker in on site
    CheckIn {
        worker: String,
        #[arg(long)]
        location: Option<String>,
    },
    /// Check a worker out
    CheckOut { worker: String },
    /// List check-ins
    Checkins,
    /// Record a toolbox talk, incident or permit
    Safety {
        kind: SafetyKind,
        title: String,
        #[arg(long)]
        details: Option<String>,
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List safety records
    SafetyLog,
    /// Change a safety record's status (open, closed)
    SafetyStatus { id: String, status: SafetyStatus },
    /// Add a utility interconnection milestone
    Milestone {
        name: String,
        #[arg(long)]
        expected: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List utility milestones
    Milestones,
    /// Change a milestone's status (pending, in_progress, complete, delayed)
    MilestoneStatus { id: String, status: MilestoneStatus },
    /// Raise a utility alert
    Alert {
        message: String,
        #[arg(long, default_value = "medium")]
        severity: Severity,
    },
    /// List utility alerts
    Alerts,
    /// Acknowledge a utility alert
    Ack { id: String },
    /// Field record counts
    Summary,
}

pub fn run(dash: &mut Dashboard, project: &str, author: &str, command: FieldCommand) -> Result<()> {
    let project = dash.project(project)?;
    let pid = project.id.as_str();

    match command {
        FieldCommand::Comment { body, task } => {
            let task_id = match task {
                Some(t) => Some(dash.project_task(pid, &t)?.id),
                None => None,
            };
            let comment = dash.add_comment(pid, task_id.as_deref(), author, &body)?;
            println!("Comment added ({})", short_id(&comment.id));
        }
        FieldCommand::Comments { task } => {
            let task_id = match task {
                Some(t) => Some(dash.project_task(pid, &t)?.id),
                None => None,
            };
            let comments = dash.store().list_comments(pid, task_id.as_deref())?;
            if comments.is_empty() {
                println!("No comments.");
            }
            for c in comments {
                println!(
                    "{} {:<12} {}",
                    c.created_at.format("%Y-%m-%d %H:%M"),
                    c.author,
                    c.body
                );
            }
        }
        FieldCommand::Attach {
            external_id,
            filename,
            task,
        } => {
            let task_id = match task {
                Some(t) => Some(dash.project_task(pid, &t)?.id),
                None => None,
            };
            let doc = dash.attach_document(pid, task_id.as_deref(), &external_id, &filename)?;
            println!("Attached '{}' ({})", doc.filename, short_id(&doc.id));
        }
        FieldCommand::Documents { task } => {
            let task_id = match task {
                Some(t) => Some(dash.project_task(pid, &t)?.id),
                None => None,
            };
            let docs = dash.store().list_documents(pid, task_id.as_deref())?;
            if docs.is_empty() {
                println!("No documents.");
                return Ok(());
            }
            println!("{:<10} {:<36} {:<24} {}", "ID", "Filename", "Document", "Attached");
            println!("{}", "-".repeat(90));
            for d in docs {
                println!(
                    "{:<10} {:<36} {:<24} {}",
                    short_id(&d.id),
                    truncate(&d.filename, 36),
                    truncate(&d.external_id, 24),
                    d.attached_at.format("%Y-%m-%d")
                );
            }
        }
        FieldCommand::Log {
            summary,
            date,
            weather,
            crew,
            issues,
        } => {
            let log = dash.add_daily_log(
                pid,
                NewDailyLog {
                    log_date: date.unwrap_or_else(today),
                    work_summary: summary,
                    weather,
                    crew_count: crew,
                    issues,
                    author: author.to_string(),
                },
            )?;
            println!("Daily log for {} recorded", log.log_date);
        }
        FieldCommand::Logs => {
            let logs = dash.store().list_daily_logs(pid)?;
            if logs.is_empty() {
                println!("No daily logs.");
            }
            for log in logs {
                println!(
                    "{}  crew {:<4} {:<12} {}",
                    log.log_date,
                    or_dash(log.crew_count),
                    truncate(log.weather.as_deref().unwrap_or("-"), 12),
                    log.work_summary
                );
                if let Some(issues) = log.issues {
                    println!("            issues: {}", issues);
                }
            }
        }
        FieldCommand::Labor {
            worker,
            hours,
            trade,
            phase,
            date,
        } => {
            let phase_id = match phase {
                Some(p) => Some(dash.project_phase(pid, &p)?.id),
                None => None,
            };
            let entry = dash.log_labor(
                pid,
                phase_id.as_deref(),
                &worker,
                trade.as_deref(),
                hours,
                date.unwrap_or_else(today),
            )?;
            println!("{:.1} h logged for {} on {}", entry.hours, entry.worker, entry.work_date);
        }
        FieldCommand::Timesheet => {
            let entries = dash.store().list_labor_entries(pid)?;
            if entries.is_empty() {
                println!("No labor entries.");
                return Ok(());
            }
            println!("{:<12} {:<20} {:<16} {:>6}", "Date", "Worker", "Trade", "Hours");
            println!("{}", "-".repeat(57));
            let mut total = 0.0;
            for e in entries {
                total += e.hours;
                println!(
                    "{:<12} {:<20} {:<16} {:>6.1}",
                    e.work_date.to_string(),
                    truncate(&e.worker, 20),
                    or_dash(e.trade.as_deref()),
                    e.hours
                );
            }
            println!("{:>57.1}", total);
        }
        FieldCommand::Punch {
            description,
            location,
            priority,
            assignee,
            phase,
        } => {
            let phase_id = match phase {
                Some(p) => Some(dash.project_phase(pid, &p)?.id),
                None => None,
            };
            let item = dash.add_punch_item(
                pid,
                phase_id.as_deref(),
                &description,
                location.as_deref(),
                priority,
                assignee.as_deref(),
            )?;
            println!("Punch item added ({})", short_id(&item.id));
        }
        FieldCommand::Punchlist => {
            let items = dash.store().list_punch_items(pid)?;
            if items.is_empty() {
                println!("Punch list is empty.");
                return Ok(());
            }
            println!(
                "{:<10} {:<8} {:<12} {:<36} {:<14} {}",
                "ID", "Priority", "Status", "Description", "Location", "Assignee"
            );
            println!("{}", "-".repeat(96));
            for item in items {
                println!(
                    "{:<10} {:<8} {:<12} {:<36} {:<14} {}",
                    short_id(&item.id),
                    item.priority,
                    item.status,
                    truncate(&item.description, 36),
                    or_dash(item.location.as_deref()),
                    or_dash(item.assignee.as_deref())
                );
            }
        }
        FieldCommand::PunchStatus { id, status } => {
            let item = resolve(dash.store().list_punch_items(pid)?, &id, "punch item", |i| i.id.as_str())?;
            dash.set_punch_status(&item.id, status)?;
            println!("Punch item '{}' is now {}", truncate(&item.description, 40), status);
        }
        FieldCommand::Rfi {
            subject,
            question,
            due,
        } => {
            let rfi = dash.open_rfi(pid, &subject, &question, due)?;
            println!("RFI #{} opened: {}", rfi.number, rfi.subject);
        }
        FieldCommand::Rfis => {
            let rfis = dash.store().list_rfis(pid)?;
            if rfis.is_empty() {
                println!("No RFIs.");
                return Ok(());
            }
            println!("{:<5} {:<10} {:<12} {:<40}", "#", "Status", "Due", "Subject");
            println!("{}", "-".repeat(70));
            for rfi in rfis {
                println!(
                    "{:<5} {:<10} {:<12} {:<40}",
                    rfi.number,
                    rfi.status,
                    or_dash(rfi.due_date),
                    truncate(&rfi.subject, 40)
                );
                if let Some(answer) = rfi.answer {
                    println!("      -> {}", answer);
                }
            }
        }
        FieldCommand::Answer { number, answer } => {
            dash.answer_rfi(pid, number, &answer)?;
            println!("RFI #{} answered", number);
        }
        FieldCommand::CloseRfi { number } => {
            dash.set_rfi_status(pid, number, RfiStatus::Closed)?;
            println!("RFI #{} closed", number);
        }
        FieldCommand::Sub {
            company,
            trade,
            contact,
        } => {
            let sub = dash.add_subcontractor(pid, &company, &trade, contact.as_deref())?;
            println!("Subcontractor '{}' added ({})", sub.company, short_id(&sub.id));
        }
        FieldCommand::Subs => {
            let subs = dash.store().list_subcontractors(pid)?;
            if subs.is_empty() {
                println!("No subcontractors.");
                return Ok(());
            }
            println!("{:<10} {:<28} {:<16} {:<10} {}", "ID", "Company", "Trade", "Status", "Contact");
            println!("{}", "-".repeat(80));
            for s in subs {
                println!(
                    "{:<10} {:<28} {:<16} {:<10} {}",
                    short_id(&s.id),
                    truncate(&s.company, 28),
                    truncate(&s.trade, 16),
                    s.status,
                    or_dash(s.contact.as_deref())
                );
            }
        }
        FieldCommand::SubStatus { id, status } => {
            let sub = resolve(dash.store().list_subcontractors(pid)?, &id, "subcontractor", |s| s.id.as_str())?;
            dash.set_subcontractor_status(&sub.id, status)?;
            println!("Subcontractor '{}' is now {}", sub.company, status);
        }
        FieldCommand::CheckIn { worker, location } => {
            let checkin = dash.check_in(pid, &worker, location.as_deref())?;
            println!("{} checked in at {}", checkin.worker, checkin.checked_in_at.format("%H:%M"));
        }
        FieldCommand::CheckOut { worker } => {
            dash.check_out(pid, &worker)?;
            println!("{} checked out", worker);
        }
        FieldCommand::Checkins => {
            let checkins = dash.store().list_checkins(pid)?;
            if checkins.is_empty() {
                println!("No check-ins.");
            }
            for c in checkins {
                let out = c
                    .checked_out_at
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_else(|| "on site".to_string());
                println!(
                    "{} {:<20} {:<16} -> {}",
                    c.checked_in_at.format("%Y-%m-%d %H:%M"),
                    truncate(&c.worker, 20),
                    or_dash(c.location.as_deref()),
                    out
                );
            }
        }
        FieldCommand::Safety {
            kind,
            title,
            details,
            severity,
            date,
        } => {
            let record = dash.add_safety_record(
                pid,
                kind,
                &title,
                details.as_deref(),
                severity,
                date.unwrap_or_else(today),
            )?;
            println!("Safety {} recorded ({})", record.kind, short_id(&record.id));
        }
        FieldCommand::SafetyLog => {
            let records = dash.store().list_safety_records(pid)?;
            if records.is_empty() {
                println!("No safety records.");
                return Ok(());
            }
            println!(
                "{:<10} {:<12} {:<9} {:<8} {:<8} {}",
                "ID", "Date", "Kind", "Severity", "Status", "Title"
            );
            println!("{}", "-".repeat(80));
            for r in records {
                println!(
                    "{:<10} {:<12} {:<9} {:<8} {:<8} {}",
                    short_id(&r.id),
                    r.record_date.to_string(),
                    r.kind,
                    or_dash(r.severity),
                    r.status,
                    r.title
                );
            }
        }
        FieldCommand::SafetyStatus { id, status } => {
            let record = resolve(dash.store().list_safety_records(pid)?, &id, "safety record", |r| r.id.as_str())?;
            dash.set_safety_status(&record.id, status)?;
            println!("Safety record '{}' is now {}", record.title, status);
        }
        FieldCommand::Milestone {
            name,
            expected,
            notes,
        } => {
            let milestone = dash.add_milestone(pid, &name, expected, notes.as_deref())?;
            println!("Milestone '{}' added ({})", milestone.name, short_id(&milestone.id));
        }
        FieldCommand::Milestones => {
            let milestones = dash.store().list_milestones(pid)?;
            if milestones.is_empty() {
                println!("No utility milestones.");
                return Ok(());
            }
            println!("{:<4} {:<10} {:<36} {:<12} {:<12}", "#", "ID", "Milestone", "Status", "Expected");
            println!("{}", "-".repeat(78));
            for m in milestones {
                println!(
                    "{:<4} {:<10} {:<36} {:<12} {:<12}",
                    m.order_index + 1,
                    short_id(&m.id),
                    truncate(&m.name, 36),
                    m.status,
                    or_dash(m.expected_date)
                );
            }
        }
        FieldCommand::MilestoneStatus { id, status } => {
            let milestone = resolve(dash.store().list_milestones(pid)?, &id, "milestone", |m| m.id.as_str())?;
            dash.set_milestone_status(&milestone.id, status)?;
            println!("Milestone '{}' is now {}", milestone.name, status);
        }
        FieldCommand::Alert { message, severity } => {
            let alert = dash.raise_alert(pid, severity, &message)?;
            println!("Alert raised ({})", short_id(&alert.id));
        }
        FieldCommand::Alerts => {
            let alerts = dash.store().list_alerts(pid)?;
            if alerts.is_empty() {
                println!("No utility alerts.");
            }
            for a in alerts {
                println!(
                    "{:<10} [{}] {}{}",
                    short_id(&a.id),
                    a.severity,
                    a.message,
                    if a.acknowledged { "" } else { "  (new)" }
                );
            }
        }
        FieldCommand::Ack { id } => {
            let alert = resolve(dash.store().list_alerts(pid)?, &id, "alert", |a| a.id.as_str())?;
            dash.acknowledge_alert(&alert.id)?;
            println!("Alert acknowledged");
        }
        FieldCommand::Summary => {
            let s = dash.field_summary(pid)?;
            println!("Field summary for '{}'", project.name);
            println!("  Open punch items:       {}", s.open_punch_items);
            println!("  Open RFIs:              {}", s.open_rfis);
            println!("  Labor hours:            {:.1}", s.labor_hours);
            println!("  Open safety incidents:  {}", s.open_incidents);
            println!("  Unacknowledged alerts:  {}", s.unacknowledged_alerts);
            println!("  Active subcontractors:  {}", s.active_subcontractors);
            println!("  Utility milestones:     {}/{}", s.milestones_complete, s.milestones_total);
        }
    }
    Ok(())
}
