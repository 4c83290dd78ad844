use anyhow::Result;

use super::truncate;
use crate::dashboard::Dashboard;

pub fn run(dash: &mut Dashboard, project: &str) -> Result<()> {
    let project = dash.project(project)?;
    let report = dash.advise(&project.id)?;

    println!("{}: {} (health {}/100)", project.name, report.status.label(), report.health_score);
    println!(
        "Tasks: {} total, {} complete, {} in progress, {} blocked",
        report.total_tasks, report.completed_tasks, report.in_progress_tasks, report.blocked_tasks
    );

    if !report.critical_path.is_empty() {
        println!();
        println!("{:<40} {:<28} {:<12} {:>8}", "Critical path", "Phase", "Status", "At risk");
        println!("{}", "-".repeat(92));
        for task in &report.critical_path {
            println!(
                "{:<40} {:<28} {:<12} {:>6} d",
                truncate(&task.title, 40),
                truncate(task.phase_name.as_deref().unwrap_or("-"), 28),
                task.status,
                task.risk_days,
            );
        }
    }

    if !report.top_actions.is_empty() {
        println!();
        println!("Top actions:");
        for action in &report.top_actions {
            println!("  [{}] {}: {}", action.priority, action.title, action.detail);
        }
    }

    if !report.top_risks.is_empty() {
        println!();
        println!("Top risks:");
        for risk in &report.top_risks {
            if risk.detail.is_empty() {
                println!("  [{}] {}", risk.severity, risk.title);
            } else {
                println!("  [{}] {}: {}", risk.severity, risk.title, risk.detail);
            }
        }
    }
    Ok(())
}
