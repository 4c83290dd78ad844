use anyhow::Result;

use super::{or_dash, short_id, today, truncate};
use crate::dashboard::Dashboard;
use crate::model::{NewTask, Task, TaskStatus};

pub fn add(dash: &mut Dashboard, phase: &str, new: NewTask) -> Result<()> {
    let phase = dash.phase(phase)?;
    let task = dash.add_task(&phase.id, new)?;
    println!("Task '{}' added to '{}' (ID: {})", task.title, phase.name, task.id);
    Ok(())
}

/// List a single phase's tasks, or the whole project's in phase order
pub fn list(dash: &mut Dashboard, project: &str, phase: Option<&str>) -> Result<()> {
    let tasks = match phase {
        Some(phase) => {
            let phase = dash.phase(phase)?;
            dash.tasks(&phase.id)?
        }
        None => {
            let project = dash.project(project)?;
            dash.project_tasks(&project.id)?
        }
    };
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<36} {:<12} {:<11} {:<12} {:>5} {:<4}",
        "ID", "Title", "Status", "Role", "Assignee", "Days", "CP"
    );
    println!("{}", "-".repeat(96));
    for task in tasks {
        print_row(&task);
    }
    Ok(())
}

fn print_row(task: &Task) {
    println!(
        "{:<10} {:<36} {:<12} {:<11} {:<12} {:>5} {:<4}",
        short_id(&task.id),
        truncate(&task.title, 36),
        task.status,
        task.role,
        truncate(task.assignee.as_deref().unwrap_or("-"), 12),
        or_dash(task.estimated_days),
        if task.critical_path { "*" } else { "" },
    );
}

pub fn status(dash: &mut Dashboard, task: &str, status: TaskStatus) -> Result<()> {
    let update = dash.update_task_status(task, status, today())?;
    println!("Task '{}' is now {}", update.task.title, update.task.status);
    if let Some(rollup) = update.phase {
        println!("  phase: {}% ({})", rollup.progress, rollup.status);
    }
    if let Some(progress) = update.project_progress {
        println!("  project: {}%", progress);
    }
    Ok(())
}

pub fn assign(dash: &mut Dashboard, task: &str, assignee: Option<&str>) -> Result<()> {
    let task = dash.assign_task(task, assignee)?;
    match task.assignee {
        Some(who) => println!("Task '{}' assigned to {}", task.title, who),
        None => println!("Task '{}' unassigned", task.title),
    }
    Ok(())
}
