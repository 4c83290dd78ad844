use anyhow::Result;

use super::{or_dash, short_id, truncate};
use crate::dashboard::Dashboard;
use crate::model::{NewProject, ProjectDates, ProjectStatus};

pub fn create(dash: &mut Dashboard, new: NewProject, seed_template: bool) -> Result<()> {
    let project = dash.create_project(new, seed_template)?;
    println!("Project '{}' created with ID: {}", project.name, project.id);
    if seed_template {
        let phases = dash.phases(&project.id)?;
        let tasks = dash.project_tasks(&project.id)?;
        println!("Seeded {} phases and {} tasks from the default template", phases.len(), tasks.len());
    }
    Ok(())
}

pub fn list(dash: &mut Dashboard, owner: Option<&str>) -> Result<()> {
    let projects = dash.projects(owner)?;
    if projects.is_empty() {
        println!("No projects found. Run 'voltbuild project create' first.");
        return Ok(());
    }

    println!(
        "{:<10} {:<24} {:<12} {:>8} {:>9} {:<12}",
        "ID", "Name", "Status", "MW", "Progress", "Target"
    );
    println!("{}", "-".repeat(80));
    for p in projects {
        println!(
            "{:<10} {:<24} {:<12} {:>8} {:>8}% {:<12}",
            short_id(&p.id),
            truncate(&p.name, 24),
            p.status,
            or_dash(p.capacity_mw),
            p.progress,
            or_dash(p.planned_end),
        );
    }
    Ok(())
}

pub fn show(dash: &mut Dashboard, query: &str) -> Result<()> {
    let project = dash.project(query)?;

    println!("Project:  {} ({})", project.name, project.id);
    println!("Owner:    {}", project.owner_id);
    println!("Status:   {}  Progress: {}%", project.status, project.progress);
    println!(
        "Capacity: {} MW  Cooling: {}",
        or_dash(project.capacity_mw),
        or_dash(project.cooling_type)
    );
    println!("Utility:  {}", or_dash(project.utility.as_deref()));
    println!("Location: {}", or_dash(project.location.as_deref()));
    println!(
        "Planned:  {} -> {}",
        or_dash(project.planned_start),
        or_dash(project.planned_end)
    );
    if project.actual_start.is_some() || project.actual_end.is_some() {
        println!(
            "Actual:   {} -> {}",
            or_dash(project.actual_start),
            or_dash(project.actual_end)
        );
    }

    let phases = dash.phases(&project.id)?;
    if phases.is_empty() {
        return Ok(());
    }
    println!();
    println!("{:<4} {:<10} {:<36} {:<12} {:>8}", "#", "ID", "Phase", "Status", "Progress");
    println!("{}", "-".repeat(74));
    for phase in phases {
        println!(
            "{:<4} {:<10} {:<36} {:<12} {:>7}%",
            phase.order_index + 1,
            short_id(&phase.id),
            truncate(&phase.name, 36),
            phase.status,
            phase.progress,
        );
    }

    let summary = dash.field_summary(&project.id)?;
    println!();
    println!(
        "Field: {} open punch items, {} open RFIs, {:.1} labor hours, {} open incidents, \
         {} unacknowledged alerts, utility milestones {}/{}",
        summary.open_punch_items,
        summary.open_rfis,
        summary.labor_hours,
        summary.open_incidents,
        summary.unacknowledged_alerts,
        summary.milestones_complete,
        summary.milestones_total,
    );
    Ok(())
}

pub fn status(dash: &mut Dashboard, query: &str, status: ProjectStatus) -> Result<()> {
    let project = dash.project(query)?;
    dash.set_project_status(&project.id, status)?;
    println!("Project '{}' is now {}", project.name, status);
    Ok(())
}

pub fn dates(dash: &mut Dashboard, query: &str, dates: ProjectDates) -> Result<()> {
    let project = dash.project(query)?;
    let project = dash.set_project_dates(&project.id, dates)?;
    println!(
        "Project '{}' planned {} -> {}, actual {} -> {}",
        project.name,
        or_dash(project.planned_start),
        or_dash(project.planned_end),
        or_dash(project.actual_start),
        or_dash(project.actual_end),
    );
    Ok(())
}
