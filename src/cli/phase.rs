use anyhow::Result;

use super::{short_id, truncate};
use crate::dashboard::Dashboard;

pub fn add(dash: &mut Dashboard, project: &str, name: &str, description: Option<&str>) -> Result<()> {
    let project = dash.project(project)?;
    let phase = dash.add_phase(&project.id, name, description)?;
    println!(
        "Phase '{}' added to '{}' at position {} (ID: {})",
        phase.name,
        project.name,
        phase.order_index + 1,
        phase.id
    );
    Ok(())
}

pub fn list(dash: &mut Dashboard, project: &str) -> Result<()> {
    let project = dash.project(project)?;
    let phases = dash.phases(&project.id)?;
    if phases.is_empty() {
        println!("No phases in '{}'.", project.name);
        return Ok(());
    }

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
    Ok(())
}

pub fn recompute(dash: &mut Dashboard, phase: &str) -> Result<()> {
    let phase = dash.phase(phase)?;
    match dash.recompute_phase(&phase.id)? {
        Some(rollup) => println!(
            "Phase '{}': {}% ({})",
            phase.name, rollup.progress, rollup.status
        ),
        None => println!("Phase '{}' has no tasks; left unchanged", phase.name),
    }
    Ok(())
}
