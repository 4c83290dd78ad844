use anyhow::Result;

use super::{or_dash, resolve, short_id, truncate};
use crate::dashboard::{Dashboard, NewRisk};
use crate::model::RiskStatus;

pub fn add(dash: &mut Dashboard, project: &str, mut new: NewRisk) -> Result<()> {
    let project = dash.project(project)?;
    if let Some(phase) = new.phase_id.take() {
        new.phase_id = Some(dash.project_phase(&project.id, &phase)?.id);
    }
    new.project_id = project.id;
    let risk = dash.add_risk(new)?;
    println!("Risk '{}' ({}) recorded with ID: {}", risk.title, risk.severity, risk.id);
    Ok(())
}

pub fn list(dash: &mut Dashboard, project: &str) -> Result<()> {
    let project = dash.project(project)?;
    let risks = dash.risks(&project.id)?;
    if risks.is_empty() {
        println!("No risks recorded for '{}'.", project.name);
        return Ok(());
    }

    println!(
        "{:<10} {:<8} {:<10} {:<32} {:<12} {}",
        "ID", "Severity", "Status", "Title", "Owner", "Mitigation"
    );
    println!("{}", "-".repeat(100));
    for risk in risks {
        println!(
            "{:<10} {:<8} {:<10} {:<32} {:<12} {}",
            short_id(&risk.id),
            risk.severity,
            risk.status,
            truncate(&risk.title, 32),
            or_dash(risk.owner.as_deref()),
            risk.mitigation
                .as_deref()
                .map(|m| truncate(m, 30))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

pub fn status(dash: &mut Dashboard, project: &str, risk: &str, status: RiskStatus) -> Result<()> {
    let project = dash.project(project)?;
    let found = resolve(dash.risks(&project.id)?, risk, "risk", |r| r.id.as_str())?;
    dash.set_risk_status(&found.id, status)?;
    println!("Risk '{}' is now {}", found.title, status);
    Ok(())
}
