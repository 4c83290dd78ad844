use anyhow::Result;

use super::{short_id, today};
use crate::dashboard::Dashboard;
use crate::model::{DriverImpact, ForecastSnapshot};

pub fn generate(dash: &mut Dashboard, project: &str) -> Result<()> {
    let project = dash.project(project)?;
    let snapshot = dash.generate_forecast(&project.id, today())?;
    print_snapshot(&project.name, &snapshot);
    Ok(())
}

fn print_snapshot(project_name: &str, snapshot: &ForecastSnapshot) {
    println!("Forecast for '{}'", project_name);
    println!("  Projected completion: {}", snapshot.projected_completion);
    println!("  Schedule slip:        {} days", snapshot.schedule_slip_days);
    println!("  CAPEX overrun:        {:.1}%", snapshot.capex_overrun_pct);
    println!("  Confidence:           {}%", snapshot.confidence_pct);

    println!();
    println!("Drivers:");
    for driver in &snapshot.drivers {
        let sign = match driver.impact {
            DriverImpact::Positive => '+',
            DriverImpact::Negative => '-',
        };
        println!("  {} {}: {}", sign, driver.name, driver.detail);
    }

    if !snapshot.actions.is_empty() {
        println!();
        println!("Recommended actions:");
        for action in &snapshot.actions {
            println!("  [{}] {}: {}", action.priority, action.title, action.detail);
        }
    }
}

pub fn history(dash: &mut Dashboard, project: &str, limit: usize) -> Result<()> {
    let project = dash.project(project)?;
    let snapshots = dash.forecasts(&project.id)?;
    if snapshots.is_empty() {
        println!("No forecasts yet. Run 'voltbuild forecast generate {}' first.", project.name);
        return Ok(());
    }

    println!(
        "{:<10} {:<17} {:<12} {:>6} {:>9} {:>6} {:<10}",
        "ID", "Generated", "Completion", "Slip", "Overrun", "Conf", "Inputs"
    );
    println!("{}", "-".repeat(78));
    for snapshot in snapshots.iter().take(limit) {
        println!(
            "{:<10} {:<17} {:<12} {:>6} {:>8.1}% {:>5}% {:<10}",
            short_id(&snapshot.id),
            snapshot.generated_at.format("%Y-%m-%d %H:%M").to_string(),
            snapshot.projected_completion.to_string(),
            snapshot.schedule_slip_days,
            snapshot.capex_overrun_pct,
            snapshot.confidence_pct,
            short_id(&snapshot.input_fingerprint),
        );
    }
    Ok(())
}

pub fn delta(dash: &mut Dashboard, project: &str) -> Result<()> {
    let project = dash.project(project)?;
    let Some(delta) = dash.forecast_delta(&project.id)? else {
        println!("Need at least two forecasts to compare.");
        return Ok(());
    };

    println!("Change since previous forecast for '{}'", project.name);
    println!("  Schedule slip:  {:+} days", delta.slip_days);
    println!("  Completion:     {:+} days", delta.completion_days);
    println!("  CAPEX overrun:  {:+.1} pts", delta.overrun_pct);
    println!("  Confidence:     {:+} pts", delta.confidence_pct);
    if !delta.inputs_changed {
        println!("  (task and phase state unchanged)");
    }
    Ok(())
}
