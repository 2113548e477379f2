//! Functionality for running a full network projection.
use crate::aggregate::{calculate_overall_metrics, network_health};
use crate::analysis::{calculate_averages, calculate_cost_breakdown, calculate_warnings};
use crate::model::Network;
use crate::output::DataWriter;
use crate::roi::{calculate_branch_roi, calculate_network_roi};
use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use std::path::Path;

/// Run the projection and write all results to CSV files.
///
/// Each branch's forecast series is already computed (it is derived when the model is
/// loaded); this derives the per-branch analyses and ROI figures, rolls them up into
/// network totals and writes everything out.
///
/// # Arguments
///
/// * `network` - The network to project
/// * `output_path` - Folder where result files will be saved
/// * `today` - The date breakeven projections are counted from
pub fn run(network: &Network, output_path: &Path, today: NaiveDate) -> Result<()> {
    let mut writer = DataWriter::create(output_path)?;

    for branch in network.branches.values() {
        info!(
            "Projecting branch {}: {} months",
            branch.id,
            branch.monthly_data.len()
        );
        writer.write_forecast(&branch.id, &branch.monthly_data)?;

        if let Some(breakdown) = calculate_cost_breakdown(&branch.monthly_data) {
            writer.write_cost_breakdown(&branch.id, &breakdown)?;
        }
        if let Some(averages) = calculate_averages(&branch.monthly_data) {
            writer.write_averages(&branch.id, &averages)?;
        }

        let warnings = calculate_warnings(&branch.monthly_data, branch.metrics.branch_capacity);
        for warning in &warnings {
            info!("Branch {}: {}", branch.id, warning.message());
        }
        writer.write_warnings(&branch.id, &warnings)?;

        writer.write_branch_roi(&branch.id, &calculate_branch_roi(branch, today))?;
    }

    let summary = calculate_overall_metrics(&network.branches);
    writer.write_branch_summaries(&network.branches, &summary)?;
    writer.write_network_summary(&summary)?;

    let findings = network_health(&network.branches);
    for finding in &findings {
        info!("Network health: {}", finding.message());
    }
    writer.write_health_findings(&findings)?;

    writer.write_network_roi(&calculate_network_roi(&network.branches, today)?)?;

    writer.flush()?;

    Ok(())
}
