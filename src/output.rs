//! The module responsible for writing output data to disk.
use crate::aggregate::{HealthFinding, NetworkSummary};
use crate::analysis::{BranchAverages, CostBreakdown, Warning};
use crate::branch::{BranchID, BranchMap};
use crate::forecast::MonthlyMetrics;
use crate::roi::{NetworkRoiMetrics, RoiMetrics};
use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "branchcast_results";

/// The output file name for the per-branch monthly forecast series
const MONTHLY_FORECAST_FILE_NAME: &str = "monthly_forecast.csv";

/// The output file name for the per-branch first-month cost breakdown
const COST_BREAKDOWN_FILE_NAME: &str = "cost_breakdown.csv";

/// The output file name for per-branch period averages and totals
const BRANCH_AVERAGES_FILE_NAME: &str = "branch_averages.csv";

/// The output file name for branch warnings and network health findings
const WARNINGS_FILE_NAME: &str = "warnings.csv";

/// The output file name for ranked per-branch summaries
const BRANCH_SUMMARIES_FILE_NAME: &str = "branch_summaries.csv";

/// The output file name for network-wide totals
const NETWORK_SUMMARY_FILE_NAME: &str = "network_summary.csv";

/// The output file name for per-branch ROI metrics
const BRANCH_ROI_FILE_NAME: &str = "branch_roi.csv";

/// The output file name for network ROI metrics
const NETWORK_ROI_FILE_NAME: &str = "network_roi.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model specified at `model_dir`.
///
/// # Returns
///
/// Whether an existing directory is being overwritten.
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        ensure!(
            overwrite,
            "Output directory {} already exists. Use --overwrite to replace it.",
            output_dir.display()
        );

        return Ok(true);
    }

    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// A date rendered for CSV output
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The branch a row of output data refers to.
///
/// Serialised alongside the per-branch payload structs so every file leads with a
/// `branch_id` column.
#[derive(Serialize)]
struct BranchRef<'a> {
    branch_id: &'a BranchID,
}

/// Represents a row in the warnings CSV file.
///
/// Network-level health findings share the file, with an empty `branch_id` cell and a
/// populated `recommendation`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct WarningRow {
    branch_id: Option<BranchID>,
    kind: String,
    message: String,
    recommendation: String,
}

/// Represents the identity and rank columns of a branch summaries row.
///
/// This will be written along with a `BranchSummary` containing the figures.
#[derive(Serialize)]
struct SummaryRef<'a> {
    rank: u32,
    branch_id: &'a BranchID,
    name: &'a str,
    location: &'a str,
}

/// Represents the single row of the network summary CSV file
#[derive(Serialize)]
struct NetworkSummaryRow<'a> {
    branches: usize,
    total_revenue: f64,
    total_profit: f64,
    total_orders: f64,
    average_margin: f64,
    average_utilization: f64,
    best_performer: Option<&'a BranchID>,
    worst_performer: Option<&'a BranchID>,
}

/// Represents the ROI-related columns of a branch ROI row.
///
/// This will be written along with a [`BranchRef`] identifying the branch.
#[derive(Serialize)]
struct RoiRow {
    total_investment: f64,
    monthly_profit: f64,
    months_to_roi: Option<u32>,
    projected_roi_date: Option<String>,
    current_roi_percentage: f64,
    is_roi_reached: bool,
}

impl RoiRow {
    /// Create a new [`RoiRow`]
    fn new(roi: &RoiMetrics) -> Self {
        Self {
            total_investment: roi.total_investment.value(),
            monthly_profit: roi.monthly_profit.value(),
            months_to_roi: roi.months_to_roi.months(),
            projected_roi_date: roi.projected_roi_date.map(format_date),
            current_roi_percentage: roi.current_roi_percentage.value(),
            is_roi_reached: roi.is_roi_reached,
        }
    }
}

/// Represents the single row of the network ROI CSV file
#[derive(Serialize)]
struct NetworkRoiRow<'a> {
    total_network_investment: f64,
    average_monthly_profit: f64,
    average_months_to_roi: Option<f64>,
    fastest_branch_id: &'a BranchID,
    fastest_branch_name: &'a str,
    fastest_months_to_roi: Option<u32>,
    slowest_branch_id: &'a BranchID,
    slowest_branch_name: &'a str,
    slowest_months_to_roi: Option<u32>,
    projected_network_roi_date: Option<String>,
    current_network_roi_percentage: f64,
    is_network_roi_reached: bool,
}

/// An object for writing all forecast results to CSV files
pub struct DataWriter {
    forecast_writer: csv::Writer<File>,
    cost_breakdown_writer: csv::Writer<File>,
    averages_writer: csv::Writer<File>,
    warnings_writer: csv::Writer<File>,
    summaries_writer: csv::Writer<File>,
    network_summary_writer: csv::Writer<File>,
    branch_roi_writer: csv::Writer<File>,
    network_roi_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            forecast_writer: new_writer(MONTHLY_FORECAST_FILE_NAME)?,
            cost_breakdown_writer: new_writer(COST_BREAKDOWN_FILE_NAME)?,
            averages_writer: new_writer(BRANCH_AVERAGES_FILE_NAME)?,
            warnings_writer: new_writer(WARNINGS_FILE_NAME)?,
            summaries_writer: new_writer(BRANCH_SUMMARIES_FILE_NAME)?,
            network_summary_writer: new_writer(NETWORK_SUMMARY_FILE_NAME)?,
            branch_roi_writer: new_writer(BRANCH_ROI_FILE_NAME)?,
            network_roi_writer: new_writer(NETWORK_ROI_FILE_NAME)?,
        })
    }

    /// Write a branch's monthly forecast series to a CSV file
    pub fn write_forecast(&mut self, branch_id: &BranchID, series: &[MonthlyMetrics]) -> Result<()> {
        for month in series {
            self.forecast_writer
                .serialize((BranchRef { branch_id }, month))?;
        }

        Ok(())
    }

    /// Write a branch's first-month cost breakdown to a CSV file
    pub fn write_cost_breakdown(
        &mut self,
        branch_id: &BranchID,
        breakdown: &CostBreakdown,
    ) -> Result<()> {
        self.cost_breakdown_writer
            .serialize((BranchRef { branch_id }, breakdown))?;

        Ok(())
    }

    /// Write a branch's period averages and totals to a CSV file
    pub fn write_averages(
        &mut self,
        branch_id: &BranchID,
        averages: &BranchAverages,
    ) -> Result<()> {
        self.averages_writer
            .serialize((BranchRef { branch_id }, averages))?;

        Ok(())
    }

    /// Write a branch's warnings to a CSV file
    pub fn write_warnings(&mut self, branch_id: &BranchID, warnings: &[Warning]) -> Result<()> {
        for warning in warnings {
            let row = WarningRow {
                branch_id: Some(branch_id.clone()),
                kind: warning.to_string(),
                message: warning.message(),
                recommendation: String::new(),
            };
            self.warnings_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write network-level health findings to the warnings CSV file
    pub fn write_health_findings(&mut self, findings: &[HealthFinding]) -> Result<()> {
        for finding in findings {
            let row = WarningRow {
                branch_id: None,
                kind: finding.to_string(),
                message: finding.message(),
                recommendation: finding.recommendation().to_string(),
            };
            self.warnings_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write per-branch summaries to a CSV file, ranked by descending total profit
    pub fn write_branch_summaries(
        &mut self,
        branches: &BranchMap,
        summary: &NetworkSummary,
    ) -> Result<()> {
        for (rank, (branch_id, branch_summary)) in (1u32..).zip(summary.ranked_by_profit()) {
            let branch = &branches[branch_id];
            let row = SummaryRef {
                rank,
                branch_id,
                name: &branch.name,
                location: &branch.location,
            };
            self.summaries_writer.serialize((row, branch_summary))?;
        }

        Ok(())
    }

    /// Write the network summary to a CSV file
    pub fn write_network_summary(&mut self, summary: &NetworkSummary) -> Result<()> {
        let row = NetworkSummaryRow {
            branches: summary.branch_summaries.len(),
            total_revenue: summary.total_revenue.value(),
            total_profit: summary.total_profit.value(),
            total_orders: summary.total_orders.value(),
            average_margin: summary.average_margin.value(),
            average_utilization: summary.average_utilization.value(),
            best_performer: summary.best_performer(),
            worst_performer: summary.worst_performer(),
        };
        self.network_summary_writer.serialize(row)?;

        Ok(())
    }

    /// Write a branch's ROI metrics to a CSV file
    pub fn write_branch_roi(&mut self, branch_id: &BranchID, roi: &RoiMetrics) -> Result<()> {
        self.branch_roi_writer
            .serialize((BranchRef { branch_id }, RoiRow::new(roi)))?;

        Ok(())
    }

    /// Write the network ROI metrics to a CSV file
    pub fn write_network_roi(&mut self, roi: &NetworkRoiMetrics) -> Result<()> {
        let row = NetworkRoiRow {
            total_network_investment: roi.total_network_investment.value(),
            average_monthly_profit: roi.average_monthly_profit.value(),
            average_months_to_roi: roi.average_months_to_roi.map(crate::units::Dimensionless::value),
            fastest_branch_id: &roi.fastest_roi.branch_id,
            fastest_branch_name: &roi.fastest_roi.branch_name,
            fastest_months_to_roi: roi.fastest_roi.months_to_roi,
            slowest_branch_id: &roi.slowest_roi.branch_id,
            slowest_branch_name: &roi.slowest_roi.branch_name,
            slowest_months_to_roi: roi.slowest_roi.months_to_roi,
            projected_network_roi_date: roi.projected_network_roi_date.map(format_date),
            current_network_roi_percentage: roi.current_network_roi_percentage.value(),
            is_network_roi_reached: roi.is_network_roi_reached,
        };
        self.network_roi_writer.serialize(row)?;

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.forecast_writer.flush()?;
        self.cost_breakdown_writer.flush()?;
        self.averages_writer.flush()?;
        self.warnings_writer.flush()?;
        self.summaries_writer.flush()?;
        self.network_summary_writer.flush()?;
        self.branch_roi_writer.flush()?;
        self.network_roi_writer.flush()?;

        Ok(())
    }
}
