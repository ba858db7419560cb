//! CLI presentation: text and JSON rendering of jobs and layouts.

use crate::error::ApiError;
use crate::job::{JobRecord, JobStatus};
use crate::scene::{outline, LayoutSnapshot, SceneNode};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

/// One finished generation as reported by `generate`.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub plan_file: PathBuf,
    pub job: JobRecord,
}

#[derive(Serialize)]
struct GenerationReportJson<'a> {
    plan_file: String,
    job: &'a JobRecord,
    layout: Option<LayoutSnapshot>,
}

fn status_color(status: JobStatus) -> Color {
    match status {
        JobStatus::Completed => Color::Green,
        JobStatus::Failed => Color::Red,
        JobStatus::Queued | JobStatus::Processing => Color::Yellow,
    }
}

fn format_timestamp(ms: Option<u64>) -> String {
    ms.and_then(|ms| i64::try_from(ms).ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|ts| ts.format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn section_title(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Job table followed by the outline of every completed layout.
pub fn format_generation_text(reports: &[GenerationReport]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Job", "Plan", "Status", "Progress", "Result", "Finished", "Duration",
    ]);
    for report in reports {
        let job = &report.job;
        let result = match job.status {
            JobStatus::Completed => job.result_id.clone().unwrap_or_default(),
            JobStatus::Failed => job.error.clone().unwrap_or_default(),
            _ => "-".to_string(),
        };
        let duration = job
            .duration_ms()
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(job.id.as_str()),
            Cell::new(report.plan_file.display()),
            Cell::new(job.status.as_str()).fg(status_color(job.status)),
            Cell::new(format!("{}%", job.progress)),
            Cell::new(result),
            Cell::new(format_timestamp(job.finished_at_ms)),
            Cell::new(duration),
        ]);
    }

    let mut out = format!("{}\n{}", section_title("Jobs"), table);
    for report in reports {
        if let Some(layout) = &report.job.result {
            out.push_str(&format!(
                "\n\n{}\n{}",
                section_title(&report.plan_file.display().to_string()),
                outline(layout).trim_end()
            ));
        }
    }
    out
}

pub fn format_generation_json(reports: &[GenerationReport]) -> Result<String, ApiError> {
    let rows: Vec<GenerationReportJson<'_>> = reports
        .iter()
        .map(|report| GenerationReportJson {
            plan_file: report.plan_file.display().to_string(),
            job: &report.job,
            layout: report.job.result.as_ref().map(LayoutSnapshot::capture),
        })
        .collect();
    to_pretty_json(&rows)
}

pub fn format_node_text(node: &SceneNode) -> String {
    let parent = node
        .parent()
        .map(|p| p.id().to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut out = format!(
        "{}: {} ({})\nparent: {}\nchildren: {}",
        node.kind().label(),
        node.name(),
        node.id(),
        parent,
        node.child_count()
    );
    for line in outline(node).lines().skip(1) {
        out.push('\n');
        out.push_str(line);
    }
    out
}

pub fn format_node_json(node: &SceneNode) -> Result<String, ApiError> {
    to_pretty_json(&LayoutSnapshot::capture(node))
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render JSON: {}", e)))
}
