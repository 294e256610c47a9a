//! Defect summary delivery to the station's reporting channel.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use firecheck_checklist::InventoryRecord;

/// Human-readable summary of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectReport {
    pub vehicle_name: String,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    pub percent_complete: u8,
    pub defect_lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DefectReport {
    pub fn from_record(record: &InventoryRecord) -> Self {
        Self {
            vehicle_name: record.vehicle_name.clone(),
            agent_name: record.agent.name.clone(),
            timestamp: record.timestamp,
            percent_complete: record.percent_complete,
            defect_lines: record.defects.iter().map(|d| d.summary_line()).collect(),
            note: record.note.clone(),
        }
    }

    pub fn has_defects(&self) -> bool {
        !self.defect_lines.is_empty()
    }

    /// Plain-text body.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} checked by {} on {} ({}% complete)\n",
            self.vehicle_name,
            self.agent_name,
            self.timestamp.format("%Y-%m-%d %H:%M UTC"),
            self.percent_complete
        );
        if self.defect_lines.is_empty() {
            out.push_str("No defects.\n");
        } else {
            for line in &self.defect_lines {
                out.push_str("- ");
                out.push_str(line);
                out.push('\n');
            }
        }
        if let Some(note) = &self.note {
            out.push_str("Note: ");
            out.push_str(note);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("report delivery failed: {0}")]
    Delivery(String),
}

#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &DefectReport) -> Result<(), ReportError>;
}

/// Keeps delivered reports in memory (tests/dev).
#[derive(Debug, Default)]
pub struct RecordingReportSink {
    delivered: Mutex<Vec<DefectReport>>,
    fail: AtomicBool,
}

impl RecordingReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<DefectReport> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ReportSink for RecordingReportSink {
    async fn deliver(&self, report: &DefectReport) -> Result<(), ReportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ReportError::Delivery("sink configured to fail".to_string()));
        }
        self.delivered.lock().unwrap().push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(lines: &[&str]) -> DefectReport {
        DefectReport {
            vehicle_name: "FPT 1".into(),
            agent_name: "Camille".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap(),
            percent_complete: 80,
            defect_lines: lines.iter().map(|l| l.to_string()).collect(),
            note: None,
        }
    }

    #[test]
    fn render_lists_each_defect() {
        let text = report(&["Cab > Axe: missing", "Rear > Hose: found 1/2"]).render();
        let header = "FPT 1 checked by Camille on 2026-03-01 07:30 UTC (80% complete)";
        assert!(text.starts_with(header));
        assert!(text.contains("- Cab > Axe: missing\n"));
        assert!(text.contains("- Rear > Hose: found 1/2\n"));
    }

    #[test]
    fn render_without_defects() {
        let r = report(&[]);
        assert!(!r.has_defects());
        assert!(r.render().contains("No defects."));
    }

    #[tokio::test]
    async fn failing_sink_records_nothing() {
        let sink = RecordingReportSink::new();
        sink.set_fail(true);
        assert!(sink.deliver(&report(&[])).await.is_err());
        assert!(sink.delivered().is_empty());
    }
}
