//! Output formatting for the command line
//!
//! JSON for machines, box-drawn text for people. Reports go to stdout, logs
//! stay on stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::config::VisionPipeConfig;
use crate::pipeline::BatchReport;
use crate::vision::DetectionOperation;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Machine-readable
    Json,
    Human,
}

/// A resource that never reached the pipeline, or whose batch was aborted
#[derive(Debug, Clone, Serialize)]
pub struct ResourceFailure {
    pub resource: String,
    pub error: String,
}

/// Everything one `analyze` invocation produced
#[derive(Debug, Clone, Default)]
pub struct AnalyzeSummary {
    pub reports: Vec<BatchReport>,
    pub failures: Vec<ResourceFailure>,
    /// Envelope bodies, collected only for dry runs
    pub envelopes: Vec<String>,
}

impl AnalyzeSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_analysis(&self, summary: &AnalyzeSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_analysis_json(summary),
            OutputFormat::Human => Ok(self.format_analysis_human(summary)),
        }
    }

    pub fn format_operations(&self) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_operations_json(),
            OutputFormat::Human => Ok(self.format_operations_human()),
        }
    }

    pub fn format_config(&self, config: &VisionPipeConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize config to JSON"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_analysis_json(&self, summary: &AnalyzeSummary) -> Result<String> {
        // Envelopes are embedded as JSON where they parse, verbatim otherwise
        let envelopes: Vec<Value> = summary
            .envelopes
            .iter()
            .map(|text| serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone())))
            .collect();

        let mut output = serde_json::json!({
            "reports": summary.reports,
            "failures": summary.failures,
        });
        if !envelopes.is_empty() {
            output["envelopes"] = Value::Array(envelopes);
        }

        serde_json::to_string_pretty(&output).context("Failed to serialize analysis to JSON")
    }

    fn format_analysis_human(&self, summary: &AnalyzeSummary) -> String {
        let mut output = String::new();

        for report in &summary.reports {
            if report.all_succeeded() {
                output.push_str(&format!("\u{2713} {}\n", report.uri));
            } else {
                output.push_str(&format!("\u{26A0} {}\n", report.uri));
            }
            output.push_str(RULE);
            output.push_str("\n\n");

            output.push_str(&format!("UID:    {}\n", report.uid));
            output.push_str(&format!("Queue:  {}\n\n", report.queue));

            let rows = report.published_count() + report.failed_count();
            let mut row = 0;
            output.push_str("Operations:\n");
            for published in &report.succeeded {
                row += 1;
                output.push_str(&format!(
                    "{}\u{2500} {:<18} published ({} bytes)\n",
                    connector(row, rows),
                    published.operation.name(),
                    published.bytes
                ));
            }
            for failed in &report.failed {
                row += 1;
                output.push_str(&format!(
                    "{}\u{2500} {:<18} {}: {}\n",
                    connector(row, rows),
                    failed.operation.name(),
                    failed.kind,
                    failed.message
                ));
            }
            if rows == 0 {
                output.push_str("\u{2514}\u{2500} (none)\n");
            }

            output.push_str(&format!(
                "\n{} published, {} failed in {}ms\n\n",
                report.published_count(),
                report.failed_count(),
                report.elapsed_ms
            ));
        }

        if !summary.failures.is_empty() {
            output.push_str("\u{26A0} Failed resources:\n");
            for failure in &summary.failures {
                output.push_str(&format!("  - {}: {}\n", failure.resource, failure.error));
            }
            output.push('\n');
        }

        if !summary.envelopes.is_empty() {
            output.push_str("Envelopes (dry run):\n");
            for envelope in &summary.envelopes {
                output.push_str(envelope);
                output.push('\n');
            }
        }

        output
    }

    fn format_operations_json(&self) -> Result<String> {
        let operations: Vec<Value> = DetectionOperation::all_variants()
            .iter()
            .map(|op| {
                serde_json::json!({
                    "name": op.name(),
                    "cli_name": op.cli_name(),
                    "feature": op.feature_type(),
                    "expands_to": op.expand().iter().map(|o| o.name()).collect::<Vec<_>>(),
                })
            })
            .collect();
        serde_json::to_string_pretty(&operations).context("Failed to serialize operations to JSON")
    }

    fn format_operations_human(&self) -> String {
        let mut output = String::from("Detection Operations\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for op in DetectionOperation::all_variants() {
            let detail = if op.is_composite() {
                let names: Vec<&str> = op.expand().iter().map(|o| o.cli_name()).collect();
                format!("runs {}", names.join(", "))
            } else {
                op.feature_type().unwrap_or_default().to_string()
            };
            output.push_str(&format!(
                "  {:<14} {:<18} {}\n",
                op.cli_name(),
                op.name(),
                detail
            ));
        }

        output
    }
}

fn connector(row: usize, rows: usize) -> &'static str {
    if row == rows {
        "\u{2514}"
    } else {
        "\u{251C}"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ErrorKind, FailedOperation};

    fn sample_report() -> BatchReport {
        let mut report = BatchReport::new("gs://bucket/cat.jpg", "uid-1", "visionqueue");
        report.record_published(DetectionOperation::Labels, 120);
        report.failed.push(FailedOperation {
            operation: DetectionOperation::Text,
            kind: ErrorKind::ServiceInvocation,
            message: "Vision API error (500): backend".to_string(),
        });
        report
    }

    #[test]
    fn test_human_analysis_output() {
        let summary = AnalyzeSummary {
            reports: vec![sample_report()],
            ..Default::default()
        };
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_analysis(&summary)
            .unwrap();

        assert!(output.contains("gs://bucket/cat.jpg"));
        assert!(output.contains("DETECT_LABELS"));
        assert!(output.contains("published (120 bytes)"));
        assert!(output.contains("service_invocation"));
        assert!(output.contains("1 published, 1 failed"));
    }

    #[test]
    fn test_json_analysis_embeds_envelopes() {
        let summary = AnalyzeSummary {
            reports: vec![sample_report()],
            failures: vec![ResourceFailure {
                resource: "missing.jpg".to_string(),
                error: "not found".to_string(),
            }],
            envelopes: vec![r#"{"operation":"DETECT_LABELS"}"#.to_string(), "not json".to_string()],
        };
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_analysis(&summary)
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["reports"][0]["uid"], "uid-1");
        assert_eq!(value["failures"][0]["resource"], "missing.jpg");
        assert_eq!(value["envelopes"][0]["operation"], "DETECT_LABELS");
        assert_eq!(value["envelopes"][1], "not json");
    }

    #[test]
    fn test_json_analysis_omits_empty_envelopes() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_analysis(&AnalyzeSummary::default())
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert!(value.get("envelopes").is_none());
    }

    #[test]
    fn test_operations_output() {
        let human = OutputFormatter::new(OutputFormat::Human)
            .format_operations()
            .unwrap();
        assert!(human.contains("doc-text"));
        assert!(human.contains("DOCUMENT_TEXT_DETECTION"));
        assert!(human.contains("runs text, labels, doc-text, landmarks, web"));

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_operations()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let all = value
            .as_array()
            .unwrap()
            .iter()
            .find(|op| op["name"] == "DETECT_ALL")
            .unwrap();
        assert!(all["feature"].is_null());
        assert_eq!(all["expands_to"].as_array().unwrap().len(), 5);
    }
}
