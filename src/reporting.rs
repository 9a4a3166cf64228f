// Reporting and output for verbscan
// Renders a CampaignReport as text, JSON or XML and writes it to disk

use colored::{ColoredString, Colorize};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::{CampaignReport, MethodResult};

const RULE_WIDTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
    Xml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err("Invalid output format. Must be one of: txt, json, xml".to_string()),
        }
    }
}

impl OutputFormat {
    /// Machine-readable formats never carry ANSI colour codes
    pub fn allows_color(&self) -> bool {
        matches!(self, OutputFormat::Txt)
    }
}

#[derive(Debug)]
pub enum ReportError {
    Serialize(serde_json::Error),
    Write(PathBuf, std::io::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Serialize(e) => write!(f, "Error formatting results: {}", e),
            ReportError::Write(path, e) => {
                write!(f, "Error writing to output file {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ReportError {}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialize(err)
    }
}

pub fn render(report: &CampaignReport, format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Txt => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Xml => Ok(render_xml(report)),
    }
}

pub fn render_json(report: &CampaignReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Escape special XML characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn xml_element(out: &mut String, indent: usize, name: &str, value: impl fmt::Display) {
    let _ = writeln!(
        out,
        "{:indent$}<{name}>{}</{name}>",
        "",
        xml_escape(&value.to_string()),
        indent = indent,
        name = name
    );
}

pub fn render_xml(report: &CampaignReport) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<http_method_test_results>\n");
    xml_element(&mut out, 2, "tool_name", &report.tool.name);
    xml_element(&mut out, 2, "tool_version", &report.tool.version);
    xml_element(&mut out, 2, "tool_author", &report.tool.author);
    xml_element(&mut out, 2, "timestamp", &report.timestamp);
    out.push_str("  <url_results>\n");

    for url_result in &report.results {
        out.push_str("    <url_result>\n");
        xml_element(&mut out, 6, "url", &url_result.url);
        out.push_str("      <results>\n");
        for r in &url_result.results {
            out.push_str("        <method_result>\n");
            xml_element(&mut out, 10, "method", &r.method);
            xml_element(&mut out, 10, "status_code", r.status_code);
            xml_element(&mut out, 10, "status", &r.status_text);
            xml_element(&mut out, 10, "response_time_ms", r.elapsed_ms);
            xml_element(&mut out, 10, "content_length", r.body_bytes);
            xml_element(&mut out, 10, "is_dangerous", r.is_dangerous);
            xml_element(&mut out, 10, "is_vulnerable", r.is_vulnerable);
            if let Some(description) = &r.description {
                xml_element(&mut out, 10, "vulnerability_description", description);
            }
            if let Some(error) = &r.transport_error {
                xml_element(&mut out, 10, "error", error);
            }
            out.push_str("        </method_result>\n");
        }
        out.push_str("      </results>\n");
        out.push_str("    </url_result>\n");
    }

    out.push_str("  </url_results>\n");
    out.push_str("</http_method_test_results>\n");
    out
}

/// Colour for a status code cell: success is the alarming case here
fn status_cell(status_code: u16) -> ColoredString {
    let cell = format!("{:<8}  ", status_code);
    match status_code {
        200..=299 => cell.red(),
        300..=399 => cell.blue(),
        400..=499 => cell.green(),
        500..=u16::MAX => cell.bright_blue(),
        _ => cell.normal(),
    }
}

fn vulnerability_tag(result: &MethodResult) -> &'static str {
    if result.is_vulnerable {
        "VULNERABLE"
    } else if result.is_dangerous {
        "DANGEROUS"
    } else {
        ""
    }
}

pub fn render_text(report: &CampaignReport) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", format!("Author: {}", report.tool.author).blue().bold());
    let _ = writeln!(
        out,
        "{}",
        format!("{} v{} - Results", report.tool.name, report.tool.version).blue().bold()
    );
    let _ = writeln!(out, "{}\n", format!("Timestamp: {}", report.timestamp).yellow().bold());

    for url_result in &report.results {
        let _ = writeln!(out, "{}", format!("URL: {}", url_result.url).yellow());
        let header = format!(
            "{:<10} {:<8} {:<40} {:<12} {}",
            "METHOD", "CODE", "STATUS", "RESPONSE_TIME", " VULNERABILITY"
        );
        let _ = writeln!(out, "{}", header.bright_cyan().bold());
        let _ = writeln!(out, "{}", rule);

        for r in &url_result.results {
            let _ = write!(out, "{:<10}  ", r.method);
            let _ = write!(out, "{}", status_cell(r.status_code));
            let _ = write!(out, "{:<40}  ", r.status_text);
            let _ = write!(out, "{}", format!("{:<12}  ", r.elapsed_ms).bright_yellow());
            let _ = writeln!(out, "{}", vulnerability_tag(r).red());

            if r.is_vulnerable {
                if let Some(description) = &r.description {
                    let _ = writeln!(out, "{}", format!("  - {}", description).bright_red().bold());
                }
            }
            let _ = writeln!(out, "{}", rule);
        }
        out.push('\n');
    }

    out
}

pub fn write_report(path: impl AsRef<Path>, contents: &str) -> Result<(), ReportError> {
    let path = path.as_ref();
    fs::write(path, contents).map_err(|e| ReportError::Write(path.to_path_buf(), e))
}
