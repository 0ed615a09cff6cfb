// render.rs
use super::ScanError;
use super::report::ScanResult;
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::info;

static NUMBERED_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("numbered section pattern must compile"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub text: String,
    pub heading: bool,
}

#[derive(Debug, Serialize)]
struct RawEntry<'a> {
    index: usize,
    message: &'a str,
    url: &'a str,
}

/// Splits model output into display lines, flagging markdown and numbered
/// section headings.
pub fn remediation_lines(text: &str) -> Vec<ReportLine> {
    let cleaned = text.replace("```markdown", "").replace("```", "");

    cleaned
        .trim()
        .lines()
        .map(|line| {
            if line.starts_with('#') || NUMBERED_SECTION.is_match(line) {
                ReportLine {
                    text: line.replace('#', "").trim().to_string(),
                    heading: true,
                }
            } else {
                ReportLine {
                    text: line.trim().to_string(),
                    heading: false,
                }
            }
        })
        .collect()
}

/// Writes the two-page report to `output_path` and returns that path.
pub fn create_report(
    result: &ScanResult,
    target_url: &str,
    output_path: &Path,
    remediation: &str,
) -> Result<PathBuf, ScanError> {
    let mut tera = Tera::default();
    tera.add_raw_template("report.html", REPORT_TEMPLATE)?;

    let entries: Vec<RawEntry> = result
        .findings
        .iter()
        .enumerate()
        .map(|(i, finding)| RawEntry {
            index: i + 1,
            message: &finding.message,
            url: &finding.url,
        })
        .collect();

    let mut context = Context::new();
    context.insert("target", target_url);
    context.insert("total", &result.findings.len());
    context.insert("entries", &entries);
    context.insert("remediation", &remediation_lines(remediation));
    context.insert("generated_at", &Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

    let rendered = tera.render("report.html", &context)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output_path, rendered)
        .map_err(|e| ScanError::ReportError(format!("写入报告文件失败 {}: {}", output_path.display(), e)))?;

    info!("扫描报告已保存至: {}", output_path.display());
    Ok(output_path.to_path_buf())
}

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Cerberus Scanner Report - {{ target }}</title>
<style>
  body { font-family: Arial, Helvetica, sans-serif; color: #000; margin: 0; }
  .page { padding: 20mm 15mm; min-height: 250mm; position: relative; page-break-after: always; break-after: page; }
  .page:last-child { page-break-after: auto; break-after: auto; }
  .banner { color: #00ff41; background: #1a1a1a; text-align: center; font-size: 18pt; font-weight: bold; padding: 6px; border-bottom: 2px solid #00ff41; }
  h2 { font-size: 14pt; }
  .raw { font-size: 9pt; margin: 2px 0; word-break: break-all; }
  .empty { font-style: italic; text-align: center; }
  .heading { font-weight: bold; font-size: 11pt; margin-top: 8px; }
  .line { font-size: 10pt; margin: 2px 0; white-space: pre-wrap; }
  .footer { position: absolute; bottom: 8mm; left: 15mm; right: 15mm; font-size: 8pt; font-style: italic; display: flex; justify-content: space-between; }
</style>
</head>
<body>
<section class="page">
  <div class="banner">// CERBERUS-SCANNER REPORT //</div>
  <p>Target URL: {{ target }}</p>
  <p>Total Potential Exposures Found: {{ total }}</p>
  <h2>--- 1. Raw Scan Data ---</h2>
  {% if total == 0 %}
  <p class="empty">No exposures found with current wordlist.</p>
  {% else %}
  {% for entry in entries %}
  <p class="raw">{{ entry.index }}. {{ entry.message }} | URL: {{ entry.url }}</p>
  {% endfor %}
  {% endif %}
  <div class="footer"><span>Generated {{ generated_at }}</span><span>Page 1/2</span></div>
</section>
<section class="page">
  <div class="banner">// CERBERUS-SCANNER REPORT //</div>
  <h2>--- 2. AI Remediation Analysis ---</h2>
  {% for line in remediation %}
  {% if line.heading %}<p class="heading">{{ line.text }}</p>{% else %}<p class="line">{{ line.text }}</p>{% endif %}
  {% endfor %}
  <div class="footer"><span>Generated {{ generated_at }}</span><span>Page 2/2</span></div>
</section>
</body>
</html>
"#;
