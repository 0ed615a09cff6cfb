// advisor.rs
//! Remediation summaries for a finished scan.
//!
//! Advisors never fail: every problem is reported back as text so the
//! rendered report always has a second page.

use super::config::DEFAULT_AI_MODEL;
use super::report::Finding;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

pub const NO_ANALYSIS_NEEDED: &str =
    "No serious exposures detected by the scanner. No AI analysis needed.";
pub const AI_DISABLED: &str = "AI analysis was disabled for this scan.";
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[async_trait]
pub trait RemediationAdvisor: Send + Sync {
    async fn analyze(&self, findings: &[Finding], target_url: &str) -> String;
}

/// Used when the caller opted out of AI analysis.
pub struct DisabledAdvisor;

#[async_trait]
impl RemediationAdvisor for DisabledAdvisor {
    async fn analyze(&self, findings: &[Finding], _target_url: &str) -> String {
        if findings.is_empty() {
            NO_ANALYSIS_NEEDED.to_string()
        } else {
            AI_DISABLED.to_string()
        }
    }
}

/// Plain-text listing of findings handed to the model.
pub fn format_findings_report(findings: &[Finding], target_url: &str) -> String {
    let mut report = format!("Target: {}\n\n", target_url);
    for finding in findings {
        report.push_str(&format!("- URL: {}\n", finding.url));
        report.push_str(&format!(
            "  Status: {} | Exposure: {}\n",
            finding.status_code, finding.message
        ));
    }
    report
}

pub fn build_prompt(formatted_report: &str) -> String {
    format!(
        "You are a highly experienced cybersecurity analyst and remediation specialist.\n\
         Analyze the following directory scan report and provide actionable, step-by-step\n\
         mitigation advice for each unique vulnerability or exposure type found.\n\
         \n\
         Format your response clearly using markdown with a section heading for each unique issue\n\
         (e.g., '1. Directory Listing Fixes', '2. Environment File Exposure Mitigation').\n\
         Keep the advice brief and technical.\n\
         \n\
         --- SCAN REPORT ---\n\
         {}\n\
         --- END REPORT ---\n",
        formatted_report
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini `generateContent` client.
pub struct GeminiAdvisor {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiAdvisor {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            timeout: Duration::from_secs(60),
        }
    }

    /// Reads the API key from `GEMINI_API_KEY`.
    pub fn from_env(model: &str) -> Self {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty());
        let model = if model.trim().is_empty() { DEFAULT_AI_MODEL } else { model };
        Self::new(GEMINI_ENDPOINT, model, api_key)
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate(&self, client: &Client, api_key: &str, prompt: String) -> String {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = match client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return unexpected(e),
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Gemini 返回 {}: {}", status, detail);
            return format!(
                "AI API Error: Failed to generate analysis. This may be due to rate limits or invalid API key. Details: {} {}",
                status,
                detail.trim()
            );
        }

        let parsed: GenerateResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => return unexpected(e),
        };

        // 只取第一个候选结果
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .into_iter()
            .flat_map(|content| content.parts)
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return unexpected("the model returned no text");
        }
        text
    }
}

fn unexpected(detail: impl std::fmt::Display) -> String {
    warn!("AI 分析失败: {}", detail);
    format!("An unexpected error occurred during AI analysis: {}", detail)
}

#[async_trait]
impl RemediationAdvisor for GeminiAdvisor {
    async fn analyze(&self, findings: &[Finding], target_url: &str) -> String {
        if findings.is_empty() {
            return NO_ANALYSIS_NEEDED.to_string();
        }

        // 1. 初始化客户端
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("未设置 {}，跳过 AI 分析", API_KEY_ENV);
                return format!(
                    "AI Initialization Error: Failed to initialize Gemini client. Check API key setup. Details: {} is not set",
                    API_KEY_ENV
                );
            }
        };
        let client = match Client::builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => {
                return format!(
                    "AI Initialization Error: Failed to initialize Gemini client. Check API key setup. Details: {}",
                    e
                );
            }
        };

        // 2. 构建提示词并请求模型
        let prompt = build_prompt(&format_findings_report(findings, target_url));
        info!("请求 {} 分析 {} 项发现", self.model, findings.len());
        self.generate(&client, api_key, prompt).await
    }
}
