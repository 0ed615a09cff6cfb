use super::ScanError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// 探测失败时的状态占位
pub const UNAVAILABLE: &str = "N/A";

/// 网络失败统一使用的消息
pub const FAILURE_MESSAGE: &str = "Request Failed (Timeout/Connection Error)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingStatus {
    Code(u16),
    Unavailable,
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingStatus::Code(code) => write!(f, "{}", code),
            FindingStatus::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

// JSON中状态码为数字，失败时为 "N/A"
impl Serialize for FindingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FindingStatus::Code(code) => serializer.serialize_u16(*code),
            FindingStatus::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    pub url: String,
    pub status_code: FindingStatus,
    pub content_type: String,
    pub is_directory_listing: bool,
    pub message: String,
}

impl Finding {
    pub fn failure(url: impl Into<String>) -> Self {
        Finding {
            url: url.into(),
            status_code: FindingStatus::Unavailable,
            content_type: String::new(),
            is_directory_listing: false,
            message: FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status_code == FindingStatus::Unavailable
    }
}

/// Result of one scan invocation. Finding order follows completion order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub target: String,
    pub findings: Vec<Finding>,
    pub paths_scanned: usize,
    pub scan_timestamp: String,
    pub scan_duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub directory_listings: usize,
    pub success: usize,
    pub forbidden: usize,
    pub server_errors: usize,
    pub failures: usize,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary {
            total: self.findings.len(),
            ..ScanSummary::default()
        };

        for finding in &self.findings {
            if finding.is_directory_listing {
                summary.directory_listings += 1;
            }
            if finding.is_failure() {
                summary.failures += 1;
                continue;
            }
            match finding.status_code {
                FindingStatus::Code(200..=299) => summary.success += 1,
                FindingStatus::Code(401 | 403) => summary.forbidden += 1,
                FindingStatus::Code(code) if code >= 500 => summary.server_errors += 1,
                FindingStatus::Code(_) | FindingStatus::Unavailable => {}
            }
        }

        summary
    }
}

pub fn save_json_report(output_path: &Path, result: &ScanResult) -> Result<(), ScanError> {
    // 创建输出目录（如果不存在）
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| ScanError::IOError(format!("无法创建输出目录: {}", e)))?;
        }
    }

    let json = serde_json::to_string_pretty(result)?;

    fs::write(output_path, json)
        .map_err(|e| ScanError::IOError(format!("写入报告文件失败: {}", e)))?;

    info!("JSON 结果已保存至: {}", output_path.display());
    Ok(())
}

pub fn print_summary(result: &ScanResult) {
    let summary = result.summary();

    println!("\n=== 扫描摘要 ===");
    println!("扫描目标: {}", result.target);
    println!("扫描路径数: {}", result.paths_scanned);
    println!("扫描耗时: {} ms", result.scan_duration_ms);
    println!("扫描时间戳: {}", result.scan_timestamp);

    println!("\n发现项: {}", summary.total);
    println!("  - 2xx可访问: {}", summary.success);
    println!("  - 401/403受保护: {}", summary.forbidden);
    println!("  - 5xx错误: {}", summary.server_errors);
    println!("  - 目录列表: {}", summary.directory_listings);
    println!("  - 请求失败: {}", summary.failures);

    let listings: Vec<_> = result
        .findings
        .iter()
        .filter(|f| f.is_directory_listing)
        .collect();
    if !listings.is_empty() {
        println!("\n开启目录列表的URL ({}项):", listings.len());
        for (i, finding) in listings.iter().enumerate().take(10) {
            println!("  {}. {}", i + 1, finding.url);
        }
        if listings.len() > 10 {
            println!("  ... 等 {} 项", listings.len() - 10);
        }
    }
}
