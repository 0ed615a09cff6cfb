// scanner.rs
use super::advisor::{DisabledAdvisor, GeminiAdvisor, RemediationAdvisor};
use super::catalog::load_paths;
use super::probe::{HttpProber, ProbeOutcome, ProbeRequest, Prober};
use super::render::create_report;
use super::report::{Finding, ScanResult, print_summary, save_json_report};
use super::{Config, ScanError};
use chrono::Local;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

/// How probes are scheduled under the concurrency ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStrategy {
    /// Catalog-order chunks of `concurrency` probes, each chunk joined before
    /// the next one starts.
    #[default]
    Batched,
    /// A new probe starts as soon as any slot frees.
    Saturating,
}

impl FromStr for ScanStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batched" | "batch" => Ok(ScanStrategy::Batched),
            "saturating" | "pool" => Ok(ScanStrategy::Saturating),
            other => Err(format!("未知的扫描策略: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub strategy: ScanStrategy,
}

// 综合扫描报告结构
#[derive(Debug)]
pub struct ComprehensiveScanReport {
    pub result: ScanResult,
    pub remediation: String,
    pub report_path: PathBuf,
}

pub fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

pub async fn run_scan(config: Config) -> Result<ComprehensiveScanReport, ScanError> {
    // 1. 验证配置，任何探测前完成
    let request = config.scan_request()?;
    let paths = load_paths(config.include_paths.as_deref(), config.exclude_paths.as_deref())?;
    let prober = HttpProber::new(config.proxy.as_deref())?;

    info!("已加载 {} 个路径，目标 {}", paths.len(), request.target);

    // 2. 执行扫描
    let options = ScanOptions {
        concurrency: request.concurrency,
        timeout: request.timeout,
        user_agent: config.user_agent.clone(),
        strategy: config.strategy,
    };
    let pb = progress_bar(paths.len());
    let result = scan(&prober, &request.target, &paths, &options, &pb).await;
    pb.finish_with_message("扫描完成");

    if let Some(json_path) = &config.json {
        save_json_report(json_path, &result)?;
    }
    print_summary(&result);

    // 3. 生成修复建议
    let advisor: Box<dyn RemediationAdvisor> = if config.no_ai {
        Box::new(DisabledAdvisor)
    } else {
        Box::new(GeminiAdvisor::from_env(&config.ai_model))
    };
    let remediation = advisor.analyze(&result.findings, result.target.as_str()).await;

    // 4. 渲染报告
    let output = config.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!("scan_report_{}.html", Local::now().timestamp()))
    });
    let report_path = create_report(&result, &result.target, &output, &remediation)?;

    Ok(ComprehensiveScanReport {
        result,
        remediation,
        report_path,
    })
}

/// Probes every path against `base_url` and collects the findings.
///
/// At most `options.concurrency` probes are in flight at once. All probes
/// have finished when this returns. Finding order is completion order.
pub async fn scan<P: Prober + ?Sized>(
    prober: &P,
    base_url: &Url,
    paths: &[String],
    options: &ScanOptions,
    pb: &ProgressBar,
) -> ScanResult {
    let started = Instant::now();
    let scan_timestamp = Local::now().to_rfc3339();
    let concurrency = options.concurrency.max(1);
    let findings: Mutex<Vec<Finding>> = Mutex::new(Vec::new());

    info!(
        "开始扫描 {} 个路径: {} ({:?}, 并发 {})",
        paths.len(),
        base_url,
        options.strategy,
        concurrency
    );

    let to_request = |path: &String| ProbeRequest {
        base_url: base_url.clone(),
        path: path.clone(),
        timeout: options.timeout,
        user_agent: options.user_agent.clone(),
    };

    match options.strategy {
        ScanStrategy::Batched => {
            for batch in paths.chunks(concurrency) {
                let probes = batch
                    .iter()
                    .map(|path| probe_and_record(prober, to_request(path), &findings, pb));
                join_all(probes).await;
            }
        }
        ScanStrategy::Saturating => {
            stream::iter(paths.iter())
                .map(|path| probe_and_record(prober, to_request(path), &findings, pb))
                .buffer_unordered(concurrency) // 控制并发数
                .collect::<Vec<()>>()
                .await;
        }
    }

    let findings = findings.into_inner();
    info!("扫描完成: {}，共 {} 项发现", base_url, findings.len());

    ScanResult {
        target: base_url.to_string(),
        findings,
        paths_scanned: paths.len(),
        scan_timestamp,
        scan_duration_ms: started.elapsed().as_millis() as u64,
    }
}

async fn probe_and_record<P: Prober + ?Sized>(
    prober: &P,
    request: ProbeRequest,
    findings: &Mutex<Vec<Finding>>,
    pb: &ProgressBar,
) {
    pb.set_message(request.path.clone());
    let outcome = prober.probe(&request).await;

    if let ProbeOutcome::Failure { url, reason } = &outcome {
        warn!("请求失败: {} - {}", url, reason);
    }
    if let Some(finding) = outcome.into_finding() {
        findings.lock().await.push(finding);
    }

    pb.inc(1);
}
