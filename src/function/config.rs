// config.rs
use super::ScanError;
use super::scanner::ScanStrategy;
use dialoguer::Input;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;
use url::Url;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 7;
pub const DEFAULT_USER_AGENT: &str = "CerberusScanner/1.0";
pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, StructOpt)]
#[structopt(name = "cerberus_scan", about = "Probe a web host for exposed sensitive paths")]
pub struct Config {
    /// 目标 URL (例如: https://example.com)，缺省协议时使用 http://
    #[structopt(short, long)]
    pub target: Option<String>,

    /// 并发请求数量
    #[structopt(short, long, default_value = "10")]
    pub concurrency: usize,

    /// 请求超时时间 (秒)
    #[structopt(long, default_value = "7")]
    pub timeout: u64,

    /// 请求使用的 User-Agent
    #[structopt(long, default_value = "CerberusScanner/1.0")]
    pub user_agent: String,

    /// HTML 报告输出路径 (默认 ./scan_report_<时间戳>.html)
    #[structopt(short, long)]
    pub output: Option<PathBuf>,

    /// 额外导出 JSON 结果的路径
    #[structopt(long)]
    pub json: Option<PathBuf>,

    /// 包含路径的文件 (每行一个路径)
    #[structopt(long)]
    pub include_paths: Option<PathBuf>,

    /// 排除路径的文件 (每行一个路径)
    #[structopt(long)]
    pub exclude_paths: Option<PathBuf>,

    /// 代理服务器 (例如: http://localhost:8080)
    #[structopt(long)]
    pub proxy: Option<String>,

    /// 调度方式: batched 或 saturating
    #[structopt(long, default_value = "batched")]
    pub strategy: ScanStrategy,

    /// 跳过 AI 修复建议
    #[structopt(long)]
    pub no_ai: bool,

    /// Gemini 模型名称 (API 密钥读取 GEMINI_API_KEY)
    #[structopt(long, default_value = "gemini-2.5-flash")]
    pub ai_model: String,

    /// 交互式输入目标、并发数与超时
    #[structopt(short, long)]
    pub interactive: bool,

    /// 输出调试日志
    #[structopt(short, long)]
    pub verbose: bool,
}

/// Validated scan inputs. Nothing is probed until one of these exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub target: Url,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl ScanRequest {
    pub fn new(target: &str, concurrency: usize, timeout_secs: u64) -> Result<Self, ScanError> {
        let target = normalize_target(target)?;

        // 验证并发合理性
        if concurrency == 0 {
            return Err(ScanError::InvalidConfig("并发数至少为1".into()));
        }
        if timeout_secs == 0 {
            return Err(ScanError::InvalidConfig("超时时间至少为1秒".into()));
        }

        Ok(Self {
            target,
            concurrency,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Form-style construction: every field arrives as text, integers are
    /// optional and fall back to the defaults.
    pub fn from_raw(target: &str, threads: Option<&str>, timeout: Option<&str>) -> Result<Self, ScanError> {
        let concurrency = parse_positive("threads", threads, DEFAULT_CONCURRENCY as u64)?;
        let timeout_secs = parse_positive("timeout", timeout, DEFAULT_TIMEOUT_SECS)?;
        let concurrency = usize::try_from(concurrency)
            .map_err(|_| ScanError::InvalidConfig("并发数超出范围".into()))?;
        Self::new(target, concurrency, timeout_secs)
    }
}

fn parse_positive(field: &str, raw: Option<&str>, default: u64) -> Result<u64, ScanError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(raw) => raw,
    };
    let value: u64 = raw
        .parse()
        .map_err(|_| ScanError::InvalidConfig(format!("{} 输入无效: {:?}", field, raw)))?;
    if value == 0 {
        return Err(ScanError::InvalidConfig(format!("{} 至少为1", field)));
    }
    Ok(value)
}

/// Parses the target, assuming `http://` when no scheme is given.
pub fn normalize_target(raw: &str) -> Result<Url, ScanError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScanError::InvalidConfig("目标URL不能为空".into()));
    }

    let lower = raw.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ScanError::InvalidConfig(format!("目标URL无效 {:?}: {}", raw, e)))?;
    if url.host_str().is_none() {
        return Err(ScanError::InvalidConfig(format!("目标URL缺少主机名 {:?}", raw)));
    }
    Ok(url)
}

/// Collects the three form fields from the terminal.
pub fn prompt_request() -> Result<ScanRequest, ScanError> {
    let target: String = Input::new()
        .with_prompt("目标 URL")
        .interact_text()
        .map_err(|e| ScanError::IOError(e.to_string()))?;
    let threads: String = Input::new()
        .with_prompt("并发数")
        .default(DEFAULT_CONCURRENCY.to_string())
        .interact_text()
        .map_err(|e| ScanError::IOError(e.to_string()))?;
    let timeout: String = Input::new()
        .with_prompt("超时时间 (秒)")
        .default(DEFAULT_TIMEOUT_SECS.to_string())
        .interact_text()
        .map_err(|e| ScanError::IOError(e.to_string()))?;

    ScanRequest::from_raw(&target, Some(&threads), Some(&timeout))
}

impl Config {
    pub fn validate(&self) -> Result<(), ScanError> {
        // 验证代理
        if let Some(proxy) = &self.proxy {
            if !proxy.starts_with("http://") && !proxy.starts_with("https://") {
                return Err(ScanError::InvalidConfig("代理URL必须以http://或https://开头".into()));
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(ScanError::InvalidConfig("User-Agent不能为空".into()));
        }

        Ok(())
    }

    /// Validates everything and yields the scan inputs, prompting first in
    /// interactive mode.
    pub fn scan_request(&self) -> Result<ScanRequest, ScanError> {
        self.validate()?;

        if self.interactive {
            return prompt_request();
        }

        let target = self
            .target
            .as_deref()
            .ok_or_else(|| ScanError::InvalidConfig("请通过 --target 或 --interactive 提供目标URL".into()))?;
        ScanRequest::new(target, self.concurrency, self.timeout)
    }
}
