// probe.rs
use super::listing;
use super::report::Finding;
use super::report::FindingStatus;
use super::ScanError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub base_url: Url,
    pub path: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ProbeRequest {
    /// Resolved target, or the naive concatenation when the path cannot be joined.
    pub fn full_url(&self) -> Result<Url, String> {
        resolve_url(&self.base_url, &self.path)
            .map_err(|_| format!("{}{}", self.base_url, self.path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Redirect,
    Body,
    InvalidUrl,
    Other,
}

impl From<&reqwest::Error> for FailureKind {
    fn from(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() {
            // DNS 与 TLS 握手失败同样归为连接错误
            FailureKind::Connect
        } else if err.is_redirect() {
            FailureKind::Redirect
        } else if err.is_body() || err.is_decode() {
            FailureKind::Body
        } else if err.is_builder() {
            FailureKind::InvalidUrl
        } else {
            FailureKind::Other
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connection error",
            FailureKind::Redirect => "redirect loop",
            FailureKind::Body => "body read error",
            FailureKind::InvalidUrl => "invalid url",
            FailureKind::Other => "request error",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success {
        url: String,
        status: u16,
        content_type: String,
        body: String,
        is_listing: bool,
    },
    Failure {
        url: String,
        reason: FailureKind,
    },
}

impl ProbeOutcome {
    /// Builds a response outcome, running listing detection on HTML bodies.
    pub fn from_response(url: impl Into<String>, status: u16, content_type: &str, body: String) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        let is_listing = listing::is_directory_listing(&body, &content_type);
        ProbeOutcome::Success {
            url: url.into(),
            status,
            content_type,
            body,
            is_listing,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ProbeOutcome::Success { url, .. } | ProbeOutcome::Failure { url, .. } => url,
        }
    }

    /// Applies the reporting policy. Failures always surface, responses only
    /// when their status carries exposure signal.
    pub fn into_finding(self) -> Option<Finding> {
        match self {
            ProbeOutcome::Failure { url, .. } => Some(Finding::failure(url)),
            ProbeOutcome::Success { url, status, content_type, is_listing, .. } => {
                if !is_interesting(status) {
                    return None;
                }
                let message = build_message(status, &content_type, is_listing);
                Some(Finding {
                    url,
                    status_code: FindingStatus::Code(status),
                    content_type,
                    is_directory_listing: is_listing,
                    message,
                })
            }
        }
    }
}

/// RFC 3986 reference resolution of `path` against `base`.
pub fn resolve_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    base.join(path)
}

pub fn is_interesting(status: u16) -> bool {
    (200..300).contains(&status) || status == 401 || status == 403 || status >= 500
}

pub fn build_message(status: u16, content_type: &str, is_listing: bool) -> String {
    let mut message = format!("Status: {}", status);
    if is_listing {
        message.push_str(" (Directory Listing Enabled!)");
    } else if !content_type.is_empty() {
        let subtype = content_type.rsplit('/').next().unwrap_or_default();
        message.push_str(&format!(" | Content: {}", subtype.to_uppercase()));
    }
    message
}

#[async_trait]
pub trait Prober: Send + Sync {
    /// Never fails: network errors come back as `ProbeOutcome::Failure`.
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome;
}

/// reqwest-backed prober sharing one connection pool across a scan.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(proxy: Option<&str>) -> Result<Self, ScanError> {
        let mut client_builder = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10));

        // 配置代理
        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ScanError::InvalidConfig(format!("代理配置错误: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build()
            .map_err(|e| ScanError::ClientError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome {
        let url = match request.full_url() {
            Ok(url) => url,
            Err(raw) => {
                return ProbeOutcome::Failure { url: raw, reason: FailureKind::InvalidUrl };
            }
        };
        let url_text = url.to_string();

        let response = match self.client.get(url)
            .header(USER_AGENT, &request.user_agent)
            .timeout(request.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("请求失败: {} - {}", url_text, e);
                return ProbeOutcome::Failure { url: url_text, reason: FailureKind::from(&e) };
            }
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        // 只有 HTML 响应才需要读取正文做目录列表检测
        let body = if listing::is_html(&content_type) {
            match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("读取响应体失败: {} - {}", url_text, e);
                    return ProbeOutcome::Failure { url: url_text, reason: FailureKind::from(&e) };
                }
            }
        } else {
            String::new()
        };

        debug!("{} -> {} ({})", url_text, status, content_type);
        ProbeOutcome::from_response(url_text, status, &content_type, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.test/app/index.php").unwrap()
    }

    #[test]
    fn absolute_paths_replace_base_path() {
        assert_eq!(resolve_url(&base(), "/.git/config").unwrap().as_str(), "http://example.test/.git/config");
    }

    #[test]
    fn relative_paths_merge_with_base_directory() {
        assert_eq!(resolve_url(&base(), "backup.zip").unwrap().as_str(), "http://example.test/app/backup.zip");
        let root = Url::parse("http://example.test").unwrap();
        assert_eq!(resolve_url(&root, "dump.sql").unwrap().as_str(), "http://example.test/dump.sql");
    }

    #[test]
    fn reporting_policy() {
        for status in [200, 204, 299, 401, 403, 500, 503, 599] {
            assert!(is_interesting(status), "{status} should be reported");
        }
        for status in [100, 301, 302, 304, 400, 404, 405, 499] {
            assert!(!is_interesting(status), "{status} should be dropped");
        }
    }

    #[test]
    fn message_variants() {
        assert_eq!(build_message(200, "text/html", true), "Status: 200 (Directory Listing Enabled!)");
        assert_eq!(build_message(403, "application/json", false), "Status: 403 | Content: JSON");
        assert_eq!(build_message(500, "", false), "Status: 500");
        assert_eq!(
            build_message(200, "text/html; charset=utf-8", false),
            "Status: 200 | Content: HTML; CHARSET=UTF-8"
        );
    }

    #[test]
    fn listing_response_becomes_finding() {
        let outcome = ProbeOutcome::from_response(
            "http://example.test/files/",
            200,
            "Text/HTML",
            "<title>Index of /files</title>".to_string(),
        );
        let finding = outcome.into_finding().unwrap();
        assert!(finding.is_directory_listing);
        assert_eq!(finding.content_type, "text/html");
        assert!(finding.message.contains("Directory Listing Enabled!"));
    }

    #[test]
    fn not_found_is_dropped() {
        let outcome = ProbeOutcome::from_response("http://example.test/nope", 404, "text/html", String::new());
        assert!(outcome.into_finding().is_none());
    }

    #[test]
    fn failure_is_always_reported() {
        let outcome = ProbeOutcome::Failure {
            url: "http://example.test/.env".into(),
            reason: FailureKind::Timeout,
        };
        assert_eq!(outcome.url(), "http://example.test/.env");
        let finding = outcome.into_finding().unwrap();
        assert_eq!(finding.status_code, FindingStatus::Unavailable);
        assert_eq!(finding.message, "Request Failed (Timeout/Connection Error)");
        assert!(finding.content_type.is_empty());
    }
}
