// catalog.rs
use super::ScanError;
use std::fs;
use std::path::Path;

/// Built-in wordlist of well-known sensitive locations, probed in this order.
/// Duplicates are intentional and probed once per entry.
pub const DEFAULT_COMMON_PATHS: &[&str] = &[
    // 常见管理与部署目录
    "/", "/admin/", "/dashboard/", "/login/", "/panel/", "/setup/",
    "/install/", "/backup/", "/backups/", "/test/", "/dev/", "/old/", "/temp/", "/tmp/",
    "/uploads/", "/files/", "/media/", "/images/", "/css/", "/js/",
    "/config/", "/conf/", "/settings/", "/data/", "/logs/",
    // 日志与文档
    "/error_log", "/access_log", "/debug.log",
    "/README.md", "/LICENSE", "/CHANGELOG.md",
    "/phpinfo.php", "/info.php", "/test.php",
    "/sitemap.xml", "/robots.txt", "/crossdomain.xml", "/security.txt",
    "/.well-known/acme-challenge/", "/.well-known/security.txt",
    // 环境变量与版本控制元数据
    "/.env", "/.env.bak", "/.env.old",
    "/.git/config", "/.git/HEAD", "/.git/index",
    "/.svn/entries", "/.svn/wc.db", "/.hg/",
    "/composer.json", "/composer.lock", "/package.json", "/yarn.lock",
    "/node_modules/", "/vendor/", "/.htaccess", "/.htpasswd",
    // CMS
    "/wp-admin/", "/wp-content/", "/wp-includes/",
    "/wp-content/uploads/", "/wp-content/plugins/", "/wp-content/themes/",
    "/joomla/", "/administrator/", "/components/",
    "/drupal/", "/sites/default/files/", "/modules/",
    "/laravel/", "/public/", "/storage/", "/.env",
    "/application/", "/system/", "/app/", "/var/",
    "/assets/", "/cache/",
    // 备份与数据库转储（相对路径，基于目标路径解析）
    "db_backup.sql", "database.sql", "backup.sql", "dump.sql", "data.sql",
    "site.zip", "website.zip", "archive.zip", "backup.zip", "web.zip",
    "site.rar", "website.rar",
    "config.php", "config.inc.php", "connections.php", "db_connect.php",
    "settings.py", "app_config.yml",
    // IIS / ASP.NET
    "/web.config", "/bin/", "/App_Data/", "/App_Code/", "/App_Start/",
    "/_vti_bin/", "/aspnet_client/", "/iisstart.htm",
    // 容器与部署描述文件
    "/.dockerignore", "/docker-compose.yml", "/Dockerfile",
    "/kubernetes/", "/serverless.yml",
];

pub fn default_paths() -> Vec<String> {
    DEFAULT_COMMON_PATHS.iter().map(|p| p.to_string()).collect()
}

fn read_wordlist(path: &Path) -> Result<Vec<String>, ScanError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ScanError::IOError(format!("无法读取字典文件 {}: {}", path.display(), e)))?;

    Ok(content
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect())
}

/// Builds the probe list: built-in catalog, plus include file entries, minus
/// exclude file entries.
pub fn load_paths(include: Option<&Path>, exclude: Option<&Path>) -> Result<Vec<String>, ScanError> {
    let mut paths = default_paths();

    // 如果指定了包含路径文件，添加这些路径
    if let Some(include_file) = include {
        paths.extend(read_wordlist(include_file)?);
    }

    // 如果指定了排除路径文件，排除这些路径
    if let Some(exclude_file) = exclude {
        let exclude_paths = read_wordlist(exclude_file)?;
        paths.retain(|path| !exclude_paths.contains(path));
    }

    Ok(paths)
}
