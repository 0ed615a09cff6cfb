use anyhow::Result;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;
use cerberus_scan::function::scanner::run_scan;
use cerberus_scan::function::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 解析命令行参数
    let config = Config::from_args();

    // 2. 初始化日志
    let filter = if config.verbose { "cerberus_scan=debug" } else { "cerberus_scan=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // 3. 执行扫描
    let report = run_scan(config).await?;

    // 4. 显示修复建议与摘要
    println!("\n=== 修复建议 ===\n{}", report.remediation);
    println!(
        "\n扫描完成！共 {} 项发现，报告已保存至: {}",
        report.result.len(),
        report.report_path.display()
    );
    Ok(())
}
