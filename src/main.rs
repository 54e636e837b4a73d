use rangedown::cli;
use rangedown::core::{AwcTransport, DownloadOutcome, Downloader};
use rangedown::ui::{self, ProgressManager};
use rangedown::utils::logger;

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    // 解析参数和配置
    let (args, config) = match cli::Args::parse_args() {
        Ok((args, config)) => (args, config),
        Err(e) => {
            eprintln!("配置加载失败: {}", e);
            std::process::exit(1);
        }
    };

    logger::init_logger(&config.log_file, config.log_max_size)?;
    log::info!("程序启动，配置文件: {}", args.config);
    log::info!("{}", config.get_summary());

    println!("{}", config.get_summary());

    let transport = AwcTransport::new(config.user_agent.clone(), config.timeout);
    let progress = if args.quiet { ProgressManager::hidden() } else { ProgressManager::new() };
    let downloader = Downloader::new(config, transport, progress);

    let report = match downloader.run().await {
        Ok(report) => report,
        Err(e) => {
            if e.is_fatal() {
                log::error!("初始化失败: {:?}", e);
            } else {
                log::error!("下载失败: {:?}", e);
            }
            ui::print_error(&format!("下载失败: {}", e));
            std::process::exit(1);
        }
    };

    match &report.outcome {
        DownloadOutcome::RangeUnsupported => Ok(()),
        DownloadOutcome::Complete { bytes_written, .. } => {
            println!("{}", report.summary());
            ui::print_success(&format!("下载完成，共 {}", ui::format_size(*bytes_written)));
            Ok(())
        }
        DownloadOutcome::Partial { missing, .. } => {
            println!("{}", report.summary());
            ui::print_error(&format!("下载不完整，缺少 {} 个区间: {:?}", missing.len(), missing));
            std::process::exit(2);
        }
    }
}
