//! CLI: 命令行接口和参数解析模块
//!
//! 下载地址、保存路径、分块大小和重试次数都来自配置文件，
//! 命令行只负责选择配置文件和控制输出。
//!
//! ## 支持的命令
//!
//! - 下载：`rangedown`
//! - 指定配置：`rangedown -c config.conf`
//! - 编辑配置：`rangedown -e`
//! - 隐藏进度条：`rangedown -q`
//!
//! ## 默认配置文件位置
//!
//! - Windows: `%APPDATA%/rangedown/rangedown.conf`
//! - macOS: `~/Library/Application Support/rangedown/rangedown.conf`
//! - Linux: `~/.config/rangedown/rangedown.conf`

use clap::Parser;
use std::env;
use crate::config::Config;
use crate::core::error::DownloadError;

/// 获取平台默认配置文件路径
pub fn default_config_path() -> String {
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        format!("{}/rangedown/rangedown.conf", appdata)
    }
    #[cfg(target_os = "macos")]
    {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/Library/Application Support/rangedown/rangedown.conf", home)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/.config/rangedown/rangedown.conf", home)
    }
}

/// 打开配置文件编辑器
pub fn open_config_in_editor(config_path: &str) {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("notepad").arg(config_path).status().ok();
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg("-e").arg(config_path).status().ok();
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // 优先 xdg-open，否则 nano
        if std::process::Command::new("xdg-open").arg(config_path).status().is_err() {
            let _ = std::process::Command::new("nano").arg(config_path).status();
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("VERGEN_GIT_SHA"),
        ", built ",
        env!("VERGEN_BUILD_TIMESTAMP"),
        ")"
    )
}

/// rangedown 命令行参数
///
/// 示例用法：
///   rangedown
///   rangedown -c /path/to/rangedown.conf
///   rangedown -e  # 编辑配置文件
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rangedown",
    author = "panzhifu",
    version = env!("CARGO_PKG_VERSION"),
    long_version = long_version(),
    about = "按 Range 分段顺序下载大文件",
    long_about = "先探测服务器是否支持 Range 请求，再按固定大小分段顺序下载到临时文件，最后按偏移顺序合并。\n\n示例：\n  rangedown\n  rangedown -c /path/to/rangedown.conf\n  rangedown -e\n"
)]
pub struct Args {
    /// 配置文件路径，默认为平台推荐路径
    #[arg(short = 'c', long, default_value_t = default_config_path(), help = "配置文件路径，默认为平台推荐路径。")]
    pub config: String,

    /// 编辑配置文件（-e 或 --edit）
    #[arg(short = 'e', long = "edit", help = "用系统默认编辑器打开配置文件并退出。")]
    pub edit_config: bool,

    /// 不显示进度条
    #[arg(short = 'q', long, help = "不显示进度条，只输出结果。")]
    pub quiet: bool,
}

impl Args {
    /// 解析命令行参数并加载配置
    pub fn parse_args() -> Result<(Self, Config), DownloadError> {
        let args = Args::parse();

        // --edit 逻辑：确保配置文件存在后再打开
        if args.edit_config {
            Config::load(&args.config)?;
            open_config_in_editor(&args.config);
            std::process::exit(0);
        }

        let config = args.load_config()?;
        Ok((args, config))
    }

    /// 加载或创建配置文件并校验
    pub fn load_config(&self) -> Result<Config, DownloadError> {
        let config = Config::load(&self.config)?;
        config.validate()?;
        Ok(config)
    }
}
