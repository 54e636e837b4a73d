use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::core::error::DownloadError;
use crate::core::target::DownloadTarget;
use crate::utils::validator;

/// 默认下载地址
pub const DEFAULT_SOURCE_URL: &str =
    "https://geo.mirror.pkgbuild.com/iso/2023.07.01/archlinux-2023.07.01-x86_64.iso";
/// 默认保存路径
pub const DEFAULT_DESTINATION: &str = "./archlinux-2023.07.01-x86_64.iso";
/// 默认分块大小（字节）
pub const DEFAULT_CHUNK_SIZE: u64 = 500_000_000;
/// 默认重试次数（整个任务共享）
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// 重试次数耗尽后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedPolicy {
    /// 停止下载，后面的分块不再请求
    #[default]
    Abort,
    /// 放弃当前分块，继续下载后面的分块
    SkipChunk,
}

/// Range 请求的区间划分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// 第 k 块为 [k*C, min((k+1)*C, S) - 1]，恰好覆盖整个文件
    #[default]
    Exact,
    /// 兼容旧算法：end = min(i + C, S)，下一块从 end + 1 开始
    Legacy,
}

/// 配置结构体
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// 下载地址
    pub source_url: String,
    /// 保存路径，分块临时文件为 `<保存路径>-<起始偏移>.chunk`
    pub destination_path: String,
    /// 分块大小（字节）
    pub chunk_size_bytes: u64,
    /// 整个任务共享的重试次数
    pub max_retries: u32,
    /// 重试次数耗尽后的处理方式
    #[serde(default)]
    pub on_retries_exhausted: ExhaustedPolicy,
    /// Range 区间划分方式
    #[serde(default)]
    pub range_policy: RangePolicy,
    /// 网络超时时间（秒），0 表示不超时
    #[serde(default)]
    pub timeout: u64,
    /// User-Agent
    pub user_agent: String,
    /// 日志文件路径
    pub log_file: String,
    /// 日志文件最大大小（字节），超过后轮转
    pub log_max_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            destination_path: DEFAULT_DESTINATION.to_string(),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            on_retries_exhausted: ExhaustedPolicy::Abort,
            range_policy: RangePolicy::Exact,
            timeout: 0,
            user_agent: format!("rangedown/{}", env!("CARGO_PKG_VERSION")),
            log_file: "logs/rangedown.log".to_string(),
            log_max_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// 加载配置文件，不存在时写入默认配置
    pub fn load(path: &str) -> Result<Self, DownloadError> {
        if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            match toml::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    eprintln!("配置文件格式错误: {}，将使用默认配置", e);
                    log::warn!("配置文件 {} 格式错误: {}，已重置为默认配置", path, e);
                    let config = Config::default();
                    config.save_with_tutorial(path)?;
                    Ok(config)
                }
            }
        } else {
            let config = Config::default();
            config.save_with_tutorial(path)?;
            Ok(config)
        }
    }

    /// 保存带教程的配置文件（唯一写入方法）
    pub fn save_with_tutorial(&self, path: &str) -> Result<(), DownloadError> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(self)
            .map_err(|e| DownloadError::config_error(format!("无法序列化配置: {}", e)))?;
        let full_content = format!("{}\n{}", Config::generate_tutorial_content(), config_content);
        fs::write(path, full_content)?;
        Ok(())
    }

    fn generate_tutorial_content() -> &'static str {
        r#"# rangedown 配置文件
# ====================
#
# TOML 格式。下载地址、保存路径、分块大小和重试次数只能在这里修改，
# 命令行只负责指定配置文件本身（-c）。
#
# 使用示例：
#   rangedown                          # 使用平台默认配置文件
#   rangedown -c ./rangedown.conf      # 指定配置文件
#   rangedown -e                       # 用编辑器打开配置文件
#
# ==================== 下载设置 ====================
#
# source_url            下载地址，必须是 http:// 或 https://
#                       服务器必须返回 Accept-Ranges: bytes
# destination_path      最终文件保存路径
#                       分块临时文件保存在 <destination_path>-<起始偏移>.chunk
#                       下载完成后临时文件会保留
# chunk_size_bytes      每次 Range 请求的字节数，必须大于 0
#
# ==================== 重试设置 ====================
#
# max_retries           整个任务共享的重试次数（不是每个分块单独计数）
#                       失败后立即重试，没有等待
# on_retries_exhausted  重试次数用完后的处理方式
#                       "abort"      停止下载，只合并已完成的前缀（默认）
#                       "skip_chunk" 放弃当前分块，继续后面的分块
#                                    最终文件里缺失的区间保持为空洞
#
# ==================== 高级设置 ====================
#
# range_policy          Range 区间划分方式
#                       "exact"  每块恰好 chunk_size_bytes 字节，区间不重叠（默认）
#                       "legacy" 旧算法：bytes=i-min(i+C,S)，下一块从 end+1 开始
# timeout               网络超时时间（秒），0 表示不超时
# user_agent            User-Agent 字符串
#
# ==================== 日志设置 ====================
#
# log_file              日志文件路径，可用 RUST_LOG 调整日志级别
# log_max_size          日志文件超过该大小（字节）后轮转为 .backup

# ==================== 配置项 ====================
"#
    }

    /// 校验配置合法性
    pub fn validate(&self) -> Result<(), DownloadError> {
        if !validator::is_valid_url(&self.source_url) {
            return Err(DownloadError::InvalidUrl(self.source_url.clone()));
        }

        validator::validate_output_path(&self.destination_path)
            .map_err(|e| DownloadError::config_error(e.to_string()))?;

        validator::validate_chunk_size(self.chunk_size_bytes)
            .map_err(|e| DownloadError::config_error(e.to_string()))?;

        if self.log_file.is_empty() {
            return Err(DownloadError::config_error("日志文件路径不能为空"));
        }

        Ok(())
    }

    /// 生成下载目标
    pub fn target(&self) -> Result<DownloadTarget, DownloadError> {
        DownloadTarget::new(&self.source_url, &self.destination_path)
    }

    /// 获取配置摘要信息
    pub fn get_summary(&self) -> String {
        format!(
            "配置摘要:\n\
            - 下载地址: {}\n\
            - 保存路径: {}\n\
            - 分块大小: {} 字节\n\
            - 重试次数: {}\n\
            - 重试耗尽: {}\n\
            - 区间划分: {}\n\
            - 超时时间: {}",
            self.source_url,
            self.destination_path,
            self.chunk_size_bytes,
            self.max_retries,
            match self.on_retries_exhausted {
                ExhaustedPolicy::Abort => "停止下载",
                ExhaustedPolicy::SkipChunk => "跳过分块",
            },
            match self.range_policy {
                RangePolicy::Exact => "exact",
                RangePolicy::Legacy => "legacy",
            },
            if self.timeout == 0 { "不超时".to_string() } else { format!("{} 秒", self.timeout) },
        )
    }
}
