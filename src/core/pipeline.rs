use std::time::{Duration, Instant};

use crate::config::Config;
use crate::core::chunk::plan_chunks;
use crate::core::concat::concatenate_chunks;
use crate::core::error::DownloadError;
use crate::core::fetcher::ChunkFetcher;
use crate::core::probe::probe_range_support;
use crate::core::transport::RangeTransport;
use crate::ui::{DownloadSummary, ProgressManager};

/// 一次下载的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 服务器不支持 Range，没有发出分块请求，也没有生成文件
    RangeUnsupported,
    /// 所有分块都已下载并合并
    Complete { bytes_written: u64, chunks: usize },
    /// 重试次数耗尽，最终文件缺少部分区间（闭区间）
    Partial { bytes_written: u64, missing: Vec<(u64, u64)> },
}

#[derive(Debug)]
pub struct DownloadReport {
    pub outcome: DownloadOutcome,
    pub content_length: u64,
    pub chunks_ok: usize,
    pub chunks_failed: usize,
    pub retries_used: u32,
    pub elapsed: Duration,
}

impl DownloadReport {
    pub fn summary(&self) -> DownloadSummary {
        DownloadSummary {
            total_size: self.content_length,
            bytes_written: match &self.outcome {
                DownloadOutcome::RangeUnsupported => 0,
                DownloadOutcome::Complete { bytes_written, .. } => *bytes_written,
                DownloadOutcome::Partial { bytes_written, .. } => *bytes_written,
            },
            elapsed_time: self.elapsed,
            chunks_ok: self.chunks_ok,
            chunks_failed: self.chunks_failed,
            retries_used: self.retries_used,
        }
    }
}

/// 探测 → 分块下载 → 合并，严格顺序执行
pub struct Downloader<T> {
    config: Config,
    transport: T,
    progress: ProgressManager,
}

impl<T: RangeTransport> Downloader<T> {
    pub fn new(config: Config, transport: T, progress: ProgressManager) -> Self {
        Self { config, transport, progress }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn run(&self) -> Result<DownloadReport, DownloadError> {
        let started = Instant::now();
        self.config.validate()?;
        let target = self.config.target()?;
        let url = target.source_url();
        let destination = target.destination_path();

        let probe = probe_range_support(&self.transport, url).await?;
        if !probe.supports_range {
            println!("The server does not support RANGE header. Terminating...");
            log::warn!("{} 不支持 Range 请求，终止下载", url);
            return Ok(DownloadReport {
                outcome: DownloadOutcome::RangeUnsupported,
                content_length: probe.content_length,
                chunks_ok: 0,
                chunks_failed: 0,
                retries_used: 0,
                elapsed: started.elapsed(),
            });
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let plan = plan_chunks(
            destination,
            probe.content_length,
            self.config.chunk_size_bytes,
            self.config.range_policy,
        );
        let chunk_count = plan.len();
        log::info!(
            "开始下载 {} -> {:?}: {} 字节, {} 个分块",
            url, destination, probe.content_length, chunk_count
        );

        let report = ChunkFetcher::new(
            &self.transport,
            url,
            probe.content_length,
            self.config.max_retries,
            self.config.on_retries_exhausted,
            &self.progress,
        )
        .fetch_all(plan)
        .await;
        self.progress.finish();

        println!("\n\nWriting chunks on file....");
        let bytes_written = concatenate_chunks(destination, &report.completed)?;
        println!("DONE!");

        let outcome = if report.is_complete() {
            if bytes_written != probe.content_length {
                log::warn!("合并后大小 {} 与探测大小 {} 不一致", bytes_written, probe.content_length);
            }
            log::info!("下载完成: {:?} ({} 字节)", destination, bytes_written);
            DownloadOutcome::Complete { bytes_written, chunks: chunk_count }
        } else {
            let missing = report.missing_ranges();
            log::error!("下载不完整: {:?} 缺少区间 {:?}", destination, missing);
            DownloadOutcome::Partial { bytes_written, missing }
        };

        Ok(DownloadReport {
            outcome,
            content_length: probe.content_length,
            chunks_ok: report.completed.len(),
            chunks_failed: report.failed.len(),
            retries_used: report.retry_stats.total_failures,
            elapsed: started.elapsed(),
        })
    }
}
