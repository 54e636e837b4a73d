mod progress;

use std::fmt;
pub use progress::{chunk_percent, ProgressManager};

pub fn print_success(message: &str) {
    println!("✓ {}", message);
}

pub fn print_error(message: &str) {
    println!("✗ {}", message);
}

pub struct DownloadSummary {
    pub total_size: u64,
    pub bytes_written: u64,
    pub elapsed_time: std::time::Duration,
    pub chunks_ok: usize,
    pub chunks_failed: usize,
    pub retries_used: u32,
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n下载摘要:")?;
        writeln!(f, "文件大小: {}", format_size(self.total_size))?;
        writeln!(f, "已写入: {}", format_size(self.bytes_written))?;
        writeln!(f, "耗时: {:.2}秒", self.elapsed_time.as_secs_f64())?;
        writeln!(f, "成功分块: {}", self.chunks_ok)?;
        writeln!(f, "失败分块: {}", self.chunks_failed)?;
        writeln!(f, "重试次数: {}", self.retries_used)?;
        Ok(())
    }
}

pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
