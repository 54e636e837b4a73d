use indicatif::{ProgressBar, ProgressStyle};

const PB_STYLE: &str = "{msg} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos:>3}%";

/// 单个分块的下载百分比
pub fn chunk_percent(written: u64, expected: u64) -> u64 {
    if expected == 0 {
        return 100;
    }
    (written.saturating_mul(100) / expected).min(100)
}

// 结构体：ProgressManager
// 同一时间只有一个分块在下载，所以只维护一个进度条，换块时原地复用
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        match ProgressStyle::with_template(PB_STYLE) {
            Ok(style) => bar.set_style(style.progress_chars("█▓▒░  ")),
            Err(e) => log::warn!("进度条模板无效: {}", e),
        }
        Self { bar }
    }

    /// 不输出任何内容，用于 --quiet 和测试
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn start_chunk(&self, index: usize, total: usize) {
        self.bar.reset();
        self.bar.set_length(100);
        self.bar.set_message(format!("Chunk {}/{}", index + 1, total));
    }

    // 方法：更新当前分块的进度
    pub fn update_chunk(&self, written: u64, expected: u64) {
        self.bar.set_position(chunk_percent(written, expected));
    }

    pub fn retry_notice(&self, used: u32, max_retries: u32) {
        self.bar.println(format!(
            "Chunk download exception....retrying...(n. of retry: {}/{})",
            used, max_retries
        ));
    }

    pub fn notice(&self, message: &str) {
        self.bar.println(message);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}
