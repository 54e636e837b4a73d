use crate::core::error::DownloadError;

/// 整个任务共享的重试预算
///
/// 所有分块的失败都从同一个计数器里扣除：第 0 块失败 2 次后，
/// 第 1 块只剩 `max_retries - 2` 次机会。失败后立即重试，不做等待。
#[derive(Debug)]
pub struct RetryBudget {
    max_retries: u32,
    used: u32,
    history: Vec<RetryRecord>,
}

/// 一次失败的记录
#[derive(Debug, Clone)]
pub struct RetryRecord {
    pub chunk_start: u64,
    pub error: String,
}

/// 重试统计信息
#[derive(Debug, Clone)]
pub struct RetryStats {
    pub total_failures: u32,
    pub max_retries: u32,
    pub exhausted: bool,
    pub history: Vec<RetryRecord>,
}

impl RetryBudget {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            used: 0,
            history: Vec::new(),
        }
    }

    /// 记录一次失败，返回是否还可以重试
    pub fn record_failure(&mut self, chunk_start: u64, error: &DownloadError) -> bool {
        self.used = self.used.saturating_add(1);
        self.history.push(RetryRecord {
            chunk_start,
            error: error.to_string(),
        });
        !self.is_exhausted()
    }

    pub fn is_exhausted(&self) -> bool {
        self.used > self.max_retries
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn stats(&self) -> RetryStats {
        RetryStats {
            total_failures: self.used,
            max_retries: self.max_retries,
            exhausted: self.is_exhausted(),
            history: self.history.clone(),
        }
    }
}
