use std::path::{Path, PathBuf};

use crate::config::RangePolicy;

/// 分块状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Pending,
    Fetching,
    Done,
    Failed,
}

/// 分块描述：一次 Range 请求对应的区间和临时文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// 从 0 开始的序号
    pub index: usize,
    pub start: u64,
    /// 闭区间，Range 头里原样发送
    pub end: u64,
    /// `<保存路径>-<start>.chunk`
    pub path: PathBuf,
    expected_len: u64,
}

impl ChunkDescriptor {
    /// 服务器实际能返回的字节数（end 超出文件末尾的部分不算）
    pub fn expected_len(&self) -> u64 {
        self.expected_len
    }

    pub fn range_header(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// 分块临时文件名
pub fn chunk_file_name(destination: &Path, start: u64) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(format!("-{}.chunk", start));
    PathBuf::from(name)
}

/// 按偏移顺序生成分块计划
pub fn plan_chunks(
    destination: &Path,
    content_length: u64,
    chunk_size: u64,
    policy: RangePolicy,
) -> Vec<ChunkDescriptor> {
    let mut chunks = Vec::new();
    if content_length == 0 || chunk_size == 0 {
        return chunks;
    }

    let last_byte = content_length - 1;
    let mut start = 0u64;
    while start < content_length {
        let end = match policy {
            RangePolicy::Exact => start.saturating_add(chunk_size).min(content_length) - 1,
            RangePolicy::Legacy => start.saturating_add(chunk_size).min(content_length),
        };
        chunks.push(ChunkDescriptor {
            index: chunks.len(),
            start,
            end,
            path: chunk_file_name(destination, start),
            expected_len: end.min(last_byte) - start + 1,
        });
        start = end.saturating_add(1);
    }
    chunks
}
