use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::core::chunk::ChunkDescriptor;
use crate::core::error::DownloadResult;

/// 按顺序把分块文件合并到最终文件，返回写入的字节数
///
/// 目标文件会被截断重建。分块之间有空缺时（跳过了失败的分块），
/// 直接定位到下一块的起始偏移，空缺部分保持为空洞。临时文件不会被删除。
pub fn concatenate_chunks(destination: &Path, chunks: &[ChunkDescriptor]) -> DownloadResult<u64> {
    let mut output = BufWriter::new(File::create(destination)?);
    let mut position = 0u64;
    let mut written = 0u64;

    for chunk in chunks {
        if chunk.start > position {
            log::warn!("分块 {} 之前缺少 {} 字节，保留空洞", chunk.range_header(), chunk.start - position);
            output.seek(SeekFrom::Start(chunk.start))?;
            position = chunk.start;
        }

        let mut input = File::open(&chunk.path)?;
        let copied = io::copy(&mut input, &mut output)?;
        log::debug!("合并 {:?}: {} 字节", chunk.path, copied);
        position += copied;
        written += copied;
    }

    output.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RangePolicy;
    use crate::core::chunk::plan_chunks;
    use crate::core::error::DownloadError;
    use crate::core::test_utils::sample_body;
    use tokio_test::{assert_err, assert_ok};

    fn write_chunks(chunks: &[ChunkDescriptor], body: &[u8]) {
        for chunk in chunks {
            let end = chunk.start + chunk.expected_len();
            std::fs::write(&chunk.path, &body[chunk.start as usize..end as usize]).unwrap();
        }
    }

    #[test]
    fn test_round_trip_exact() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let body = sample_body(1000);
        let chunks = plan_chunks(&dest, 1000, 128, RangePolicy::Exact);
        write_chunks(&chunks, &body);

        let written = assert_ok!(concatenate_chunks(&dest, &chunks));
        assert_eq!(written, 1000);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        // 临时文件保留
        assert!(chunks.iter().all(|c| c.path.exists()));
    }

    #[test]
    fn test_round_trip_legacy() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let body = sample_body(1000);
        let chunks = plan_chunks(&dest, 1000, 300, RangePolicy::Legacy);
        write_chunks(&chunks, &body);

        assert_eq!(assert_ok!(concatenate_chunks(&dest, &chunks)), 1000);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn test_gap_keeps_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let body = sample_body(30);
        let chunks = plan_chunks(&dest, 30, 10, RangePolicy::Exact);
        write_chunks(&chunks, &body);

        let kept = vec![chunks[0].clone(), chunks[2].clone()];
        assert_eq!(assert_ok!(concatenate_chunks(&dest, &kept)), 20);

        let output = std::fs::read(&dest).unwrap();
        assert_eq!(output.len(), 30);
        assert_eq!(&output[..10], &body[..10]);
        assert_eq!(&output[10..20], &[0u8; 10]);
        assert_eq!(&output[20..], &body[20..]);
    }

    #[test]
    fn test_empty_list_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        std::fs::write(&dest, b"old content").unwrap();

        assert_eq!(assert_ok!(concatenate_chunks(&dest, &[])), 0);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
    }

    #[test]
    fn test_missing_chunk_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let chunks = plan_chunks(&dest, 10, 10, RangePolicy::Exact);

        let err = assert_err!(concatenate_chunks(&dest, &chunks));
        assert!(matches!(err, DownloadError::IoError(_)));
    }
}
