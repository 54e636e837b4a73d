use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::core::error::DownloadError;

/// 分块文件的缓冲写入器
///
/// 每次尝试都会截断重建文件；drop 时尽力把缓冲区剩余数据写入磁盘。
pub struct ChunkWriter {
    buffer: Vec<u8>,
    buffer_size: usize,
    current_pos: usize,
    file_handle: File,
    total_written: u64,
}

impl ChunkWriter {
    pub fn create(file_path: &Path, buffer_size: usize) -> Result<Self, DownloadError> {
        let file_handle = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(file_path)?;
        let buffer_size = buffer_size.max(1);

        Ok(Self {
            buffer: vec![0; buffer_size],
            buffer_size,
            current_pos: 0,
            file_handle,
            total_written: 0,
        })
    }

    /// 向缓冲区写入数据，满了就刷盘
    pub fn write(&mut self, data: &[u8]) -> Result<(), DownloadError> {
        let mut bytes_written = 0;
        while bytes_written < data.len() {
            let space_left = self.buffer_size - self.current_pos;
            let to_copy = space_left.min(data.len() - bytes_written);

            self.buffer[self.current_pos..self.current_pos + to_copy]
                .copy_from_slice(&data[bytes_written..bytes_written + to_copy]);
            self.current_pos += to_copy;
            bytes_written += to_copy;

            if self.current_pos == self.buffer_size {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// 将缓冲区内容刷入文件
    pub fn flush(&mut self) -> Result<(), DownloadError> {
        if self.current_pos > 0 {
            self.file_handle.write_all(&self.buffer[..self.current_pos])?;
            self.total_written += self.current_pos as u64;
            self.current_pos = 0;
        }
        self.file_handle.flush()?;
        Ok(())
    }

    /// 已写入的总字节数（含缓冲区中的数据）
    pub fn len(&self) -> u64 {
        self.total_written + self.current_pos as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::warn!("分块文件刷盘失败: {}", e);
        }
    }
}
