use chrono::Local; // 用于获取本地时间
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// 按大小轮转的日志文件
///
/// 超过 max_size 后当前文件重命名为 `<路径>.backup`（覆盖旧的备份），再新建文件继续写。
pub struct RotatingFile {
    file: File,
    file_path: PathBuf,
    max_size: u64,
    current_size: u64,
}

impl RotatingFile {
    pub fn open(file_path: impl AsRef<Path>, max_size: u64) -> io::Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();
        // 确保日志目录存在
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = Self::open_append(&file_path)?;
        let current_size = file.metadata()?.len();

        Ok(Self { file, file_path, max_size, current_size })
    }

    fn open_append(path: &Path) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.file_path.as_os_str().to_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// 检查并执行日志轮转
    fn check_rotation(&mut self) -> io::Result<()> {
        if self.current_size > self.max_size {
            self.file.flush()?;

            let backup_path = self.backup_path();
            if backup_path.exists() {
                std::fs::remove_file(&backup_path)?;
            }
            std::fs::rename(&self.file_path, &backup_path)?;

            self.file = Self::open_append(&self.file_path)?;
            self.current_size = 0;
        }
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_rotation()?;
        let written = self.file.write(buf)?;
        self.current_size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// 单行日志格式: `2024-01-01 12:00:00 [INFO] - message`
pub fn format_line(level: log::Level, message: &std::fmt::Arguments<'_>) -> String {
    format!("{} [{}] - {}", Local::now().format("%Y-%m-%d %H:%M:%S"), level, message)
}

/// 初始化全局日志，写入轮转日志文件，默认级别 info，可用 RUST_LOG 覆盖
pub fn init_logger(file_path: &str, max_size: u64) -> anyhow::Result<()> {
    let file = RotatingFile::open(file_path, max_size)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", format_line(record.level(), record.args())))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;

    Ok(())
}
