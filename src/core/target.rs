use std::path::{Path, PathBuf};
use url::Url;

use crate::core::error::DownloadError;
use crate::utils::validator;

/// 下载目标：源地址和保存路径，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    source_url: Url,
    destination_path: PathBuf,
}

impl DownloadTarget {
    pub fn new(source_url: &str, destination_path: impl AsRef<Path>) -> Result<Self, DownloadError> {
        let parsed = Url::parse(source_url)?;
        if !validator::is_valid_url(parsed.as_str()) {
            return Err(DownloadError::InvalidUrl(source_url.to_string()));
        }
        let destination_path = destination_path.as_ref().to_path_buf();
        if destination_path.as_os_str().is_empty() {
            return Err(DownloadError::config_error("输出路径不能为空"));
        }
        Ok(Self { source_url: parsed, destination_path })
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }
}
