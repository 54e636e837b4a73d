use anyhow::Result;
use url::Url;

/// 只接受 http/https 地址
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

pub fn validate_chunk_size(chunk_size: u64) -> Result<()> {
    if chunk_size == 0 {
        anyhow::bail!("分块大小必须大于0");
    }
    Ok(())
}

pub fn validate_output_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        anyhow::bail!("输出路径不能为空");
    }
    if path.ends_with('/') || path.ends_with('\\') {
        anyhow::bail!("输出路径必须是文件而不是目录: {}", path);
    }
    Ok(())
}
