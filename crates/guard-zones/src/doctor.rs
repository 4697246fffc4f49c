use anyhow::Result;

use crate::directory::DirectoryConfig;

pub fn check_directory(cfg: &DirectoryConfig) -> Result<()> {
    anyhow::ensure!(
        cfg.endpoint.starts_with("http://") || cfg.endpoint.starts_with("https://"),
        "directory.endpoint must be an http(s) URL: {}",
        cfg.endpoint
    );
    anyhow::ensure!(
        cfg.timeout_s >= 1 && cfg.timeout_s <= 120,
        "directory.timeout_s should be 1..120"
    );
    Ok(())
}
