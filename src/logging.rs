use std::env;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// 使用者自訂的 log4rs 設定檔。
pub const LOG_CONFIG_FILE: &str = "config/log4rs.yaml";
/// 沒有設定檔時的預設日誌檔。
pub const DEFAULT_LOG_FILE: &str = "logs/argocd-chat.log";
/// 調整預設日誌等級的環境變數。
pub const LOG_LEVEL_ENV: &str = "ARGOCD_CHAT_LOG";

/// 初始化日誌系統。
///
/// 終端機畫面由 TUI 佔用，所以日誌一律寫入檔案。
pub fn init(workspace_root: &Path) -> Result<()> {
    let config_path = workspace_root.join(LOG_CONFIG_FILE);
    if config_path.is_file() {
        return log4rs::init_file(&config_path, Default::default())
            .with_context(|| format!("載入日誌設定失敗: {}", config_path.display()));
    }

    let level = env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|raw| LevelFilter::from_str(raw.trim()).ok())
        .unwrap_or(LevelFilter::Info);
    let log_path = workspace_root.join(DEFAULT_LOG_FILE);
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}",
        )))
        .build(&log_path)
        .with_context(|| format!("建立日誌檔失敗: {}", log_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(level))
        .context("建立日誌設定失敗")?;
    log4rs::init_config(config).context("初始化日誌系統失敗")?;
    Ok(())
}
