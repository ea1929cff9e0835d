//! コマンド失敗時のエラーログ（Logs/temu-plugin.log へ追記）
//!
//! ローテーションはしない。書き込みに失敗してもコマンドの結果には影響させない。

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::storage::{ensure_directory, LOGS_DIR};

pub const LOG_FILE_NAME: &str = "temu-plugin.log";

pub fn log_file_path(app_dir: &Path) -> PathBuf {
    app_dir.join(LOGS_DIR).join(LOG_FILE_NAME)
}

/// エラーを1行追記する。失敗は握りつぶす（warn ログのみ）。
pub fn log_error(app_dir: &Path, operation: &str, error: &str) {
    if let Err(e) = append_entry(app_dir, operation, error) {
        log::warn!("Failed to write plugin error log: {e}");
    }
}

fn append_entry(app_dir: &Path, operation: &str, error: &str) -> Result<(), String> {
    ensure_directory(app_dir, LOGS_DIR)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(app_dir))
        .map_err(|e| format!("Failed to open log file: {e}"))?;

    writeln!(
        file,
        "[{}] Error during {}: {}",
        Local::now().to_rfc3339(),
        operation,
        error
    )
    .map_err(|e| format!("Failed to append to log file: {e}"))
}
