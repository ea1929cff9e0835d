//! 取得結果のファイル保存
//!
//! アプリケーションディレクトリ配下に以下を書き出す。
//! - `Orders/temu-orders-<yyyyMMdd-HHmmss>.json`
//! - `Labels/<ファイル名>.{pdf|zpl}`

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::temu::{LabelResult, TemuOrder};

pub const ORDERS_DIR: &str = "Orders";
pub const LABELS_DIR: &str = "Labels";
pub const LOGS_DIR: &str = "Logs";

/// `<app_dir>/<name>` を作成してパスを返す
pub fn ensure_directory(app_dir: &Path, name: &str) -> Result<PathBuf, String> {
    let dir = app_dir.join(name);
    fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create directory {}: {e}", dir.display()))?;
    Ok(dir)
}

pub fn orders_file_name(now: &DateTime<Local>) -> String {
    format!("temu-orders-{}.json", now.format("%Y%m%d-%H%M%S"))
}

/// 注文一覧を整形済み JSON 配列として保存
pub fn save_orders_to_file(
    app_dir: &Path,
    orders: &[TemuOrder],
    now: DateTime<Local>,
) -> Result<PathBuf, String> {
    let orders_dir = ensure_directory(app_dir, ORDERS_DIR)?;
    let file_path = orders_dir.join(orders_file_name(&now));

    let json = serde_json::to_string_pretty(orders)
        .map_err(|e| format!("Failed to serialize orders: {e}"))?;
    fs::write(&file_path, json).map_err(|e| format!("Failed to write orders file: {e}"))?;

    log::info!(
        "Saved {} order(s) to {}",
        orders.len(),
        file_path.display()
    );
    Ok(file_path)
}

/// フォーマットから拡張子を決める（PDF 以外は ZPL 扱い）
pub fn label_extension(format: &str) -> &'static str {
    if format.trim().eq_ignore_ascii_case("PDF") {
        "pdf"
    } else {
        "zpl"
    }
}

/// 保存するラベルのファイル名
///
/// API が返したファイル名はディレクトリ部分を取り除いて使う（Labels 外への書き込み防止）。
pub fn label_file_name(label: &LabelResult) -> String {
    label
        .file_name
        .as_deref()
        .and_then(sanitize_file_name)
        .unwrap_or_else(|| {
            format!(
                "temu-label-{}.{}",
                sanitize_file_name(&label.order_id).unwrap_or_default(),
                label_extension(&label.format)
            )
        })
}

fn sanitize_file_name(name: &str) -> Option<String> {
    // Windows 区切りも区切りとして扱う
    let normalized = name.trim().replace('\\', "/");
    let last = normalized.rsplit('/').next()?;
    // ドライブ指定（"C:evil.pdf"）は Windows で Labels 外を指すので取り除く
    let last = last.rsplit(':').next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last.to_string())
}

/// ラベルを Labels ディレクトリに保存
pub fn save_label_file(app_dir: &Path, label: &LabelResult) -> Result<PathBuf, String> {
    let labels_dir = ensure_directory(app_dir, LABELS_DIR)?;
    let file_path = labels_dir.join(label_file_name(label));

    fs::write(&file_path, &label.content)
        .map_err(|e| format!("Failed to write label file: {e}"))?;

    log::info!(
        "Saved label ({} bytes) to {}",
        label.content.len(),
        file_path.display()
    );
    Ok(file_path)
}
