//! 新規注文取得のロジック

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::storage::save_orders_to_file;
use crate::temu::TemuClientTrait;

pub const NO_NEW_ORDERS_MESSAGE: &str = "No new orders to fetch.";

/// 注文取得の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOrdersOutcome {
    pub count: usize,
    /// 0件の場合はファイルを書き出さないので None
    pub file_path: Option<PathBuf>,
}

impl FetchOrdersOutcome {
    pub fn message(&self) -> String {
        match &self.file_path {
            Some(path) if self.count > 0 => format!(
                "Fetched {} new order(s) from TEMU.\nSaved to file: {}",
                self.count,
                path.display()
            ),
            _ => NO_NEW_ORDERS_MESSAGE.to_string(),
        }
    }
}

/// 新規注文を取得し、1件以上あれば Orders ディレクトリに保存する
pub async fn fetch_and_save_orders<C>(
    client: &C,
    app_dir: &Path,
    now: DateTime<Local>,
) -> Result<FetchOrdersOutcome, String>
where
    C: TemuClientTrait + ?Sized,
{
    let orders = client.get_new_orders().await?;

    if orders.is_empty() {
        log::info!("No new TEMU orders, skipping file write");
        return Ok(FetchOrdersOutcome {
            count: 0,
            file_path: None,
        });
    }

    let file_path = save_orders_to_file(app_dir, &orders, now)?;
    Ok(FetchOrdersOutcome {
        count: orders.len(),
        file_path: Some(file_path),
    })
}
