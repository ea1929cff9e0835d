//! 梱包（配送ラベル発行）のロジック

use std::path::{Path, PathBuf};

use crate::order_xml::extract_order_id;
use crate::storage::save_label_file;
use crate::temu::TemuClientTrait;

pub const MISSING_ORDER_ID_MESSAGE: &str = "Order identifier not found in the supplied XML.";

/// ホストの XML から注文IDを取り出す。空白のみの場合は None。
pub fn resolve_order_id(xml: &str) -> Option<String> {
    let order_id = extract_order_id(xml);
    if order_id.trim().is_empty() {
        None
    } else {
        Some(order_id)
    }
}

/// ラベル保存の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedLabel {
    pub order_id: String,
    pub path: PathBuf,
}

impl SavedLabel {
    pub fn message(&self) -> String {
        format!(
            "Label for order {} saved to: {}",
            self.order_id,
            self.path.display()
        )
    }
}

/// ラベルを発行して Labels ディレクトリに保存する
pub async fn create_and_save_label<C>(
    client: &C,
    app_dir: &Path,
    order_id: &str,
) -> Result<SavedLabel, String>
where
    C: TemuClientTrait + ?Sized,
{
    let label = client.create_label(order_id).await?;
    let path = save_label_file(app_dir, &label)?;

    Ok(SavedLabel {
        order_id: order_id.to_string(),
        path,
    })
}
