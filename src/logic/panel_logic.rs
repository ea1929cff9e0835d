//! パネル表示のロジック

use crate::config::TemuSettings;

/// 読み込んだ設定の概要メッセージ（認証情報は含めない）
pub fn panel_message(settings: &TemuSettings) -> String {
    format!(
        "TEMU connection configured for shop: {}.\nAPI address: {}\nLabel format: {}",
        settings.shop_id, settings.base_url, settings.label_format
    )
}
