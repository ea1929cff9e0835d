//! ホストから渡される注文 XML の解析
//!
//! ホストは梱包対象の注文を XML 断片で渡す。`order` 要素の `id` 属性、
//! または子要素 `<id>` のテキストを注文IDとして扱う。

/// 注文 XML から注文IDを取り出す
///
/// 空入力・不正な XML・ID が見つからない場合は空文字を返す。
pub fn extract_order_id(xml: &str) -> String {
    if xml.trim().is_empty() {
        return String::new();
    }

    let doc = match roxmltree::Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("Failed to parse order XML: {e}");
            return String::new();
        }
    };

    // ルート要素を含めて文書順で最初の <order>
    let Some(order) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "order")
    else {
        return String::new();
    };

    if let Some(id) = order.attribute("id") {
        return id.to_string();
    }

    order
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "id")
        .map(|id_element| {
            id_element
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect::<String>()
        })
        .unwrap_or_default()
}
