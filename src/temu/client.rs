//! TEMU API クライアント
//!
//! - `GET  {base}orders/new?shopId=...`       新規注文の取得
//! - `POST {base}orders/{orderId}/label`      配送ラベルの発行
//!
//! リトライ・ページング・トークン更新は行わない（1コマンド = 1リクエスト）。

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use hyper::{Method, Request};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::TemuSettings;

/// リクエスト送信〜レスポンスボディ取得のタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 30;

const CLIENT_USER_AGENT: &str = concat!("temu-plugin/", env!("CARGO_PKG_VERSION"));

/// 新規注文1件
///
/// API からは camelCase で受け取り、注文ファイルには PascalCase（OrderId, Status, CreatedAt）で書き出す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemuOrder {
    #[serde(
        rename(serialize = "OrderId"),
        alias = "OrderId",
        alias = "order_id",
        deserialize_with = "deserialize_nullable_string"
    )]
    pub order_id: String,
    #[serde(
        rename(serialize = "Status"),
        alias = "Status",
        deserialize_with = "deserialize_nullable_string"
    )]
    pub status: String,
    #[serde(
        rename(serialize = "CreatedAt"),
        alias = "CreatedAt",
        alias = "created_at",
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_at: DateTime<Utc>,
}

/// 発行された配送ラベル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelResult {
    pub order_id: String,
    pub content: Vec<u8>,
    /// "PDF" または "ZPL"
    pub format: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    #[serde(default, alias = "Orders")]
    orders: Option<Vec<TemuOrder>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelResponse {
    #[serde(default, alias = "LabelContentBase64", alias = "label_content_base64")]
    label_content_base64: Option<String>,
    #[serde(default, alias = "Format")]
    format: Option<String>,
    #[serde(default, alias = "FileName", alias = "file_name")]
    file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LabelRequest<'a> {
    shop_id: &'a str,
    format: &'a str,
}

/// null を空文字として受け付ける
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// タイムスタンプのデシリアライズ
///
/// RFC 3339 を基本とし、オフセット無しの値は UTC とみなす。null / 空文字はエポック。
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(DateTime::<Utc>::default()),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}

/// TEMU クライアントトレイト（テスト用モック対応）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemuClientTrait: Send + Sync {
    /// 新規注文を取得
    async fn get_new_orders(&self) -> Result<Vec<TemuOrder>, String>;

    /// 指定注文の配送ラベルを発行
    async fn create_label(&self, order_id: &str) -> Result<LabelResult, String>;
}

/// TEMU API クライアント実装
pub struct TemuClient {
    base_url: String,
    shop_id: String,
    label_format: String,
    authorization: String,
    http_client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl TemuClient {
    /// 新しい TEMU クライアントを作成
    ///
    /// `settings.base_url` は末尾スラッシュ付きに正規化済みであること（`config::load` が保証）。
    ///
    /// # セキュリティ
    /// 認証情報はログに出力されません
    pub fn new(settings: &TemuSettings) -> Result<Self, String> {
        let https = match hyper_rustls::HttpsConnectorBuilder::new().with_native_roots() {
            Ok(builder) => builder,
            Err(e) => {
                // OS の証明書ストアが空の環境では https は失敗するが http（テスト用）は使える
                log::warn!("Native root certificates unavailable, HTTPS will fail: {e}");
                hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(empty_root_tls_config()?)
            }
        }
        .https_or_http()
        .enable_http1()
        .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https);

        log::info!("TemuClient created for {}", settings.base_url);

        Ok(Self {
            base_url: settings.base_url.clone(),
            shop_id: settings.shop_id.clone(),
            label_format: settings.label_format.clone(),
            authorization: basic_authorization(&settings.client_id, &settings.client_secret),
            http_client,
        })
    }

    fn orders_url(&self) -> String {
        format!(
            "{}orders/new?shopId={}",
            self.base_url,
            urlencoding::encode(&self.shop_id)
        )
    }

    fn label_url(&self, order_id: &str) -> String {
        format!(
            "{}orders/{}/label",
            self.base_url,
            urlencoding::encode(order_id)
        )
    }

    /// リクエストを送信し、2xx のレスポンスボディを返す
    ///
    /// 2xx 以外はステータスコードとボディを含むエラーになる。
    async fn send(&self, method: Method, url: &str, body: Option<String>) -> Result<Bytes, String> {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(url)
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json; charset=utf-8");
        }

        let req = builder
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| format!("Failed to build request: {e}"))?;

        log::debug!("TEMU API request: {} {}", method, url);

        let request_result =
            tokio::time::timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS), async {
                let response = self
                    .http_client
                    .request(req)
                    .await
                    .map_err(|e| format!("Failed to send request to TEMU API: {e}"))?;
                let status = response.status();
                let body_bytes = response
                    .into_body()
                    .collect()
                    .await
                    .map_err(|e| format!("Failed to read response body: {e}"))?
                    .to_bytes();
                Ok::<_, String>((status, body_bytes))
            })
            .await;

        let (status, body_bytes) = match request_result {
            Ok(Ok((s, b))) => (s, b),
            Ok(Err(e)) => {
                log::error!("Failed to complete TEMU API request: {e}");
                return Err(e);
            }
            Err(_) => {
                log::error!(
                    "TEMU API request timed out after {} seconds",
                    REQUEST_TIMEOUT_SECS
                );
                return Err(format!(
                    "Request timed out after {} seconds",
                    REQUEST_TIMEOUT_SECS
                ));
            }
        };

        if !status.is_success() {
            log::error!(
                "TEMU API error (status {}), response body length: {} bytes",
                status,
                body_bytes.len()
            );
            return Err(format!(
                "TEMU API error ({}): {}",
                status,
                String::from_utf8_lossy(&body_bytes)
            ));
        }

        Ok(body_bytes)
    }
}

#[async_trait]
impl TemuClientTrait for TemuClient {
    async fn get_new_orders(&self) -> Result<Vec<TemuOrder>, String> {
        let body = self.send(Method::GET, &self.orders_url(), None).await?;

        let response: OrdersResponse = serde_json::from_slice(&body)
            .map_err(|e| format!("Failed to parse TEMU orders response: {e}"))?;
        let orders = response.orders.unwrap_or_default();

        log::info!("TEMU API returned {} new order(s)", orders.len());
        Ok(orders)
    }

    async fn create_label(&self, order_id: &str) -> Result<LabelResult, String> {
        let payload = serde_json::to_string(&LabelRequest {
            shop_id: &self.shop_id,
            format: &self.label_format,
        })
        .map_err(|e| format!("Failed to serialize label request: {e}"))?;

        let body = self
            .send(Method::POST, &self.label_url(order_id), Some(payload))
            .await?;

        let response: LabelResponse = serde_json::from_slice(&body)
            .map_err(|e| format!("Failed to parse TEMU label response: {e}"))?;

        let encoded = response
            .label_content_base64
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| "TEMU API response does not contain label content".to_string())?;
        let content = decode_label_content(&encoded)?;

        log::info!("TEMU API returned label ({} bytes)", content.len());

        Ok(LabelResult {
            order_id: order_id.to_string(),
            content,
            format: response
                .format
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| self.label_format.clone()),
            file_name: response.file_name.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// `Basic base64(clientId:clientSecret)` を組み立てる
fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

fn empty_root_tls_config() -> Result<rustls::ClientConfig, String> {
    rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| format!("Failed to create TLS config: {e}"))
    .map(|builder| {
        builder
            .with_root_certificates(rustls::RootCertStore::empty())
            .with_no_client_auth()
    })
}

/// ラベル本体の base64 をデコード（改行・空白は無視）
fn decode_label_content(encoded: &str) -> Result<Vec<u8>, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| format!("Invalid label content encoding: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> TemuSettings {
        TemuSettings {
            base_url: "https://api.example.com/".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            shop_id: "shop 1/2".to_string(),
            label_format: "PDF".to_string(),
        }
    }

    #[test]
    fn test_basic_authorization() {
        // "id:secret" -> aWQ6c2VjcmV0
        assert_eq!(basic_authorization("id", "secret"), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn test_orders_url_encodes_shop_id() {
        let client = TemuClient::new(&test_settings()).unwrap();
        assert_eq!(
            client.orders_url(),
            "https://api.example.com/orders/new?shopId=shop%201%2F2"
        );
    }

    #[test]
    fn test_label_url_encodes_order_id() {
        let client = TemuClient::new(&test_settings()).unwrap();
        assert_eq!(
            client.label_url("PO-1/2"),
            "https://api.example.com/orders/PO-1%2F2/label"
        );
    }

    #[test]
    fn test_order_deserialization_accepts_pascal_case() {
        let json = r#"{"Orders":[{"OrderId":"1","Status":"NEW","CreatedAt":"2024-05-01T10:00:00Z"}]}"#;
        let response: OrdersResponse = serde_json::from_str(json).unwrap();
        let orders = response.orders.unwrap();
        assert_eq!(orders[0].order_id, "1");
        assert_eq!(orders[0].status, "NEW");
        assert_eq!(orders[0].created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_order_deserialization_naive_timestamp_is_utc() {
        let json = r#"{"orderId":"1","status":"NEW","createdAt":"2024-05-01T10:00:00"}"#;
        let order: TemuOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_order_deserialization_missing_fields_default() {
        let order: TemuOrder = serde_json::from_str(r#"{"orderId":"7"}"#).unwrap();
        assert_eq!(order.order_id, "7");
        assert_eq!(order.status, "");
        assert_eq!(order.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_order_deserialization_null_fields_default() {
        let json = r#"{"orderId":null,"status":null,"createdAt":null}"#;
        let order: TemuOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order, TemuOrder::default());

        let json = r#"{"orders":[{"orderId":"1","status":null,"createdAt":"2024-05-01T10:00:00Z"}]}"#;
        let response: OrdersResponse = serde_json::from_str(json).unwrap();
        let orders = response.orders.unwrap();
        assert_eq!(orders[0].order_id, "1");
        assert_eq!(orders[0].status, "");
    }

    #[test]
    fn test_order_serialization_uses_pascal_case() {
        let order = TemuOrder {
            order_id: "1".to_string(),
            status: "NEW".to_string(),
            ..TemuOrder::default()
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["OrderId"], "1");
        assert_eq!(value["Status"], "NEW");
        assert_eq!(value["CreatedAt"], "1970-01-01T00:00:00Z");
        assert!(value.get("orderId").is_none());
    }

    #[test]
    fn test_orders_response_null_orders() {
        let response: OrdersResponse = serde_json::from_str(r#"{"orders":null}"#).unwrap();
        assert!(response.orders.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_label_request_serialization() {
        let json = serde_json::to_string(&LabelRequest {
            shop_id: "shop-1",
            format: "ZPL",
        })
        .unwrap();
        assert_eq!(json, r#"{"shopId":"shop-1","format":"ZPL"}"#);
    }

    #[test]
    fn test_decode_label_content_ignores_whitespace() {
        let decoded = decode_label_content("JVBE\nRi0x\r\n").unwrap();
        assert_eq!(decoded, b"%PDF-1");
    }

    #[test]
    fn test_decode_label_content_invalid() {
        let result = decode_label_content("!!not-base64!!");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid label content"));
    }

    #[tokio::test]
    async fn test_mock_temu_client() {
        let mut mock = MockTemuClientTrait::new();

        mock.expect_create_label()
            .withf(|order_id| order_id == "123")
            .returning(|order_id| {
                Ok(LabelResult {
                    order_id: order_id.to_string(),
                    content: b"^XA^XZ".to_vec(),
                    format: "ZPL".to_string(),
                    file_name: None,
                })
            });

        let label = mock.create_label("123").await.unwrap();
        assert_eq!(label.order_id, "123");
        assert_eq!(label.format, "ZPL");
    }
}
