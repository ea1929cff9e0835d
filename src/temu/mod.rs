//! TEMU パートナー API 連携モジュール
//!
//! # セキュリティガイドライン
//! - **認証情報のログ出力禁止**: ClientId / ClientSecret や Authorization ヘッダーはログに出力しないこと
//! - **メトリクスのみ**: ログに出力できるのは件数、ステータスコード、サイズなどの統計情報のみ

pub mod client;

pub use client::{LabelResult, TemuClient, TemuClientTrait, TemuOrder};
