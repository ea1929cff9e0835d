//! コマンドのビジネスロジック
//!
//! ホスト向けコマンド（commands.rs）から API 呼び出しとファイル保存の処理を分離する。

pub mod label_logic;
pub mod order_logic;
pub mod panel_logic;
