//! ホストから呼び出されるコマンド
//!
//! - パネル表示（設定の確認）
//! - 新規注文の取得
//! - 梱包（配送ラベルの発行）
//!
//! すべてのエラーはここで捕捉し、ログファイルに追記したうえでエラー表示用の `Popup` に変換する。
//! ホストにエラーが伝播することはない。

use chrono::Local;

use crate::error_log::log_error;
use crate::logic::label_logic::{self, MISSING_ORDER_ID_MESSAGE};
use crate::logic::order_logic;
use crate::logic::panel_logic::panel_message;
use crate::plugin::PluginContext;
use crate::popup::{Popup, PopupPresenter, Severity};

pub const USAGE: &str = "Usage: temu-plugin <panel | orders | pack <xml | ->>";

/// ホストのメニュー操作に対応するコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Panel,
    FetchOrders,
    Pack(String),
}

impl Command {
    /// コマンド名と引数から組み立てる
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        match args {
            [name] if name == "panel" => Ok(Command::Panel),
            [name] if name == "orders" => Ok(Command::FetchOrders),
            [name, xml] if name == "pack" => Ok(Command::Pack(xml.clone())),
            _ => Err(USAGE.to_string()),
        }
    }
}

/// 設定を読み込んで接続情報を表示
pub fn show_panel(ctx: &PluginContext) -> Popup {
    match ctx.settings() {
        Ok(settings) => Popup::info(panel_message(settings)),
        Err(e) => {
            log_error(ctx.app_dir(), "loading configuration", &e);
            Popup::error(format!("Failed to load TEMU configuration.\n{e}"))
        }
    }
}

/// 新規注文を取得してファイルに保存
pub fn fetch_new_orders(ctx: &PluginContext) -> Popup {
    let result = ctx.client().and_then(|client| {
        ctx.block_on(order_logic::fetch_and_save_orders(
            client,
            ctx.app_dir(),
            Local::now(),
        ))
    });

    match result {
        Ok(outcome) => Popup::info(outcome.message()),
        Err(e) => {
            log_error(ctx.app_dir(), "fetching orders", &e);
            Popup::error(format!("A problem occurred while fetching orders.\n{e}"))
        }
    }
}

/// 注文 XML から注文IDを取り出し、配送ラベルを発行して保存
pub fn pack_order(ctx: &PluginContext, xml: &str) -> Popup {
    // ID が無ければ設定の読み込みも API 呼び出しもしない
    let Some(order_id) = label_logic::resolve_order_id(xml) else {
        return Popup::warning(MISSING_ORDER_ID_MESSAGE);
    };

    let result = ctx.client().and_then(|client| {
        ctx.block_on(label_logic::create_and_save_label(
            client,
            ctx.app_dir(),
            &order_id,
        ))
    });

    match result {
        Ok(saved) => Popup::info(saved.message()),
        Err(e) => {
            log_error(ctx.app_dir(), "printing label", &e);
            Popup::error(format!("An error occurred while printing the label.\n{e}"))
        }
    }
}

/// コマンドを実行して結果を表示し、重要度を返す
pub fn run_command(
    ctx: &PluginContext,
    command: &Command,
    presenter: &dyn PopupPresenter,
) -> Severity {
    log::info!("Running command: {}", command_name(command));

    let popup = match command {
        Command::Panel => show_panel(ctx),
        Command::FetchOrders => fetch_new_orders(ctx),
        Command::Pack(xml) => pack_order(ctx, xml),
    };

    presenter.present(&popup);
    popup.severity
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Panel => "panel",
        Command::FetchOrders => "orders",
        Command::Pack(_) => "pack",
    }
}
