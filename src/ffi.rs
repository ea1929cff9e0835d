//! ホストアプリケーション向けの C ABI
//!
//! ホストはこのライブラリ（cdylib）を読み込み、メニュー操作ごとに以下を呼び出す。
//! 戻り値は表示したポップアップの重要度（0: 情報, 1: 警告, 2: エラー）。
//!
//! - `temu_plugin_panel()`
//! - `temu_plugin_fetch_orders()`
//! - `temu_plugin_pack(xml)`
//!
//! `temu_plugin_set_message_callback` でホスト側のメッセージボックスを登録できる。
//! 未登録の場合はコンソールに出力する。

use once_cell::sync::Lazy;
use std::ffi::{c_char, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use crate::commands::{run_command, Command};
use crate::plugin::{app_dir, PluginContext};
use crate::popup::{
    CallbackPresenter, ConsolePresenter, MessageCallback, Popup, PopupPresenter, Severity,
};

static CONTEXT: Lazy<Result<PluginContext, String>> = Lazy::new(|| {
    crate::init_logging();
    PluginContext::new(app_dir())
});

static MESSAGE_CALLBACK: Mutex<Option<MessageCallback>> = Mutex::new(None);

fn registered_callback() -> Option<MessageCallback> {
    MESSAGE_CALLBACK.lock().ok().and_then(|guard| *guard)
}

/// コマンドを実行する。パニックもホストには伝播させない。
fn run_exported(command: Command) -> i32 {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let presenter: Box<dyn PopupPresenter> = match registered_callback() {
            Some(callback) => Box::new(CallbackPresenter::new(callback)),
            None => Box::new(ConsolePresenter),
        };

        match CONTEXT.as_ref() {
            Ok(ctx) => run_command(ctx, &command, presenter.as_ref()).code(),
            Err(e) => {
                let popup = Popup::error(e.clone());
                presenter.present(&popup);
                popup.severity.code()
            }
        }
    }));

    result.unwrap_or_else(|_| {
        log::error!("Plugin command panicked");
        Severity::Error.code()
    })
}

/// メッセージ表示コールバックを登録する。NULL で登録解除。
#[no_mangle]
pub extern "C" fn temu_plugin_set_message_callback(callback: Option<MessageCallback>) {
    match MESSAGE_CALLBACK.lock() {
        Ok(mut guard) => *guard = callback,
        Err(poisoned) => *poisoned.into_inner() = callback,
    }
}

/// パネル表示
#[no_mangle]
pub extern "C" fn temu_plugin_panel() -> i32 {
    run_exported(Command::Panel)
}

/// 新規注文の取得
#[no_mangle]
pub extern "C" fn temu_plugin_fetch_orders() -> i32 {
    run_exported(Command::FetchOrders)
}

/// 梱包（配送ラベルの発行）
///
/// # Safety
/// `xml` は NULL または有効な NUL 終端文字列であること。
/// NULL は空の XML として扱う。
#[no_mangle]
pub unsafe extern "C" fn temu_plugin_pack(xml: *const c_char) -> i32 {
    let xml = if xml.is_null() {
        String::new()
    } else {
        CStr::from_ptr(xml).to_string_lossy().into_owned()
    };
    run_exported(Command::Pack(xml))
}
