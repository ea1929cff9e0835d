//! コマンド結果のポップアップ表示
//!
//! コマンドは結果を `Popup` として返し、表示はホスト側の仕組み（C コールバック）
//! または CLI の標準出力/標準エラーに任せる。

use serde::Serialize;
use std::ffi::{c_char, CString};

pub const POPUP_TITLE: &str = "TEMU PL";
pub const POPUP_ERROR_TITLE: &str = "TEMU PL - error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// C ABI / 終了コード用の数値
    pub fn code(self) -> i32 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Popup {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            title: POPUP_TITLE.to_string(),
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            title: POPUP_ERROR_TITLE.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: POPUP_ERROR_TITLE.to_string(),
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// ポップアップ表示トレイト（テスト用モック対応）
#[cfg_attr(test, mockall::automock)]
pub trait PopupPresenter: Send + Sync {
    fn present(&self, popup: &Popup);
}

/// CLI 用: 情報は標準出力、警告・エラーは標準エラーへ
pub struct ConsolePresenter;

impl ConsolePresenter {
    /// 出力する1行（`title: message`）
    pub fn line(popup: &Popup) -> String {
        format!("{}: {}", popup.title, popup.message)
    }

    pub fn uses_stderr(severity: Severity) -> bool {
        severity != Severity::Info
    }
}

impl PopupPresenter for ConsolePresenter {
    fn present(&self, popup: &Popup) {
        if Self::uses_stderr(popup.severity) {
            eprintln!("{}", Self::line(popup));
        } else {
            println!("{}", Self::line(popup));
        }
    }
}

/// ホストが登録するメッセージ表示関数
///
/// 文字列はコールバック中のみ有効。ホスト側でコピーすること。
pub type MessageCallback =
    extern "C" fn(title: *const c_char, message: *const c_char, severity: i32);

/// ホストのコールバックで表示する
pub struct CallbackPresenter {
    callback: MessageCallback,
}

impl CallbackPresenter {
    pub fn new(callback: MessageCallback) -> Self {
        Self { callback }
    }
}

impl PopupPresenter for CallbackPresenter {
    fn present(&self, popup: &Popup) {
        let title = to_c_string(&popup.title);
        let message = to_c_string(&popup.message);
        (self.callback)(title.as_ptr(), message.as_ptr(), popup.severity.code());
    }
}

/// NUL を含む文字列でも落ちないように変換
fn to_c_string(s: &str) -> CString {
    CString::new(s.replace('\0', " ")).unwrap_or_default()
}
