use std::io::Write;
use std::sync::Once;

pub mod commands;
pub mod config;
pub mod error_log;
pub mod ffi;
pub mod logic;
pub mod order_xml;
pub mod plugin;
pub mod popup;
pub mod storage;
pub mod temu;

pub use commands::{fetch_new_orders, pack_order, run_command, show_panel, Command};
pub use config::TemuSettings;
pub use plugin::PluginContext;
pub use popup::{ConsolePresenter, Popup, PopupPresenter, Severity};

static LOGGER_INIT: Once = Once::new();

/// ロガーの初期化（複数回呼んでも1度だけ初期化される）
///
/// リリースビルドではWarnレベル以上、デバッグビルドではInfoレベル以上のログを出力。
/// RUST_LOG が設定されていればそちらを優先する。
pub fn init_logging() {
    LOGGER_INIT.call_once(|| {
        #[cfg(debug_assertions)]
        let default_level = log::LevelFilter::Info;
        #[cfg(not(debug_assertions))]
        let default_level = log::LevelFilter::Warn;

        // ホスト側で既にロガーが設定されている場合は何もしない
        let _ = env_logger::Builder::new()
            .filter_level(default_level)
            .parse_default_env()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {:5} {}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_times() {
        // 複数回初期化してもクラッシュしないことを確認
        init_logging();
        init_logging();
        init_logging();

        log::info!("Test after multiple init");
    }
}
