//! プラグインの実行コンテキスト
//!
//! ホストは同期的にコマンドを呼び出すので、単一スレッドの tokio ランタイムで
//! 非同期の HTTP 呼び出しを完了まで待つ。設定とクライアントは初回利用時に作成する。

use once_cell::sync::OnceCell;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::config::{self, TemuSettings};
use crate::temu::TemuClient;

/// アプリケーションディレクトリを上書きする環境変数
pub const APP_DIR_ENV: &str = "TEMU_PLUGIN_DIR";

/// 設定ファイル・出力ファイルを置くディレクトリ
///
/// `TEMU_PLUGIN_DIR` > 実行ファイルのディレクトリ > カレントディレクトリ の順。
pub fn app_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(APP_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub struct PluginContext {
    app_dir: PathBuf,
    runtime: tokio::runtime::Runtime,
    // 成功した読み込みのみキャッシュする（設定を直せば次のコマンドで反映される）
    settings: OnceCell<TemuSettings>,
    client: OnceCell<TemuClient>,
}

impl PluginContext {
    pub fn new(app_dir: PathBuf) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create async runtime: {e}"))?;

        log::info!("Plugin directory: {}", app_dir.display());

        Ok(Self {
            app_dir,
            runtime,
            settings: OnceCell::new(),
            client: OnceCell::new(),
        })
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn settings(&self) -> Result<&TemuSettings, String> {
        self.settings.get_or_try_init(|| config::load(&self.app_dir))
    }

    pub fn client(&self) -> Result<&TemuClient, String> {
        self.client
            .get_or_try_init(|| TemuClient::new(self.settings()?))
    }

    /// 非同期処理を完了までブロックして実行
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
