use std::io::Read;

use temu_plugin_lib::commands::{run_command, Command};
use temu_plugin_lib::plugin::{app_dir, PluginContext};
use temu_plugin_lib::popup::{ConsolePresenter, Popup, PopupPresenter, Severity};

/// 引数の使い方が誤っている場合の終了コード（EX_USAGE）
const EXIT_USAGE: i32 = 64;

fn main() {
    temu_plugin_lib::init_logging();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // `pack -` は標準入力から XML を読む
    if args.len() == 2 && args[0] == "pack" && args[1] == "-" {
        let mut xml = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut xml) {
            ConsolePresenter.present(&Popup::error(format!("Failed to read XML from stdin: {e}")));
            std::process::exit(Severity::Error.code());
        }
        args[1] = xml;
    }

    let command = match Command::from_args(&args) {
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{usage}");
            std::process::exit(EXIT_USAGE);
        }
    };

    let ctx = match PluginContext::new(app_dir()) {
        Ok(ctx) => ctx,
        Err(e) => {
            ConsolePresenter.present(&Popup::error(e));
            std::process::exit(Severity::Error.code());
        }
    };

    let severity = run_command(&ctx, &command, &ConsolePresenter);
    std::process::exit(severity.code());
}
