//! ログ初期化
//!
//! 進捗表示は println!、診断ログは tracing で stderr へ出力する。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_env_layer(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into())
}

pub fn init_tracing(verbose: bool) {
    let env_layer = init_env_layer(verbose);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // 二重初期化（テスト等）は無視
    let _ = tracing_subscriber::registry()
        .with(env_layer)
        .with(stderr_layer)
        .try_init();
}
