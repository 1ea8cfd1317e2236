pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod state;

#[cfg(test)]
mod test_support;

pub use shared::{AppConfig, AppError, Result};
pub use state::AppState;

/// ログ設定の初期化。`RUST_LOG` が無ければ `apptrack=debug,info`。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // 二重初期化（テストなど）は無視
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apptrack=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
