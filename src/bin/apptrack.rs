use anyhow::{Context, Result};
use apptrack_lib::application::ports::NotificationLevel;
use apptrack_lib::domain::entities::confidence_trends;
use apptrack_lib::domain::value_objects::{RecordId, UserId};
use apptrack_lib::presentation::{
    dispatch_save, ApplicationFilter, CellEffect, CellEvent, InlineEditCell, ListView,
};
use apptrack_lib::{init_logging, AppConfig, AppState};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Job application tracker client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// User whose records are loaded
    #[arg(short, long, env = "APPTRACK_USER")]
    user: String,

    /// API base URL (overrides APPTRACK_API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of applications
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Search company or role
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only applications in an interview stage
        #[arg(long)]
        interviewing: bool,
    },
    /// Update one field of an application
    Update {
        #[arg(long)]
        id: i64,
        /// Wire field name, e.g. jobStatus
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
    },
    /// Print dashboard counters
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    let state = AppState::new(config)?;
    let user = UserId::new(cli.user).map_err(anyhow::Error::msg)?;

    info!("Starting apptrack v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::List {
            page,
            search,
            interviewing,
        } => list(&state, &user, page, search, interviewing).await?,
        Commands::Update { id, field, value } => update(&state, &user, id, &field, &value).await?,
        Commands::Stats => stats(&state, &user).await?,
    }

    state.logout().await;
    Ok(())
}

async fn list(
    state: &AppState,
    user: &UserId,
    page: usize,
    search: String,
    interviewing: bool,
) -> Result<()> {
    let store = &state.applications;
    let rows = store
        .sync
        .load(&store.key(user))
        .await
        .context("failed to load applications")?;

    let filter = ApplicationFilter {
        search,
        interviewing,
        ..Default::default()
    };
    let filtered: Vec<_> = filter.apply(&rows).into_iter().cloned().collect();

    let list = &state.config.list;
    let mut view = ListView::from_config(list);
    // 端末ではページ全体を描画する
    view.set_viewport_height((list.page_size as u32).saturating_mul(list.row_height));
    view.go_to_page(page.saturating_sub(1), filtered.len());
    let rendered = view.render(&filtered);

    println!(
        "Page {}/{} ({} applications)",
        rendered.index + 1,
        rendered.page_count.max(1),
        rendered.total
    );
    for row in rendered.rows {
        let app = row.record;
        println!(
            "{:>5}  {}  {:<24} {:<28} {:<12} {}",
            app.id, app.date_applied, app.company_name, app.role_title, app.job_status, app.application_stage
        );
    }
    Ok(())
}

async fn update(state: &AppState, user: &UserId, id: i64, field: &str, value: &str) -> Result<()> {
    let store = &state.applications;
    let key = store.key(user);
    let id = RecordId::new(id).map_err(anyhow::Error::msg)?;

    let rows = store.sync.load(&key).await.context("failed to load applications")?;
    let current = rows
        .iter()
        .find(|app| app.id == id)
        .and_then(|app| serde_json::to_value(app).ok())
        .and_then(|value| value.get(field).cloned())
        .map(|value| match value {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
        .with_context(|| format!("application {id} not found"))?;

    // UI と同じ経路（セル → デバウンス書き込み）で保存する
    let mut cell = InlineEditCell::new(id, field, current);
    cell.handle(CellEvent::Activate);
    cell.handle(CellEvent::Input(value.to_string()));
    match cell.handle(CellEvent::ConfirmKey) {
        Some(CellEffect::Save(input)) => {
            let settled = dispatch_save(&store.writes, &key, &cell, &input).await;
            if let CellEvent::SaveRejected(message) = &settled {
                anyhow::bail!("{field}: {message}");
            }
            cell.handle(settled);

            let mut notifications = state.notifier.subscribe();
            store.writes.flush().await;
            while let Ok(notification) = notifications.try_recv() {
                if notification.level == NotificationLevel::Error {
                    anyhow::bail!("{}: {}", notification.title, notification.description);
                }
            }
            println!("Saved {field} = {value} for application {id}");
        }
        _ => println!("No change"),
    }
    Ok(())
}

async fn stats(state: &AppState, user: &UserId) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let stats = state.dashboard(user, today).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    let sessions = state
        .preparation_sessions
        .sync
        .load(&state.preparation_sessions.key(user))
        .await?;
    for trend in confidence_trends(&sessions) {
        println!(
            "{:<22} {:.1} ({} sessions)",
            trend.topic, trend.average_score, trend.sessions
        );
    }
    Ok(())
}
