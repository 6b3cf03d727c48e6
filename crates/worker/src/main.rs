use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalist_core::llm::anthropic::AnthropicClient;
use signalist_core::mail::relay::HttpMailer;
use signalist_core::mail::Mailer;
use signalist_core::market::finnhub::FinnhubClient;
use signalist_core::storage::Database;

mod daily;
mod welcome;

#[derive(Debug, Parser)]
#[command(name = "signalist_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Do everything except sending email and writing run records.
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Email every user a summary of their watchlist news.
    DailyNews {
        /// Run date (YYYY-MM-DD). Defaults to today's UTC date.
        #[arg(long)]
        date: Option<String>,
    },
    /// Send the welcome email to one user.
    Welcome {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = signalist_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let db = Database::connect(settings.require_database_url()?).await?;
    db.migrate().await?;

    let llm = AnthropicClient::from_settings(&settings)?;
    let mailer = if args.dry_run {
        None
    } else {
        Some(HttpMailer::from_settings(&settings)?)
    };
    let mailer = mailer.as_ref().map(|m| m as &dyn Mailer);

    let result = match args.command {
        Command::DailyNews { date } => {
            let run_date = resolve_run_date(date.as_deref())?;
            let market = FinnhubClient::from_settings(&settings)?;
            daily::DailyJob {
                db: &db,
                market: &market,
                llm: &llm,
                mailer,
            }
            .run(run_date)
            .await
        }
        Command::Welcome { email } => welcome::send_welcome(&db, &llm, mailer, &email).await,
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    db.close().await;
    result
}

fn init_sentry(settings: &signalist_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_run_date(arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    match arg {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date {s:?}, expected YYYY-MM-DD")),
        None => Ok(signalist_core::time::window::today_utc()),
    }
}
