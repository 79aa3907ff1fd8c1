//! Taskbot service entry point.
//!
//! Reads configuration from the environment, wires storage, the Telegram
//! transport and the notification dispatcher, then runs the dispatch loop
//! until SIGINT or SIGTERM.
//!
//! Tasks are created by the host application sharing the database, which
//! wires its own `TaskService` and `CreationNotifier`; this process only
//! handles chat interactions.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::sync::Arc;
use taskbot::bot::services::{DispatchLoop, EvidenceContexts, InteractionRouter};
use taskbot::config::{AppConfig, LogFormat};
use taskbot::messaging::adapters::telegram::TelegramTransport;
use taskbot::messaging::ports::MessagingTransport;
use taskbot::notification::domain::MessageTemplates;
use taskbot::notification::services::{NotificationComposer, NotificationDispatcher};
use taskbot::task::adapters::memory::InMemoryTaskRepository;
use taskbot::task::adapters::postgres::PostgresTaskRepository;
use taskbot::task::ports::TaskRepository;
use taskbot::task::services::LifecycleEngine;
use taskbot::user::adapters::memory::InMemoryUserDirectory;
use taskbot::user::adapters::postgres::PostgresUserDirectory;
use taskbot::user::ports::UserDirectory;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::from_env()?;
    init_logging(config.log_format);

    match config.database_url.clone() {
        Some(url) => {
            let pool = Pool::builder().build(ConnectionManager::<PgConnection>::new(url))?;
            info!("using PostgreSQL storage");
            run_with(
                &config,
                Arc::new(PostgresTaskRepository::new(pool.clone())),
                Arc::new(PostgresUserDirectory::new(pool)),
            )
            .await
        }
        None => {
            warn!("TASKBOT_DATABASE_URL not set, state is kept in memory only");
            run_with(
                &config,
                Arc::new(InMemoryTaskRepository::new()),
                Arc::new(InMemoryUserDirectory::new()),
            )
            .await
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run_with<R, U>(config: &AppConfig, tasks: Arc<R>, users: Arc<U>) -> Result<(), BoxError>
where
    R: TaskRepository + 'static,
    U: UserDirectory + 'static,
{
    let clock = Arc::new(DefaultClock);
    let telegram = Arc::new(TelegramTransport::new(config.telegram())?);
    let transport: Arc<dyn MessagingTransport> = telegram.clone();

    let composer = Arc::new(NotificationComposer::new(Arc::new(MessageTemplates::new()?)));
    let dispatcher = Arc::new(NotificationDispatcher::start(
        Arc::clone(&transport),
        config.dispatcher(),
    ));
    let router = Arc::new(InteractionRouter::new(
        LifecycleEngine::new(tasks, Arc::clone(&clock)),
        users,
        transport,
        composer,
        Arc::clone(&dispatcher),
        EvidenceContexts::new(config.evidence_ttl, clock),
    ));

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let summary = DispatchLoop::new(telegram, router).run(shutdown).await;
    dispatcher.shutdown().await;
    info!(handled = summary.handled, "taskbot stopped");
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                error!(error = %err, "failed to listen for Ctrl+C");
            }
        }
        () = terminate => {}
    }
    info!("shutdown signal received, finishing in-flight work");
    shutdown.cancel();
}
