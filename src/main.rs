use anyhow::Context;
use library_rental::{
    adapters::logging::LoggingNotificationService,
    adapters::postgres::{
        PostgresBookRepository, PostgresCustomerRepository, PostgresLoanRepository,
    },
    api::{handlers::AppState, router::create_router},
    application::{ServiceDependencies, loan::OverdueNotice},
    config::Settings,
    scheduler::OverdueSweepScheduler,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_rental=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    // Initialize adapters
    let book_repository = Arc::new(PostgresBookRepository::new(pool.clone()));
    let customer_repository = Arc::new(PostgresCustomerRepository::new(pool.clone()));
    let loan_repository = Arc::new(PostgresLoanRepository::new(pool.clone()));
    let notification_service = Arc::new(LoggingNotificationService::new(
        settings.notifications.sender.clone(),
    ));

    // Create service dependencies
    let service_deps = ServiceDependencies {
        book_repository,
        customer_repository,
        loan_repository,
        notification_service,
    };

    // Start the overdue sweep
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_handle = if settings.scheduler.enabled {
        let scheduler = OverdueSweepScheduler::new(
            service_deps.clone(),
            settings.scheduler.run_at,
            settings.scheduler.overdue_threshold_days,
            OverdueNotice {
                subject: settings.notifications.late_loans_subject.clone(),
                body: settings.notifications.late_loans_message.clone(),
            },
        );
        Some(scheduler.start(shutdown_rx))
    } else {
        tracing::info!("Overdue sweep disabled");
        None
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweep_handle {
        let _ = handle.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
