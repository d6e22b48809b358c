//! Xaveco API server entry point.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xaveco::adapters::ai::{OpenAIConfig, OpenAIGenerator};
use xaveco::adapters::analytics::AnalyticsDispatcher;
use xaveco::adapters::http::{app_router, AppState};
use xaveco::adapters::memory::{
    InMemoryAccountRepository, InMemoryAnalyticsSink, InMemoryBillingEventRepository,
    InMemoryTrialOriginRepository,
};
use xaveco::adapters::postgres::{
    PostgresAccountRepository, PostgresAnalyticsSink, PostgresBillingEventRepository,
    PostgresTrialOriginRepository,
};
use xaveco::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use xaveco::config::{AppConfig, DatabaseConfig, StorageBackend};
use xaveco::domain::billing::StripeWebhookVerifier;
use xaveco::ports::{AccountRepository, AnalyticsSink, BillingEventRepository, TrialOriginRepository};

/// Store implementations selected by `database.backend`.
struct Stores {
    accounts: Arc<dyn AccountRepository>,
    trial_origins: Arc<dyn TrialOriginRepository>,
    billing_events: Arc<dyn BillingEventRepository>,
    analytics_sink: Arc<dyn AnalyticsSink>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);

    tracing::info!("Starting Xaveco API Server v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;
    let policy = config.entitlement.to_policy();

    let stores = connect_stores(&config.database).await?;

    let payment_provider = StripePaymentAdapter::new(
        StripeConfig::new(config.payment.stripe_api_key.clone())
            .with_base_url(config.payment.api_base_url.clone())
            .with_timeout(config.payment.timeout()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to build Stripe client: {}", e))?;

    let generator = OpenAIGenerator::new(
        OpenAIConfig::new(config.ai.openai_api_key.clone().unwrap_or_default())
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_temperature(config.ai.temperature)
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries)
            .with_max_suggestions(policy.max_suggestions),
    )
    .map_err(|e| anyhow::anyhow!("Failed to build suggestion generator: {}", e))?;

    tracing::info!(
        stripe_test_mode = config.payment.is_test_mode(),
        ip_gate = ?policy.ip_gate,
        refund_on_upstream_failure = policy.refund_on_upstream_failure,
        "Adapters configured"
    );

    let state = AppState {
        accounts: stores.accounts,
        trial_origins: stores.trial_origins,
        billing_events: stores.billing_events,
        generator: Arc::new(generator),
        payment_provider: Arc::new(payment_provider),
        analytics: AnalyticsDispatcher::new(stores.analytics_sink),
        webhook_verifier: StripeWebhookVerifier::new(config.payment.stripe_webhook_secret.clone()),
        policy,
        checkout: config.payment.to_checkout_settings(),
        admin_token: config.server.admin_token.clone(),
    };

    let app = app_router(state, &config.server);

    let addr = config.server.socket_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.log_level.clone().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect_stores(database: &DatabaseConfig) -> anyhow::Result<Stores> {
    match database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory stores; state is lost on restart");
            Ok(Stores {
                accounts: Arc::new(InMemoryAccountRepository::new()),
                trial_origins: Arc::new(InMemoryTrialOriginRepository::new()),
                billing_events: Arc::new(InMemoryBillingEventRepository::new()),
                analytics_sink: Arc::new(InMemoryAnalyticsSink::new()),
            })
        }
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .min_connections(database.min_connections)
                .max_connections(database.max_connections)
                .acquire_timeout(database.acquire_timeout())
                .idle_timeout(Some(database.idle_timeout()))
                .max_lifetime(Some(database.max_lifetime()))
                .connect(&database.url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection established");

            if database.run_migrations {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run migrations")?;
            }

            Ok(Stores {
                accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
                trial_origins: Arc::new(PostgresTrialOriginRepository::new(pool.clone())),
                billing_events: Arc::new(PostgresBillingEventRepository::new(pool.clone())),
                analytics_sink: Arc::new(PostgresAnalyticsSink::new(pool)),
            })
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
