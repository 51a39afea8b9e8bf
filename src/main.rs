use std::io::Error;
use std::sync::Arc;

use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use sqlx::postgres::PgPoolOptions;
use tokio::main;
use tracing_subscriber::EnvFilter;

use crate::{
    application::{
        handlers::dispatcher::DispatchHandler,
        services::{
            compliance::{ComplianceDefaults, ComplianceEvaluator},
            content::ContentResolver,
            jwt::JwtServiceConfig,
            lifecycle::MessageLifecycle,
            notifier::{Notifier, NoopNotifier},
            provider::ProviderGateway,
        },
        usecases::{
            cancel_message::CancelMessageUseCase, get_message::GetMessageUseCase,
            ingest_webhook::IngestWebhookUseCase, list_messages::ListMessagesUseCase,
            retry_message::RetryMessageUseCase, send_message::SendMessageUseCase,
        },
    },
    config::Config,
    domain::repositories::MessageRepository,
    infrastructure::{
        notifications::nats::NatsNotifier,
        providers::{twilio::TwilioProvider, vonage::VonageProvider},
        repositories::{
            in_memory::{
                InMemoryMessageRepository, InMemoryRateLimiter, InMemoryTemplateStore,
                InMemoryTenantDirectory,
            },
            postgres::PostgresMessageRepository,
        },
    },
    presentation::http::endpoints::{
        messages::MessagesEndpoints,
        root::{ApiState, Endpoints},
        webhooks::WebhooksEndpoints,
    },
};

mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

#[main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::try_parse().map_err(Error::other)?;

    let repo: Arc<dyn MessageRepository> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .map_err(Error::other)?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(Error::other)?;
            PostgresMessageRepository::new(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping messages in memory");
            Arc::new(InMemoryMessageRepository::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.nats_url {
        Some(url) => Arc::new(NatsNotifier::connect(url).await.map_err(Error::other)?),
        None => Arc::new(NoopNotifier),
    };

    let tenants = Arc::new(InMemoryTenantDirectory::new(config.daily_tenant_ceiling));
    let templates = Arc::new(InMemoryTemplateStore::new());
    let rate_limiter = Arc::new(InMemoryRateLimiter::new());

    let gateway = Arc::new(ProviderGateway::new(
        vec![TwilioProvider::new(), VonageProvider::new()],
        config.default_country_code.clone(),
    ));
    let lifecycle = Arc::new(MessageLifecycle::new(repo.clone()));
    let dispatcher = Arc::new(DispatchHandler::new(
        gateway,
        lifecycle.clone(),
        tenants.clone(),
        notifier.clone(),
    ));
    let resolver = Arc::new(ContentResolver::new(templates));
    let evaluator = Arc::new(ComplianceEvaluator::new(
        ComplianceDefaults::default(),
        rate_limiter,
    ));

    let state = Arc::new(ApiState {
        send_message_usecase: Arc::new(SendMessageUseCase::new(
            tenants.clone(),
            resolver,
            evaluator,
            lifecycle.clone(),
            dispatcher.clone(),
        )),
        get_message_usecase: Arc::new(GetMessageUseCase::new(repo.clone())),
        list_messages_usecase: Arc::new(ListMessagesUseCase::new(repo.clone())),
        retry_message_usecase: Arc::new(RetryMessageUseCase::new(
            repo.clone(),
            tenants,
            lifecycle.clone(),
            dispatcher,
        )),
        cancel_message_usecase: Arc::new(CancelMessageUseCase::new(repo, lifecycle.clone())),
        ingest_webhook_usecase: Arc::new(IngestWebhookUseCase::new(lifecycle, notifier)),
        jwt_config: JwtServiceConfig {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        },
    });

    let server_url = format!("{}://{}:{}", config.scheme, config.host, config.port);

    tracing::info!(%server_url, "starting server");

    let api_service = OpenApiService::new(
        (
            Endpoints,
            MessagesEndpoints::new(state.clone()),
            WebhooksEndpoints::new(state),
        ),
        "Compliance Gateway API",
        "0.1.0",
    )
    .server(format!("{}/api", server_url));
    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/", ui);

    Server::new(TcpListener::bind(format!("localhost:{}", config.port)))
        .run(app)
        .await
}
