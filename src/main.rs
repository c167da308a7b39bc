mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::moderation::services::{
    AutoModerator, EnrichmentService, GroupService, ModerationNotifier, ReportService,
};
use crate::features::moderation::store::PgReportStore;
use crate::features::moderation::{routes as moderation_routes, ReportStore};
use crate::features::notifications::handlers::NotificationState;
use crate::features::notifications::routes::notification_routes;
use crate::features::notifications::service::NotificationService;
use crate::features::notifications::{AppNotificationTransport, NotificationTransport, RealtimeHub};
use crate::features::platform::{
    AssetUrlResolver, EnforcementExecutor, IdentityResolver, PgEnforcementExecutor,
    PgIdentityResolver, PublicAssetResolver,
};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Platform collaborators behind their seams
    let store: Arc<dyn ReportStore> = Arc::new(PgReportStore::new(pool.clone()));
    let resolver: Arc<dyn IdentityResolver> = Arc::new(PgIdentityResolver::new(pool.clone()));
    let executor: Arc<dyn EnforcementExecutor> = Arc::new(PgEnforcementExecutor::new(pool.clone()));
    let assets: Arc<dyn AssetUrlResolver> = Arc::new(PublicAssetResolver::new(
        config.assets.public_endpoint.clone(),
        config.assets.public_prefix.clone(),
    ));
    if config.assets.public_endpoint.is_none() {
        tracing::warn!("ASSET_PUBLIC_ENDPOINT not set; avatar URLs will degrade to raw paths");
    }

    // Realtime hub and notification plumbing
    let hub = RealtimeHub::default();
    let transport: Arc<dyn NotificationTransport> =
        Arc::new(AppNotificationTransport::new(pool.clone(), hub.clone()));
    let notification_service = Arc::new(NotificationService::new(pool.clone()));
    tracing::info!("Notification services initialized");

    // Moderation services
    let notifier = Arc::new(ModerationNotifier::new(
        Arc::clone(&store),
        Arc::clone(&resolver),
        Arc::clone(&transport),
    ));
    let auto_moderator = Arc::new(AutoModerator::new(
        Arc::clone(&store),
        Arc::clone(&resolver),
        Arc::clone(&executor),
        Arc::clone(&notifier),
        &config.moderation,
    ));
    let enrichment_service = Arc::new(EnrichmentService::new(
        Arc::clone(&store),
        Arc::clone(&resolver),
        Arc::clone(&assets),
        &config.moderation,
    ));
    let group_service = Arc::new(GroupService::new(
        Arc::clone(&store),
        Arc::clone(&enrichment_service),
        &config.moderation,
    ));
    let report_service = Arc::new(ReportService::new(
        Arc::clone(&store),
        Arc::clone(&resolver),
        Arc::clone(&executor),
        Arc::clone(&notifier),
        Arc::clone(&auto_moderator),
    ));
    tracing::info!(
        "Moderation services initialized (auto-enforcement: {})",
        config.moderation.auto_enforcement_enabled
    );

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Identity comes from gateway headers; role checks happen per-handler
    let api_routes = Router::new()
        .merge(moderation_routes::routes(
            Arc::clone(&report_service),
            Arc::clone(&group_service),
        ))
        .merge(notification_routes(NotificationState {
            service: notification_service,
            hub: hub.clone(),
        }));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
