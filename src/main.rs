use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::response::IntoResponse;
use reqwest::Client;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use workspace_settings::{
    api::HttpWorkspaceApi,
    config::{Config, LogFormat},
    responses::JsonResponse,
    routes,
    store::{spawn_sweeper, PageStore},
    AppState,
};

#[cfg(feature = "tls")]
use axum_server::tls_rustls::RustlsConfig;

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_logging(config.log_format);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit_ms)
            .burst_size(config.rate_limit_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .context("invalid rate limiter settings")?,
    );

    // Background task to cleanup old IPs
    let governor_limiter = governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = std::time::Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            governor_limiter.retain_recent();
        }
    });

    let http_client = Client::builder()
        .timeout(config.api_timeout)
        .build()
        .context("failed to build HTTP client")?;
    let api = HttpWorkspaceApi::new(http_client, config.workspace_api_url.clone());

    let pages = Arc::new(PageStore::new());
    spawn_sweeper(pages.clone(), config.page_idle_timeout);

    let addr = config.bind_addr;
    let state = AppState {
        api: Arc::new(api),
        pages,
        config: Arc::new(config),
    };

    let app = routes::router(state).layer(GovernorLayer {
        config: governor_conf,
    });
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();

    #[cfg(feature = "tls")]
    {
        let tls_config = RustlsConfig::from_pem_file(
            std::env::var("DEV_CERT_LOCATION").context("DEV_CERT_LOCATION must be set")?,
            std::env::var("DEV_KEY_LOCATION").context("DEV_KEY_LOCATION must be set")?,
        )
        .await
        .context("failed to load TLS certs")?;

        info!(%addr, "running with TLS");
        axum_server::bind_rustls(addr, tls_config)
            .serve(make_service)
            .await
            .context("server error")?;
        return Ok(());
    }

    #[cfg(not(feature = "tls"))]
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!(%addr, "running without TLS");
        axum::serve(listener, make_service)
            .await
            .context("server error")?;
        Ok(())
    }
}
