/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → AuthzChecker 生成 → Router 組み立て
 * - Middleware の適用 (request id / trace / body limit / timeout)
 * - axum::serve() で起動、SIGTERM / Ctrl-C で graceful shutdown
 */
use std::{panic, process};

use axum::Router;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::services::authz::build_checker;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // ext_authz=debug adds the per-request decision and deny cause.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: 即落として気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    if config.jwt_rsa_public_key.is_empty() {
        tracing::warn!("JWT_RSA_PUBLIC_KEY is not set; bearer requests will be denied with 503");
    }

    tracing::info!(
        "starting ext_authz in {:?} mode on {} (check prefix {})",
        config.app_env,
        config.addr,
        config.check_path_prefix
    );

    let state = build_state(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: config.addr,
            source,
        })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Serve)?;

    tracing::info!("ext_authz stopped");
    Ok(())
}

fn build_state(config: &Config) -> AppState {
    let checker = build_checker(config);
    AppState::new(checker, &config.check_path_prefix)
}

fn build_router(state: AppState) -> Router {
    middleware::http::apply(api::routes(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received");
}
