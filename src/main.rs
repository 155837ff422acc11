use std::sync::Arc;

use axum::{error_handling::HandleErrorLayer, http::StatusCode};
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use assistant_relay_service::{
    channels::{KakaoChannel, NotificationChannel, TelegramChannel},
    create_router, inference,
    services::{chat::ChatService, materials::load_course_materials},
    AppConfig, AppState, NotificationDispatcher, SystemClock,
};

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request took too long".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // One HTTP client shared by every outbound integration
    let http_client = reqwest::Client::new();

    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();
    match &config.telegram {
        Some(telegram) => {
            channels.push(Arc::new(TelegramChannel::new(
                http_client.clone(),
                telegram.clone(),
            )));
            info!("Telegram channel enabled for chat {}", telegram.chat_id);
        }
        None => warn!("TELEGRAM_BOT_TOKEN not set - Telegram channel disabled"),
    }
    match &config.kakao {
        Some(kakao) => {
            channels.push(Arc::new(KakaoChannel::new(http_client.clone(), kakao.clone())));
            info!("KakaoTalk channel enabled");
        }
        None => warn!("KAKAO_TOKEN not set - KakaoTalk channel disabled"),
    }

    let clock = Arc::new(SystemClock);
    let dispatcher = NotificationDispatcher::new(channels, clock);
    info!(
        "Notification dispatcher ready with channels: {:?}",
        dispatcher.channel_names()
    );

    let chat = match config.inference.clone() {
        Some(inference_config) => {
            info!(
                "Loading course materials from {}",
                config.materials_dir.display()
            );
            let materials_dir = config.materials_dir.clone();
            let materials =
                match tokio::task::spawn_blocking(move || load_course_materials(&materials_dir))
                    .await
                {
                    Ok(materials) => materials,
                    Err(e) => {
                        error!("Course material loading task failed: {}", e);
                        Default::default()
                    }
                };

            if materials.is_empty() {
                warn!("No course material text available - chat requests will be refused");
            } else {
                info!("Course assistant is ready");
            }

            info!(
                "Using {:?} model {}",
                inference_config.provider, inference_config.model
            );
            let client = inference::build_client(http_client.clone(), inference_config);
            Some(ChatService::new(client, materials))
        }
        None => {
            warn!("No LLM API key configured - chat endpoint disabled");
            None
        }
    };

    if config.server.is_production {
        info!("Running in PRODUCTION mode - restricting available endpoints");
    } else {
        info!("Running in DEVELOPMENT mode - all endpoints will be available");
    }

    // Create shared application state
    let app_state = Arc::new(AppState { dispatcher, chat });

    let app = create_router(app_state, config.server.is_production).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .timeout(config.server.request_timeout)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    );

    let addr = config.server.bind_addr;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    // Set up signal handler for graceful shutdown
    let shutdown = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received interrupt signal, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received terminate signal, starting graceful shutdown");
            },
        }
    };

    info!("Server is ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Failed to start server");

    info!("Server has been gracefully shut down");
}
