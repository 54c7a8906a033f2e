use actix_cors::Cors;
use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use portfolio_gateway::{
    graceful_shutdown::shutdown_signal,
    middlewares::studio_gate::{StudioGate, StudioGateConfig},
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(&config));
    let gate_config = StudioGateConfig::from(&config);
    let cors_origins = config.cors_origins();

    let server_addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        let cors = if cors_origins.iter().any(|o| o == "*") {
            Cors::default()
                .allow_any_origin()
                .allow_any_header()
                .allowed_methods(vec!["GET", "POST"])
        } else {
            cors_origins.iter().fold(
                Cors::default()
                    .allow_any_header()
                    .allowed_methods(vec!["GET", "POST"]),
                |cors, origin| cors.allowed_origin(origin),
            )
        };

        // The gate is registered first so it wraps the base service directly;
        // its Transform impl is fixed to `ServiceResponse<BoxBody>`.
        App::new()
            .app_data(app_state.clone())
            .wrap(StudioGate::new(gate_config.clone()))
            .wrap(NormalizePath::trim())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
