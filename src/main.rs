use std::sync::Arc;

use postal_httpd::config::{AppState, Config};
use postal_httpd::logger::Logger;
use postal_httpd::postal::AddressParser;
use postal_httpd::server::{self, SignalHandler};

const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    let logger = Arc::new(Logger::from_config(&cfg.logging)?);

    // Size the Tokio runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger.info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger.info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, logger))
}

async fn async_main(cfg: Config, logger: Arc<Logger>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let parser = build_parser(&logger)?;
    let listener = server::create_reusable_listener(addr)?;

    logger.info("======================================");
    logger.info(&format!("Listening on: http://{addr}"));
    logger.info(&format!("  - GET  {}?address=...[&format=keys]", cfg.routes.parse_path));
    logger.info(&format!("  - POST {}", cfg.routes.multi_parse_path));
    logger.info(&format!("Log level: {}", cfg.logging.level));
    logger.info(&format!("Max body size: {} bytes", cfg.http.max_body_size));
    logger.info("======================================");

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals), Arc::clone(&logger))?;

    let state = Arc::new(AppState::new(cfg, Arc::clone(&logger), parser));
    server::run(listener, state, signals).await?;

    logger.info("Server stopped");
    Ok(())
}

#[cfg(feature = "libpostal")]
fn build_parser(logger: &Logger) -> Result<Arc<dyn AddressParser>, Box<dyn std::error::Error>> {
    logger.info("Loading libpostal models...");
    let parser = postal_httpd::postal::LibpostalParser::new()?;
    logger.info("libpostal ready");
    Ok(Arc::new(parser))
}

#[cfg(not(feature = "libpostal"))]
fn build_parser(logger: &Logger) -> Result<Arc<dyn AddressParser>, Box<dyn std::error::Error>> {
    let message = "no address parser compiled in; rebuild with `--features libpostal`";
    logger.error(message);
    Err(message.into())
}
