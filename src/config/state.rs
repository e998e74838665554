// Application state module
// Everything a connection needs to serve requests, built once at startup

use std::sync::Arc;

use super::types::Config;
use crate::handler::{MultiParserHandler, ParserHandler};
use crate::logger::Logger;
use crate::postal::{AddressParser, DefaultSanitizer, Sanitizer};

/// Application state
pub struct AppState {
    pub config: Config,
    pub logger: Arc<Logger>,
    pub parser: ParserHandler,
    pub multi_parser: MultiParserHandler,
}

impl AppState {
    /// Wire the handlers to the given parser, a sanitizer built from
    /// `[sanitize]` and the shared logger
    pub fn new(config: Config, logger: Arc<Logger>, parser: Arc<dyn AddressParser>) -> Self {
        let sanitizer: Arc<dyn Sanitizer> =
            Arc::new(DefaultSanitizer::new(config.sanitize.max_length));
        Self::with_sanitizer(config, logger, parser, sanitizer)
    }

    pub fn with_sanitizer(
        config: Config,
        logger: Arc<Logger>,
        parser: Arc<dyn AddressParser>,
        sanitizer: Arc<dyn Sanitizer>,
    ) -> Self {
        let single = ParserHandler::new(
            Arc::clone(&parser),
            Arc::clone(&sanitizer),
            logger.clone(),
        );
        let multi = MultiParserHandler::new(
            parser,
            sanitizer,
            logger.clone(),
            config.max_body_size(),
        );

        Self {
            config,
            logger,
            parser: single,
            multi_parser: multi,
        }
    }
}
