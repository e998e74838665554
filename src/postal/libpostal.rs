//! libpostal-backed parser
//!
//! libpostal keeps global model state, so every call goes through one mutex.

use std::sync::{Mutex, PoisonError};

use postal::{Context, InitOptions, ParseAddressOptions};

use super::{AddressParser, ParsedComponent};

pub struct LibpostalParser {
    ctx: Mutex<Context>,
}

impl LibpostalParser {
    /// Load the libpostal parser models. Slow: reads several hundred MB of data.
    pub fn new() -> Result<Self, String> {
        let mut ctx = Context::new();
        ctx.init(InitOptions {
            expand_address: false,
            parse_address: true,
        })
        .map_err(|e| format!("libpostal init failed: {e:?}"))?;
        Ok(Self {
            ctx: Mutex::new(ctx),
        })
    }
}

impl AddressParser for LibpostalParser {
    fn parse_address(&self, address: &str) -> Vec<ParsedComponent> {
        // a panic mid-parse leaves the context itself usable
        let ctx = self.ctx.lock().unwrap_or_else(PoisonError::into_inner);
        let mut opts = ParseAddressOptions::new();
        ctx.parse_address(address, &mut opts).map_or_else(
            |_| Vec::new(),
            |components| {
                components
                    .map(|c| ParsedComponent::new(c.label, c.value))
                    .collect()
            },
        )
    }
}
