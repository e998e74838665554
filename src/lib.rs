//! HTTP front end for an address parsing engine.
//!
//! `GET /parse?address=...` parses one address, `POST /parse/multi` a JSON
//! array of `{"address": ...}` objects. The engine and the sanitizer sit
//! behind the traits in [`postal`] so they can be swapped out.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod postal;
pub mod server;

#[cfg(test)]
mod testing;
