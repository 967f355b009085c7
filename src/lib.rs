//! # Radio Search MCP
//!
//! A Model Context Protocol server exposing one tool, `search_radio_stations`,
//! over two HTTP transports: an SSE stream and plain JSON-RPC POST.
//!
//! - [`client`]: radio directory API client and its response model
//! - [`tools`]: tool registry, search tool and result formatting
//! - [`server`]: JSON-RPC bridge, transports and server lifecycle
//! - [`service`]: health and discovery endpoints
//! - [`config`]: layered configuration

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod tools;

pub use client::{RadioDirectoryClient, RadioSearch};
pub use config::Config;
pub use error::{Error, Result};
pub use server::{RadioServerHandler, Server};
pub use tools::{ResultFormatter, SearchTool};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
