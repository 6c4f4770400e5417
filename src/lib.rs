//! # Chimera Panel Library
//!
//! This library provides the core of The Chimera Protocol control panel: a
//! local server that streams a static single-page UI and exposes a small,
//! read-only JSON API over the data files describing a personal
//! infrastructure setup (domains, websites, hardware inventory, ...).
//!
//! ## Overview
//!
//! - `config`: Command-line parsing and the immutable server configuration
//! - `error`: The crate-wide error type
//! - `data`: Reads a single top-level field from a JSON data file
//! - `modules`: Reports which panel modules have their data file on disk
//! - `api`: Maps `/api/*` paths onto the status report, data and modules
//! - `server`: Router, static file serving and the server lifecycle
//! - `utils`: Timestamps and browser launch
//!
//! ## Getting Started
//!
//! ```no_run
//! use chimera_panel::{config::ServerConfig, server};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chimera_panel::error::PanelError> {
//!     let config = ServerConfig::new("localhost", 8008, ".")?;
//!     let cancel_token = CancellationToken::new();
//!     tokio::spawn(server::cancel_on_interrupt(cancel_token.clone()));
//!
//!     server::run(config, cancel_token).await
//! }
//! ```
//!
//! ## API
//!
//! | Path | Response |
//! |---|---|
//! | `/api/status` | server status, name, version and timestamp |
//! | `/api/domains` | `domainManagement` from `domains.json` |
//! | `/api/websites` | `personalWebsites` from `websites-servers.json` |
//! | `/api/modules` | availability of each panel module |
//!
//! Any other `/api/` path is a 404 with `{"error": "API endpoint not found"}`.
//! Every response, static or API, carries no-cache and permissive CORS headers.

/// JSON API dispatch
///
/// Resolves request paths to endpoints by exact match and turns data and
/// probe results into JSON responses with the right status code.
pub mod api;

/// Configuration module
///
/// Defines the command-line interface and the `ServerConfig` built from it,
/// including the `index.html` startup check.
pub mod config;

/// Data source reader
///
/// Declares the data files served by the API and extracts their top-level
/// field, reporting missing or malformed files as typed errors.
pub mod data;

/// Custom error types module
pub mod error;

/// Module availability prober
pub mod modules;

/// Server operations module
///
/// Contains the Axum router, static file serving through `tower-http`, the
/// shared response headers and the server lifecycle controller with graceful
/// shutdown driven by a cancellation token.
pub mod server;

/// Utility functions module
pub mod utils;
