//! # Coursehub
//!
//! A course directory hub: remote sites register themselves, publish course
//! metadata and backups, and clients search the directory by tag facets.
//! Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! coursehub = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use coursehub::config::HubConfig;
//! use coursehub::directory::Directory;
//! use coursehub::files::BackupStorage;
//! use coursehub::notify::LogNotifier;
//! use coursehub::search::{SearchEngine, SearchOptions};
//! use coursehub::server::{AppState, create_router};
//! use coursehub::store::{SqliteStore, Store};
//!
//! let store = Arc::new(SqliteStore::new("./data/coursehub.db").unwrap());
//! store.initialize().unwrap();
//!
//! let config = HubConfig::default();
//! let notifier = Arc::new(LogNotifier);
//! let state = Arc::new(AppState {
//!     store: store.clone(),
//!     directory: Directory::new(store.clone(), config.clone(), notifier.clone()),
//!     search: SearchEngine::new(store, SearchOptions, &config),
//!     backups: BackupStorage::new(&PathBuf::from("./data")),
//!     config,
//!     notifier,
//!     restorer: None,
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the binary's CLI dependencies. Disable with
//!   `default-features = false`.

pub mod auth;
pub mod config;
pub mod demo;
pub mod directory;
pub mod error;
pub mod files;
pub mod notify;
pub mod search;
pub mod server;
pub mod store;
pub mod sync;
pub mod tags;
pub mod types;
