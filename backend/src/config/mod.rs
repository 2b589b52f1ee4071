//! Configuration module for the club backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use crate::db::DEFAULT_STORAGE_KEY;
use crate::sync::SyncMode;

/// Where the persisted document lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// `<data_dir>/<storage_key>.json`
    File,
    /// Process memory only
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted document
    pub data_dir: PathBuf,
    /// Key (file stem) of the persisted document
    pub storage_key: String,
    pub storage: StorageKind,
    /// Remote synchronization behaviour
    pub remote_sync: SyncMode,
    /// Members promoted to admin at startup
    pub admin_pseudos: Vec<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("LUDO_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let storage_key =
            env::var("LUDO_STORAGE_KEY").unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string());

        let storage = match env::var("LUDO_STORAGE").as_deref() {
            Ok("memory") => StorageKind::Memory,
            _ => StorageKind::File,
        };

        let remote_sync = env::var("LUDO_REMOTE_SYNC")
            .ok()
            .and_then(|v| SyncMode::parse(&v))
            .unwrap_or_default();

        let admin_pseudos = env::var("LUDO_ADMIN_PSEUDOS")
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        let bind_addr = env::var("LUDO_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = env::var("LUDO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data_dir,
            storage_key,
            storage,
            remote_sync,
            admin_pseudos,
            bind_addr,
            log_level,
        })
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
