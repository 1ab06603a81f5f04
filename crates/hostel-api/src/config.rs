use std::env;

use tracing::{info, warn};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SQLITE_PATH: &str = "hostel_directory.sqlite";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub sqlite_path: String,
}

impl ServiceConfig {
    pub fn load() -> Self {
        Self {
            port: load_port(),
            sqlite_path: load_sqlite_path(),
        }
    }
}

fn load_port() -> u16 {
    match env::var("HOSTEL_API_PORT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("invalid HOSTEL_API_PORT value {raw:?}, using {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
        Err(_) => {
            info!("HOSTEL_API_PORT not set, using {DEFAULT_PORT}");
            DEFAULT_PORT
        }
    }
}

fn load_sqlite_path() -> String {
    env::var("HOSTEL_SQLITE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
}
