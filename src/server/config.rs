//! Server configuration types
//!
//! Contains all configuration structures for the Tessella server.

use serde::{Deserialize, Serialize};
use tessella_board::Rgb;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

/// Listen address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Board dimensions, fill color, and write cooldown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Fill color for a freshly seeded board, as an [r, g, b] triplet
    #[serde(default = "default_color")]
    pub default_color: [u8; 3],
    /// Minimum seconds between accepted writes from one device
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_width() -> u32 {
    16
}
fn default_height() -> u32 {
    16
}
fn default_color() -> [u8; 3] {
    [255, 255, 255]
}
fn default_cooldown_secs() -> u64 {
    10
}

impl BoardConfig {
    /// The configured fill color as a board color value
    pub fn default_rgb(&self) -> Rgb {
        let [r, g, b] = self.default_color;
        Rgb::new(r, g, b)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            default_color: default_color(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

/// Durable storage location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_data_dir() -> String {
    "./data".to_string()
}
fn default_database() -> String {
    "board.db".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database: default_database(),
        }
    }
}

/// Reset secret digest
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// SHA-256 hex digest of the reset secret. Empty disables reset: no
    /// candidate hashes to the empty string.
    #[serde(default)]
    pub reset_secret_sha256: String,
}

/// Periodic maintenance intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// How often to check for a viewer-less server and clear the ledger
    #[serde(default = "default_sweep_interval")]
    pub ledger_sweep_interval_secs: u64,
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            ledger_sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = BoardConfig::default();
        assert_eq!(config.width, 16);
        assert_eq!(config.height, 16);
        assert_eq!(config.default_rgb(), Rgb::WHITE);
        assert_eq!(config.cooldown_secs, 10);
    }

    #[test]
    fn test_minimal_toml_deserializes() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.board.width, 16);
        assert!(config.admin.reset_secret_sha256.is_empty());
    }
}
