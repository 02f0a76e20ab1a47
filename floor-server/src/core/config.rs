use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::orders::TableReleasePoint;

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | holds `orders.redb`, `catalog.json` and logs |
/// | HTTP_PORT | 3000 | HTTP / WebSocket port |
/// | TIMEZONE | Asia/Tashkent | business timezone for order dates |
/// | TABLE_LOCK_TTL_SECS | 1800 | idle table lock eviction |
/// | TABLE_LOCK_SWEEP_SECS | 60 | sweep period |
/// | PRINT_TIMEOUT_MS | 8000 | per-station print timeout |
/// | PRINTER_PORT | 9100 | station port when the address has none |
/// | TABLE_RELEASE_POINT | payment | `completion` or `payment` |
/// | LOG_LEVEL | info | fallback when `RUST_LOG` is unset |
/// | LOG_DIR | unset | daily rolling log files |
/// | ENVIRONMENT | development | environment label |
///
/// ```ignore
/// WORK_DIR=/srv/sora HTTP_PORT=8080 TABLE_RELEASE_POINT=completion cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub timezone: Tz,
    pub table_lock_ttl_secs: u64,
    pub table_lock_sweep_secs: u64,
    pub print_timeout_ms: u64,
    pub printer_port: u16,
    /// Order transition that frees the table
    pub table_release_point: TableReleasePoint,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from environment variables, defaulting anything unset or invalid
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            timezone: env_or("TIMEZONE", chrono_tz::Asia::Tashkent),
            table_lock_ttl_secs: env_or("TABLE_LOCK_TTL_SECS", 1800),
            table_lock_sweep_secs: env_or("TABLE_LOCK_SWEEP_SECS", 60),
            print_timeout_ms: env_or("PRINT_TIMEOUT_MS", 8000),
            printer_port: env_or("PRINTER_PORT", sora_printer::DEFAULT_PORT),
            table_release_point: env_or("TABLE_RELEASE_POINT", TableReleasePoint::Payment),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override work dir and port, mostly for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// `{work_dir}/orders.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("orders.redb")
    }

    /// `{work_dir}/catalog.json`, the optional collaborator seed
    pub fn catalog_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("catalog.json")
    }

    pub fn table_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.table_lock_ttl_secs)
    }

    pub fn table_lock_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.table_lock_sweep_secs.max(1))
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_millis(self.print_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/sora-test", 4100);
        assert_eq!(config.work_dir, "/tmp/sora-test");
        assert_eq!(config.http_port, 4100);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/sora-test/orders.redb")
        );
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("SORA_TEST_UNSET_VARIABLE", 42u64), 42);
    }

    #[test]
    fn test_sweep_interval_never_zero() {
        let mut config = Config::with_overrides("/tmp", 0);
        config.table_lock_sweep_secs = 0;
        assert_eq!(config.table_lock_sweep_interval(), Duration::from_secs(1));
    }
}
