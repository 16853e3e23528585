//! Server configuration, read from the environment with sane defaults.

/// Configuration for the catalog/budget engine
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the embedded database files
    pub data_dir: String,
    /// SurrealDB namespace
    pub db_namespace: String,
    /// SurrealDB database name
    pub db_name: String,
    pub environment: String,
    pub log_level: String,
    /// Optional directory for daily-rolling log files
    pub log_dir: Option<String>,
    /// Address that receives administrator notifications
    pub admin_email: String,
    /// Image served for unresolvable or image-less products
    pub placeholder_image: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/var/lib/tienda".into()),
            db_namespace: std::env::var("DB_NAMESPACE").unwrap_or_else(|_| "tienda".into()),
            db_name: std::env::var("DB_NAME").unwrap_or_else(|_| "catalogo".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@localhost".into()),
            placeholder_image: std::env::var("PLACEHOLDER_IMAGE")
                .unwrap_or_else(|_| "/images/placeholder.png".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// File logging is reserved for production; local runs log to stdout.
    fn effective_log_dir(&self) -> Option<&str> {
        if self.is_production() {
            self.log_dir.as_deref()
        } else {
            None
        }
    }

    /// Wire the logger from this configuration
    pub fn init_logging(&self) {
        crate::utils::logger::init_logger_with_file(
            Some(&self.log_level),
            self.effective_log_dir(),
        );
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

    fn config(environment: &str) -> Config {
        Config {
            data_dir: "/tmp".to_string(),
            db_namespace: "tienda".to_string(),
            db_name: "catalogo".to_string(),
            environment: environment.to_string(),
            log_level: "info".to_string(),
            log_dir: Some("/var/log/tienda".to_string()),
            admin_email: "admin@localhost".to_string(),
            placeholder_image: "/images/placeholder.png".to_string(),
        }
    }

    #[test]
    fn production_logs_to_the_configured_directory() {
        let cfg = config("production");
        assert!(cfg.is_production());
        assert_eq!(cfg.effective_log_dir(), Some("/var/log/tienda"));
    }

    #[test]
    fn development_logs_to_stdout_only() {
        let cfg = config("development");
        assert!(!cfg.is_production());
        assert_eq!(cfg.effective_log_dir(), None);
    }
}
