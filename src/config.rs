use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Arogya Bridge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default TCP port for the API server.
pub const DEFAULT_PORT: u16 = 3001;

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "arogya_bridge=info,tower_http=warn".to_string()
}

/// Get the default application data directory (~/.arogya-bridge).
pub fn default_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".arogya-bridge")
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Origin allowed by CORS (the dashboard frontend).
    pub frontend_origin: String,
    /// Demo mode seeds demo data at startup and echoes one-time codes in
    /// the request-otp response. Never enable in production.
    pub demo_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("BRIDGE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_dir = std::env::var("BRIDGE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());
        let frontend_origin = std::env::var("BRIDGE_FRONTEND_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        let demo_mode = std::env::var("BRIDGE_DEMO_MODE")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Self {
            port,
            data_dir,
            frontend_origin,
            demo_mode,
        }
    }

    /// Path of the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("bridge.db")
    }

    /// Root of the uploaded-files tree, served at `/uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Voice-note storage directory.
    pub fn voice_notes_dir(&self) -> PathBuf {
        self.uploads_dir().join("voice-notes")
    }
}
