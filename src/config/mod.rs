use std::env;
use std::path::PathBuf;

pub const DEFAULT_MATCHES_FILE: &str = "IPL_Matches_2008_2022.csv";
pub const DEFAULT_DELIVERIES_FILE: &str = "IPL_Ball_by_Ball_2008_2022.csv";
pub const DEFAULT_PORT: u16 = 8000;

/// Process settings, read once from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub matches_file: String,
    pub deliveries_file: String,
    pub model_path: PathBuf,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            matches_file: DEFAULT_MATCHES_FILE.to_string(),
            deliveries_file: DEFAULT_DELIVERIES_FILE.to_string(),
            model_path: PathBuf::from("model/win_predictor.json"),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid PORT value '{}'", raw);
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        Self {
            data_dir: env::var("CRICKET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            matches_file: env::var("CRICKET_MATCHES_FILE").unwrap_or(defaults.matches_file),
            deliveries_file: env::var("CRICKET_DELIVERIES_FILE")
                .unwrap_or(defaults.deliveries_file),
            model_path: env::var("CRICKET_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            port,
        }
    }

    pub fn matches_path(&self) -> PathBuf {
        self.data_dir.join(&self.matches_file)
    }

    pub fn deliveries_path(&self) -> PathBuf {
        self.data_dir.join(&self.deliveries_file)
    }

    /// Same settings pointed at another data directory.
    pub fn with_data_dir(&self, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..self.clone()
        }
    }
}
