use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Dataset root holding `test.json`, `train.json` and `images/`.
    pub dataset_dir: PathBuf,
    /// Directory of the static browser client.
    pub client_dir: PathBuf,
    /// Per-file upload size limit in bytes (default: 50 MiB).
    pub max_file_bytes: usize,
    /// Maximum number of files in one folder upload (default: `300`).
    pub max_folder_files: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default      |
    /// |------------------------|--------------|
    /// | `HOST`                 | `0.0.0.0`    |
    /// | `PORT`                 | `5000`       |
    /// | `CORS_ORIGINS`         | `*`          |
    /// | `REQUEST_TIMEOUT_SECS` | `60`         |
    /// | `DATASET_DIR`          | `dataset`    |
    /// | `CLIENT_DIR`           | `client`     |
    /// | `MAX_FILE_BYTES`       | `52428800`   |
    /// | `MAX_FOLDER_FILES`     | `300`        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let dataset_dir =
            PathBuf::from(std::env::var("DATASET_DIR").unwrap_or_else(|_| "dataset".into()));

        let client_dir =
            PathBuf::from(std::env::var("CLIENT_DIR").unwrap_or_else(|_| "client".into()));

        let max_file_bytes: usize = std::env::var("MAX_FILE_BYTES")
            .unwrap_or_else(|_| (50 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_FILE_BYTES must be a valid usize");

        let max_folder_files: usize = std::env::var("MAX_FOLDER_FILES")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("MAX_FOLDER_FILES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            dataset_dir,
            client_dir,
            max_file_bytes,
            max_folder_files,
        }
    }

    /// Whether `CORS_ORIGINS` allows any origin.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    /// Largest request body accepted: a full folder plus multipart overhead.
    pub fn max_body_bytes(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(self.max_folder_files.max(1))
            .saturating_add(1024 * 1024)
    }
}
