//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project-local config file, read from the working directory
pub const LOCAL_CONFIG_FILE: &str = "secom.yaml";

/// secom-seed configuration with layered hierarchy
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database: PathBuf,

    /// Schema name written into generated SQL scripts (`USE <schema>;`)
    pub schema_name: String,

    /// Text encoding applied to newly created databases
    pub encoding: String,

    /// Connection attempts before giving up
    pub connect_attempts: u32,

    /// Fixed delay between connection attempts
    pub connect_backoff_ms: u64,

    /// Directory holding `secom.data` and `secom_labels.data`
    pub data_dir: Option<PathBuf>,

    /// Seed for the random source (unset = OS entropy)
    pub seed: Option<u64>,

    /// Rows per INSERT statement in generated SQL
    pub sql_batch_size: usize,

    /// Pending measurement rows that trigger a flush
    pub measurement_flush_rows: usize,

    /// Records per transaction window
    pub commit_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("secom.db"),
            schema_name: "secom".to_string(),
            encoding: "UTF-8".to_string(),
            connect_attempts: 30,
            connect_backoff_ms: 2000,
            data_dir: None,
            seed: None,
            sql_batch_size: 50,
            measurement_flush_rows: 10_000,
            commit_every: 100,
        }
    }
}

/// A config file layer; only the keys present override lower layers
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    database: Option<PathBuf>,
    schema_name: Option<String>,
    encoding: Option<String>,
    connect_attempts: Option<u32>,
    connect_backoff_ms: Option<u64>,
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    sql_batch_size: Option<usize>,
    measurement_flush_rows: Option<usize>,
    commit_every: Option<usize>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/secom-seed/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(layer) = Self::read_layer(&global_path) {
                config.merge(layer);
            }
        }

        // 3. Project config (./secom.yaml)
        if let Some(layer) = Self::read_layer(Path::new(LOCAL_CONFIG_FILE)) {
            config.merge(layer);
        }

        // 4. Environment variables
        if let Ok(database) = std::env::var("SECOM_DATABASE") {
            config.database = PathBuf::from(database);
        }
        if let Ok(data_dir) = std::env::var("SECOM_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(data_dir));
        }
        if let Ok(seed) = std::env::var("SECOM_SEED") {
            match seed.parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => tracing::warn!(value = %seed, "ignoring non-numeric SECOM_SEED"),
            }
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "secom-seed")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_layer(path: &Path) -> Option<ConfigLayer> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<ConfigLayer>(&contents) {
            Ok(layer) => {
                tracing::debug!(path = %path.display(), "loaded config layer");
                Some(layer)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Merge a layer into this config (layer takes precedence)
    fn merge(&mut self, other: ConfigLayer) {
        if let Some(database) = other.database {
            self.database = database;
        }
        if let Some(schema_name) = other.schema_name {
            self.schema_name = schema_name;
        }
        if let Some(encoding) = other.encoding {
            self.encoding = encoding;
        }
        if let Some(attempts) = other.connect_attempts {
            self.connect_attempts = attempts;
        }
        if let Some(backoff) = other.connect_backoff_ms {
            self.connect_backoff_ms = backoff;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.seed.is_some() {
            self.seed = other.seed;
        }
        if let Some(size) = other.sql_batch_size {
            self.sql_batch_size = size;
        }
        if let Some(rows) = other.measurement_flush_rows {
            self.measurement_flush_rows = rows;
        }
        if let Some(every) = other.commit_every {
            self.commit_every = every;
        }
    }

    pub fn connect_backoff(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_ms)
    }
}
