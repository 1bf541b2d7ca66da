//! Session configuration submitted to the engine at startup.

use crate::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default system language code.
pub const DEFAULT_LANG_CODE: &str = "en";

/// Default device model reported to the engine.
pub const DEFAULT_DEVICE_MODEL: &str = "Desktop";

/// Directory under the home directory used when no work dir is configured.
const DEFAULT_WORK_DIR_NAME: &str = ".tdauth";

/// Immutable per-session engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Working directory; database and files directories derive from it.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Explicit database directory (defaults to `{work_dir}/database`).
    #[serde(default)]
    pub database_directory: Option<PathBuf>,
    /// Explicit files directory (defaults to `{work_dir}/files`).
    #[serde(default)]
    pub files_directory: Option<PathBuf>,
    /// Application identifier issued by the engine's operator.
    #[serde(default)]
    pub api_id: i32,
    /// Application hash issued alongside `api_id`.
    #[serde(default)]
    pub api_hash: String,
    /// Use the engine's test environment.
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_true")]
    pub use_file_db: bool,
    #[serde(default = "default_true")]
    pub use_chat_db: bool,
    #[serde(default = "default_true")]
    pub use_message_db: bool,
    #[serde(default = "default_true")]
    pub allow_secret_chat: bool,
    #[serde(default = "default_lang_code")]
    pub lang_code: String,
    #[serde(default = "default_device_model")]
    pub device_model: String,
    #[serde(default = "default_system_version")]
    pub system_version: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_true")]
    pub storage_optimizer: bool,
    /// Keep original file names for downloaded files.
    #[serde(default = "default_true")]
    pub file_readable_names: bool,
}

fn default_true() -> bool {
    true
}

fn default_work_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_WORK_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR_NAME))
}

fn default_lang_code() -> String {
    DEFAULT_LANG_CODE.to_string()
}

fn default_device_model() -> String {
    DEFAULT_DEVICE_MODEL.to_string()
}

fn default_system_version() -> String {
    std::env::consts::OS.to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            database_directory: None,
            files_directory: None,
            api_id: 0,
            api_hash: String::new(),
            test_mode: false,
            use_file_db: true,
            use_chat_db: true,
            use_message_db: true,
            allow_secret_chat: true,
            lang_code: default_lang_code(),
            device_model: default_device_model(),
            system_version: default_system_version(),
            app_version: default_app_version(),
            storage_optimizer: true,
            file_readable_names: true,
        }
    }
}

impl SessionConfig {
    /// Create a config with the given API credentials and defaults elsewhere.
    pub fn new(api_id: i32, api_hash: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash: api_hash.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a file if it exists, then apply environment
    /// overrides and validate.
    pub fn load(path: &Path) -> AuthResult<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific JSON file.
    pub fn load_from_file(path: &Path) -> AuthResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> AuthResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override fields from `TDAUTH_*` environment variables.
    fn load_from_env(&mut self) -> AuthResult<()> {
        if let Some(api_id) = env_value("TDAUTH_API_ID") {
            self.api_id = api_id.parse().map_err(|_| {
                AuthError::Config(format!("TDAUTH_API_ID is not an integer: {}", api_id))
            })?;
        }
        if let Some(api_hash) = env_value("TDAUTH_API_HASH") {
            self.api_hash = api_hash;
        }
        if let Some(work_dir) = env_value("TDAUTH_WORK_DIR") {
            self.work_dir = PathBuf::from(work_dir);
        }
        if let Some(test_mode) = env_value("TDAUTH_TEST_MODE") {
            self.test_mode = matches!(test_mode.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Check that the engine can accept this configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.api_id <= 0 {
            return Err(AuthError::Config("api_id must be a positive integer".to_string()));
        }
        if self.api_hash.trim().is_empty() {
            return Err(AuthError::Config("api_hash is required".to_string()));
        }
        Ok(())
    }

    /// Effective database directory.
    pub fn database_directory(&self) -> PathBuf {
        self.database_directory
            .clone()
            .unwrap_or_else(|| self.work_dir.join("database"))
    }

    /// Effective files directory.
    pub fn files_directory(&self) -> PathBuf {
        self.files_directory
            .clone()
            .unwrap_or_else(|| self.work_dir.join("files"))
    }

    /// Parameters record submitted while the engine waits for them.
    pub fn tdlib_parameters(&self) -> TdlibParameters {
        TdlibParameters {
            use_test_dc: self.test_mode,
            database_directory: self.database_directory().to_string_lossy().into_owned(),
            files_directory: self.files_directory().to_string_lossy().into_owned(),
            use_file_database: self.use_file_db,
            use_chat_info_database: self.use_chat_db,
            use_message_database: self.use_message_db,
            use_secret_chats: self.allow_secret_chat,
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            system_language_code: self.lang_code.clone(),
            device_model: self.device_model.clone(),
            system_version: self.system_version.clone(),
            application_version: self.app_version.clone(),
            enable_storage_optimizer: self.storage_optimizer,
            ignore_file_names: !self.file_readable_names,
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Engine startup parameters, named the way the engine names them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdlibParameters {
    pub use_test_dc: bool,
    pub database_directory: String,
    pub files_directory: String,
    pub use_file_database: bool,
    pub use_chat_info_database: bool,
    pub use_message_database: bool,
    pub use_secret_chats: bool,
    pub api_id: i32,
    pub api_hash: String,
    pub system_language_code: String,
    pub device_model: String,
    pub system_version: String,
    pub application_version: String,
    pub enable_storage_optimizer: bool,
    pub ignore_file_names: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.lang_code, DEFAULT_LANG_CODE);
        assert_eq!(config.device_model, DEFAULT_DEVICE_MODEL);
        assert!(config.use_message_db);
        assert!(config.file_readable_names);
        assert!(!config.test_mode);
    }

    #[test]
    fn test_derived_directories() {
        let mut config = SessionConfig::new(1, "hash");
        config.work_dir = PathBuf::from("/var/lib/tdauth");

        assert_eq!(
            config.database_directory(),
            PathBuf::from("/var/lib/tdauth/database")
        );
        assert_eq!(config.files_directory(), PathBuf::from("/var/lib/tdauth/files"));
    }

    #[test]
    fn test_explicit_directories_win() {
        let mut config = SessionConfig::new(1, "hash");
        config.work_dir = PathBuf::from("/var/lib/tdauth");
        config.database_directory = Some(PathBuf::from("/mnt/db"));
        config.files_directory = Some(PathBuf::from("/mnt/files"));

        let params = config.tdlib_parameters();
        assert_eq!(params.database_directory, "/mnt/db");
        assert_eq!(params.files_directory, "/mnt/files");
    }

    #[test]
    fn test_tdlib_parameters_copy_flags() {
        let mut config = SessionConfig::new(42, "abc123");
        config.test_mode = true;
        config.use_chat_db = false;
        config.allow_secret_chat = false;
        config.file_readable_names = false;
        config.lang_code = "de".to_string();

        let params = config.tdlib_parameters();
        assert!(params.use_test_dc);
        assert!(!params.use_chat_info_database);
        assert!(!params.use_secret_chats);
        assert!(params.ignore_file_names);
        assert_eq!(params.api_id, 42);
        assert_eq!(params.api_hash, "abc123");
        assert_eq!(params.system_language_code, "de");
    }

    #[test]
    fn test_validate() {
        assert!(SessionConfig::new(12345, "0123abcd").validate().is_ok());
        assert!(matches!(
            SessionConfig::new(0, "hash").validate(),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            SessionConfig::new(1, "  ").validate(),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_config_load_from_file_applies_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("session.json");

        let config_json = r#"{
            "api_id": 777,
            "api_hash": "deadbeef",
            "work_dir": "/tmp/tdauth-test",
            "use_chat_db": false
        }"#;
        std::fs::write(&config_path, config_json).unwrap();

        let config = SessionConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.api_id, 777);
        assert_eq!(config.api_hash, "deadbeef");
        assert_eq!(config.work_dir, PathBuf::from("/tmp/tdauth-test"));
        assert!(!config.use_chat_db);
        assert!(config.use_file_db);
        assert_eq!(config.lang_code, DEFAULT_LANG_CODE);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("session.json");

        let mut config = SessionConfig::new(99, "cafe");
        config.device_model = "Server".to_string();
        config.save(&config_path).unwrap();

        let loaded = SessionConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    const ENV_VARS: [&str; 4] = [
        "TDAUTH_API_ID",
        "TDAUTH_API_HASH",
        "TDAUTH_WORK_DIR",
        "TDAUTH_TEST_MODE",
    ];

    // Process environment is shared across test threads
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Run `f` with exactly `vars` set among the `TDAUTH_*` variables.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }

        let result = f();

        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        result
    }

    #[test]
    fn test_config_load_missing_file_uses_env() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let config = with_env(
            &[
                ("TDAUTH_API_ID", "4242"),
                ("TDAUTH_API_HASH", "feedface"),
                ("TDAUTH_WORK_DIR", "/opt/tdauth"),
                ("TDAUTH_TEST_MODE", "true"),
            ],
            || SessionConfig::load(&missing),
        )
        .unwrap();

        assert_eq!(config.api_id, 4242);
        assert_eq!(config.api_hash, "feedface");
        assert_eq!(config.work_dir, PathBuf::from("/opt/tdauth"));
        assert!(config.test_mode);
        assert_eq!(config.lang_code, DEFAULT_LANG_CODE);
    }

    #[test]
    fn test_config_load_env_overrides_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("session.json");
        std::fs::write(
            &config_path,
            r#"{"api_id": 777, "api_hash": "deadbeef", "work_dir": "/tmp/tdauth-test", "use_chat_db": false}"#,
        )
        .unwrap();

        let config = with_env(
            &[("TDAUTH_API_HASH", "override"), ("TDAUTH_TEST_MODE", "1")],
            || SessionConfig::load(&config_path),
        )
        .unwrap();

        assert_eq!(config.api_id, 777);
        assert_eq!(config.api_hash, "override");
        assert_eq!(config.work_dir, PathBuf::from("/tmp/tdauth-test"));
        assert!(config.test_mode);
        assert!(!config.use_chat_db);
    }

    #[test]
    fn test_config_load_rejects_malformed_api_id() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let result = with_env(
            &[("TDAUTH_API_ID", "not-a-number"), ("TDAUTH_API_HASH", "h")],
            || SessionConfig::load(&missing),
        );

        match result {
            Err(AuthError::Config(message)) => {
                assert!(message.contains("TDAUTH_API_ID"), "{}", message);
                assert!(message.contains("not-a-number"), "{}", message);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_config_load_validates_result() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let no_credentials = with_env(&[], || SessionConfig::load(&missing));
        assert!(matches!(no_credentials, Err(AuthError::Config(_))));

        let no_hash = with_env(&[("TDAUTH_API_ID", "5")], || SessionConfig::load(&missing));
        match no_hash {
            Err(AuthError::Config(message)) => assert!(message.contains("api_hash")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_config_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("session.json");
        std::fs::write(&config_path, "{ not json").unwrap();

        let result = SessionConfig::load_from_file(&config_path);
        assert!(matches!(result, Err(AuthError::Json(_))));
    }
}
