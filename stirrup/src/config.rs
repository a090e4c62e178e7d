//! Configuration loading for the bootstrap shell.
//!
//! Configuration lives in JSON files under a fixed directory (`./configs`
//! by default), one file per environment: `./configs/local.json`,
//! `./configs/production.json`, and so on. The active environment is named
//! explicitly or taken from the `APP_ENV` environment variable. A missing
//! or unparseable file is a fatal bootstrap condition — callers are
//! expected to `?` it straight out of `main`.

use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

use stirrup_core::{
    error::{ReadFailurePolicy, StoreError, StoreResult},
    repository::RepoOptions,
};

/// The configuration reader handed to the bootstrap shell and, from there,
/// into repository construction.
///
/// # Example
///
/// ```ignore
/// use stirrup::config::Settings;
///
/// let settings = Settings::load("local")?;
/// let uri = settings.get_string("database.uri")?;
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    inner: Config,
    environment: String,
}

impl Settings {
    /// Directory searched for environment config files.
    pub const DEFAULT_DIR: &'static str = "./configs";

    /// Environment variable naming the active environment.
    pub const ENV_VAR: &'static str = "APP_ENV";

    /// Loads `./configs/<environment>.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the file is missing or not
    /// valid JSON.
    pub fn load(environment: &str) -> StoreResult<Self> {
        Self::load_from(Self::DEFAULT_DIR, environment)
    }

    /// Loads `<dir>/<environment>.json`.
    pub fn load_from(dir: impl AsRef<Path>, environment: &str) -> StoreResult<Self> {
        let path = dir
            .as_ref()
            .join(format!("{environment}.json"));
        let inner = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .build()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        Ok(Self { inner, environment: environment.to_string() })
    }

    /// Loads the environment named by [`Settings::ENV_VAR`].
    pub fn from_env() -> StoreResult<Self> {
        let environment = std::env::var(Self::ENV_VAR).map_err(|_| {
            StoreError::Configuration(format!("{} is not set", Self::ENV_VAR))
        })?;

        Self::load(&environment)
    }

    /// The name of the active environment.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Looks up and deserializes a value at a dotted key path.
    pub fn get<'de, T: Deserialize<'de>>(&self, key: &str) -> StoreResult<T> {
        self.inner
            .get(key)
            .map_err(|e| StoreError::Configuration(e.to_string()))
    }

    /// Looks up a string value at a dotted key path.
    pub fn get_string(&self, key: &str) -> StoreResult<String> {
        self.inner
            .get_string(key)
            .map_err(|e| StoreError::Configuration(e.to_string()))
    }

    /// Looks up a boolean value at a dotted key path.
    pub fn get_bool(&self, key: &str) -> StoreResult<bool> {
        self.inner
            .get_bool(key)
            .map_err(|e| StoreError::Configuration(e.to_string()))
    }

    /// Looks up an integer value at a dotted key path.
    pub fn get_i64(&self, key: &str) -> StoreResult<i64> {
        self.inner
            .get_int(key)
            .map_err(|e| StoreError::Configuration(e.to_string()))
    }

    /// Materializes repository options from the `repository.*` keys.
    ///
    /// `repository.trace_queries` defaults to false;
    /// `repository.read_failures` accepts `"abort"` (default) or
    /// `"propagate"`.
    pub fn repo_options(&self) -> RepoOptions {
        let trace_queries = self
            .inner
            .get_bool("repository.trace_queries")
            .unwrap_or(false);
        let read_failures = match self
            .inner
            .get_string("repository.read_failures")
            .as_deref()
        {
            Ok("propagate") => ReadFailurePolicy::Propagate,
            _ => ReadFailurePolicy::Abort,
        };

        RepoOptions { trace_queries, read_failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_config(dir: &Path, environment: &str, value: serde_json::Value) {
        fs::write(
            dir.join(format!("{environment}.json")),
            value.to_string(),
        )
        .unwrap();
    }

    #[test]
    fn loads_environment_file_and_resolves_dotted_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "local",
            json!({
                "database": { "uri": "mongodb://localhost:27017", "name": "orders" },
                "http": { "port": 8080 },
                "verbose": true
            }),
        );

        let settings = Settings::load_from(dir.path(), "local").unwrap();

        assert_eq!(settings.environment(), "local");
        assert_eq!(
            settings.get_string("database.uri").unwrap(),
            "mongodb://localhost:27017"
        );
        assert_eq!(settings.get_i64("http.port").unwrap(), 8080);
        assert!(settings.get_bool("verbose").unwrap());
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            Settings::load_from(dir.path(), "production"),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("local.json"), "{ not json").unwrap();

        assert!(matches!(
            Settings::load_from(dir.path(), "local"),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn repo_options_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "local", json!({}));

        let options = Settings::load_from(dir.path(), "local")
            .unwrap()
            .repo_options();

        assert!(!options.trace_queries);
        assert_eq!(options.read_failures, ReadFailurePolicy::Abort);
    }

    #[test]
    fn repo_options_from_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "local",
            json!({
                "repository": { "trace_queries": true, "read_failures": "propagate" }
            }),
        );

        let options = Settings::load_from(dir.path(), "local")
            .unwrap()
            .repo_options();

        assert!(options.trace_queries);
        assert_eq!(options.read_failures, ReadFailurePolicy::Propagate);
    }

    #[test]
    fn typed_section_deserialization() {
        #[derive(Debug, Deserialize)]
        struct DatabaseSection {
            uri: String,
            name: String,
        }

        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "local",
            json!({ "database": { "uri": "mongodb://db:27017", "name": "orders" } }),
        );

        let settings = Settings::load_from(dir.path(), "local").unwrap();
        let section: DatabaseSection = settings.get("database").unwrap();

        assert_eq!(section.uri, "mongodb://db:27017");
        assert_eq!(section.name, "orders");
    }
}
