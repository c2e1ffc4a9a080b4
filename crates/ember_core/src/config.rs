//! Engine configuration.
//!
//! Plain data with serde derives: build one in code via the `with_*`
//! methods, or point [`EngineConfig::from_path`] at a TOML file.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for the task pool.  `None` picks one per logical
    /// core, minus one for the thread driving the frame.  `Some(0)` is
    /// rejected when the pool is built.
    pub worker_threads: Option<usize>,
    /// Default records-per-chunk for threaded systems.
    pub chunk_size: usize,
    /// Log level name for [`init_logging`](crate::logging::init_logging)
    /// ("off", "error", "warn", "info", "debug", "trace").
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            chunk_size: ember_ecs::DEFAULT_CHUNK_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read a TOML config file.  Missing keys fall back to the defaults.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config `{}`", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parsing engine config `{}`", path.display()))
    }

    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    /// Worker count after resolving the auto default.
    pub fn effective_workers(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1).max(1))
                .unwrap_or(1)
        })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_size, ember_ecs::DEFAULT_CHUNK_SIZE);
        assert!(config.worker_threads.is_none());
        assert!(config.effective_workers() >= 1);
    }

    #[test]
    fn toml_file_overrides_partially() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "worker_threads = 3\nlog_level = \"debug\"\n").unwrap();

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.worker_threads, Some(3));
        assert_eq!(config.log_level, "debug");
        // untouched key keeps its default
        assert_eq!(config.chunk_size, ember_ecs::DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(EngineConfig::from_path("/definitely/not/here.toml").is_err());
    }
}
