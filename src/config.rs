/// Configuration management for the pedigree layout engine
use crate::reports::OutputFormat;
use crate::sandwich::{SolverConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_WIDTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub solver: SolverSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    pub max_width: usize,
    pub max_iterations: usize,
    pub timeout_seconds: u64,
    pub parallel_execution: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub include_intervals: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver: SolverSettings {
                max_width: DEFAULT_MAX_WIDTH,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
                parallel_execution: true,
            },
            output: OutputSettings {
                format: OutputFormat::Text,
                include_intervals: true,
            },
        }
    }
}

impl SolverSettings {
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            max_width: self.max_width,
            max_iterations: self.max_iterations,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(width) = std::env::var("PEDIGREE_MAX_WIDTH") {
            config.solver.max_width = width.parse().context("Invalid PEDIGREE_MAX_WIDTH")?;
        }

        if let Ok(iterations) = std::env::var("PEDIGREE_MAX_ITERATIONS") {
            config.solver.max_iterations = iterations
                .parse()
                .context("Invalid PEDIGREE_MAX_ITERATIONS")?;
        }

        if let Ok(timeout) = std::env::var("PEDIGREE_TIMEOUT_SECONDS") {
            config.solver.timeout_seconds = timeout.parse().context("Invalid PEDIGREE_TIMEOUT_SECONDS")?;
        }

        if let Ok(parallel) = std::env::var("PEDIGREE_PARALLEL_EXECUTION") {
            config.solver.parallel_execution = parallel
                .parse()
                .context("Invalid PEDIGREE_PARALLEL_EXECUTION")?;
        }

        if let Ok(format) = std::env::var("PEDIGREE_OUTPUT_FORMAT") {
            config.output.format = format.parse()?;
        }

        Ok(config)
    }

    /// Merge with another configuration (other takes precedence where it differs from the defaults)
    pub fn merge_with(&mut self, other: Config) {
        let defaults = Config::default();

        if other.solver.max_width != defaults.solver.max_width {
            self.solver.max_width = other.solver.max_width;
        }
        if other.solver.max_iterations != defaults.solver.max_iterations {
            self.solver.max_iterations = other.solver.max_iterations;
        }
        if other.solver.timeout_seconds != defaults.solver.timeout_seconds {
            self.solver.timeout_seconds = other.solver.timeout_seconds;
        }
        if other.solver.parallel_execution != defaults.solver.parallel_execution {
            self.solver.parallel_execution = other.solver.parallel_execution;
        }

        if other.output.format != defaults.output.format {
            self.output.format = other.output.format;
        }
        if other.output.include_intervals != defaults.output.include_intervals {
            self.output.include_intervals = other.output.include_intervals;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.solver.max_width < 2 {
            return Err(anyhow::anyhow!("Solver width must be at least 2"));
        }

        if self.solver.max_iterations == 0 {
            return Err(anyhow::anyhow!("Solver iteration budget must be greater than 0"));
        }

        if self.solver.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Solver timeout must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_save_and_load() {
        let mut config = Config::default();
        config.output.format = OutputFormat::Markdown;
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).await.unwrap();
        let loaded_config = Config::load_from_file(temp_file.path()).await.unwrap();

        assert_eq!(config, loaded_config);
    }

    #[tokio::test]
    async fn test_load_invalid_file() {
        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), "solver: [1, 2").await.unwrap();

        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.solver.max_width = 1;
        assert!(config.validate().is_err());

        config = Config::default();
        config.solver.max_iterations = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.solver.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_merge() {
        let mut base_config = Config::default();
        base_config.solver.max_iterations = 500;

        let mut override_config = Config::default();
        override_config.solver.max_width = 4;
        override_config.output.format = OutputFormat::Json;

        base_config.merge_with(override_config);

        assert_eq!(base_config.solver.max_width, 4);
        assert_eq!(base_config.solver.max_iterations, 500);
        assert_eq!(base_config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_solver_config() {
        let config = Config::default();
        let solver = config.solver.solver_config();

        assert_eq!(solver.max_width, 3);
        assert_eq!(solver.max_iterations, 1_000_000);
    }

    #[test]
    fn test_default_config_yaml_shape() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();

        assert!(yaml.contains("max_width: 3"));
        assert!(yaml.contains("format: text"));
    }
}
