use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SubtransError};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "subtrans.toml";

static DIRECTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}:[a-z]{2}$").expect("valid direction regex"));

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub translation: TranslationConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Path to the translate-shell binary
    pub binary_path: String,
    /// Pass `-brief` so only the translation is printed
    pub brief: bool,
    /// Pass `-no-warn` to silence warnings
    pub no_warn: bool,
    /// Extra arguments placed after the language flags
    pub extra_args: Vec<String>,
    /// Run the command line through `sh -c` instead of spawning the binary directly
    pub use_shell: bool,
    /// Treat any stderr output as a failed translation
    pub fail_on_stderr: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Direction used when none is given on the command line, as `from:to`
    pub default_direction: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the input path to name the backup of the original file
    pub backup_suffix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling log file
    pub directory: PathBuf,
    /// Write a log file at all
    pub file: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            binary_path: "trans".to_string(),
            brief: true,
            no_warn: true,
            extra_args: Vec::new(),
            use_shell: false,
            fail_on_stderr: false,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            default_direction: "en:ru".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backup_suffix: "_".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(".subtrans").join("log"),
            file: true,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtransError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| SubtransError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, else `subtrans.toml` in the working directory, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.backup_suffix.is_empty() {
            return Err(SubtransError::Config(
                "output.backup_suffix must not be empty".to_string(),
            ));
        }
        if self.translator.binary_path.trim().is_empty() {
            return Err(SubtransError::Config(
                "translator.binary_path must not be empty".to_string(),
            ));
        }
        self.default_direction()?;
        Ok(())
    }

    pub fn default_direction(&self) -> Result<TranslationDirection> {
        self.translation
            .default_direction
            .parse()
            .map_err(|e: SubtransError| {
                SubtransError::Config(format!("translation.default_direction: {}", e))
            })
    }
}

/// Source and target language codes, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationDirection {
    source: String,
    target: String,
}

impl TranslationDirection {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl FromStr for TranslationDirection {
    type Err = SubtransError;

    fn from_str(s: &str) -> Result<Self> {
        if !DIRECTION_PATTERN.is_match(s) {
            return Err(SubtransError::Usage(format!(
                "invalid translation direction '{}', expected 'from:to' such as 'en:fr'",
                s
            )));
        }

        let (source, target) = s.split_at(2);
        Ok(Self {
            source: source.to_string(),
            target: target[1..].to_string(),
        })
    }
}

impl fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source, self.target)
    }
}
