// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::DEFAULT_MAX_OUTPUT_BYTES;
use crate::types::StepPolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// timeout = "10s"
/// max_output_bytes = 50000
/// on_step_failure = "stop"
///
/// [language.ruby]
/// extensions = [".rb"]
/// run = "ruby {file}"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Runner behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Extra languages from `[language.<id>]`.
    #[serde(default)]
    pub language: BTreeMap<String, LanguageConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Per-step time limit such as `"10s"`; absent means no limit.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Cap on captured output across the whole run; `0` disables the cap.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// `"stop"` (default) or `"continue"`.
    #[serde(default)]
    pub on_step_failure: StepPolicy,

    /// Run each command line through the platform shell instead of
    /// executing the first token directly.
    #[serde(default)]
    pub shell: bool,
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            timeout: None,
            max_output_bytes: default_max_output_bytes(),
            on_step_failure: StepPolicy::default(),
            shell: false,
        }
    }
}

/// `[language.<id>]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Suffixes including the dot, e.g. `[".rb"]`.
    pub extensions: Vec<String>,

    /// Optional build command template.
    #[serde(default)]
    pub compile: Option<String>,

    /// Command template that runs the program.
    pub run: String,
}

/// Validated configuration.
///
/// Construct via `ConfigFile::try_from(raw)` (see `validate.rs`) so the
/// invariants checked there always hold.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub language: BTreeMap<String, LanguageConfig>,
    timeout: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        language: BTreeMap<String, LanguageConfig>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            config,
            language,
            timeout,
        }
    }

    /// Parsed `[config].timeout`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `[config].max_output_bytes`, with `0` mapped to "no cap".
    pub fn max_output_bytes(&self) -> Option<usize> {
        match self.config.max_output_bytes {
            0 => None,
            n => Some(n),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ConfigSection::default(), BTreeMap::new(), None)
    }
}
