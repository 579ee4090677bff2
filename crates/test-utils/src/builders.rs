#![allow(dead_code)]

use std::collections::BTreeMap;

use coderun::config::{ConfigFile, ConfigSection, LanguageConfig, RawConfigFile};
use coderun::resolve::{CommandPlan, StepRole};

/// Builder for `CommandPlan` to simplify runner tests.
pub struct PlanBuilder {
    plan: CommandPlan,
}

impl PlanBuilder {
    pub fn new(language: &str, file_name: &str) -> Self {
        Self {
            plan: CommandPlan::new(language, file_name),
        }
    }

    pub fn compile(mut self, cmd: &str) -> Self {
        self.plan = self.plan.with_step(StepRole::Compile, cmd);
        self
    }

    pub fn run(mut self, cmd: &str) -> Self {
        self.plan = self.plan.with_step(StepRole::Run, cmd);
        self
    }

    pub fn build(self) -> CommandPlan {
        self.plan
    }
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                language: BTreeMap::new(),
            },
        }
    }

    pub fn timeout(mut self, value: &str) -> Self {
        self.config.config.timeout = Some(value.to_string());
        self
    }

    pub fn language(mut self, id: &str, extensions: &[&str], compile: Option<&str>, run: &str) -> Self {
        self.config.language.insert(
            id.to_string(),
            LanguageConfig {
                extensions: extensions.iter().map(|e| e.to_string()).collect(),
                compile: compile.map(str::to_string),
                run: run.to_string(),
            },
        );
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
