// src/resolve/mod.rs

//! Command resolution: file name → [`CommandPlan`].
//!
//! - [`table`] holds the built-in language table and the [`Language`] type.
//! - [`template`] expands `{file}` / `{stem}` / `{exe}` placeholders.
//! - [`plan`] defines the plan handed to the runner.
//!
//! Resolution is pure: it never touches the filesystem, so a plan can be
//! produced for a file that does not exist yet.

pub mod plan;
pub mod table;
pub mod template;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::LanguageConfig;
use crate::errors::ResolveError;

pub use plan::{CommandPlan, PlanStep, StepRole};
pub use table::{Language, builtin_languages};
pub use template::TemplateVars;

/// Resolve `file_name` against the built-in table.
pub fn resolve(file_name: &str) -> Result<CommandPlan, ResolveError> {
    Resolver::builtin().resolve(file_name)
}

/// Suffix table lookup, optionally extended by configured languages.
#[derive(Debug, Clone)]
pub struct Resolver {
    languages: Vec<Language>,
}

impl Resolver {
    pub fn builtin() -> Self {
        Self {
            languages: builtin_languages(),
        }
    }

    /// Built-in table plus configured languages.
    ///
    /// A configured extension takes over that extension from whichever
    /// built-in language had it; a built-in left with no extensions is
    /// dropped.
    pub fn with_configured(configured: &BTreeMap<String, LanguageConfig>) -> Self {
        let mut languages = builtin_languages();

        for (id, cfg) in configured {
            for lang in languages.iter_mut() {
                lang.extensions.retain(|ext| !cfg.extensions.contains(ext));
            }
            languages.retain(|lang| !lang.extensions.is_empty());

            debug!(language = %id, extensions = ?cfg.extensions, "registering configured language");
            languages.push(Language {
                id: id.clone(),
                extensions: cfg.extensions.clone(),
                compile: cfg.compile.clone(),
                run: cfg.run.clone(),
            });
        }

        Self { languages }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Find the language whose extension is the longest exact suffix of
    /// `file_name`, together with that extension.
    pub fn lookup(&self, file_name: &str) -> Option<(&Language, &str)> {
        self.languages
            .iter()
            .flat_map(|lang| lang.extensions.iter().map(move |ext| (lang, ext.as_str())))
            .filter(|(_, ext)| file_name.ends_with(ext))
            .max_by_key(|(_, ext)| ext.len())
    }

    pub fn resolve(&self, file_name: &str) -> Result<CommandPlan, ResolveError> {
        let Some((lang, extension)) = self.lookup(file_name) else {
            return Err(ResolveError::UnsupportedFileType {
                file_name: file_name.to_string(),
            });
        };

        let vars = TemplateVars::for_file(file_name, extension);
        if vars.stem_name().is_empty() && lang.templates().any(template::uses_stem) {
            return Err(ResolveError::MissingStem {
                file_name: file_name.to_string(),
                extension: extension.to_string(),
            });
        }

        let mut plan = CommandPlan::new(&lang.id, file_name);
        if let Some(compile) = &lang.compile {
            plan = plan.with_step(StepRole::Compile, vars.render(compile));
        }
        plan = plan.with_step(StepRole::Run, vars.render(&lang.run));

        debug!(
            file = %file_name,
            language = %lang.id,
            commands = ?plan.commands(),
            "resolved command plan"
        );
        Ok(plan)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::builtin()
    }
}
