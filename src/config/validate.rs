// src/config/validate.rs

use std::collections::BTreeMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CoderunError, Result};
use crate::resolve::template::unknown_placeholders;
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::CoderunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let timeout = validate_global_config(&raw)?;
        validate_languages(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.language, timeout))
    }
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<Option<std::time::Duration>> {
    // on_step_failure is strongly typed and validated during deserialization.
    let Some(raw) = cfg.config.timeout.as_deref() else {
        return Ok(None);
    };

    let timeout = parse_duration(raw).map_err(|e| {
        CoderunError::ConfigError(format!("[config].timeout: {e}"))
    })?;

    if timeout.is_zero() {
        return Err(CoderunError::ConfigError(
            "[config].timeout must be greater than zero".to_string(),
        ));
    }

    Ok(Some(timeout))
}

fn validate_languages(cfg: &RawConfigFile) -> Result<()> {
    let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();

    for (name, lang) in cfg.language.iter() {
        if lang.extensions.is_empty() {
            return Err(CoderunError::ConfigError(format!(
                "language '{}' must list at least one extension",
                name
            )));
        }

        for ext in lang.extensions.iter() {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(CoderunError::ConfigError(format!(
                    "language '{}' has invalid extension '{}' (expected e.g. \".rb\")",
                    name, ext
                )));
            }
            if let Some(other) = claimed.insert(ext.as_str(), name.as_str()) {
                return Err(CoderunError::ConfigError(format!(
                    "extension '{}' is claimed by both '{}' and '{}'",
                    ext, other, name
                )));
            }
        }

        validate_template(name, "run", &lang.run)?;
        if let Some(compile) = &lang.compile {
            validate_template(name, "compile", compile)?;
        }
    }

    Ok(())
}

fn validate_template(language: &str, field: &str, template: &str) -> Result<()> {
    if template.trim().is_empty() {
        return Err(CoderunError::ConfigError(format!(
            "language '{}' has an empty `{}` command",
            language, field
        )));
    }

    let unknown = unknown_placeholders(template);
    if !unknown.is_empty() {
        return Err(CoderunError::ConfigError(format!(
            "language '{}' `{}` uses unknown placeholder(s) {:?}; expected {{file}}, {{stem}} or {{exe}}",
            language, field, unknown
        )));
    }

    Ok(())
}
