// src/resolve/template.rs

//! `{name}` placeholder expansion for command templates.
//!
//! Known placeholders:
//! - `{file}`: the file name exactly as given.
//! - `{stem}`: the file name with the matched extension removed once from
//!   the end (`src/hello.c` → `src/hello`).
//! - `{exe}`: `{stem}` as something a process spawner can execute from the
//!   working directory (`hello` → `./hello`, `/tmp/hello` unchanged).

use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

pub const PLACEHOLDERS: &[&str] = &["file", "stem", "exe"];

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"))
}

/// Placeholder names in `template` that [`TemplateVars`] cannot fill.
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    placeholder_re()
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .filter(|name| !PLACEHOLDERS.contains(&name.as_str()))
        .collect()
}

/// True if `template` needs a non-empty stem.
pub fn uses_stem(template: &str) -> bool {
    placeholder_re()
        .captures_iter(template)
        .any(|caps| matches!(&caps[1], "stem" | "exe"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars<'a> {
    file: &'a str,
    stem: &'a str,
    exe: String,
}

impl<'a> TemplateVars<'a> {
    /// `extension` must be a suffix of `file_name`.
    pub fn for_file(file_name: &'a str, extension: &str) -> Self {
        let stem = file_name.strip_suffix(extension).unwrap_or(file_name);
        Self {
            file: file_name,
            stem,
            exe: executable_path(stem),
        }
    }

    pub fn stem(&self) -> &str {
        self.stem
    }

    /// Last path component of the stem: empty for `dir/.c` as well as `.c`.
    pub fn stem_name(&self) -> &str {
        self.stem
            .rsplit(std::path::is_separator)
            .next()
            .unwrap_or(self.stem)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "file" => Some(self.file),
            "stem" => Some(self.stem),
            "exe" => Some(&self.exe),
            _ => None,
        }
    }

    /// Expand known placeholders; unknown ones are left as written.
    pub fn render(&self, template: &str) -> String {
        placeholder_re()
            .replace_all(template, |caps: &Captures| {
                self.get(&caps[1])
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn executable_path(stem: &str) -> String {
    if Path::new(stem).is_absolute() || stem.starts_with("./") || stem.starts_with("../") {
        stem.to_string()
    } else {
        format!("./{stem}")
    }
}
