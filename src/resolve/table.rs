// src/resolve/table.rs

//! Built-in extension table.

/// One entry of the resolver table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: String,
    /// Exact, case-sensitive suffixes including the leading dot.
    pub extensions: Vec<String>,
    /// Optional build step template, run before `run`.
    pub compile: Option<String>,
    pub run: String,
}

impl Language {
    fn builtin(id: &str, extensions: &[&str], compile: Option<&str>, run: &str) -> Self {
        Self {
            id: id.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            compile: compile.map(str::to_string),
            run: run.to_string(),
        }
    }

    pub fn is_compiled(&self) -> bool {
        self.compile.is_some()
    }

    /// Compile template (if any) followed by the run template.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.compile.as_deref().into_iter().chain(std::iter::once(self.run.as_str()))
    }
}

pub fn builtin_languages() -> Vec<Language> {
    vec![
        Language::builtin("python", &[".py"], None, "python3 {file}"),
        Language::builtin("c", &[".c"], Some("gcc {file} -o {stem}"), "{exe}"),
        Language::builtin("cpp", &[".cpp", ".c++"], Some("g++ {file} -o {stem}"), "{exe}"),
        Language::builtin("java", &[".java"], Some("javac {file}"), "java {stem}"),
        Language::builtin("php", &[".php"], None, "php {file}"),
        Language::builtin("go", &[".go"], None, "go run {file}"),
    ]
}
