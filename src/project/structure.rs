//! Module and build-variant outline of an Android project
//!
//! Derived from the Gradle build files with plain text matching; no Gradle
//! evaluation happens, so modules added by script logic are not seen.

use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Build types every Android module has without declaring them
pub const DEFAULT_BUILD_VARIANTS: [&str; 2] = ["debug", "release"];

const SETTINGS_FILES: [&str; 2] = ["settings.gradle.kts", "settings.gradle"];
const MODULE_BUILD_FILES: [&str; 2] = ["build.gradle.kts", "build.gradle"];

// include(":app", ":feature:login") / include ':app', ':lib'
static INCLUDE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*include\b(.*)$").expect("include pattern is valid"));

static QUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("quoted pattern is valid"));

static BUILD_TYPES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bbuildTypes\s*\{").expect("buildTypes pattern is valid"));

// create("staging") / register("qa") / getByName("release") / maybeCreate("x")
static NAMED_BUILD_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:create|register|getByName|maybeCreate)\s*\(\s*["'](\w+)["']"#)
        .expect("named build type pattern is valid")
});

// Groovy DSL: `staging {` at the start of a line
static BLOCK_BUILD_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\w+)\s*(?:\([^)]*\))?\s*\{").expect("block build type pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Gradle project path without the leading colon, e.g. `feature:login`
    pub name: String,
    /// Directory relative to the project root
    pub path: String,
    pub build_variants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStructure {
    pub name: String,
    pub modules: Vec<ModuleInfo>,
}

impl ProjectStructure {
    /// Inspect the project at `project_dir`.
    ///
    /// Unreadable build files are treated as empty.
    pub fn scan(name: &str, project_dir: &Path) -> Self {
        let module_names = settings_modules(project_dir)
            .filter(|modules| !modules.is_empty())
            .unwrap_or_else(|| subdirectory_modules(project_dir));

        let modules = module_names
            .into_iter()
            .map(|module| {
                let path = module.replace(':', "/");
                let build_variants = module_build_file(&project_dir.join(&path))
                    .map(|content| build_variants(&content))
                    .unwrap_or_else(default_variants);
                ModuleInfo {
                    name: module,
                    path,
                    build_variants,
                }
            })
            .collect();

        Self {
            name: name.to_string(),
            modules,
        }
    }
}

impl fmt::Display for ProjectStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project: {}", self.name)?;
        if self.modules.is_empty() {
            return writeln!(f, "|\n+-- (no modules found)");
        }

        for (index, module) in self.modules.iter().enumerate() {
            let last = index + 1 == self.modules.len();
            let rail = if last { " " } else { "|" };

            writeln!(f, "|")?;
            writeln!(f, "+-- {} (Module)", module.name)?;
            writeln!(f, "{rail}   |")?;
            writeln!(f, "{rail}   +-- Build Variants:")?;
            for variant in &module.build_variants {
                writeln!(f, "{rail}       +-- {variant}")?;
            }
        }
        Ok(())
    }
}

/// Modules from the settings file, `None` if there is no settings file
fn settings_modules(project_dir: &Path) -> Option<Vec<String>> {
    let content = SETTINGS_FILES
        .iter()
        .find_map(|file| fs::read_to_string(project_dir.join(file)).ok())?;
    Some(parse_includes(&content))
}

/// Module paths named by `include` statements.
///
/// A statement continues on the next line after a trailing comma or while
/// its parenthesis is open.
fn parse_includes(settings: &str) -> Vec<String> {
    let mut modules: Vec<String> = Vec::new();
    let mut continued = false;
    let mut open_paren = false;

    for line in settings.lines() {
        let mut statement = if continued {
            line
        } else if let Some(arguments) = INCLUDE_REGEX.captures(line).and_then(|caps| caps.get(1)) {
            let arguments = arguments.as_str();
            open_paren = arguments.trim_start().starts_with('(');
            arguments
        } else {
            continue;
        };

        if let Some(end) = statement.find(')') {
            statement = &statement[..end];
            open_paren = false;
        }

        for quoted in QUOTED_REGEX.captures_iter(statement) {
            let module = quoted[1].trim_start_matches(':').to_string();
            if !module.is_empty() && !modules.contains(&module) {
                modules.push(module);
            }
        }

        continued = open_paren || statement.trim_end().ends_with(',');
    }
    modules
}

/// Immediate subdirectories that carry their own build file
fn subdirectory_modules(project_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(project_dir) else {
        return Vec::new();
    };

    let mut modules: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| {
            MODULE_BUILD_FILES
                .iter()
                .any(|file| entry.path().join(file).is_file())
        })
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    modules.sort();
    modules
}

fn module_build_file(module_dir: &Path) -> Option<String> {
    let content = MODULE_BUILD_FILES
        .iter()
        .find_map(|file| fs::read_to_string(module_dir.join(file)).ok());
    if content.is_none() {
        debug!("No build file in module {}", module_dir.display());
    }
    content
}

fn default_variants() -> Vec<String> {
    DEFAULT_BUILD_VARIANTS.iter().map(|v| v.to_string()).collect()
}

/// `debug`, `release`, then every build type declared in `buildTypes { }`
fn build_variants(build_file: &str) -> Vec<String> {
    let mut variants = default_variants();

    let Some(block) = build_types_block(build_file) else {
        return variants;
    };

    let mut found: Vec<(usize, String)> = NAMED_BUILD_TYPE_REGEX
        .captures_iter(block)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps[1].to_string())))
        .collect();

    // Groovy-style blocks only count at the top level of buildTypes
    for (offset, line) in top_level_lines(block) {
        if NAMED_BUILD_TYPE_REGEX.is_match(line) {
            continue;
        }
        if let Some(caps) = BLOCK_BUILD_TYPE_REGEX.captures(line) {
            found.push((offset, caps[1].to_string()));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    for (_, name) in found {
        if !is_dsl_keyword(&name) && !variants.contains(&name) {
            variants.push(name);
        }
    }
    variants
}

/// Body of the first `buildTypes { ... }` block, without the outer braces
fn build_types_block(build_file: &str) -> Option<&str> {
    let start = BUILD_TYPES_REGEX.find(build_file)?.end();
    let mut depth = 1usize;
    for (index, ch) in build_file[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&build_file[start..start + index]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Lines of `block` that start at brace depth zero, with their byte offsets
fn top_level_lines(block: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut offset = 0usize;
    for line in block.split_inclusive('\n') {
        if depth == 0 {
            lines.push((offset, line));
        }
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        offset += line.len();
    }
    lines
}

fn is_dsl_keyword(name: &str) -> bool {
    matches!(
        name,
        "all" | "configureEach" | "named" | "withType" | "create" | "register" | "getByName"
            | "maybeCreate"
    )
}
