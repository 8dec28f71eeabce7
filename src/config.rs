//! Configuration schema for hookdoc.
//!
//! A config file tunes which calls count as hooks and how the rule reports
//! and fixes them. Every key is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["hookdoc.yaml", ".hookdoc.yaml", "hookdoc.yml"];

/// Reporting strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrictMode {
    /// Report warnings, never fix.
    Warn,
    /// Report errors and fix them when fixing is requested.
    #[default]
    ErrorWithFix,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Dotted rule name used to match `phpcs:` pragma code lists
    pub rule_name: String,
    /// Function names treated as hook declarations
    pub hooks: Vec<String>,
    pub strict_mode: StrictMode,
    /// Doc-block tag that records the version a hook was introduced in
    pub version_tag: String,
    /// Summary line written into synthesized doc-blocks
    pub summary_placeholder: String,
    /// Columns per indentation unit when re-emitting indentation
    pub tab_width: usize,
    /// Text emitted for each full unit of indentation
    pub indent_unit: String,
    /// File extensions scanned when walking directories (without dot)
    pub extensions: Vec<String>,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/vendor/**")
    pub excluded_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rule_name: "WooCommerce.Commenting.CommentHooks".to_string(),
            hooks: vec!["do_action".to_string(), "apply_filters".to_string()],
            strict_mode: StrictMode::default(),
            version_tag: "@since".to_string(),
            summary_placeholder: "Hook".to_string(),
            tab_width: 4,
            indent_unit: "\t".to_string(),
            extensions: vec!["php".to_string(), "inc".to_string()],
            excluded_paths: vec!["**/vendor/**".to_string(), "**/node_modules/**".to_string()],
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a config from YAML text. An empty document yields the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Whether findings should be fixed when fixing is requested.
    pub fn fixes_enabled(&self) -> bool {
        self.strict_mode == StrictMode::ErrorWithFix
    }

    /// Whether a file extension is scanned.
    pub fn handles_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Look for a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Validate a config.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.hooks.is_empty() {
        anyhow::bail!("at least one hook name is required");
    }
    if let Some(hook) = config.hooks.iter().find(|h| h.trim().is_empty()) {
        anyhow::bail!("invalid hook name {:?}", hook);
    }
    if !config.version_tag.starts_with('@')
        || config.version_tag.len() < 2
        || config.version_tag.chars().any(char::is_whitespace)
    {
        anyhow::bail!(
            "version_tag must look like \"@since\", got {:?}",
            config.version_tag
        );
    }
    if config.summary_placeholder.contains("*/") || config.summary_placeholder.contains('\n') {
        anyhow::bail!("summary_placeholder must be a single line without \"*/\"");
    }
    if config.tab_width == 0 {
        anyhow::bail!("tab_width must be at least 1");
    }
    if config.indent_unit.is_empty() || !config.indent_unit.chars().all(|c| c == ' ' || c == '\t') {
        anyhow::bail!("indent_unit must be made of spaces or tabs");
    }
    if config.extensions.is_empty() {
        anyhow::bail!("at least one file extension is required");
    }
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }
    Ok(())
}
