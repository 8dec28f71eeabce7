//! Command-line interface for hookdoc.

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::report::{self, Mode};
use crate::rule::{RunResult, Runner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Check that WordPress-style hook calls are documented.
///
/// hookdoc finds every `do_action` / `apply_filters` call (or whichever hook
/// functions are configured) and requires a `/** */` doc-block with a
/// `@since` tag on the line above. `hookdoc fix` writes missing doc-blocks
/// and converts `//` and `/* */` comments in place.
#[derive(Parser)]
#[command(name = "hookdoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report undocumented hooks
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Rewrite files so every hook is documented
    Fix(FixArgs),
    /// Create a config file from a template
    Init(InitArgs),
}

/// Options shared by check and fix.
#[derive(Args)]
pub struct TargetArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover, else built-in defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct FixArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Compute fixes without writing files
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "hookdoc.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Errors with fixes for do_action and apply_filters",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "warn",
        description: "Warnings only, including the *_ref_array variants",
        content: include_str!("templates/warn.yaml"),
    },
];

/// Resolve the config: an explicit path, a discovered file next to the
/// target or in the working directory, or the defaults.
pub fn load_config(explicit: Option<&Path>, target: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let dir = if target.is_dir() {
                Some(target)
            } else {
                target.parent()
            };
            dir.and_then(config::discover)
                .or_else(|| config::discover(Path::new(".")))
        }
    };

    let config = match &path {
        Some(p) => {
            debug!(path = %p.display(), "loading config");
            Config::parse_file(p).with_context(|| format!("cannot parse config {}", p.display()))?
        }
        None => Config::default(),
    };
    config::validate(&config)?;
    Ok((config, path))
}

/// Collect files to scan under `root`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden directories
            !(e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !config.handles_extension(ext) {
            continue;
        }
        if config.is_path_excluded(path) {
            debug!(path = %path.display(), "excluded");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

struct Prepared {
    config: Config,
    files: Vec<PathBuf>,
}

fn prepare(args: &TargetArgs) -> Result<Prepared, i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", args.format);
        return Err(EXIT_ERROR);
    }

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Err(EXIT_ERROR);
        }
    };

    let config = match load_config(args.config.as_deref(), &args.path) {
        Ok((config, path)) => {
            if let Some(path) = path {
                info!(path = %path.display(), "using config");
            }
            config
        }
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Err(EXIT_ERROR);
        }
    };

    let files = if metadata.is_dir() {
        match collect_files(&args.path, &config) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(EXIT_ERROR);
            }
        }
    } else {
        vec![args.path.clone()]
    };

    Ok(Prepared { config, files })
}

fn output(args: &TargetArgs, mode: Mode, result: &RunResult, rule_name: &str) -> anyhow::Result<()> {
    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, mode, result, rule_name, args.show_suppressed)?,
        _ => report::write_pretty(&path_str, mode, result, args.show_suppressed),
    }
    Ok(())
}

fn exit_code(result: &RunResult) -> i32 {
    if result.has_errors() || result.failed_files().next().is_some() {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let prepared = match prepare(&args.target) {
        Ok(p) => p,
        Err(code) => return Ok(code),
    };
    if prepared.files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let rule_name = prepared.config.rule_name.clone();
    let runner = Runner::new(prepared.config);
    let result = runner.check_files(&prepared.files);

    output(&args.target, Mode::Check, &result, &rule_name)?;
    Ok(exit_code(&result))
}

/// Run the fix command.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let prepared = match prepare(&args.target) {
        Ok(p) => p,
        Err(code) => return Ok(code),
    };
    if prepared.files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }
    if !prepared.config.fixes_enabled() {
        eprintln!("Warning: strict_mode is 'warn'; nothing will be fixed");
    }

    let rule_name = prepared.config.rule_name.clone();
    let runner = Runner::new(prepared.config);
    let result = runner.fix_files(&prepared.files, args.dry_run);

    output(&args.target, Mode::Fix, &result, &rule_name)?;
    Ok(exit_code(&result))
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'hookdoc init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite or --output to pick another path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: hookdoc check . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  hookdoc init --template <name>");

    Ok(EXIT_SUCCESS)
}
