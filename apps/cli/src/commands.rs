//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use styleguide_core::export::{ExportMeta, export};
use styleguide_core::pipeline::{self, PipelineConfig, PipelineOutput, ProgressReporter, SilentProgress};
use styleguide_shared::{
    AppConfig, SubstitutionConfig, init_config, load_config, load_config_from, validate_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Styleguide — turn documented stylesheets into a style guide model.
#[derive(Parser)]
#[command(
    name = "styleguide",
    version,
    about = "Extract DocBlock annotations from SCSS into a grouped style guide and search index.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./styleguide.toml when present).
    #[arg(short, long, global = true, env = "STYLEGUIDE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl stylesheets and export the style guide JSON files.
    Build {
        /// Stylesheets or glob patterns. Defaults to `project.files`.
        files: Vec<String>,

        /// Output directory (overrides `project.target`).
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Reproducible filler text and image URLs.
        #[arg(long)]
        static_lipsum: bool,

        /// Image URL template using `${width}` and `${height}`.
        #[arg(long)]
        placeholder_service: Option<String>,
    },

    /// Print the crawled DocBlock records as JSON without building entities.
    Inspect {
        /// Stylesheets or glob patterns. Defaults to `project.files`.
        files: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "styleguide=info",
        1 => "styleguide=debug",
        _ => "styleguide=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build {
            files,
            target,
            static_lipsum,
            placeholder_service,
        } => cmd_build(
            config_path,
            &files,
            target,
            static_lipsum,
            placeholder_service,
        ),
        Command::Inspect { files } => cmd_inspect(config_path, &files),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(
    config_path: Option<&Path>,
    files: &[String],
    target: Option<PathBuf>,
    static_lipsum: bool,
    placeholder_service: Option<String>,
) -> Result<()> {
    let mut config = resolve_config(config_path)?;

    // CLI flags override config file values
    if let Some(target) = &target {
        config.project.target = target.to_string_lossy().to_string();
    }
    if static_lipsum {
        config.substitution.static_lipsum = true;
    }
    if let Some(service) = placeholder_service {
        config.substitution.placeholder_service = service;
    }
    validate_config(&config)?;

    let pipeline_config = PipelineConfig {
        files: resolve_files(&config, files)?,
        substitution: SubstitutionConfig::from(&config),
    };

    info!(
        files = pipeline_config.files.len(),
        target = %config.project.target,
        static_lipsum = pipeline_config.substitution.static_lipsum,
        "building style guide"
    );

    let reporter = CliProgress::new();
    let output = pipeline::run(&pipeline_config, &reporter)?;

    let meta = ExportMeta {
        title: config.project.title.clone(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let target = PathBuf::from(&config.project.target);
    let result = export(&target, &meta, &output)?;

    println!();
    println!("  Style guide built!");
    println!("  Files:    {}", output.file_count);
    println!("  Entities: {}", output.entity_count);
    println!("  Sections: {}", output.guide.sections.len());
    println!("  Warnings: {}", output.diagnostics.len());
    println!("  Path:     {}", result.target.display());
    println!("  Time:     {:.1}s", output.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_inspect(config_path: Option<&Path>, files: &[String]) -> Result<()> {
    let config = resolve_config(config_path)?;
    let files = resolve_files(&config, files)?;

    info!(files = files.len(), "inspecting stylesheets");

    let styles = pipeline::crawl(&files, &SilentProgress)?;
    println!("{}", serde_json::to_string_pretty(&styles)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let cwd = std::env::current_dir()
        .map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    let path = init_config(&cwd)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Expand CLI patterns, or the configured ones when none were given.
fn resolve_files(config: &AppConfig, cli_patterns: &[String]) -> Result<Vec<PathBuf>> {
    let patterns: &[String] = if cli_patterns.is_empty() {
        &config.project.files
    } else {
        cli_patterns
    };

    let files = styleguide_crawler::discover_files(patterns)?;
    if files.is_empty() {
        return Err(eyre!(
            "no stylesheets matched {}",
            patterns.join(", ")
        ));
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_crawled(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Crawling [{current}/{total}] {}", path.display()));
    }

    fn done(&self, _output: &PipelineOutput) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_build_flags() {
        let cli = Cli::try_parse_from([
            "styleguide",
            "-vv",
            "build",
            "src/a.scss",
            "src/b.scss",
            "--target",
            "out",
            "--static-lipsum",
            "--placeholder-service",
            "https://placehold.co/${width}x${height}",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Build {
            files,
            target,
            static_lipsum,
            placeholder_service,
        } = cli.command
        else {
            panic!("expected build");
        };
        assert_eq!(files, vec!["src/a.scss", "src/b.scss"]);
        assert_eq!(target, Some(PathBuf::from("out")));
        assert!(static_lipsum);
        assert!(placeholder_service.is_some());
    }

    #[test]
    fn parses_config_subcommands() {
        let cli = Cli::try_parse_from(["styleguide", "config", "show", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn configured_patterns_are_used_when_none_given() {
        let mut config = AppConfig::default();
        config.project.files = vec!["../../fixtures/scss/colors.scss".into()];
        let files = resolve_files(&config, &[]).unwrap();
        assert_eq!(files.len(), 1);

        let err = resolve_files(&config, &["does/not/exist/*.scss".to_string()]).unwrap_err();
        assert!(err.to_string().contains("no stylesheets matched"));
    }
}
