//! lciafmt CLI
//!
//! Command-line interface for mapping, collapsing and exporting LCIA methods

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use lciafmt_core::{DEFAULT_LOG_FILTER, DuplicatePolicy, init_tracing};
use std::io;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "lciafmt")]
#[command(about = "lciafmt: harmonize LCIA methods onto a common flow list")]
#[command(version = lciafmt_core::VERSION)]
#[command(
    long_about = "lciafmt maps the elementary flows of LCIA characterization tables onto a\n\
target flow list, collapses duplicate factors and exports JSON-LD packages.\n\
\n\
Examples:\n  \
lciafmt map traci.csv mapped.csv -s TRACI2.1      # Map onto a bundled system\n  \
lciafmt collapse mapped.csv final.csv --policy sum\n  \
lciafmt jsonld final.csv traci.zip                # Export a JSON-LD package\n  \
lciafmt mapped TRACI --source raw/ -o traci.csv   # Generate and store a mapped method\n  \
lciafmt config init                               # Initialize configuration file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.lciafmtrc.json/.lciafmtrc.toml/lciafmt.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported LCIA methods
    Methods {
        /// Print metadata as JSON
        #[arg(long, help = "Print method metadata as JSON")]
        json: bool,
    },

    /// List the bundled mapping systems
    Systems,

    /// Map the flows of a characterization table onto a target flow list
    Map {
        /// Input table (.csv or .json)
        input: PathBuf,

        /// Output table (.csv or .json)
        output: PathBuf,

        /// Named mapping system
        #[arg(
            short,
            long,
            required_unless_present = "mapping",
            help = "Mapping system name (see 'lciafmt systems')"
        )]
        system: Option<String>,

        /// Mapping file in flow-list mapping format
        #[arg(short, long, conflicts_with = "system", help = "Mapping file (.csv)")]
        mapping: Option<PathBuf>,

        /// Keep rows without a mapping entry
        #[arg(
            long,
            overrides_with = "no_preserve_unmapped",
            help = "Keep unmapped rows instead of dropping them"
        )]
        preserve_unmapped: bool,

        #[arg(
            long,
            overrides_with = "preserve_unmapped",
            help = "Drop unmapped rows even when the config keeps them"
        )]
        no_preserve_unmapped: bool,

        /// Case-insensitive flow matching
        #[arg(
            long,
            overrides_with = "no_case_insensitive",
            help = "Match flow names and contexts case-insensitively"
        )]
        case_insensitive: bool,

        #[arg(
            long,
            overrides_with = "case_insensitive",
            help = "Match flow names and contexts exactly even when the config does not"
        )]
        no_case_insensitive: bool,
    },

    /// Collapse duplicate factors of mapped indicators
    Collapse {
        /// Input table (.csv or .json)
        input: PathBuf,

        /// Output table (.csv or .json)
        output: PathBuf,

        /// Treatment of conflicting factors
        #[arg(
            long,
            help = "Conflict policy: keep-all, keep-first, sum or average (default: config or keep-all)"
        )]
        policy: Option<DuplicatePolicy>,
    },

    /// Export a characterization table as a JSON-LD zip package
    #[command(name = "jsonld")]
    JsonLd {
        /// Input table (.csv or .json)
        input: PathBuf,

        /// Output zip package
        output: PathBuf,

        /// Skip flows and flow categories
        #[arg(long, help = "Do not write flows and flow categories")]
        no_flows: bool,
    },

    /// Get a mapped method, generating and storing it on first use
    Mapped {
        /// Method id, name or alias
        method: String,

        /// Raw method table, or a directory of tables named after the method
        #[arg(long, help = "Raw method table or directory used when nothing is stored")]
        source: PathBuf,

        /// Write the mapped table here
        #[arg(short, long, help = "Output table (.csv or .json)")]
        output: Option<PathBuf>,

        /// Keep only these indicators
        #[arg(long = "indicator", help = "Keep only this indicator (repeatable)")]
        indicators: Vec<String>,

        /// Keep only these sub-methods
        #[arg(long = "submethod", help = "Keep only this sub-method (repeatable)")]
        methods: Vec<String>,
    },

    /// List the indicators of a stored mapped method
    Indicators {
        /// Method id, name or alias
        method: String,
    },

    /// Manage the local file cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete cached files and stored methods
    Clear,
    /// Print the cache folder
    Path,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration format
        #[arg(short, long, default_value = "json", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        path: Option<PathBuf>,
    },

    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// TOML configuration format
    Toml,
    /// YAML configuration format
    Yaml,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return;
    }

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let log_filter = match cli.verbose {
        0 => DEFAULT_LOG_FILTER,
        1 => "lciafmt=debug",
        _ => "lciafmt=trace",
    };
    init_tracing(log_filter);

    if let Err(e) = run_command(cli) {
        error!("lciafmt failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Explicit value of a `--x`/`--no-x` flag pair, `None` when neither is given
fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Some(Commands::Methods { json }) => commands::methods_command(json),

        Some(Commands::Systems) => commands::systems_command(),

        Some(Commands::Map {
            input,
            output,
            system,
            mapping,
            preserve_unmapped,
            no_preserve_unmapped,
            case_insensitive,
            no_case_insensitive,
        }) => commands::map_command(
            &input,
            &output,
            system,
            mapping,
            flag(preserve_unmapped, no_preserve_unmapped),
            flag(case_insensitive, no_case_insensitive),
            config_path,
        ),

        Some(Commands::Collapse {
            input,
            output,
            policy,
        }) => commands::collapse_command(&input, &output, policy, config_path),

        Some(Commands::JsonLd {
            input,
            output,
            no_flows,
        }) => commands::jsonld_command(&input, &output, no_flows, config_path),

        Some(Commands::Mapped {
            method,
            source,
            output,
            indicators,
            methods,
        }) => commands::mapped_command(
            &method,
            &source,
            output.as_deref(),
            indicators,
            methods,
            config_path,
        ),

        Some(Commands::Indicators { method }) => {
            commands::indicators_command(&method, config_path)
        }

        Some(Commands::Cache { action }) => match action {
            CacheAction::Clear => commands::cache_clear_command(config_path),
            CacheAction::Path => commands::cache_path_command(config_path),
        },

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { format, force } => commands::config::init_command(format, force),
            ConfigAction::Show => commands::config::show_command(config_path),
            ConfigAction::Validate { path } => {
                commands::config::validate_command(path.as_deref().or(config_path))
            }
            ConfigAction::Schema => commands::config::schema_command(),
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("lciafmt {}", lciafmt_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
                println!(
                    "  Mapping systems: {}",
                    lciafmt_core::supported_mapping_systems().join(", ")
                );
            } else {
                println!("{}", lciafmt_core::VERSION);
            }
            Ok(())
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
