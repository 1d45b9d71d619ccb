//! SCheck Blocklist CLI
//!
//! Search & filter tool for SCheck blocklist datasets.

mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::debug;
use tracing_subscriber::EnvFilter;

use scheckbl_core::{Blocklist, BlocklistError, DEFAULT_THRESHOLD};
use scheckbl_loader::{ConfigError, DirectorySource, SourceConfig};

use output::{
    auto_filename, print_content, render_entries, render_found, render_similar_json,
    render_similar_table, render_similar_text, write_output,
};

#[derive(Parser)]
#[command(name = "scheckbl", version)]
#[command(about = "Search & filter tool for SCheck blocklist datasets")]
struct Cli {
    /// Dataset root directory
    #[arg(long, global = true, env = "SCHECKBL_DATA")]
    data: Option<PathBuf>,

    /// JSON source configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Compare entries case-insensitively unless a category overrides it
    #[arg(long, global = true)]
    ignore_case: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check if a keyword exists in a blocklist
    Check {
        /// Blocklist type (e.g. phrases, urls)
        type_name: String,
        /// Category (e.g. vulgarisms, nsfw)
        category: String,
        /// Exact keyword to verify
        keyword: String,
    },

    /// Scan a text for any blocklisted entry
    Find {
        type_name: String,
        category: String,
        /// Full sentence or message to analyze
        text: String,
    },

    /// Retrieve entries and save them to a file
    Get {
        type_name: String,
        category: String,

        /// Specific dataset file
        #[arg(short, long, value_name = "NAME")]
        filename: Option<String>,

        /// Keep only entries matching this regex
        #[arg(short, long, value_name = "PATTERN")]
        regex: Option<String>,

        /// Output file (default: auto-named in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Find entries similar to a phrase
    Similar {
        type_name: String,
        category: String,
        /// Input phrase to compare
        phrase: String,

        /// Minimum similarity (0.0-1.0)
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// Write JSON instead of text
        #[arg(long)]
        json: bool,

        /// Output file (default: auto-named in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// List blocklist types, or the categories of one type
    List {
        type_name: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Blocklist(#[from] BlocklistError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Write error: {0}")]
    Output(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Blocklist(BlocklistError::NotFound { .. }) => 2,
            Self::Blocklist(BlocklistError::Pattern(_)) => 3,
            Self::Blocklist(BlocklistError::InvalidArgument(_)) => 4,
            Self::Blocklist(BlocklistError::Io { .. }) => 5,
            Self::Config(ConfigError::Parse(_)) => 4,
            Self::Config(ConfigError::Io { .. }) => 5,
            Self::Output(_) => 5,
        }
    }
}

/// Exit code for check/find when nothing matched.
const EXIT_NO_MATCH: i32 = 1;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ Error: {e}");
            e.exit_code()
        }
    };

    std::process::exit(code);
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn source_config(cli: &Cli) -> Result<SourceConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => SourceConfig::from_file(path)?,
        None => SourceConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.base_path = data.clone();
    }
    if cli.ignore_case {
        config.case_sensitive = false;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let config = source_config(&cli)?;
    debug!("Using datasets under '{}'", config.base_path.display());
    let blocklist = Blocklist::new(DirectorySource::new(config));

    match cli.command {
        Commands::Check {
            type_name,
            category,
            keyword,
        } => {
            let found = blocklist.check(&type_name, &category, &keyword)?;
            Ok(report_found(found))
        }
        Commands::Find {
            type_name,
            category,
            text,
        } => {
            let found = blocklist.find(&type_name, &category, &text)?;
            Ok(report_found(found))
        }
        Commands::Get {
            type_name,
            category,
            filename,
            regex,
            output,
            stdout,
        } => {
            let entries = blocklist.get(&type_name, &category, filename.as_deref(), regex.as_deref())?;
            let content = render_entries(&entries);
            if stdout {
                print_content(&mut std::io::stdout().lock(), &content)
                    .map_err(|e| CliError::Output(e.to_string()))?;
            } else {
                let path = output.unwrap_or_else(|| auto_filename(&[type_name.as_str(), category.as_str(), "get"], "txt"));
                save(&path, &content)?;
            }
            Ok(0)
        }
        Commands::Similar {
            type_name,
            category,
            phrase,
            threshold,
            json,
            output,
            stdout,
        } => {
            let results = blocklist.similar(&type_name, &category, &phrase, threshold)?;
            if results.is_empty() {
                println!("⚠ No similar entries found for threshold {threshold}");
                return Ok(0);
            }

            let (content, ext) = match (json, stdout) {
                (true, _) => (render_similar_json(&results).map_err(CliError::Output)?, "json"),
                (false, true) => (render_similar_table(&results, threshold), "txt"),
                (false, false) => (render_similar_text(&results), "txt"),
            };

            if stdout {
                print_content(&mut std::io::stdout().lock(), &content)
                    .map_err(|e| CliError::Output(e.to_string()))?;
            } else {
                let path = output.unwrap_or_else(|| auto_filename(&[type_name.as_str(), category.as_str(), "similar"], ext));
                save(&path, &content)?;
            }
            Ok(0)
        }
        Commands::List { type_name } => {
            let source = blocklist.source();
            let names = match &type_name {
                Some(type_name) => source.categories(type_name)?,
                None => source.types()?,
            };
            for name in names {
                println!("{name}");
            }
            Ok(0)
        }
    }
}

fn report_found(found: bool) -> i32 {
    println!("{}", render_found(found));
    if found {
        0
    } else {
        EXIT_NO_MATCH
    }
}

fn save(path: &Path, content: &str) -> Result<(), CliError> {
    write_output(path, content).map_err(CliError::Output)?;
    println!("✓ Saved → {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::CommandFactory;

    use super::*;

    fn dataset_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let phrases = dir.path().join("phrases");
        fs::create_dir_all(&phrases).unwrap();
        fs::write(phrases.join("vulgarisms.txt"), "darn\nheck\n").unwrap();
        dir
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn similar_defaults_threshold() {
        let cli = parse(&["scheckbl", "similar", "phrases", "vulgarisms", "darm"]);
        match cli.command {
            Commands::Similar { threshold, json, stdout, .. } => {
                assert_eq!(threshold, DEFAULT_THRESHOLD);
                assert!(!json);
                assert!(!stdout);
            }
            _ => panic!("expected similar"),
        }
    }

    #[test]
    fn global_flags_shape_config() {
        let cli = parse(&["scheckbl", "check", "phrases", "vulgarisms", "darn", "--data", "/lists", "--ignore-case"]);
        let config = source_config(&cli).unwrap();
        assert_eq!(config.base_path, PathBuf::from("/lists"));
        assert!(!config.case_sensitive);
    }

    #[test]
    fn check_and_find_exit_codes() {
        let dir = dataset_root();
        let data = dir.path().to_str().unwrap();

        let found = parse(&["scheckbl", "--data", data, "check", "phrases", "vulgarisms", "darn"]);
        assert_eq!(run(found).unwrap(), 0);

        let missing = parse(&["scheckbl", "--data", data, "find", "phrases", "vulgarisms", "all fine"]);
        assert_eq!(run(missing).unwrap(), EXIT_NO_MATCH);
    }

    #[test]
    fn list_types_and_categories() {
        let dir = dataset_root();
        let data = dir.path().to_str().unwrap();

        assert_eq!(run(parse(&["scheckbl", "--data", data, "list"])).unwrap(), 0);
        assert_eq!(run(parse(&["scheckbl", "--data", data, "list", "PHRASES"])).unwrap(), 0);

        let unknown = parse(&["scheckbl", "--data", data, "list", "urls"]);
        assert_eq!(run(unknown).unwrap_err().exit_code(), 2);

        let source = DirectorySource::new(SourceConfig::new(dir.path()));
        assert_eq!(source.types().unwrap(), ["phrases"]);
        assert_eq!(source.categories("phrases").unwrap(), ["vulgarisms"]);
    }

    #[test]
    fn get_stdout_with_no_matches_succeeds() {
        let dir = dataset_root();
        let data = dir.path().to_str().unwrap();
        let cli = parse(&["scheckbl", "--data", data, "get", "phrases", "vulgarisms", "-r", "^zzz", "--stdout"]);
        assert_eq!(run(cli).unwrap(), 0);
    }

    #[test]
    fn errors_map_to_exit_codes() {
        let dir = dataset_root();
        let data = dir.path().to_str().unwrap();

        let unknown = parse(&["scheckbl", "--data", data, "check", "urls", "nsfw", "x"]);
        assert_eq!(run(unknown).unwrap_err().exit_code(), 2);

        let bad_regex = parse(&["scheckbl", "--data", data, "get", "phrases", "vulgarisms", "-r", "(", "--stdout"]);
        assert_eq!(run(bad_regex).unwrap_err().exit_code(), 3);

        let bad_threshold = parse(&["scheckbl", "--data", data, "similar", "phrases", "vulgarisms", "x", "-t", "1.5"]);
        assert_eq!(run(bad_threshold).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn get_writes_requested_output() {
        let dir = dataset_root();
        let data = dir.path().to_str().unwrap();
        let out = dir.path().join("out/entries.txt");

        let cli = parse(&["scheckbl", "--data", data, "get", "phrases", "vulgarisms", "-o", out.to_str().unwrap()]);
        assert_eq!(run(cli).unwrap(), 0);
        assert_eq!(fs::read_to_string(out).unwrap(), "darn\nheck");
    }

    #[test]
    fn similar_writes_json() {
        let dir = dataset_root();
        let data = dir.path().to_str().unwrap();
        let out = dir.path().join("similar.json");

        let cli = parse(&[
            "scheckbl", "--data", data, "similar", "phrases", "vulgarisms", "darn", "--json", "-o",
            out.to_str().unwrap(),
        ]);
        assert_eq!(run(cli).unwrap(), 0);

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(parsed, serde_json::json!([["darn", 1.0]]));
    }
}
