// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use readtogether::alignment::{normalize_words, Aligner, SequenceMatcher};
use readtogether::app_config::{self, Config};
use readtogether::coaching::ReadingCoach;
use readtogether::database::{DatabaseConnection, Repository};
use readtogether::providers::openai::OpenAI;
use readtogether::providers::Provider;
use readtogether::server::{self, AppState};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default command)
    Serve(ServeArgs),

    /// Score a transcript against a passage and print the report
    Align(AlignArgs),

    /// Generate shell completions for readtogether
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Default)]
struct ServeArgs {
    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Passage text, or @FILE to read it from a file
    #[arg(short, long)]
    target: String,

    /// Transcript text, or @FILE to read it from a file
    #[arg(long)]
    transcript: String,

    /// Also log the edit operations behind the report
    #[arg(short, long)]
    verbose: bool,
}

/// ReadTogether - read-aloud scoring service
///
/// Scores a child's reading of a passage from a speech-to-text transcript,
/// and serves the reading app's HTTP API.
#[derive(Parser, Debug)]
#[command(name = "readtogether")]
#[command(version)]
#[command(about = "Read-aloud scoring service")]
#[command(long_about = "ReadTogether scores children's read-aloud attempts and serves the reading app API.

EXAMPLES:
    readtogether                                         # Serve using default config
    readtogether serve --port 8080                       # Serve on another port
    readtogether align -t 'The cat sat' --transcript 'the cat sit'
    readtogether align -t @passage.txt --transcript @heard.txt -v
    readtogether completions bash > readtogether.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The OpenAI key may also come from OPENAI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// OpenAI API key, overriding the config file
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    openai_api_key: Option<String>,
}

struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // ANSI colour and tag per level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "readtogether", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Align(args)) => {
            let config = load_config(&cli)?;
            run_align(args, &config)
        }
        Some(Commands::Serve(args)) => run_serve(&cli, args).await,
        None => run_serve(&cli, &ServeArgs::default()).await,
    }
}

/// Load the config file and apply the global command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    if let Some(api_key) = cli.openai_api_key.as_ref().filter(|k| !k.is_empty()) {
        config.openai.api_key = api_key.clone();
    }

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

async fn run_serve(cli: &CommandLineOptions, args: &ServeArgs) -> Result<()> {
    let mut config = load_config(cli)?;

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db_path) = &args.db_path {
        config.database.path = Some(db_path.to_string_lossy().into_owned());
    }

    config.validate().context("Configuration validation failed")?;

    let connection = match config.database.path_buf() {
        Some(path) => DatabaseConnection::new(path)?,
        None => DatabaseConnection::new_default()?,
    };
    let repository = Repository::new(connection);
    let db = repository.connection();
    info!("Database ready at {:?} ({})", db.path(), db.stats()?);

    let openai = OpenAI::from_config(&config.openai);
    if !config.openai.api_key.is_empty() {
        match openai.test_connection().await {
            Ok(()) => info!("Connected to OpenAI at {}", openai.endpoint()),
            Err(e) => warn!("OpenAI API check failed, AI routes may not work: {}", e),
        }
    }
    let coach = ReadingCoach::from_config(openai.clone(), &config.openai);

    let state = Arc::new(AppState::new(
        Arc::new(openai),
        Arc::new(coach),
        repository,
        Aligner::from_config(&config.alignment),
    ));

    server::start_server(state, &config.server).await
}

fn run_align(args: &AlignArgs, config: &Config) -> Result<()> {
    let target = read_text_arg(&args.target)?;
    let transcript = read_text_arg(&args.transcript)?;

    let aligner = Aligner::from_config(&config.alignment);
    let (report, opcodes) = aligner.align_with_opcodes(&target, &transcript);

    if args.verbose {
        for opcode in &opcodes {
            info!(
                "{:<7} target[{}..{}] transcript[{}..{}]",
                opcode.tag, opcode.i1, opcode.i2, opcode.j1, opcode.j2
            );
        }
        info!("{}/{} words read correctly", report.correct_count(), report.total());

        let target_words = normalize_words(&target);
        let transcript_words = normalize_words(&transcript);
        let similarity = SequenceMatcher::new(&target_words, &transcript_words).ratio();
        info!("Similarity ratio: {:.3}", similarity);
    }

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);

    Ok(())
}

/// Literal text, or the contents of a file when prefixed with `@`
fn read_text_arg(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path)),
        None => Ok(value.to_string()),
    }
}
