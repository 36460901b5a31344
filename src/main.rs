// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use tricue::app_config::{self, Config};
use tricue::app_controller::Controller;
use tricue::export::{FixedDirectory, SubtitleFormat};

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitleFormat {
    Vtt,
    Srt,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Vtt => SubtitleFormat::Vtt,
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
        }
    }
}

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
    /// Replace the rows with the texts of a spreadsheet (xlsx, xls, ods)
    Import {
        /// Workbook with EN / FR / AR header columns
        #[arg(value_name = "SPREADSHEET")]
        path: PathBuf,
    },

    /// Set the reference video
    Video {
        /// Video file (mp4, avi, mkv, mov, webm)
        #[arg(value_name = "VIDEO")]
        path: PathBuf,
    },

    /// Append an empty row
    New,

    /// Print the rows and their timings
    List,

    /// Time rows by replaying a session script (stdin when no file is given)
    Session {
        /// Script file with one command per line
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
    },

    /// Write subtitles_english/french/arabic documents into a directory
    Export {
        /// Target directory; without it the export is cancelled
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Subtitle format (overrides the configuration)
        #[arg(short, long, value_enum)]
        format: Option<CliSubtitleFormat>,
    },

    /// Generate shell completions for tricue
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// tricue - three-language subtitle timing
///
/// Times English, French and Arabic subtitle rows against a reference video
/// and exports one subtitle document per language.
#[derive(Parser, Debug)]
#[command(name = "tricue")]
#[command(author = "tricue Team")]
#[command(version = "1.0.0")]
#[command(about = "Three-language subtitle timing tool")]
#[command(long_about = "tricue keeps English, French and Arabic subtitle rows, times them against a reference video and exports them per language.

EXAMPLES:
    tricue import script.xlsx                  # Load rows from a spreadsheet
    tricue video movie.mp4                     # Set the reference video
    tricue session timing.txt                  # Time rows from a session script
    tricue list                                # Show rows and timings
    tricue export --dir out/                   # Write subtitles_<language>.vtt
    tricue export --dir out/ --format srt      # Write SRT documents instead
    tricue completions bash > tricue.bash      # Generate bash completions

SESSION SCRIPTS:
    select <id> | at <seconds> | show | next | hide | reset | goto | press
    text <en|fr|ar> <text> | new | list | save

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
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
            let (emoji, color) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Accept everything at the logger; the max level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "tricue", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    if let Err(e) = run(cli.command, config).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(command: Commands, mut config: Config) -> Result<()> {
    if let Commands::Export { format: Some(format), .. } = &command {
        config.export_format = format.clone().into();
    }

    let mut controller = Controller::with_config(config)?;

    match command {
        Commands::Import { path } => {
            let count = controller.import_spreadsheet(&path)?;
            info!("Success: {} rows loaded", count);
        }
        Commands::Video { path } => {
            if controller.select_video(&path).is_none() {
                return Err(anyhow!("Not a supported video file: {:?}", path));
            }
        }
        Commands::New => {
            let id = controller.new_row();
            info!("Added row {}", id);
        }
        Commands::List => {
            let mut stdout = std::io::stdout();
            controller.write_table(&mut stdout)?;
        }
        Commands::Session { script } => {
            let stdout = std::io::stdout();
            let summary = match script {
                Some(path) => {
                    let file = File::open(&path)
                        .context(format!("Failed to open session script: {:?}", path))?;
                    controller.run_session(BufReader::new(file), stdout.lock())?
                }
                None => controller.run_session(std::io::stdin().lock(), stdout.lock())?,
            };
            if summary.ignored > 0 {
                warn!("{} timing operation(s) were ignored", summary.ignored);
            }
        }
        Commands::Export { dir, .. } => {
            let outcome = controller.export(&FixedDirectory(dir)).await;
            match outcome.folder_path {
                Some(folder) if outcome.success => info!("Success: {:?}", folder),
                _ => warn!("Export did not happen"),
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
