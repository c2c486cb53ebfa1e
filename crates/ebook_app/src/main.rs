mod platform;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ebook_core::{Msg, SourceFilter, DEFAULT_TARGET_FORMAT};
use ebook_engine::{
    find_format, format_names, locate_blocking, scan_folder, ConvertSettings, DiscoverySettings,
    FORMATS,
};
use engine_logging::{engine_info, engine_warn, LogDestination};
use log::LevelFilter;

use platform::app::{ConvertOptions, Shell, ShellConfig};
use platform::ui::OutputMode;

#[derive(Parser)]
#[command(name = "ebook_app")]
#[command(about = "Batch ebook converter driving Calibre's ebook-convert")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log file path
    #[arg(long, global = true, default_value = "./ebook_app.log")]
    log_file: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every matching ebook in a folder
    Convert {
        /// Folder holding the source ebooks
        source: PathBuf,

        /// Output folder (defaults to the source folder)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source format to pick up, or "all"
        #[arg(long, default_value = "all")]
        from: String,

        /// Target format
        #[arg(long, default_value = DEFAULT_TARGET_FORMAT)]
        to: String,

        /// Converter executable (skips discovery)
        #[arg(long)]
        converter: Option<PathBuf>,

        /// Per-file time limit in seconds
        #[arg(long, default_value_t = 600)]
        timeout: u64,

        /// Print runner events as JSON lines instead of text
        #[arg(long)]
        json_events: bool,
    },

    /// List the ebooks a conversion would pick up
    Scan {
        folder: PathBuf,

        /// Source format to pick up, or "all"
        #[arg(long, default_value = "all")]
        from: String,
    },

    /// Report where the converter was found
    Locate,

    /// List supported formats and their extensions
    Formats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(LogDestination::File(cli.log_file.clone()), level);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Convert {
            source,
            output,
            from,
            to,
            converter,
            timeout,
            json_events,
        } => {
            let from = parse_filter(&from)?;
            let Some(target) = find_format(&to) else {
                bail!("unknown target format: {to}");
            };
            let converter = converter.or_else(|| {
                locate_blocking(&DiscoverySettings::default()).map(|found| found.program())
            });

            let config = ShellConfig {
                output: if json_events {
                    OutputMode::JsonEvents
                } else {
                    OutputMode::Text
                },
                convert: ConvertSettings {
                    timeout: Duration::from_secs(timeout),
                    ..ConvertSettings::default()
                },
                ..ShellConfig::default()
            };
            let (shell, msg_tx) = Shell::new(config, std::io::stdout(), std::io::stderr());
            ctrlc::set_handler(move || {
                let _ = msg_tx.send(Msg::StopClicked);
            })
            .context("installing Ctrl-C handler")?;

            let report = shell.run(ConvertOptions {
                source,
                output,
                from,
                to: target.name.to_string(),
                converter,
            })?;
            engine_info!(
                "Run finished: {:?} with {} notice(s)",
                report.tally,
                report.notices.len()
            );

            Ok(match report.tally {
                Some(tally) if tally.failed == 0 => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Commands::Scan { folder, from } => {
            let names = match parse_filter(&from)? {
                SourceFilter::All => format_names().map(str::to_string).collect(),
                SourceFilter::Only(name) => vec![name],
            };
            let items = scan_folder(&folder, &names)
                .with_context(|| format!("scanning {}", folder.display()))?;
            for item in &items {
                println!("{}", item.path().display());
            }
            eprintln!("Found {} ebook file(s)", items.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Locate => match locate_blocking(&DiscoverySettings::default()) {
            Some(found) => {
                println!("{}", found.program().display());
                Ok(ExitCode::SUCCESS)
            }
            None => {
                engine_warn!("Converter not found");
                eprintln!("Calibre not found. Install it from https://calibre-ebook.com/download");
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Formats => {
            for format in FORMATS {
                println!("{:<6} {}", format.name, format.extensions.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_filter(value: &str) -> Result<SourceFilter> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(SourceFilter::All);
    }
    match find_format(value) {
        Some(format) => Ok(SourceFilter::Only(format.name.to_string())),
        None => bail!("unknown source format: {value}"),
    }
}
