//! propli CLI - convert between property-list, YAML, and JSON files

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use propli::{FileTarget, Format, FormatHint, Resource, derive_target};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "propli")]
#[command(version, about = "propli: convert between plist, YAML, and JSON files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read file at SOURCE, convert, and output to TARGET
    Convert {
        /// The path to the file to convert ("-" reads standard input)
        source: PathBuf,

        /// The path where the converted file will be written ("-" writes standard output)
        target: Option<PathBuf>,

        /// Format of the source file (plist, yaml, json); detected from the extension if omitted
        #[arg(short, long, value_name = "FORMAT")]
        source_format: Option<String>,

        /// Format of the target file; defaults to the counterpart of the source format
        #[arg(short = 'f', long, value_name = "FORMAT")]
        target_format: Option<String>,

        /// Extension for the derived target path. Also selects the target format
        /// when --target-format is omitted. Ignored when TARGET is given
        #[arg(short = 'x', long, value_name = "EXTENSION")]
        target_ext: Option<String>,

        /// Overwrite the target file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Print the file in the specified format
    Print {
        /// The path to the file to read ("-" reads standard input)
        source: PathBuf,

        /// Format of the source file; detected from the extension if omitted
        #[arg(short, long, value_name = "FORMAT")]
        source_format: Option<String>,

        /// Format to print in; defaults to yaml
        #[arg(short = 'f', long, value_name = "FORMAT")]
        print_format: Option<String>,
    },
}

impl Commands {
    fn execute(self) -> anyhow::Result<ExitCode> {
        match self {
            Commands::Convert {
                source,
                target,
                source_format,
                target_format,
                target_ext,
                force,
            } => convert(
                source,
                target,
                source_format,
                target_format,
                target_ext.as_deref(),
                force,
            ),
            Commands::Print {
                source,
                source_format,
                print_format,
            } => convert(
                source,
                Some(PathBuf::from(FileTarget::SENTINEL)),
                source_format,
                print_format,
                None,
                false,
            ),
        }
    }
}

fn convert(
    source: PathBuf,
    target: Option<PathBuf>,
    source_format: Option<String>,
    target_format: Option<String>,
    target_ext: Option<&str>,
    force: bool,
) -> anyhow::Result<ExitCode> {
    let source_file = Resource::new(source, source_format.map(FormatHint::Name))?;
    if !source_file.target().is_standard() && !source_file.exists() {
        eprintln!(
            "{}",
            style(format!("ERROR: The file \"{}\" does not exist.", source_file.target())).red()
        );
        return Ok(ExitCode::FAILURE);
    }

    let target_file = match target {
        Some(target) => Resource::new(target, target_format.map(FormatHint::Name))?,
        None => {
            let format: Option<Format> = target_format
                .map(|name| FormatHint::Name(name).resolve())
                .transpose()?;
            derive_target(&source_file, format, target_ext)
        }
    };

    if !force && target_file.exists() {
        eprintln!(
            "{}",
            style(format!(
                "WARNING: The target file \"{}\" already exists. \
                 If you would like to overwrite it, use the --force flag.",
                target_file.target()
            ))
            .yellow()
        );
        return Ok(ExitCode::FAILURE);
    }

    propli::convert(&source_file, &target_file)?;

    if !target_file.target().is_standard() {
        eprintln!(
            "{}",
            style(format!(
                "Converted {} to {}",
                source_file.target(),
                target_file.target()
            ))
            .green()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for converted output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.execute() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", style(format!("ERROR: {err:#}")).red());
            ExitCode::FAILURE
        }
    }
}
