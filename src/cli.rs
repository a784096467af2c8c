use std::path::PathBuf;

use lazyhold::config::Config;

#[derive(Copy, Clone, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum Format {
    #[default]
    Long,
    Json,
}

impl Format {
    pub fn into_error_hook(self) -> miette::ErrorHook {
        match self {
            Self::Long => Box::new(|_| Box::new(miette::GraphicalReportHandler::new())),
            Self::Json => Box::new(|_| Box::new(miette::JSONReportHandler::new())),
        }
    }
}

#[derive(clap::Parser)]
#[command(about, version)]
pub(crate) struct Args {
    /// Read settings from this file instead of looking for `lazyhold.toml`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render style for messages
    #[arg(long, value_enum, ignore_case = true, default_value("long"))]
    format: Format,

    /// Log more, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Number of threads racing for the value
    #[arg(long)]
    threads: Option<usize>,

    /// Number of accesses made by each thread
    #[arg(long)]
    calls: Option<usize>,

    /// Time spent constructing the value, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Make the first N construction attempts fail
    #[arg(long, value_name = "N")]
    fail_first: Option<usize>,
}

impl Args {
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    /// Settings given on the command line, to be layered over the file ones
    pub fn to_config(&self) -> Config {
        Config {
            threads: self.run.threads,
            calls: self.run.calls,
            delay_ms: self.run.delay_ms,
            failures: self.run.fail_first,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
