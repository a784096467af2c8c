use std::io::{IsTerminal, Write};

use clap::Parser;

use miette::{Context, IntoDiagnostic};

use lazyhold::config::Config;

mod cli;

fn main() -> miette::Result<()> {
    let args = cli::Args::parse();

    miette::set_hook(args.format().into_error_hook())?;
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_defaults();
    let file_config = match args.config_path() {
        Some(path) => Some(Config::from_file(path).map_err(anyhow_to_miette)?),
        None => {
            let cwd = std::env::current_dir()
                .into_diagnostic()
                .wrap_err("could not get the current directory")?;
            Config::from_dir(&cwd).map_err(anyhow_to_miette)?
        }
    };
    if let Some(file_config) = &file_config {
        config.update(file_config);
    }
    config.update(&args.to_config());

    let report = lazyhold::demo::run(&config).map_err(anyhow_to_miette)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{report}").into_diagnostic()?;

    Ok(())
}

fn anyhow_to_miette(error: anyhow::Error) -> miette::Report {
    miette::miette!("{error:#}")
}
