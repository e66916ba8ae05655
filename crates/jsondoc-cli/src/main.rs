//! jsondoc CLI - Turn JSON and JSON Lines files into documents.

use clap::Parser;
use jsondoc_cli::commands;
use jsondoc_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> jsondoc_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Convert(args) => {
            let result = commands::execute_convert(args, &config, std::io::stdin().lock())?;
            println!("{}", formatter.format_documents(&result.documents)?);
            eprintln!("{}", formatter.summary(result.documents.len(), &result.stats));
        }
        Command::Check(args) => {
            println!("{}", commands::execute_check(args, &formatter)?);
        }
        Command::Config(args) => {
            print!("{}", commands::execute_config(args, &config)?);
        }
    }

    Ok(())
}
