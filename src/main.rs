use clap::Parser;
use nullfill::cli::format;
use nullfill::cli::{Cli, Commands, OutputFormat};
use nullfill::fill;
use std::io::{self, Read};
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fill {
            paths,
            config,
            type_name,
            glob,
            format: output_format,
        } => {
            let result = if paths.is_empty() {
                let mut text = String::new();
                if let Err(e) = io::stdin().read_to_string(&mut text) {
                    fail(&format!("failed to read stdin: {}", e));
                }
                fill::run_fill_text(&config, &type_name, &text)
            } else {
                fill::run_fill(&config, &type_name, &paths, &glob)
            };

            let result = match result {
                Ok(r) => r,
                Err(e) => fail(&e),
            };

            let output_format = output_format.unwrap_or(if result.registry.config().pretty {
                OutputFormat::Pretty
            } else {
                OutputFormat::Compact
            });
            format::print_documents(&result, output_format);
        }
        Commands::Check { config } => match fill::load_registry(&config) {
            Ok(registry) => format::print_check(&registry),
            Err(e) => fail(&e),
        },
    }
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("\x1b[31merror\x1b[0m: {}", e);
    process::exit(2);
}
