use anyhow::Context;
use clap::Parser;
use engine::converter::FormatConverter;
use engine::store::{AlwaysOverwrite, ThemeStore};
use std::process::ExitCode;
use themeshift::args::Cli;
use themeshift::config::{self, defaults};
use themeshift::convert::{self, ConvertReport, PromptConfirmer};
use themeshift::error::{AppResult, EXIT_SUCCESS, EXIT_VALIDATION};
use themeshift::logger;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_VALIDATION)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };

    match run(&cli) {
        Ok(report) => {
            print_report(&report);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {}", e.user_message());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> AppResult<ConvertReport> {
    let config = config::load_config(cli.config.as_deref()).into_result()?;

    if let Err(e) = logger::setup_logger(config.logging(), cli.log_level.as_deref())
        .context("Failed to initialize logging")
    {
        eprintln!("Warning: {e:#}");
    }

    let store = ThemeStore::new(config.backup_manager()?);
    let collection_path = config.collection_path()?;
    let template = defaults::DEFAULT_COLLECTION.as_bytes();
    if store.ensure_default_collection_exists(&collection_path, template)? {
        eprintln!("Created theme collection {}", collection_path.display());
    }

    let request = cli.to_request(&collection_path)?;
    let converter = FormatConverter::new(config.derivation_config());

    if cli.force {
        convert::run_convert(&store, &converter, &request, &AlwaysOverwrite)
    } else {
        convert::run_convert(&store, &converter, &request, &PromptConfirmer)
    }
}

fn print_report(report: &ConvertReport) {
    match &report.name {
        Some(name) => println!("Saved '{name}' to {}", report.output.display()),
        None => println!("Saved {}", report.output.display()),
    }
    if !report.defaulted_input_slots.is_empty() {
        eprintln!(
            "Not defined in the input, defaults used: {}",
            join(&report.defaulted_input_slots)
        );
    }
    if !report.derived_slots.is_empty() {
        eprintln!("Derived (not copied): {}", join(&report.derived_slots));
    }
    if report.low_contrast {
        eprintln!("Warning: foreground/background contrast is below 4.5:1");
    }
}

fn join(slots: &std::collections::BTreeSet<String>) -> String {
    slots.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
