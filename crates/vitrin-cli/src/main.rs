// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::BackendRuntime;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vitrin_app::AdminConsole;
use vitrin_testkit::{DEFAULT_PAGE_SIZE, DEMO_IMAGE_ORIGIN};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    match options.action {
        CliAction::Help => {
            print_help();
            return Ok(());
        }
        CliAction::PrintConfigPath => {
            println!("{}", options.config_path.display());
            return Ok(());
        }
        CliAction::PrintExample => {
            print!("{}", Config::example_config(&options.config_path));
            return Ok(());
        }
        CliAction::Check | CliAction::Run => {}
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `vitrin --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    if options.demo {
        let catalog = vitrin_testkit::demo_catalog(DEFAULT_PAGE_SIZE)?;
        if options.action == CliAction::Check {
            println!("demo catalog ready");
            return Ok(());
        }
        init_logging(&config)?;
        info!(page_size = DEFAULT_PAGE_SIZE, "starting against demo catalog");
        let mut console = AdminConsole::new(
            config.start_view(),
            DEMO_IMAGE_ORIGIN,
            config.default_ingredients(),
        );
        let mut runtime = BackendRuntime::new(catalog);
        return vitrin_tui::run_app(&mut console, &mut runtime);
    }

    let base_url = config.base_url();
    let client = vitrin_api::Client::new(&base_url, config.timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values or set VITRIN_API_URL",
            options.config_path.display()
        )
    })?;
    let image_origin = config.image_origin()?;

    if options.action == CliAction::Check {
        client.ping()?;
        println!("{base_url} is reachable; images resolve against {image_origin}");
        return Ok(());
    }

    init_logging(&config)?;
    info!(base_url = %base_url, image_origin = %image_origin, "starting");
    let mut console = AdminConsole::new(
        config.start_view(),
        &image_origin,
        config.default_ingredients(),
    );
    let mut runtime = BackendRuntime::new(client);
    vitrin_tui::run_app(&mut console, &mut runtime)
}

/// Sends logs to a file; the terminal belongs to the console. `VITRIN_LOG`
/// takes an env-filter directive that overrides `[log].level`.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_file()?;
    let file = open_log_file(&path)?;
    let filter = EnvFilter::try_from_env("VITRIN_LOG")
        .or_else(|_| EnvFilter::try_new(config.log_level()))
        .with_context(|| format!("invalid log level {:?}", config.log_level()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("initialize logging: {error}"))?;
    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })
}

/// What a single invocation does. Informational flags win over `--check`,
/// which wins over launching the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CliAction {
    Run,
    Check,
    PrintExample,
    PrintConfigPath,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    demo: bool,
    action: CliAction,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        demo: false,
        action: CliAction::Run,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let requested = match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
                continue;
            }
            "--demo" => {
                options.demo = true;
                continue;
            }
            "--check" => CliAction::Check,
            "--print-example-config" => CliAction::PrintExample,
            "--print-config-path" => CliAction::PrintConfigPath,
            "--help" | "-h" => CliAction::Help,
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        };
        options.action = options.action.max(requested);
    }

    Ok(options)
}

fn print_help() {
    println!("vitrin - catalog admin console");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Run against an in-memory demo catalog");
    println!("  --check                  Validate config and reach the catalog API, then exit");
    println!("  --help                   Show this help");
}
