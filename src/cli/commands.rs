use crate::cli::args::{Args, Command, ConfigCommand, ListArgs, RunArgs, SendArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::remote::NativeRemoteService;
use crate::core::session::Connector;
use crate::domain::config::FlipperConfig;
use crate::domain::error::{FlipperError, FlipperResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use std::time::Duration;
use tracing::{debug, warn};

/// Execute CLI command
pub async fn execute_command(args: Args) -> FlipperResult<()> {
    let writer = ConsoleWriter::new(args.output.clone());

    // Load configuration using ConfigManager
    let config_manager = ConfigManager::new()?;
    let mut config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path.as_ref())?
    } else {
        config_manager.load_config()?
    };
    if args.port.is_some() {
        config.device.port = args.port.clone();
    }

    // Initialize logging
    if !args.quiet {
        if let Err(e) = init_logging(&config.global.log_level, args.verbose) {
            eprintln!("Warning: logging unavailable: {}", e);
        }
    }

    match args.command {
        Command::Detect => {
            let endpoint = blocking(move || Connector::from_config(&config).endpoint()).await?;
            writer.write_endpoint(&endpoint)?;
            Ok(())
        }
        Command::Free => {
            let endpoint = blocking(move || Connector::from_config(&config).free()).await?;
            writer.write_message(&format!("Released {}", endpoint))?;
            Ok(())
        }
        Command::Send(send_args) => execute_send(send_args, config, &writer).await,
        Command::List(list_args) => execute_list(list_args, config, &writer).await,
        Command::Run(run_args) => execute_run(run_args, config, &writer).await,
        Command::Config(config_args) => {
            execute_config_command(config_args.command, &config, &config_manager, &writer)
        }
        Command::Version => {
            writer.write_message(&format!("flipper-remote {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Device I/O is blocking; keep it off the async workers
async fn blocking<T, F>(f: F) -> FlipperResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> FlipperResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FlipperError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

async fn execute_send(args: SendArgs, config: FlipperConfig, writer: &ConsoleWriter) -> FlipperResult<()> {
    let window = parse_window(args.window)?;
    let text = args.command.clone();
    let all = args.all;

    let lines = blocking(move || {
        Connector::from_config(&config).with_session(|session| {
            if all {
                session.command_all(&text, window)
            } else {
                session.command(&text, window).map(|line| vec![line])
            }
        })
    })
    .await?;

    writer.write_lines(&args.command, &lines)?;
    Ok(())
}

async fn execute_list(args: ListArgs, config: FlipperConfig, writer: &ConsoleWriter) -> FlipperResult<()> {
    let files = blocking(move || {
        NativeRemoteService::from_config(&config).list_remote(args.extension.as_deref())
    })
    .await?;

    if files.is_empty() {
        warn!("No signal files found on the device");
    }
    writer.write_files(&files)?;
    Ok(())
}

async fn execute_run(args: RunArgs, config: FlipperConfig, writer: &ConsoleWriter) -> FlipperResult<()> {
    let target = args.target.clone();

    let result = blocking(move || {
        let service = NativeRemoteService::from_config(&config);
        let path = if args.target.starts_with('/') {
            args.target
        } else {
            service
                .find_remote(&args.target)?
                .map(|file| file.path)
                .ok_or_else(|| FlipperError::ScriptNotFound(args.target.clone()))?
        };

        debug!("Running {} (repeat {}, device {})", path, args.repeat, args.device);
        service.run_remote(&path, args.repeat, args.device)
    })
    .await?;

    writer.write_result(&target, &result)?;
    Ok(())
}

fn execute_config_command(
    command: ConfigCommand,
    config: &FlipperConfig,
    config_manager: &ConfigManager,
    writer: &ConsoleWriter,
) -> FlipperResult<()> {
    match command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
        }
        ConfigCommand::Path => {
            writer.write_message(&format!(
                "global: {}",
                config_manager.get_global_config_path_ref().display()
            ))?;
            match config_manager.get_project_config_path() {
                Some(path) => writer.write_message(&format!("project: {}", path.display()))?,
                None => writer.write_message("project: (none)")?,
            }
        }
        ConfigCommand::Init { global } => {
            let path = if global {
                config_manager.init_global_config()?
            } else {
                config_manager.init_project_config(&std::env::current_dir()?)?
            };
            writer.write_message(&format!("Configuration written to {}", path.display()))?;
        }
    }
    Ok(())
}

fn parse_window(seconds: Option<f64>) -> FlipperResult<Option<Duration>> {
    match seconds {
        None => Ok(None),
        Some(s) if s.is_finite() && s > 0.0 => Ok(Some(Duration::from_secs_f64(s))),
        Some(s) => Err(FlipperError::InvalidInput(format!(
            "Collection window must be a positive number of seconds, got {}",
            s
        ))),
    }
}
