//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{GenerationReport, OutputTarget};
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{FaultTree, TreeParams};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Name of the config file created by `config init` in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "ftgen.toml";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| CliError::Usage(e.to_string()))?;
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        print_completions(*shell);
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Generate { tree, out } => cmd_generate(&container, tree, out.clone()),
        Commands::Preview { tree } => cmd_preview(&container, tree),
        Commands::Config { command } => cmd_config(&container, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Settings with the command line flags applied.
fn effective_settings(container: &ServiceContainer, tree: &TreeArgs, out: Option<PathBuf>) -> Settings {
    let mut settings = container.settings.merge_with(&tree.to_overlay(out));
    settings.expand_paths();
    debug!(?settings, "effective settings");
    settings
}

#[instrument(level = "debug", skip(container))]
fn cmd_generate(container: &ServiceContainer, tree: &TreeArgs, out: Option<PathBuf>) -> CliResult<()> {
    let settings = effective_settings(container, tree, out);
    let target = OutputTarget::from_path(&settings.out);

    let report = container.generator.generate(&settings.tree, target)?;
    warn_if_short(&report, &settings.tree);

    // Stdout carries the document itself, keep it clean.
    if let OutputTarget::File(path) = &report.target {
        output::success("Fault tree generated");
        print_counts(report.gates, report.primary_events, report.ratio);
        output::action("Written", &path.display());
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_preview(container: &ServiceContainer, tree: &TreeArgs) -> CliResult<()> {
    let settings = effective_settings(container, tree, None);
    let fault_tree: FaultTree = container.generator.build(&settings.tree)?;

    output::header(&settings.tree.ft_name);
    output::info(&fault_tree.to_display_tree());
    let gates = fault_tree.num_gates();
    let events = fault_tree.num_events();
    print_counts(gates, events, events as f64 / gates as f64);
    Ok(())
}

fn print_counts(gates: usize, events: usize, ratio: f64) {
    output::detail(&format!("gates: {gates}"));
    output::detail(&format!("primary events: {events}"));
    output::detail(&format!("primary events per gate: {ratio:.3}"));
}

fn warn_if_short(report: &GenerationReport, params: &TreeParams) {
    if let Some(notice) = short_run_notice(report, params) {
        output::warning(&notice);
    }
}

/// Runs stay below nprimary only when ctop == ptop fills the root with events.
fn short_run_notice(report: &GenerationReport, params: &TreeParams) -> Option<String> {
    let root_only_events = params.ctop > 0 && params.ctop == params.ptop;
    if root_only_events && (report.primary_events as i64) < params.nprimary {
        Some(format!(
            "ctop equals ptop ({}), the root holds only primary events: {} of {} created",
            params.ctop, report.primary_events, params.nprimary
        ))
    } else {
        None
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                PathBuf::from(LOCAL_CONFIG_FILE)
            };
            init_config(container, &path)
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not found" };
                    output::action("Global", &format!("{} ({state})", path.display()));
                }
                None => output::action("Global", &"unavailable"),
            }
            let local = Path::new(LOCAL_CONFIG_FILE);
            output::action(
                "Example local",
                &format!("{} (use --config to load it)", local.display()),
            );
            Ok(())
        }
    }
}

fn init_config(container: &ServiceContainer, path: &Path) -> CliResult<()> {
    if container.fs.exists(path) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    container
        .fs
        .write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::success(&format!("Created {}", path.display()));
    Ok(())
}
