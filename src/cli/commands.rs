//! Command dispatch and handlers

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::TreeService;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, Operation};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    DomainError, EventSink, KeyKind, RecordingSink, TracingSink, TreeEvent, TreeNodeConvert,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the parsed command line.
pub fn execute(cli: &Cli) -> CliResult<()> {
    let dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine working directory", e))?,
    };

    let command = cli
        .command
        .as_ref()
        .ok_or_else(|| CliError::Usage("no command given, see --help".into()))?;

    match command {
        Commands::Completion { shell } => {
            cmd_completion(*shell);
            Ok(())
        }
        Commands::Config { command } => cmd_config(command, &dir),
        other => {
            let settings = Settings::load(Some(&dir))?;
            debug!("settings: {:?}", settings);
            let container = ServiceContainer::new(settings);
            match other {
                Commands::Run {
                    kind,
                    import,
                    export,
                    events,
                    no_validate,
                    ops,
                } => cmd_run(
                    &container,
                    RunArgs {
                        kind: *kind,
                        import: import.as_deref(),
                        export: export.as_deref(),
                        events: *events,
                        no_validate: *no_validate,
                        ops,
                    },
                ),
                Commands::Convert {
                    input,
                    output,
                    no_validate,
                } => cmd_convert(&container, input, output, *no_validate),
                Commands::Validate { file } => cmd_validate(&container, file),
                Commands::Show { file, no_validate } => cmd_show(&container, file, *no_validate),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

// ============================================================
// run
// ============================================================

struct RunArgs<'a> {
    kind: Option<KeyKind>,
    import: Option<&'a Path>,
    export: Option<&'a Path>,
    events: bool,
    no_validate: bool,
    ops: &'a [Operation],
}

/// Records events for printing and mirrors them to tracing when enabled.
struct CommandSink {
    log: RecordingSink,
    trace: bool,
}

impl EventSink for CommandSink {
    fn emit(&mut self, event: TreeEvent) {
        if self.trace {
            TracingSink.emit(event.clone());
        }
        self.log.emit(event);
    }
}

impl CommandSink {
    fn flush(&mut self, print: bool) {
        let events = self.log.take();
        if print {
            for (i, event) in events.iter().enumerate() {
                output::detail(&format!("{:>3}  {}", i + 1, event));
            }
        }
    }
}

#[instrument(level = "debug", skip(container, args))]
fn cmd_run(container: &ServiceContainer, args: RunArgs<'_>) -> CliResult<()> {
    let mut svc = container.tree_service();
    if args.no_validate {
        svc.enable_validation(false);
    }
    if let Some(kind) = args.kind {
        svc.set_key_kind(kind)?;
    }

    let mut sink = CommandSink {
        log: RecordingSink::new(),
        trace: container.settings.trace_events,
    };

    if let Some(path) = args.import {
        svc.import_tree(path, &mut sink)?;
        output::action("Imported", &path.display());
        if !svc.is_verified() {
            output::warning("tree was not validated, insert and delete are disabled");
        }
        sink.flush(args.events);
    }

    for op in args.ops {
        if args.events {
            output::header(op);
        }
        apply(&mut svc, op, &mut sink)?;
        sink.flush(args.events);
    }

    print_tree(&svc);

    if let Some(path) = args.export {
        svc.export_tree(path)?;
        output::action("Exported", &path.display());
    }
    Ok(())
}

fn apply(svc: &mut TreeService, op: &Operation, sink: &mut dyn EventSink) -> CliResult<()> {
    match op {
        Operation::Insert(key) => match svc.insert(key, sink) {
            Ok(_) => output::success(&format!("inserted {}", key)),
            Err(ApplicationError::Domain(DomainError::DuplicateKey(k))) => {
                output::warning(&format!("{} is already in the tree", k))
            }
            Err(e) => return Err(e.into()),
        },
        Operation::Delete(key) => {
            if svc.delete(key, sink)? {
                output::success(&format!("deleted {}", key));
            } else {
                output::failure(&format!("{} not found", key));
            }
        }
        Operation::Find(key) => {
            if svc.find(key, sink)? {
                output::success(&format!("found {}", key));
            } else {
                output::failure(&format!("{} not found", key));
            }
        }
    }
    Ok(())
}

/// Tallest tree drawn as a diagram. A red-black tree this tall holds more
/// than 2^32 nodes, so only unvalidated imports exceed it.
const MAX_DIAGRAM_HEIGHT: usize = 64;

fn print_tree(svc: &TreeService) {
    let tree = svc.tree();
    if tree.height() <= MAX_DIAGRAM_HEIGHT {
        output::info(&output::tree_diagram(
            tree.to_tree_string().to_string().trim_end(),
        ));
    } else {
        output::warning(&format!(
            "diagram omitted, height {} exceeds {}",
            tree.height(),
            MAX_DIAGRAM_HEIGHT
        ));
    }
    let black_height = tree
        .root()
        .and_then(|root| tree.black_height(root))
        .map_or_else(|| "-".to_string(), |h| h.to_string());
    output::detail(&format!(
        "kind: {}  nodes: {}  height: {}  black-height: {}",
        tree.kind(),
        svc.node_count(),
        svc.height(),
        black_height
    ));
}

// ============================================================
// file commands
// ============================================================

fn load(
    container: &ServiceContainer,
    file: &Path,
    validate: bool,
) -> CliResult<TreeService> {
    let mut svc = container.tree_service();
    svc.enable_validation(validate);
    let mut sink = container.default_sink();
    svc.import_tree(file, sink.as_mut())?;
    Ok(svc)
}

#[instrument(level = "debug", skip(container))]
fn cmd_convert(
    container: &ServiceContainer,
    input: &Path,
    output_path: &Path,
    no_validate: bool,
) -> CliResult<()> {
    let validate = container.settings.validation && !no_validate;
    let svc = load(container, input, validate)?;
    svc.export_tree(output_path)?;
    output::action(
        "Converted",
        &format!("{} -> {} ({} nodes)", input.display(), output_path.display(), svc.node_count()),
    );
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_validate(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    match load(container, file, true) {
        Ok(svc) => {
            output::success(&format!(
                "{} is a valid red-black tree ({} nodes, height {})",
                file.display(),
                svc.node_count(),
                svc.height()
            ));
            Ok(())
        }
        Err(CliError::Infra(InfraError::Application(ApplicationError::Validation { message }))) => {
            for line in message.lines() {
                output::failure(&line);
            }
            Err(ApplicationError::Validation { message }.into())
        }
        Err(e) => Err(e),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_show(container: &ServiceContainer, file: &Path, no_validate: bool) -> CliResult<()> {
    let validate = container.settings.validation && !no_validate;
    let svc = load(container, file, validate)?;
    print_tree(&svc);
    Ok(())
}

// ============================================================
// config / completion
// ============================================================

fn cmd_config(command: &ConfigCommands, dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let show = |label: &str, path: Option<PathBuf>| match path {
                Some(p) => {
                    let state = if p.exists() { "exists" } else { "not found" };
                    output::info(&format!("{}: {} ({})", label, p.display(), state));
                }
                None => output::info(&format!("{}: unavailable", label)),
            };
            show("global", global_config_path());
            show("local", Some(local_config_path(dir)));
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
