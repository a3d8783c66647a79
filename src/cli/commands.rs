//! Command dispatch: one handler per subcommand

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::WorkspaceService;
use crate::cli::args::{Cli, Commands, ConfigCommands, HierarchyCommands, WordCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{short_id, Outcome, RenderOptions, SaveKind, TreeRender};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

/// Output path meaning "write to stdout".
const STDOUT_MARKER: &str = "-";

/// Run the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `wordtree --help`".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            print_completions(*shell);
            Ok(())
        }
        Commands::Config { command } => execute_config(cli, command),
        _ => {
            let container = ServiceContainer::new(load_settings(cli.dir.as_deref())?);
            let workspace = container.workspace();
            match command {
                Commands::Word { command } => execute_word(&workspace, command),
                Commands::Tree { depth, ids, stats } => {
                    show_tree(&workspace, *depth, *ids, *stats)
                }
                Commands::Hierarchy { command } => execute_hierarchy(&workspace, command),
                Commands::Export { output } => export(&workspace, output.as_deref()),
                Commands::Import { file } => import(&workspace, file),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

/// Settings for this run; `-C dir` also keeps the session in that directory.
fn load_settings(dir: Option<&Path>) -> CliResult<Settings> {
    let mut settings = Settings::load(dir)?;
    if let Some(dir) = dir {
        settings.data_dir = dir.to_path_buf();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Report a rejected mutation; rejections are not failures.
fn report<T>(outcome: Outcome<T>, applied: impl FnOnce(T)) {
    match outcome {
        Outcome::Applied(value) => applied(value),
        Outcome::Rejected(reason) => output::warning(&format!("unchanged: {reason}")),
    }
}

// ============================================================
// word
// ============================================================

#[instrument(skip(workspace))]
fn execute_word(workspace: &WorkspaceService, command: &WordCommands) -> CliResult<()> {
    match command {
        WordCommands::Add { name, parent } => {
            let outcome = workspace.add_word(name, parent.as_deref())?;
            report(outcome, |key| {
                output::action("Added", &format!("{} [{}]", name.trim(), short_id(&key)))
            });
        }
        WordCommands::Remove { word } => {
            report(workspace.remove_word(word)?, |()| {
                output::action("Removed", word)
            });
        }
        WordCommands::Rename { word, name } => {
            report(workspace.rename_word(word, name)?, |()| {
                output::action("Renamed", &format!("{word} -> {name}"))
            });
        }
        WordCommands::Move { word, into } => {
            report(workspace.move_word(word, into.as_deref())?, |()| {
                let dest = into.as_deref().unwrap_or("first level");
                output::action("Moved", &format!("{word} -> {dest}"))
            });
        }
        WordCommands::Unlink { word } => {
            report(workspace.unlink_word(word)?, |()| {
                output::action("Unlinked", word)
            });
        }
        WordCommands::Order { word, offset } => {
            report(workspace.order_word(word, *offset)?, |changed| {
                if changed {
                    output::action("Reordered", word)
                } else {
                    output::detail(&format!("{word} already at that position"))
                }
            });
        }
        WordCommands::Drop {
            word,
            target,
            dx,
            dy,
        } => {
            let dropped = workspace.drop_word(word, target.as_deref(), *dx, *dy)?;
            let intent = format!("{:?}", dropped.intent).to_lowercase();
            report(dropped.outcome, |()| {
                output::action("Dropped", &format!("{word} ({intent})"))
            });
        }
    }
    Ok(())
}

// ============================================================
// tree
// ============================================================

#[instrument(skip(workspace))]
fn show_tree(
    workspace: &WorkspaceService,
    depth: Option<u32>,
    ids: bool,
    stats: bool,
) -> CliResult<()> {
    let loaded = workspace.load()?;
    let options = RenderOptions {
        max_depth: depth.map(|d| d as usize),
        show_ids: ids,
    };
    let trees = loaded.forest().to_trees(&options);
    if trees.is_empty() {
        output::detail(&"(empty)");
        return Ok(());
    }
    for tree in trees {
        output::info(tree.to_string().trim_end());
    }
    if stats {
        let forest = loaded.forest();
        output::detail(&format!(
            "{} words, {} levels, {} leaves",
            forest.len(),
            forest.depth(),
            forest.leaf_names().len()
        ));
    }
    Ok(())
}

// ============================================================
// hierarchy
// ============================================================

#[instrument(skip(workspace))]
fn execute_hierarchy(workspace: &WorkspaceService, command: &HierarchyCommands) -> CliResult<()> {
    match command {
        HierarchyCommands::New => {
            let id = workspace.new_hierarchy()?;
            output::action("Created", &short_id(&id));
        }
        HierarchyCommands::Save => {
            let (id, kind) = workspace.save_hierarchy()?;
            let label = match kind {
                SaveKind::Created => "Created",
                SaveKind::Updated => "Saved",
            };
            output::action(label, &short_id(&id));
        }
        HierarchyCommands::List => {
            let loaded = workspace.load()?;
            if loaded.catalog.is_empty() {
                output::detail(&"no saved hierarchies");
                return Ok(());
            }
            output::header(&"Hierarchies");
            for hierarchy in loaded.catalog.iter() {
                let marker = if loaded.current == Some(hierarchy.id) {
                    "*"
                } else {
                    " "
                };
                output::info(&format!(
                    "{marker} {}  {:<16} {:>4} words  updated {}",
                    short_id(&hierarchy.id),
                    hierarchy.name,
                    hierarchy.word_count(),
                    hierarchy.updated_at.format("%Y-%m-%d %H:%M:%S"),
                ));
            }
        }
        HierarchyCommands::Open { id } => {
            let id = workspace.open_hierarchy(id)?;
            output::action("Opened", &short_id(&id));
        }
        HierarchyCommands::Remove { id } => {
            let id = workspace.remove_hierarchy(id)?;
            output::action("Removed", &short_id(&id));
        }
    }
    Ok(())
}

// ============================================================
// export / import
// ============================================================

#[instrument(skip(workspace))]
fn export(workspace: &WorkspaceService, output_path: Option<&Path>) -> CliResult<()> {
    if output_path.is_some_and(|p| p.as_os_str() == STDOUT_MARKER) {
        output::info(&workspace.export_json()?);
        return Ok(());
    }
    let path = workspace.export_to(output_path)?;
    output::action("Exported", &path.display());
    Ok(())
}

#[instrument(skip(workspace))]
fn import(workspace: &WorkspaceService, file: &Path) -> CliResult<()> {
    let count = workspace.import_file(file)?;
    output::action("Imported", &format!("{count} word(s) from {}", file.display()));
    Ok(())
}

// ============================================================
// config
// ============================================================

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli.dir.as_deref())?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(&local_dir(cli)?)
            };
            write_template(&RealFileSystem, &path)?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            let settings = load_settings(cli.dir.as_deref())?;
            match global_config_path() {
                Some(path) => print_config_path("global", &path),
                None => output::detail(&"global: (unavailable)"),
            }
            print_config_path("local", &local_config_path(&local_dir(cli)?));
            output::detail(&format!("session: {}", settings.session_path().display()));
        }
    }
    Ok(())
}

/// Write the config template to `path`; an existing file is never replaced.
fn write_template(fs: &dyn FileSystem, path: &Path) -> CliResult<()> {
    if fs.exists(path) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    let output_err = |source| CliError::Output {
        path: path.to_path_buf(),
        source,
    };
    fs.ensure_parent(path).map_err(output_err)?;
    fs.write(path, &Settings::template()).map_err(output_err)?;
    Ok(())
}

fn local_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("current directory", e))),
    }
}

fn print_config_path(label: &str, path: &Path) {
    if RealFileSystem.exists(path) {
        output::success_detail(&format!("{label}: {}", path.display()));
    } else {
        output::failure(&format!("{label}: {} (not found)", path.display()));
    }
}
