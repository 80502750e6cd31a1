//! Command dispatch: one handler per subcommand

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use generational_arena::Index;
use tracing::{debug, instrument};

use crate::application::{codec, parse_path, ListSession, LoadMode, LookupService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    split_loaded, validate, DomainError, DomainResult, RootPointers, SourceRef, TreeDisplay,
    REPORT_SOURCE_KIND,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Edit intents that operate on one node of an opened list.
#[derive(Debug)]
enum Edit {
    AddGroup,
    AddSource,
    SetSource(SourceRef),
    ClearSource,
    Delete,
}

impl Edit {
    fn label(&self) -> &'static str {
        match self {
            Edit::AddGroup => "Added group",
            Edit::AddSource => "Added source",
            Edit::SetSource(_) => "Set source",
            Edit::ClearSource => "Cleared source",
            Edit::Delete => "Deleted",
        }
    }

    fn apply(self, session: &mut ListSession, target: Index) -> DomainResult<RootPointers> {
        match self {
            Edit::AddGroup => session.add_group(target),
            Edit::AddSource => session.add_source(target),
            Edit::SetSource(source_ref) => session.set_source(target, source_ref),
            Edit::ClearSource => session.clear_source(target),
            Edit::Delete => session.delete(target),
        }
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `seglist --help`".to_string(),
        ));
    };

    // Commands that need no settings
    match command {
        Commands::Completion { shell } => return _completion(*shell),
        Commands::Validate { file } => return _validate(file),
        _ => {}
    }

    let config_dir = config_dir(cli)?;
    let settings = Settings::load(Some(config_dir.as_path()))?;
    debug!("settings: {:?}", settings);
    let mode = if cli.legacy {
        LoadMode::AllowDegraded
    } else {
        LoadMode::Strict
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => _config_show(&settings),
            ConfigCommands::Path => _config_path(&config_dir),
        },
        Commands::New { owner, force } => _new(&ServiceContainer::new(settings)?, owner, *force),
        Commands::Show { owner, json } => {
            _show(&ServiceContainer::new(settings)?, owner, *json, mode)
        }
        Commands::AddGroup { owner, path } => {
            _edit(&ServiceContainer::new(settings)?, owner, path, mode, Edit::AddGroup)
        }
        Commands::AddSource { owner, path } => {
            _edit(&ServiceContainer::new(settings)?, owner, path, mode, Edit::AddSource)
        }
        Commands::SetSource {
            owner,
            path,
            kind,
            id,
            name,
            column,
        } => {
            let mut source_ref = SourceRef::new(kind, id, name);
            if let Some(column) = column {
                source_ref = source_ref.with_column(column);
            }
            _edit(
                &ServiceContainer::new(settings)?,
                owner,
                path,
                mode,
                Edit::SetSource(source_ref),
            )
        }
        Commands::ClearSource { owner, path } => {
            _edit(&ServiceContainer::new(settings)?, owner, path, mode, Edit::ClearSource)
        }
        Commands::Delete { owner, path } => {
            _edit(&ServiceContainer::new(settings)?, owner, path, mode, Edit::Delete)
        }
        Commands::Suggest { term, schema } => {
            _suggest(&ServiceContainer::new(settings)?, term, schema)
        }
        Commands::Columns { source_id } => _columns(&ServiceContainer::new(settings)?, source_id),
        Commands::Completion { .. } | Commands::Validate { .. } => Ok(()),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

fn lookup(container: &ServiceContainer) -> CliResult<LookupService> {
    container.lookup_service().ok_or_else(|| {
        CliError::Usage(
            "no source catalog configured (set `catalog` in seglist.toml or SEGLIST_CATALOG)"
                .to_string(),
        )
    })
}

fn print_session(session: &ListSession) {
    if session.is_degraded() {
        output::warning("degraded mode: list has no exclusion subtree");
    }
    output::info(&session.tree().to_tree_string());
}

#[instrument(skip(container))]
fn _new(container: &ServiceContainer, owner: &str, force: bool) -> CliResult<()> {
    let existing = container
        .store
        .list_id_for(owner)
        .map_err(|e| InfraError::io(format!("look up list of {}", owner), e))?;
    if existing.is_some() && !force {
        return Err(CliError::Usage(format!(
            "{} already has a list (use --force to replace it)",
            owner
        )));
    }

    let mut session = container.list_service.create(owner);
    if !container.list_service.save(&mut session)? {
        return Err(CliError::Usage(format!("store rejected list of {}", owner)));
    }
    output::action("Created", owner);
    print_session(&session);
    Ok(())
}

#[instrument(skip(container))]
fn _show(container: &ServiceContainer, owner: &str, json: bool, mode: LoadMode) -> CliResult<()> {
    let mut session = container.list_service.open(owner, mode)?;
    if session.list_id().is_none() {
        output::warning(&format!("no list saved for {}, showing an empty one", owner));
    }
    if json {
        let node = session.snapshot();
        output::info(&codec::encode_node_pretty(&node)?);
    } else {
        output::header(&format!(
            "{} ({} nodes, {} sources)",
            owner,
            session.tree().node_count(),
            session.tree().sources().len()
        ));
        print_session(&session);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _edit(
    container: &ServiceContainer,
    owner: &str,
    path: &str,
    mode: LoadMode,
    edit: Edit,
) -> CliResult<()> {
    let mut session = container.list_service.open(owner, mode)?;
    let target = session.resolve(&parse_path(path)?)?;
    let label = edit.label();

    let roots = edit.apply(&mut session, target)?;
    debug!("held roots after edit: {:?}", roots);
    if !container.list_service.save(&mut session)? {
        return Err(CliError::Usage(format!("store rejected list of {}", owner)));
    }
    output::action(label, &format!("{} at {}", owner, path));
    print_session(&session);
    Ok(())
}

#[instrument]
fn _validate(file: &Path) -> CliResult<()> {
    let payload = std::fs::read_to_string(file)
        .map_err(|e| InfraError::io(format!("read {}", file.display()), e))?;
    let mut tree = codec::decode(&payload)?;

    let (violations, split_error) = match split_loaded(&mut tree) {
        Ok(roots) => (validate(&tree, Some(roots)), None),
        Err(e) => (validate(&tree, None), Some(e)),
    };
    output::info(&tree.to_tree_string());

    if let Some(e) = &split_error {
        output::failure(e);
    }
    for violation in &violations {
        output::failure(violation);
    }
    if split_error.is_none() && violations.is_empty() {
        output::success(&format!("{} is a valid segment list", file.display()));
        return Ok(());
    }
    let problems = violations.len() + usize::from(split_error.is_some());
    Err(DomainError::malformed(format!("{}: {} problem(s)", file.display(), problems)).into())
}

#[instrument(skip(container))]
fn _suggest(container: &ServiceContainer, term: &str, schema: &str) -> CliResult<()> {
    let candidates = lookup(container)?.suggest(term, schema)?;
    if candidates.is_empty() {
        output::warning(&format!("no {} source matches {:?}", schema, term));
    }
    for candidate in candidates {
        output::info(&format!("{}\t{}", candidate.source_id, candidate.source_name));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _columns(container: &ServiceContainer, source_id: &str) -> CliResult<()> {
    let source = SourceRef::new(REPORT_SOURCE_KIND, source_id, source_id);
    for column in lookup(container)?.join_columns(&source)? {
        output::info(&format!("{}\t{}", column.name, column.label));
    }
    Ok(())
}

fn _config_show(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn _config_path(config_dir: &Path) -> CliResult<()> {
    let global = global_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unavailable>".to_string());
    output::action("global", &global);
    output::action("local", &local_config_path(config_dir).display());
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
