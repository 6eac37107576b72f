//! Command dispatch: load records, build the provider, print results

use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{QueryOptions, TreeDataProvider, TreeView};
use crate::cli::args::{Cli, Commands, ConfigCommands, SourceArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeId, TreeNode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::source::{load_store, read_records};
use crate::infrastructure::{InfraError, SortDirection};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Tree { source, ids } => cmd_tree(cli, source, *ids),
        Commands::Json { source, compact } => cmd_json(cli, source, *compact),
        Commands::Search { query, source } => cmd_search(cli, source, query),
        Commands::Find { ids, source } => cmd_find(cli, source, ids),
        Commands::Roots { source } => cmd_roots(cli, source),
        Commands::Children { parent_id, source } => cmd_children(cli, source, parent_id),
        Commands::Choices { source } => cmd_choices(cli, source),
    }
}

/// Load settings and apply command-line overrides.
fn load_settings(cli: &Cli, source: Option<&SourceArgs>) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(level) = cli.expanded_level {
        settings.tree.expanded_level = Some(level);
    }
    if let Some(parent_field) = source.and_then(|s| s.parent_field.clone()) {
        settings.fields.parent_field = Some(parent_field);
        settings.validate()?;
    }
    Ok(settings)
}

/// Build the provider the source arguments describe.
fn create_provider(cli: &Cli, source: &SourceArgs) -> CliResult<Box<dyn TreeDataProvider>> {
    let settings = load_settings(cli, Some(source))?;
    match &source.entity {
        Some(entity) => {
            let store = load_store(&source.file)?;
            let container = ServiceContainer::with_store(settings, Arc::new(store));
            Ok(Box::new(container.entity_provider(entity)?))
        }
        None => {
            let records = read_records(&source.file)?;
            let container = ServiceContainer::new(settings);
            Ok(Box::new(container.array_provider(records)))
        }
    }
}

/// Translate `--where` and `--order-by` arguments.
fn parse_query_options(source: &SourceArgs) -> CliResult<QueryOptions> {
    let mut options = QueryOptions::new();
    for condition in &source.filters {
        let (field, raw) = condition
            .split_once('=')
            .ok_or_else(|| CliError::InvalidArgs(format!("expected FIELD=VALUE, got '{}'", condition)))?;
        options = options.filter(field.trim(), parse_value(raw.trim()));
    }
    for key in &source.order_by {
        let (field, direction) = match key.split_once(':') {
            Some((field, dir)) => (field, dir.parse::<SortDirection>().map_err(CliError::InvalidArgs)?),
            None => (key.as_str(), SortDirection::Asc),
        };
        options = options.order(field.trim(), direction);
    }
    Ok(options)
}

/// JSON literal if it parses, otherwise the raw text as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}


fn print_nodes(nodes: &[TreeNode]) {
    for node in nodes {
        output::info(&format!(
            "{}\t{}",
            node.id().map_or_else(|| "-".to_string(), ToString::to_string),
            node.label()
        ));
    }
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, source: &SourceArgs, ids: bool) -> CliResult<()> {
    let provider = create_provider(cli, source)?;
    let outcome = provider.get_tree_outcome(&parse_query_options(source)?)?;
    debug!(report = ?outcome.report, "built forest");
    for root in &outcome.roots {
        output::info(&output::to_tree(root, ids));
    }
    output::report_dropped(&outcome.report);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_json(cli: &Cli, source: &SourceArgs, compact: bool) -> CliResult<()> {
    let provider = create_provider(cli, source)?;
    let view = TreeView::from_provider(provider.as_ref(), &parse_query_options(source)?)?;
    let text = if compact {
        serde_json::to_string(&view)
    } else {
        serde_json::to_string_pretty(&view)
    }
    .map_err(|e| InfraError::DataFormat {
        message: format!("serialize tree: {}", e),
    })?;
    output::info(&text);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_search(cli: &Cli, source: &SourceArgs, query: &str) -> CliResult<()> {
    let provider = create_provider(cli, source)?;
    let found = provider.search_nodes(query, &parse_query_options(source)?)?;
    print_nodes(&found);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_find(cli: &Cli, source: &SourceArgs, ids: &[String]) -> CliResult<()> {
    let provider = create_provider(cli, source)?;
    let ids: Vec<NodeId> = ids.iter().map(|raw| NodeId::parse_loose(raw)).collect();
    let found = provider.find_nodes_by_ids(&ids)?;
    if found.len() < ids.len() {
        let missing = ids
            .iter()
            .filter(|id| !found.iter().any(|n| n.id() == Some(*id)))
            .join(", ");
        output::warning(&format!("not found: {}", missing));
    }
    for node in &found {
        output::info(&output::to_tree(node, true));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_roots(cli: &Cli, source: &SourceArgs) -> CliResult<()> {
    let provider = create_provider(cli, source)?;
    print_nodes(&provider.root_nodes()?);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_children(cli: &Cli, source: &SourceArgs, parent_id: &str) -> CliResult<()> {
    let provider = create_provider(cli, source)?;
    print_nodes(&provider.children_nodes(&NodeId::parse_loose(parent_id))?);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_choices(cli: &Cli, source: &SourceArgs) -> CliResult<()> {
    let provider = create_provider(cli, source)?;
    let view = TreeView::from_provider(provider.as_ref(), &parse_query_options(source)?)?;
    for choice in &view.choices {
        let id = choice.id.as_ref().map_or_else(|| "-".to_string(), ToString::to_string);
        output::info(&format!("{}\t{}", choice.label, id));
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli, None)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            output::header("Config paths");
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", describe_path(&path))),
                None => output::detail("global: (no home directory)"),
            }
            if let Some(local) = &cli.config {
                output::detail(&format!("local:  {}", describe_path(local)));
            }
        }
    }
    Ok(())
}

fn describe_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
