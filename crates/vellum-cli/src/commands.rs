use std::path::Path;

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use serde::Serialize;
use serde_json::{json, Value};
use vellum_diff::{
    diff_document, render, ChangeCounts, ChangeKind, DefaultTranslator, LocaleLabels, LocaleSet,
    RenderNode, RenderOptions, TextSegment,
};
use vellum_schema::{walk, AppConfig, EntityConfig};
use vellum_server::{ServerConfig, SourceConfig, VellumServer};
use vellum_store::VersionSnapshot;
use vellum_types::{DocumentData, LocaleCode};

use crate::cli::{CheckArgs, Cli, Command, DiffArgs, OutputFormat, ServeArgs, WalkArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Check(args) => cmd_check(args, format),
        Command::Walk(args) => cmd_walk(args, format),
        Command::Diff(args) => cmd_diff(args, format),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
    Ok(config)
}

fn entity<'a>(config: &'a AppConfig, slug: &str, global: bool) -> anyhow::Result<EntityConfig<'a>> {
    let found = if global {
        config.global(slug).map(EntityConfig::Global)
    } else {
        config.collection(slug).map(EntityConfig::Collection)
    };
    found.ok_or_else(|| {
        let kind = if global { "global" } else { "collection" };
        anyhow!("no {kind} named {slug:?}")
    })
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    config.validate().context("invalid configuration")?;

    let entities: Vec<(&str, EntityConfig<'_>)> = config
        .collections
        .iter()
        .map(|c| ("collection", EntityConfig::Collection(c)))
        .chain(config.globals.iter().map(|g| ("global", EntityConfig::Global(g))))
        .collect();

    match format {
        OutputFormat::Json => {
            let summary: Vec<Value> = entities
                .iter()
                .map(|(kind, e)| -> anyhow::Result<Value> {
                    Ok(json!({"kind": kind, "slug": e.slug(), "leaves": walk(e.fields())?.count()}))
                })
                .collect::<anyhow::Result<_>>()?;
            let report = json!({"valid": true, "entities": summary});
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for (kind, e) in &entities {
                let leaves = walk(e.fields())?.count();
                println!("{} {} ({kind}, {leaves} leaves)", "✓".green(), e.slug().bold());
            }
            println!("{} {} is valid", "✓".green().bold(), args.config.display());
        }
    }
    Ok(())
}

fn cmd_walk(args: WalkArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let entity = entity(&config, &args.slug, args.global)?;
    let leaves = walk(entity.fields())?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = leaves
                .map(|leaf| {
                    json!({
                        "path": leaf.path.to_string(),
                        "type": leaf.field.type_name(),
                        "localized": leaf.localized,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for leaf in leaves {
                let localized = if leaf.localized {
                    " localized".cyan().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{}  {}{localized}",
                    leaf.path.to_string().bold(),
                    leaf.field.type_name().dimmed()
                );
            }
        }
    }
    Ok(())
}

/// Field data of a snapshot file: either a full version record (field values
/// under `version`) or a bare document.
pub fn read_snapshot(path: &Path) -> anyhow::Result<DocumentData> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    if value.get("version").is_some_and(Value::is_object) && value.get("createdAt").is_some() {
        let snapshot: VersionSnapshot = serde_json::from_value(value)
            .with_context(|| format!("{} is not a valid version record", path.display()))?;
        return Ok(snapshot.data);
    }
    match value {
        Value::Object(data) => Ok(data),
        _ => bail!("{} does not contain a JSON object", path.display()),
    }
}

#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub counts: ChangeCounts,
    pub rows: Vec<RenderNode>,
}

pub fn diff_files(args: &DiffArgs) -> anyhow::Result<DiffReport> {
    let config = load_config(&args.config)?;
    let entity = entity(&config, &args.slug, args.global)?;
    let base = read_snapshot(&args.base)?;
    let comparison = read_snapshot(&args.comparison)?;

    let requested = args
        .locales
        .iter()
        .map(|code| LocaleCode::new(code.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    let configured = LocaleSet::from_config(&config);
    if configured.matches_none(&requested) {
        bail!("none of the requested locales is configured: {}", args.locales.join(","));
    }
    let locales = configured.select(&requested);
    tracing::debug!(locales = locales.len(), "diffing snapshot files");

    let tree = diff_document(entity.fields(), &base, &comparison, &locales)?;
    let options = RenderOptions {
        hide_unchanged: args.hide_unchanged,
    };
    let rows = render(
        &tree,
        entity.fields(),
        &LocaleLabels::from_config(&config),
        &DefaultTranslator,
        &options,
    );
    Ok(DiffReport {
        counts: tree.counts(),
        rows,
    })
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = diff_files(&args)?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.counts.total() == 0 {
        println!("No changes.");
        return Ok(());
    }
    for row in &report.rows {
        print_row(row);
    }
    println!(
        "\n{} added, {} removed, {} modified",
        report.counts.added.to_string().green(),
        report.counts.removed.to_string().red(),
        report.counts.modified.to_string().yellow(),
    );
    Ok(())
}

fn print_row(row: &RenderNode) {
    let indent = "  ".repeat(row.depth);
    let (marker, label) = match row.change {
        ChangeKind::Added => ("+".green(), row.label.green()),
        ChangeKind::Removed => ("-".red(), row.label.red()),
        ChangeKind::Modified => ("~".yellow(), row.label.yellow()),
        ChangeKind::Unchanged => (" ".normal(), row.label.dimmed()),
    };
    let value = match (&row.text_diff, &row.before, &row.after) {
        (Some(diff), _, _) => diff
            .segments
            .iter()
            .map(|segment| match segment {
                TextSegment::Equal(text) => text.normal().to_string(),
                TextSegment::Inserted(text) => text.green().underline().to_string(),
                TextSegment::Deleted(text) => text.red().strikethrough().to_string(),
            })
            .collect::<String>(),
        (None, Some(before), Some(after)) if row.change == ChangeKind::Modified => {
            format!("{} → {}", short(before).red(), short(after).green())
        }
        (None, None, Some(after)) => short(after).green().to_string(),
        (None, Some(before), None) => short(before).red().to_string(),
        _ => String::new(),
    };
    if value.is_empty() {
        println!("{indent}{marker} {label}");
    } else {
        println!("{indent}{marker} {label}: {value}");
    }
}

/// Compact one-line rendering of a JSON value.
fn short(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > 60 {
        format!("{}…", text.chars().take(59).collect::<String>())
    } else {
        text
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.parse().with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    if let Some(app) = args.app {
        config.app_config = app;
    }
    if let Some(seed) = args.seed {
        config.source = SourceConfig::Memory { seed: Some(seed) };
    }
    config.allow_cors |= args.cors;

    let server = VellumServer::from_config(config)?;
    println!(
        "{} Vellum server on {}",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}
