use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use invokeai_models::api::ModelsApi;
use invokeai_models::commands::{CmdMessage, CmdResult, MessageLevel};
use invokeai_models::config::AppConfig;
use invokeai_models::db::sqlite::SqliteModelStore;
use invokeai_models::error::{ModelsError, Result};
use invokeai_models::model::{DatabaseModelRecord, ModelRecord, RowMetadata, Snapshot, SyncAction, SyncPlan};
use std::collections::BTreeMap;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let mut ctx = match init_context() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    // operation failures are reported but are not setup failures; only a
    // broken configuration exits non-zero
    if let Err(e) = run(&mut ctx, cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
}

struct AppContext {
    api: ModelsApi<SqliteModelStore>,
}

fn init_context() -> Result<AppContext> {
    let proj_dirs = ProjectDirs::from("com", "itsjustregi", "invokeai-models")
        .ok_or_else(|| ModelsError::Config("could not determine a data directory".to_string()))?;

    let config = AppConfig::load(proj_dirs.data_dir())?;
    config.validate()?;

    let db = SqliteModelStore::open(&config.database_path())?;
    Ok(AppContext {
        api: ModelsApi::new(db, config),
    })
}

fn run(ctx: &mut AppContext, cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CreateSnapshot => handle_create_snapshot(ctx),
        Commands::ListSnapshots => handle_list_snapshots(ctx),
        Commands::DeleteSnapshot { names } => handle_delete_snapshot(ctx, names, cli.yes),
        Commands::RestoreSnapshot { name } => handle_restore_snapshot(ctx, name, cli.yes),
        Commands::LocalModels { tree, refresh } => handle_local_models(ctx, tree, refresh),
        Commands::DatabaseModels { refresh } => handle_database_models(ctx, refresh),
        Commands::Compare { sync } => handle_compare(ctx, sync, cli.yes),
        Commands::Sync { dry_run } => handle_sync(ctx, dry_run, cli.yes),
        Commands::DeleteModels { names, dry_run } => {
            handle_delete_models(ctx, names, dry_run, cli.yes)
        }
        Commands::CacheUpdate => handle_cache_update(ctx),
    }
}

fn handle_create_snapshot(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.create_snapshot()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list_snapshots(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_snapshots()?;
    print_snapshots(&result.snapshots);
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete_snapshot(ctx: &AppContext, names: Vec<String>, yes: bool) -> Result<()> {
    if !yes {
        let prompt = format!(
            "Delete {} snapshot(s)? This action is irreversible.",
            names.len()
        );
        if !confirm(&prompt)? {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let result = ctx.api.delete_snapshots(&names)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_restore_snapshot(ctx: &AppContext, name: String, yes: bool) -> Result<()> {
    if !yes && !confirm("Restore this snapshot? This will replace your current database.")? {
        println!("Restoration cancelled.");
        return Ok(());
    }

    let result = ctx.api.restore_snapshot(&name)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_local_models(ctx: &AppContext, tree: bool, refresh: bool) -> Result<()> {
    let result = ctx.api.local_models(refresh)?;
    print_local_models(&result.local_models, tree);
    print_messages(&result.messages);
    Ok(())
}

fn handle_database_models(ctx: &AppContext, refresh: bool) -> Result<()> {
    let result = ctx.api.database_models(refresh)?;
    print_database_models(&result.database_models);
    print_messages(&result.messages);
    Ok(())
}

fn handle_compare(ctx: &mut AppContext, sync_after: bool, yes: bool) -> Result<()> {
    let result = ctx.api.compare(false)?;
    print_missing(&result.missing);
    print_messages(&result.messages);

    let has_plan = result.plan.as_ref().map(|p| !p.is_empty()).unwrap_or(false);
    if !sync_after || !has_plan {
        return Ok(());
    }

    if let Some(plan) = &result.plan {
        print_plan(plan);
    }
    if !yes && !confirm("Apply this sync plan? A snapshot will be created first.")? {
        println!("Sync cancelled.");
        return Ok(());
    }

    let applied = ctx.api.sync(false)?;
    print_messages(&applied.messages);
    Ok(())
}

fn handle_sync(ctx: &mut AppContext, dry_run: bool, yes: bool) -> Result<()> {
    if dry_run {
        let result = ctx.api.sync(true)?;
        if let Some(plan) = &result.plan {
            print_plan(plan);
        }
        print_messages(&result.messages);
        return Ok(());
    }

    let preview = ctx.api.compare(false)?;
    let has_plan = preview.plan.as_ref().map(|p| !p.is_empty()).unwrap_or(false);
    if !has_plan {
        print_messages(&preview.messages);
        return Ok(());
    }

    print_missing(&preview.missing);
    if let Some(plan) = &preview.plan {
        print_plan(plan);
    }
    if !yes && !confirm("Apply this sync plan? A snapshot will be created first.")? {
        println!("Sync cancelled.");
        return Ok(());
    }

    let result = ctx.api.sync(false)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete_models(
    ctx: &mut AppContext,
    names: Vec<String>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    if !dry_run && !yes {
        println!("This will permanently delete the following database rows:");
        for name in &names {
            println!("  {}", name);
        }
        if !confirm("Continue?")? {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let result = ctx.api.delete_models(&names, dry_run)?;
    if dry_run {
        if let Some(plan) = &result.plan {
            print_plan(plan);
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_cache_update(ctx: &AppContext) -> Result<()> {
    let result: CmdResult = ctx.api.update_caches()?;
    print_messages(&result.messages);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush().map_err(ModelsError::Io)?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(ModelsError::Io)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad_to_width(h, widths[i]))
        .collect();
    println!("{}", header_line.join("  ").bold());
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad_to_width(cell, widths[i]))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

fn print_local_models(records: &[ModelRecord], tree: bool) {
    if records.is_empty() {
        return;
    }

    let mut by_category: BTreeMap<&str, Vec<&ModelRecord>> = BTreeMap::new();
    for record in records {
        by_category.entry(&record.category).or_default().push(record);
    }

    for (category, models) in by_category {
        println!("\n{}", format!("== {} ==", category.to_uppercase()).blue().bold());

        let rows: Vec<Vec<String>> = models
            .iter()
            .map(|m| {
                vec![
                    m.filename.clone(),
                    m.relative_path.display().to_string(),
                    m.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    m.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();
        print_table(&["Filename", "Relative Path", "Created", "Updated"], &rows);

        if tree {
            for model in models {
                println!("\n{}", model.filename.cyan().bold());
                println!("  {} {}", "full path:".yellow(), model.file_path.display());
                println!("  {} {}", "category:".yellow(), model.category);
                println!(
                    "  {} {}",
                    "created:".yellow(),
                    model.created_at.format("%Y-%m-%d %H:%M:%S")
                );
                println!(
                    "  {} {}",
                    "updated:".yellow(),
                    model.updated_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }
}

fn print_database_models(records: &[DatabaseModelRecord]) {
    // only locally-installed rows are interesting here; the rest belong to
    // InvokeAI's own model manager
    for record in records.iter().filter(|r| r.source_type == "path") {
        println!("\n{}", record.name.blue().bold());
        println!("  {} {}", "key:".green(), record.key);
        if !record.base.is_empty() {
            println!("  {} {}", "base:".green(), record.base);
        }
        if !record.kind.is_empty() {
            println!("  {} {}", "type:".green(), record.kind);
        }
        if !record.format.is_empty() {
            println!("  {} {}", "format:".green(), record.format);
        }
        if let Some(description) = &record.description {
            println!("  {} {}", "description:".green(), description);
        }
        println!("  {} {}", "path:".yellow(), record.path);
        if !record.source.is_empty() {
            println!("  {} {}", "source:".yellow(), record.source);
        }
        if !record.created_at.is_empty() {
            println!("  {} {}", "created_at:".cyan(), record.created_at);
        }
        if !record.updated_at.is_empty() {
            println!("  {} {}", "updated_at:".cyan(), record.updated_at);
        }
        match &record.metadata {
            RowMetadata::Absent => {}
            RowMetadata::Parsed(value) => {
                if let Some(object) = value.as_object() {
                    println!("  {}", "metadata:".magenta());
                    for (k, v) in object {
                        println!("    {}: {}", k.magenta(), v);
                    }
                }
            }
            RowMetadata::Invalid => println!("  {}", "invalid metadata JSON".red()),
        }
    }
}

fn print_missing(records: &[DatabaseModelRecord]) {
    if records.is_empty() {
        return;
    }

    println!("{}", "Database models missing on disk".bold());
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| vec![r.name.clone(), r.format.clone(), r.path.clone()])
        .collect();
    print_table(&["Name", "Format", "Stored Path"], &rows);
}

fn print_plan(plan: &SyncPlan) {
    if plan.is_empty() {
        return;
    }

    println!("\n{}", "Sync plan".bold());
    for action in &plan.actions {
        match action {
            SyncAction::Relocate { name, new_path } => {
                println!("  {} '{}' -> {}", "relocate".yellow(), name, new_path);
            }
            SyncAction::Delete { name } => {
                println!("  {} '{}'", "delete".red(), name);
            }
        }
    }
}

fn print_snapshots(snapshots: &[Snapshot]) {
    if snapshots.is_empty() {
        return;
    }

    let rows: Vec<Vec<String>> = snapshots
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.timestamp.clone(),
                s.path.display().to_string(),
            ]
        })
        .collect();
    print_table(&["Name", "Timestamp", "Path"], &rows);
}
