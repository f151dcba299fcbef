//! Database maintenance commands.

use super::AppContext;
use anyhow::Context;
use gonetwork::storage::migrations::max_version;
use gonetwork::storage::schema::{MIGRATIONS, TABLES};

/// Init command.
pub fn cmd_init(ctx: &AppContext) -> anyhow::Result<()> {
    let db = ctx.open_database()?;
    let version = db.schema_version()?;
    println!("Database ready at {}", db.path().display());
    println!("Schema version: {version}");
    Ok(())
}

/// Doctor command. Fails when any problem is found.
pub fn cmd_doctor(ctx: &AppContext) -> anyhow::Result<()> {
    let paths = ctx.paths();
    let resolved = paths.resolve();
    let mut problems = Vec::new();

    println!("Database Diagnostics");
    println!("====================");
    println!();
    let origin = if paths.explicit.is_some() {
        "configured"
    } else if resolved == paths.secondary {
        "web data directory"
    } else {
        "application data directory"
    };
    println!("Resolved path: {} ({origin})", resolved.display());
    println!("  Primary:   {}", paths.primary.display());
    println!("  Secondary: {}", paths.secondary.display());

    if let Some(legacy) = paths.legacy_file() {
        problems.push(format!(
            "legacy database found at {}; it is never read, move its data into {}",
            legacy.display(),
            resolved.display()
        ));
    }

    if resolved.is_file() {
        let db = ctx.database();
        let version = db.schema_version().context("reading schema version")?;
        let expected = max_version(MIGRATIONS);
        println!("Schema version: {version} (latest {expected})");
        if version < expected {
            problems.push(format!(
                "schema is at version {version}, run `gonetwork init` to migrate to {expected}"
            ));
        }

        let present = db.list_tables().context("listing tables")?;
        let missing: Vec<&str> = TABLES
            .iter()
            .copied()
            .filter(|t| !present.iter().any(|p| p.as_str() == *t))
            .collect();
        println!("Tables: {} present, {} missing", present.len(), missing.len());
        for table in missing {
            problems.push(format!("table '{table}' is missing"));
        }
    } else {
        problems.push(format!(
            "no database at {}, run `gonetwork init`",
            resolved.display()
        ));
    }

    println!();
    if problems.is_empty() {
        println!("No problems found.");
        return Ok(());
    }
    println!("Problems:");
    for problem in &problems {
        println!("  - {problem}");
    }
    anyhow::bail!("{} problem(s) found", problems.len())
}

/// Tables command.
pub fn cmd_tables(ctx: &AppContext, table: Option<&str>) -> anyhow::Result<()> {
    let db = ctx.existing_database()?;

    let Some(table) = table else {
        for name in db.list_tables()? {
            let rows = db.count(&format!("SELECT COUNT(*) FROM \"{name}\""), &[])?;
            println!("{name:<24} {rows:>8} rows");
        }
        return Ok(());
    };

    let columns = db.list_columns(table)?;
    if columns.is_empty() {
        anyhow::bail!("table '{table}' does not exist");
    }
    println!("{table}");
    for column in columns {
        let mut flags = Vec::new();
        if column.primary_key {
            flags.push("PK");
        }
        if column.not_null {
            flags.push("NOT NULL");
        }
        println!(
            "  {:<20} {:<10} {}",
            column.name,
            column.declared_type,
            flags.join(" ")
        );
    }
    Ok(())
}
