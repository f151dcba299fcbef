//! Config command handler.

use super::AppContext;

/// Config command. Prints where the configuration came from and any
/// config files that were passed over, then the effective values as JSON.
pub fn cmd_config(ctx: &AppContext) -> anyhow::Result<()> {
    for skipped in ctx.skipped() {
        println!("# Skipped {}: {}", skipped.path.display(), skipped.error);
    }
    match ctx.source() {
        Some(source) => println!("# Loaded from {}", source.display()),
        None => println!("# No config file found, using defaults"),
    }
    println!("# Database: {}", ctx.paths().resolve().display());
    println!("{}", serde_json::to_string_pretty(ctx.config())?);
    Ok(())
}
