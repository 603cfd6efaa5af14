use mediconnect_core::config;
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::path::Path;

use super::Context;

/// Show current configuration
pub fn show(ctx: &Context<'_>) -> Result<()> {
    ctx.output.section("Current Configuration");

    let toml_str = toml::to_string_pretty(ctx.config).into_diagnostic()?;
    ctx.output.raw(&toml_str);
    ctx.output.kv(
        "Session directory",
        &ctx.config.session.resolved_directory().display().to_string(),
    );

    Ok(())
}

/// Save current configuration to file
pub async fn save(ctx: &Context<'_>, path: &Path) -> Result<()> {
    ctx.output.info(
        "💾",
        &format!("Saving configuration to: {}", path.display()),
    );

    config::save_config(ctx.config, path).await?;

    ctx.output.success("Configuration saved successfully!");
    ctx.output.raw("");
    ctx.output.raw("To use this configuration, run:");
    ctx.output.raw(&format!(
        "  {} --config {}",
        "mediconnect".bright_green(),
        path.display()
    ));

    Ok(())
}
