mod cli;
mod summary;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use probekit_av::config::TIMEOUT_ENV_VAR;
use probekit_av::{FfProbe, ProbeConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use walkdir::WalkDir;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "probekit=debug,probekit_av=trace".to_string()
        } else {
            "probekit=info,probekit_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli);

    match cli.command {
        Commands::Probe { path, json } => probe_path(&path, json, config),
        Commands::CheckTools => check_tools(&config),
    }
}

/// Layer the config file, the environment and command-line flags.
fn load_config(cli: &Cli) -> ProbeConfig {
    let mut config = ProbeConfig::load_or_default(cli.config.as_deref());
    let env = ProbeConfig::from_env();

    // clap already reads FFPROBE into `cli.ffprobe`.
    if let Some(path) = cli.ffprobe.clone().or(env.ffprobe_path) {
        config.ffprobe_path = Some(path);
    }

    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    } else if std::env::var_os(TIMEOUT_ENV_VAR).is_some() {
        config.timeout = env.timeout;
    }

    config
}

fn probe_path(path: &Path, json: bool, config: ProbeConfig) -> Result<ExitCode> {
    let prober = FfProbe::new(config);

    if path.is_file() {
        probe_one(&prober, path, json)?;
    } else if path.is_dir() {
        probe_dir(&prober, path, json)?;
    } else {
        eprintln!("Not a file or directory: {}", path.display());
        return Ok(ExitCode::from(1));
    }

    Ok(ExitCode::SUCCESS)
}

fn probe_one(prober: &FfProbe, file: &Path, json: bool) -> Result<()> {
    let result = prober
        .probe(file)
        .with_context(|| format!("Failed to probe {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", summary::format_summary(&display_name(file), &result));
    }

    Ok(())
}

/// Probe every regular file directly inside `dir`, skipping dot files.
///
/// A file that fails to probe is logged and skipped.
fn probe_dir(prober: &FfProbe, dir: &Path, json: bool) -> Result<()> {
    let mut reports = Vec::new();

    for file in list_media_files(dir)? {
        match prober.probe(file.as_path()) {
            Ok(result) if json => reports.push(serde_json::json!({
                "path": file,
                "result": result,
            })),
            Ok(result) => print!("{}", summary::format_summary(&display_name(&file), &result)),
            Err(e) => tracing::error!("Failed to probe {}: {e}", file.display()),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

fn list_media_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            tracing::debug!("Skipping hidden file {}", entry.path().display());
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_tools(config: &ProbeConfig) -> Result<ExitCode> {
    println!("Checking probe tool...\n");

    let tool = probekit_av::check_tool(config);
    let status = if tool.available { "✓" } else { "✗" };

    print!("{} {}", status, tool.name);

    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }

    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }

    println!();
    println!();

    if tool.available {
        println!("Probe tool is available!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Probe tool is missing. Install ffprobe or set FFPROBE.");
        Ok(ExitCode::from(1))
    }
}
