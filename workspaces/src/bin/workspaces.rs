// workspaces: inspect a project's saved editor workspaces
//
// Commands:
//   workspaces list [--project <dir>] [--json]
//   workspaces show <name> [--project <dir>] [--json]
//   workspaces settings [--prompt on|off] [--project <dir>]
//   workspaces clean [--project <dir>]

use anyhow::{anyhow, Context, Result};
use std::{env, path::PathBuf};
use workspaces_lib::{
    config::Config,
    logging::init_logging,
    snapshot::{restore::plan_groups, Snapshot, SnapshotStore},
};

fn print_help() {
    println!(
        r#"workspaces - inspect saved editor workspaces

USAGE:
    workspaces <COMMAND> [OPTIONS]

COMMANDS:
    list                   List saved workspaces
    show <name>            Show a workspace's documents in restore order
    settings               Show or change the load prompt setting
    clean                  Remove stale temp files from interrupted saves
    help                   Show this help message

OPTIONS:
    --project <dir>    Project root (defaults to the nearest directory
                       containing the workspaces directory, else cwd)
    --prompt <on|off>  Ask before loading a workspace (for settings)
    --json             Output in JSON format

ENVIRONMENT:
    WORKSPACES_DIR     Workspaces directory name (default .vsworkspaces)
    RUST_LOG           Log filter, e.g. RUST_LOG=debug

EXAMPLES:
    workspaces list
    workspaces show "bug 1234" --json
    workspaces settings --prompt off --project ~/code/app
"#
    );
}

fn parse_switch(value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(anyhow!("--prompt expects on or off, got '{}'", other)),
    }
}

/// Options following the command name
#[derive(Debug, Default, PartialEq)]
struct Options {
    project_path: Option<String>,
    json_output: bool,
    prompt: Option<bool>,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--project" | "-p" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| anyhow!("--project expects a directory"))?;
                options.project_path = Some(value.clone());
            }
            "--json" => {
                options.json_output = true;
            }
            "--prompt" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| anyhow!("--prompt expects on or off"))?;
                options.prompt = Some(parse_switch(value)?);
            }
            other => options.positional.push(other.to_string()),
        }
        i += 1;
    }

    Ok(options)
}

fn print_summary(snapshot: &Snapshot) {
    let captured = snapshot
        .captured_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let active = snapshot
        .active_document()
        .map(|d| d.relative_path.as_str())
        .unwrap_or("-");
    println!(
        "{:<24} {:>3} docs  {:<16}  active: {}",
        snapshot.name,
        snapshot.documents.len(),
        captured,
        active
    );
}

fn print_details(snapshot: &Snapshot) {
    print_summary(snapshot);

    for (index, group) in plan_groups(&snapshot.documents).iter().enumerate() {
        println!("  group {}:", index + 1);
        for doc in group {
            let cursor = doc
                .cursor()
                .map(|c| format!("{}:{}", c.line, c.column))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "    {}{} @ {}  [{:?}{}]",
                if doc.is_active { "* " } else { "  " },
                doc.relative_path,
                cursor,
                doc.window_state,
                if doc.is_floating { ", floating" } else { "" }
            );
        }
    }

    if !snapshot.tool_windows.is_empty() {
        println!("  tool windows:");
        for tool in &snapshot.tool_windows {
            println!(
                "    {} ({}){}",
                tool.caption,
                tool.kind,
                if tool.is_visible { "" } else { " hidden" }
            );
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    let _ = init_logging("warn");

    let command = &args[1];

    let Options {
        project_path,
        json_output,
        prompt,
        positional,
    } = parse_options(&args[2..])?;

    let config = Config::from_env();
    let cwd = env::current_dir().context("Failed to read current directory")?;
    let project_root = project_path
        .map(PathBuf::from)
        .or_else(|| config.find_project_root(&cwd))
        .unwrap_or(cwd);
    let store = SnapshotStore::new(&project_root, config);

    match command.as_str() {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }

        "list" => {
            let snapshots = store
                .list()
                .with_context(|| format!("Failed to list workspaces in {}", store.dir().display()))?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
                return Ok(());
            }

            if snapshots.is_empty() {
                println!("No workspaces found in {}", store.dir().display());
                return Ok(());
            }
            for snapshot in &snapshots {
                print_summary(snapshot);
            }
            Ok(())
        }

        "show" => {
            let name = positional
                .first()
                .ok_or_else(|| anyhow!("Usage: workspaces show <name>"))?;
            let snapshot = store
                .load(name)
                .with_context(|| format!("Failed to load workspace '{}'", name))?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_details(&snapshot);
            }
            Ok(())
        }

        "settings" => {
            let mut settings = store.load_settings().context("Failed to load settings")?;
            if let Some(show) = prompt {
                settings.show_load_prompt = show;
                store
                    .save_settings(&settings)
                    .context("Failed to save settings")?;
            }

            if json_output {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!(
                    "Ask before loading: {}",
                    if settings.show_load_prompt { "on" } else { "off" }
                );
            }
            Ok(())
        }

        "clean" => {
            let (deleted, scanned) = store
                .cleanup_stale_temps()
                .context("Failed to clean workspaces directory")?;
            println!("Removed {} stale temp files ({} files scanned)", deleted, scanned);
            Ok(())
        }

        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
    }
}
