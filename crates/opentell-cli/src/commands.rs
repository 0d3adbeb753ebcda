use std::io;

use anyhow::Result;

use opentell_core::{resolve_state_dir, StatePaths};
use opentell_runtime::HookEvent;
use opentell_store::Store;

use crate::args::{Cli, Commands};

fn paths(state_dir: Option<&str>) -> Result<StatePaths> {
    let root = resolve_state_dir(state_dir)?;
    Ok(StatePaths::new(root))
}

/// Run a hook body, catching any error so the process still exits 0
/// (spec.md §4.11 "A hook must always exit 0; failure is logged, never
/// raised").
fn guarded(label: &str, body: impl FnOnce() -> Result<()>) {
    if let Err(err) = body() {
        tracing::error!(hook = label, error = %err, "hook failed");
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let paths = paths(cli.state_dir.as_deref())?;
    let _log_guard = crate::logging::init(&paths);

    match command {
        Commands::SessionStart => {
            let event = HookEvent::from_reader(io::stdin());
            let mut context = String::new();
            guarded("session-start", || {
                context = opentell_runtime::session_start::run(&paths, &event.session_id())?;
                Ok(())
            });
            println!("{context}");
        }

        Commands::TurnStop => {
            let event = HookEvent::from_reader(io::stdin());
            guarded("turn-stop", || {
                let Some(transcript_path) = event.transcript_path.as_deref() else {
                    return Ok(());
                };
                opentell_runtime::turn_stop::run(&paths, &event.session_id(), transcript_path)
            });
        }

        Commands::ToolUse => {
            let event = HookEvent::from_reader(io::stdin());
            guarded("tool-use", || {
                let Some(tool_name) = event.tool_name.as_deref() else {
                    return Ok(());
                };
                opentell_runtime::tool_use::run(&paths, &event.session_id(), tool_name, event.tool_input.as_ref())
            });
        }

        Commands::SessionEnd => {
            let event = HookEvent::from_reader(io::stdin());
            guarded("session-end", || opentell_runtime::session_end::run(&paths, &event.session_id()));
        }

        Commands::ClassifyWorker { entry } => {
            guarded("classify-worker", || opentell_runtime::classify_worker::run(&paths, entry));
        }

        Commands::SelfUpdate => {
            guarded("self-update", opentell_runtime::self_update::run);
        }

        Commands::Doctor => {
            let report = opentell_runtime::doctor::run(&paths);
            print_doctor_report(&report, cli.format);
        }

        Commands::Stats => {
            let stats = opentell_runtime::stats::load(&paths.stats());
            print_stats(&stats, cli.format);
        }

        Commands::Promote { instruction_file } => {
            let count = opentell_runtime::promote::run(&paths, &instruction_file);
            println!("Promoted {count} learning(s) into {}", instruction_file.display());
        }

        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to reset without --yes");
            }
            let mut store = Store::load(paths.clone());
            store.reset();
            store.save();
            println!("Cleared all learned state.");
        }
    }

    Ok(())
}

fn print_doctor_report(report: &opentell_runtime::doctor::DoctorReport, format: crate::args::OutputFormat) {
    if format == crate::args::OutputFormat::Json {
        let summary = serde_json::json!({
            "checks": report.checks.iter().map(|c| {
                let status = match &c.status {
                    opentell_runtime::doctor::CheckStatus::Ok => "ok".to_string(),
                    opentell_runtime::doctor::CheckStatus::Missing => "missing".to_string(),
                    opentell_runtime::doctor::CheckStatus::Unparseable(e) => format!("unparseable: {e}"),
                };
                serde_json::json!({ "name": c.name, "status": status })
            }).collect::<Vec<_>>(),
            "state_counts": report.state_counts,
            "total_sessions": report.total_sessions,
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
        return;
    }

    println!("opentell doctor");
    for check in &report.checks {
        let status = match &check.status {
            opentell_runtime::doctor::CheckStatus::Ok => "ok".to_string(),
            opentell_runtime::doctor::CheckStatus::Missing => "missing".to_string(),
            opentell_runtime::doctor::CheckStatus::Unparseable(e) => format!("unparseable ({e})"),
        };
        println!("  {:<16} {status}", check.name);
    }
    println!("learnings by state:");
    for (state, count) in &report.state_counts {
        println!("  {state:<10} {count}");
    }
    println!("total sessions: {}", report.total_sessions);
}

fn print_stats(stats: &opentell_runtime::stats::Stats, format: crate::args::OutputFormat) {
    if format == crate::args::OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(stats).unwrap_or_default());
        return;
    }

    println!("opentell stats");
    for (key, entry) in &stats.by_kind_and_month {
        println!(
            "  {key:<24} calls={:<5} in~{:<8} out~{:<8} cost~${:.4}",
            entry.count, entry.estimated_input_tokens, entry.estimated_output_tokens, entry.estimated_cost_usd
        );
    }
}
