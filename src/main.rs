// Entry point and high-level CLI flow.
//
// - `show` renders one question's dashboard (KPI strip plus chart preview).
// - `list` prints the question menu, `check` loads every dataset.
// - Without a command the binary runs the interactive menu: pick a question,
//   read its dashboard, then go back to the menu or exit.
mod charts;
mod cli;
mod error;
#[cfg(test)]
mod fixtures;
mod loader;
mod output;
mod questions;
mod reports;
mod types;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, RenderArgs};
use loader::Session;
use reports::RenderOptions;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Print `prompt` and read one trimmed line; `None` once stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to go back to the question menu. Closed stdin means no.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to question selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_menu() {
    println!("{}", output::PAGE_TITLE);
    println!("Select Dashboard Question:");
    for q in questions::Question::all() {
        let title = q.report().map_or("-", reports::Report::title);
        println!("[{}] {} ({})", q.number(), q, title);
    }
    println!("[Q] Quit\n");
}

fn handle_show(
    session: &Session,
    question: &str,
    opts: &RenderOptions,
    json: bool,
    kpi_out: Option<&Path>,
    chart_out: Option<&Path>,
) -> Result<()> {
    let data = session.datasets()?;
    let rendered = reports::dispatch(question, data, opts)?;
    output::print_rendered(&rendered, json)?;
    if let Some(path) = kpi_out {
        output::write_csv(path, &rendered.kpis)
            .with_context(|| format!("writing KPIs to {}", path.display()))?;
        info!(path = %path.display(), "KPI strip exported");
    }
    if let Some(path) = chart_out {
        output::write_json(path, &rendered.chart)
            .with_context(|| format!("writing chart to {}", path.display()))?;
        info!(path = %path.display(), "chart exported");
    }
    Ok(())
}

fn handle_check(session: &Session, json: bool) -> Result<()> {
    let data = session.datasets()?;
    output::print_rows(data.reports(), json)?;
    if !json {
        let rows: usize = data.reports().iter().map(|r| r.rows).sum();
        println!(
            "All {} dataset files present ({} rows).",
            data.reports().len(),
            util::format_int(rows)
        );
    }
    Ok(())
}

fn handle_interactive(session: &Session, opts: &RenderOptions, json: bool) -> Result<()> {
    // Missing files stop the run before the first menu.
    session.datasets()?;
    loop {
        print_menu();
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        if choice.eq_ignore_ascii_case("q") {
            break;
        }
        println!();
        match reports::dispatch(&choice, session.datasets()?, opts) {
            Ok(rendered) => output::print_rendered(&rendered, json)?,
            Err(e) => {
                debug!(choice = %choice, error = ?e, "dashboard failed");
                eprintln!("Error: {e}\n");
            }
        }
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let session = Session::new(&cli.data_dir);
    info!(data_dir = %cli.data_dir.display(), "starting");

    match cli.command {
        Some(Commands::Show {
            question,
            render,
            kpi_out,
            chart_out,
        }) => handle_show(
            &session,
            &question,
            &RenderOptions::from(&render),
            cli.json,
            kpi_out.as_deref(),
            chart_out.as_deref(),
        ),
        Some(Commands::List) => {
            output::print_rows(&questions::catalog(), cli.json)?;
            Ok(())
        }
        Some(Commands::Check) => handle_check(&session, cli.json),
        Some(Commands::Interactive { render }) => {
            handle_interactive(&session, &RenderOptions::from(&render), cli.json)
        }
        None => handle_interactive(&session, &RenderOptions::from(&RenderArgs::default()), cli.json),
    }
}
