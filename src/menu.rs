//! Interactive menu loop (thin, non-core).
//!
//! Malformed numeric or date input re-prompts; data-integrity failures from
//! the store abort the operation and surface to the caller. Ctrl-C/Ctrl-D at
//! any prompt unwinds to a graceful exit.

use std::collections::BTreeSet;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime, Utc};
use crossterm::style::Stylize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chart;
use crate::config::TrackerConfig;
use crate::error::StoreError;
use crate::project::{ProjectMetadata, ProjectSession};
use crate::store::Store;

enum Input {
    Line(String),
    Quit,
}

enum Flow {
    Back,
    Quit,
}

/// Run the menu loop until the writer quits. Always exits cleanly (code 0)
/// on Ctrl-C/Ctrl-D.
pub fn run(config: &TrackerConfig, store: &Store) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new().context("failed to initialize the interactive prompt")?;
    if config.history_file.exists() {
        let _ = rl.load_history(&config.history_file);
    }

    let result = main_loop(&mut rl, store);

    if let Some(parent) = config.history_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = rl.save_history(&config.history_file) {
        tracing::debug!("could not save prompt history: {e}");
    }
    result
}

fn main_loop(rl: &mut DefaultEditor, store: &Store) -> anyhow::Result<()> {
    loop {
        let ids = store.list_project_ids()?;

        println!("\nSelect an option:");
        println!("  1. Make a new project");
        if !ids.is_empty() {
            println!("  2. Select an existing project");
            println!("  3. Delete a project");
        }
        println!("  q. Quit");

        let choice = match prompt(rl, "Enter the option number: ")? {
            Input::Quit => break,
            Input::Line(line) => line,
        };

        match choice.trim() {
            "1" => match new_project(rl, store, &ids)? {
                Some(session) => {
                    if let Flow::Quit = project_loop(rl, store, session)? {
                        break;
                    }
                }
                None => break,
            },
            "2" if !ids.is_empty() => {
                print_project_list(&ids);
                let id = match prompt(rl, "Enter the project ID you want to select: ")? {
                    Input::Quit => break,
                    Input::Line(line) => line.trim().to_string(),
                };
                match store.open_project(&id) {
                    Ok((metadata, samples)) => {
                        let session = ProjectSession::hydrate(metadata, samples)?;
                        if let Flow::Quit = project_loop(rl, store, session)? {
                            break;
                        }
                    }
                    Err(err @ StoreError::NotFound { .. }) => {
                        println!("{}", err.to_string().yellow());
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            "3" if !ids.is_empty() => {
                print_project_list(&ids);
                let id = match prompt(rl, "Enter the project ID you want to DELETE FOREVER: ")? {
                    Input::Quit => break,
                    Input::Line(line) => line.trim().to_string(),
                };
                store.delete_project(&id)?;
                println!("Project {id} removed.");
            }
            "q" | "quit" | "exit" => break,
            _ => println!("Invalid option"),
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn new_project(
    rl: &mut DefaultEditor,
    store: &Store,
    existing: &BTreeSet<String>,
) -> anyhow::Result<Option<ProjectSession>> {
    let project_id = loop {
        match prompt(rl, "Enter a unique project ID: ")? {
            Input::Quit => return Ok(None),
            Input::Line(line) => {
                let id = line.trim().to_string();
                if id.is_empty() {
                    println!("{}", "Project ID must not be empty.".yellow());
                    continue;
                }
                if existing.contains(&id) {
                    println!("Project ID already exists, please choose a different one.");
                    continue;
                }
                break id;
            }
        }
    };

    loop {
        let start = match read_date(
            rl,
            "Enter the start date (YYYY-MM-DD) or press Enter for today: ",
            true,
        )? {
            None => return Ok(None),
            Some(date) => date,
        };
        let goal = match read_date(rl, "Enter the goal date (YYYY-MM-DD): ", false)? {
            None => return Ok(None),
            // allow_empty is false, so a successful read always carries a date
            Some(Some(date)) => date,
            Some(None) => continue,
        };
        let word_goal = match read_i64(rl, "Enter the total word goal: ")? {
            None => return Ok(None),
            Some(value) => value,
        };

        let now = Utc::now();
        let (start_date, started_at) = match start {
            Some(date) => (date, date.and_time(NaiveTime::MIN).and_utc()),
            None => (now.date_naive(), now),
        };

        match ProjectMetadata::new(project_id.clone(), start_date, goal, word_goal) {
            Ok(metadata) => {
                let session = ProjectSession::create(metadata, started_at);
                store.append_samples(session.metadata(), session.samples())?;
                return Ok(Some(session));
            }
            Err(err) => println!("{}", err.to_string().yellow()),
        }
    }
}

fn project_loop(
    rl: &mut DefaultEditor,
    store: &Store,
    mut session: ProjectSession,
) -> anyhow::Result<Flow> {
    loop {
        println!("\nSelect an option:");
        println!("  1. Update word count");
        println!("  2. Show progress");
        println!("  3. Show chart");
        println!("  4. Back to the project list");

        let choice = match prompt(rl, "Enter the option number: ")? {
            Input::Quit => return Ok(Flow::Quit),
            Input::Line(line) => line,
        };

        match choice.trim() {
            "1" => {
                println!(
                    "Last time you said your total word count was {} words out of your {} word goal",
                    session.last_reported_total(),
                    session.metadata().word_goal
                );
                let total = match read_i64(rl, "What's your total word count now? ")? {
                    None => return Ok(Flow::Quit),
                    Some(value) => value,
                };
                let sample = session.record_progress(total);
                store.append_samples(session.metadata(), std::slice::from_ref(&sample))?;
                println!("{} words to go.", sample.words_remaining);
            }
            "2" => show_progress(&session),
            "3" => {
                let mut out = std::io::stdout();
                chart::render(session.metadata(), session.samples(), &mut out)?;
            }
            "4" => return Ok(Flow::Back),
            _ => println!("Invalid option"),
        }
    }
}

fn show_progress(session: &ProjectSession) {
    let progress = session.current_progress();
    let standing = if progress.ahead_of_schedule {
        "on schedule".green().to_string()
    } else {
        "behind schedule".red().to_string()
    };
    println!(
        "{} words remaining ({:.1}% of {} written), {standing}",
        progress.words_remaining,
        progress.fraction_complete * 100.0,
        session.metadata().word_goal,
    );
}

fn print_project_list(ids: &BTreeSet<String>) {
    println!("\nExisting projects:");
    for id in ids {
        println!("  {id}");
    }
}

fn prompt(rl: &mut DefaultEditor, msg: &str) -> anyhow::Result<Input> {
    match rl.readline(msg) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.as_str());
            }
            Ok(Input::Line(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(Input::Quit),
        Err(e) => Err(e).context("failed to read input"),
    }
}

/// Re-prompts until a whole number is entered; `None` means the writer quit.
fn read_i64(rl: &mut DefaultEditor, msg: &str) -> anyhow::Result<Option<i64>> {
    loop {
        match prompt(rl, msg)? {
            Input::Quit => return Ok(None),
            Input::Line(line) => match line.trim().parse::<i64>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => println!("{}", "Please enter a whole number.".yellow()),
            },
        }
    }
}

/// Re-prompts until a `YYYY-MM-DD` date (or, when allowed, an empty line)
/// is entered. Outer `None` means the writer quit; inner `None` means the
/// empty-line default was taken.
fn read_date(
    rl: &mut DefaultEditor,
    msg: &str,
    allow_empty: bool,
) -> anyhow::Result<Option<Option<NaiveDate>>> {
    loop {
        match prompt(rl, msg)? {
            Input::Quit => return Ok(None),
            Input::Line(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() && allow_empty {
                    return Ok(Some(None));
                }
                match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                    Ok(date) => return Ok(Some(Some(date))),
                    Err(_) => println!("{}", "Please enter a date as YYYY-MM-DD.".yellow()),
                }
            }
        }
    }
}
