use std::io;
use std::path::PathBuf;

use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use yuju::engine::SqliteEngine;
use yuju::error::Result;
use yuju::settings::Settings;
use yuju::shell::{Flow, Shell};

fn history_path(settings: &Settings) -> Option<PathBuf> {
    match &settings.shell.history_file {
        Some(path) => Some(PathBuf::from(path)),
        None => dirs::home_dir().map(|p| p.join(".yuju_history")),
    }
}

fn run(settings: Settings) -> Result<()> {
    let engine = if settings.database.in_memory {
        SqliteEngine::open_in_memory()?
    } else {
        let existed = std::path::Path::new(&settings.database.path).exists();
        let engine = SqliteEngine::open(&settings.database.path)?;
        if existed {
            println!("数据库 {} 已存在，直接连接", settings.database.path);
        } else {
            println!("数据库 {} 不存在，已创建", settings.database.path);
        }
        engine
    };
    info!(path = %settings.database.path, in_memory = settings.database.in_memory, "database opened");

    let history = history_path(&settings);
    let mut shell = Shell::new(engine, settings.shell);
    let mut stdout = io::stdout();
    shell.greet(&mut stdout)?;

    let mut editor = DefaultEditor::new()?;
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    loop {
        let prompt = shell.prompt().cyan().bold().to_string();
        match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if shell.handle_line(&line, &mut stdout)? == Flow::Quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                shell.handle_line("quit", &mut stdout)?;
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            warn!(error = %e, "could not save history");
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "Failed to load settings:".red(), e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run(settings) {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}
