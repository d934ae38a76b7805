mod cli;
mod ui;

use std::{fs::OpenOptions, io, sync::Mutex};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tasktopia::{Config, FlatFile, TaskStore};
use tracing_subscriber::EnvFilter;

use crate::ui::App;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli::command().get_matches();
    let config = cli::resolve_config(&matches).map_err(|err| cli::user_message(&err))?;
    init_logging(&config)?;

    let mut store = TaskStore::open(FlatFile::new(&config.tasks_file));

    if let Some((name, sub_matches)) = matches.subcommand() {
        match cli::run_subcommand(&mut store, name, sub_matches) {
            Ok(output) => println!("{output}"),
            Err(message) => {
                eprintln!("{message}");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.removal_mode);
    let result = ui::run_app(&mut terminal, &mut store, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{:?}", err);
    }
    Ok(())
}

/// The interactive screen owns the terminal, so logs only go to a file.
fn init_logging(config: &Config) -> io::Result<()> {
    let filter = EnvFilter::try_from_env("TASKTOPIA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::sink).init(),
    }
    Ok(())
}
