pub mod app;
pub mod input;
pub mod message;
pub mod projector;
pub mod theme;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

pub use app::{App, AppOptions, Command};
pub use message::{DataLoaded, Message};

pub async fn run(options: AppOptions) -> Result<()> {
    if !std::io::IsTerminal::is_terminal(&io::stdout()) {
        anyhow::bail!("swarmboard requires an interactive terminal");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(options);

    // Initial load; the UI comes up immediately with a loading indicator.
    if app.update(Message::Reload) == Some(Command::Reload) {
        app.spawn_reload();
    }

    let result = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Resize(width, height) => {
                    // Layout recomputes from the new size on the next draw;
                    // no reload is needed.
                    app.width = width;
                    app.height = height;
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let msg = input::dispatch(app, key);
                    match app.update(msg) {
                        Some(Command::Quit) => return Ok(()),
                        Some(Command::Reload) => app.spawn_reload(),
                        None => {}
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.poll_reload();
            last_tick = std::time::Instant::now();
        }
    }
}
