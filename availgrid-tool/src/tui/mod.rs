mod app;
mod input;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use availgrid_client::AvailabilityClient;
use availgrid_core::GridRequest;
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;

use app::App;

use crate::error::ToolError;

pub async fn run(
    client: AvailabilityClient,
    request: GridRequest,
    export_dir: PathBuf,
    title: String,
) -> Result<(), ToolError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, request, export_dir, title);
    info!(base_url = app.client.base_url(), "starting timetable");
    app.load().await;

    let result = run_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), ToolError> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Short poll so background grid replies are picked up promptly
        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            input::handle_event(app, event).await;
        }

        app.poll_grids();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
