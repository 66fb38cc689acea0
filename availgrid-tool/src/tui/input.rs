use availgrid_core::Weekday;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, AppMode};

pub async fn handle_event(app: &mut App, event: Event) {
    if let Event::Key(key) = event {
        if key.kind == KeyEventKind::Press {
            handle_key(app, key).await;
        }
    }
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    match app.mode {
        AppMode::Browse => handle_browse_key(app, key).await,
        AppMode::AddStudent => handle_text_key(app, key).await,
        AppMode::ConfirmDelete => handle_confirm_key(app, key).await,
        AppMode::BusyForm | AppMode::GridForm => handle_form_key(app, key).await,
    }
}

async fn handle_browse_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Char(' ') => app.toggle_current(),
        KeyCode::Enter => app.activate_current(),
        KeyCode::Char('a') => app.session.select_all(),
        KeyCode::Char('n') => app.session.select_none(),
        KeyCode::Char('+') | KeyCode::Char('i') => app.open_add_student(),
        KeyCode::Char('d') | KeyCode::Delete => app.ask_delete(),
        KeyCode::Char('b') => app.open_busy_form(),
        KeyCode::Char('p') => app.open_grid_form(),
        KeyCode::Char('g') | KeyCode::F(5) => app.request_grid(),
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('r') => app.reload().await,
        KeyCode::Char('[') => app.cycle_slot(false),
        KeyCode::Char(']') => app.cycle_slot(true),
        KeyCode::PageUp => app.scroll_grid(false),
        KeyCode::PageDown => app.scroll_grid(true),
        KeyCode::Char(c @ '1'..='7') => {
            let index = c as usize - '1' as usize;
            app.toggle_day(Weekday::ALL[index]);
        }
        _ => {}
    }
}

async fn handle_text_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_popup(),
        KeyCode::Enter => app.submit_student().await,
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Left => app.input_left(),
        KeyCode::Right => app.input_right(),
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}

async fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_delete(true).await,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_delete(false).await,
        _ => {}
    }
}

async fn handle_form_key(app: &mut App, key: KeyEvent) {
    let busy = app.mode == AppMode::BusyForm;
    let form = if busy {
        &mut app.busy_form
    } else {
        &mut app.grid_form
    };
    match key.code {
        KeyCode::Esc => app.close_popup(),
        KeyCode::Tab => form.next_field(true),
        KeyCode::BackTab => form.next_field(false),
        KeyCode::Up | KeyCode::Char('+') => form.adjust(true),
        KeyCode::Down | KeyCode::Char('-') => form.adjust(false),
        KeyCode::Left => form.sideways(false),
        KeyCode::Right => form.sideways(true),
        KeyCode::Enter if busy => app.submit_busy().await,
        KeyCode::Enter => app.submit_grid_form(),
        _ => {}
    }
}
