use std::collections::BTreeSet;
use std::io;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};
use tasktopia::{RemovalMode, Task, TaskBackend, TaskStore};

use crate::cli::{unsaved_warning, user_message};

/// Screen state. Checked rows index into the latest ordered snapshot and
/// are cleared whenever the store changes.
#[derive(Debug, Default)]
pub struct App {
    pub mode: RemovalMode,
    pub cursor: usize,
    pub checked: BTreeSet<usize>,
    pub status: String,
}

impl App {
    pub fn new(mode: RemovalMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn add<B: TaskBackend>(
        &mut self,
        store: &mut TaskStore<B>,
        title: &str,
        description: &str,
        date: &str,
    ) {
        self.status = match store.add(title, description, date) {
            Ok(task) => format!("Added \"{}\".", task.title),
            Err(err) => user_message(&err),
        };
        self.after_change(store);
    }

    pub fn toggle(&mut self, len: usize) {
        if self.mode != RemovalMode::Select || self.cursor >= len {
            return;
        }
        if !self.checked.remove(&self.cursor) {
            self.checked.insert(self.cursor);
        }
    }

    pub fn delete_checked<B: TaskBackend>(&mut self, store: &mut TaskStore<B>) {
        if self.checked.is_empty() {
            self.status = "Please select a task to delete.".to_string();
            return;
        }
        let snapshot = store.list_ordered();
        let selected: Vec<Task> = self
            .checked
            .iter()
            .filter_map(|&i| snapshot.get(i).cloned())
            .collect();
        let removed = store.remove_selected(&selected);
        self.status = format!("Deleted {removed} task(s).");
        self.after_change(store);
    }

    pub fn accomplish<B: TaskBackend>(&mut self, store: &mut TaskStore<B>) {
        self.status = match store.remove_earliest() {
            Ok(task) => format!("Accomplished \"{}\".", task.title),
            Err(err) => user_message(&err),
        };
        self.after_change(store);
    }

    pub fn switch_mode(&mut self) {
        self.mode = match self.mode {
            RemovalMode::Select => RemovalMode::Earliest,
            RemovalMode::Earliest => RemovalMode::Select,
        };
        self.checked.clear();
    }

    pub fn move_cursor(&mut self, up: bool, len: usize) {
        if up {
            self.cursor = self.cursor.saturating_sub(1);
        } else if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    fn after_change<B: TaskBackend>(&mut self, store: &TaskStore<B>) {
        self.checked.clear();
        self.cursor = self.cursor.min(store.len().saturating_sub(1));
        if !store.is_synced() {
            self.status = format!("{} {}", self.status, unsaved_warning());
        }
    }

    fn help(&self) -> &'static str {
        match self.mode {
            RemovalMode::Select => {
                "a: add  space: select  d: delete selected  m: switch mode  q: quit"
            }
            RemovalMode::Earliest => "a: add  x: accomplish task  m: switch mode  q: quit",
        }
    }
}

pub fn run_app<B: Backend, T: TaskBackend>(
    terminal: &mut Terminal<B>,
    store: &mut TaskStore<T>,
    app: &mut App,
) -> io::Result<()> {
    let mut list_state = ListState::default();
    loop {
        let tasks = store.list_ordered();
        list_state.select((!tasks.is_empty()).then_some(app.cursor));

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(3),
                    Constraint::Min(3),
                    Constraint::Length(3),
                ])
                .split(f.area());

            let help = Paragraph::new(app.help())
                .block(Block::default().title("TaskTopia").borders(Borders::ALL));
            f.render_widget(help, chunks[0]);

            let items: Vec<ListItem> = tasks
                .iter()
                .enumerate()
                .map(|(i, t)| task_item(t, app.mode, app.checked.contains(&i)))
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .title(format!("Tasks ({})", tasks.len()))
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                )
                .highlight_style(Style::default().add_modifier(Modifier::BOLD));
            f.render_stateful_widget(list, chunks[1], &mut list_state);

            let status = Paragraph::new(app.status.as_str())
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(status, chunks[2]);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('a') => {
                    let fields = prompt("Enter task title").and_then(|title| {
                        let description = prompt("Enter task description")?;
                        let date = prompt("Enter due date (MM-DD-YY)")?;
                        Some((title, description, date))
                    });
                    terminal.clear()?;
                    if let Some((title, description, date)) = fields {
                        app.add(store, &title, &description, &date);
                    }
                }
                KeyCode::Up => app.move_cursor(true, tasks.len()),
                KeyCode::Down => app.move_cursor(false, tasks.len()),
                KeyCode::Char(' ') => app.toggle(tasks.len()),
                KeyCode::Char('d') if app.mode == RemovalMode::Select => {
                    app.delete_checked(store)
                }
                KeyCode::Char('x') if app.mode == RemovalMode::Earliest => app.accomplish(store),
                KeyCode::Char('m') => app.switch_mode(),
                _ => {}
            }
        }
    }
}

fn task_item(task: &Task, mode: RemovalMode, checked: bool) -> ListItem<'_> {
    let mut title = Vec::new();
    if mode == RemovalMode::Select {
        title.push(Span::raw(if checked { "[x] " } else { "[ ] " }));
    }
    title.push(Span::raw("Title: "));
    title.push(Span::styled(&task.title, Style::default().fg(Color::White)));

    ListItem::new(vec![
        Line::from(title),
        Line::from(format!("    Description: {}", task.description)),
        Line::from(format!("    Due Date: {}", task.due_date)),
        Line::from(""),
    ])
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input);
    enable_raw_mode().ok();
    match read {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim_end_matches(['\r', '\n']).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktopia::MemoryBackend;

    fn seeded() -> TaskStore<MemoryBackend> {
        TaskStore::open(MemoryBackend::with_tasks(vec![
            Task::new("Essay", "Draft", "09-30-25"),
            Task::new("Quiz", "Study", "01-01-20"),
            Task::new("Final", "Review", "12-31-99"),
        ]))
    }

    #[test]
    fn delete_without_selection_prompts() {
        let mut store = seeded();
        let mut app = App::new(RemovalMode::Select);
        app.delete_checked(&mut store);
        assert_eq!(app.status, "Please select a task to delete.");
        assert_eq!(store.len(), 3);
        assert_eq!(store.backend().saves, 0);
    }

    #[test]
    fn delete_checked_rows() {
        let mut store = seeded();
        let mut app = App::new(RemovalMode::Select);
        app.toggle(3);
        app.move_cursor(false, 3);
        app.move_cursor(false, 3);
        app.toggle(3);
        app.delete_checked(&mut store);

        assert_eq!(app.status, "Deleted 2 task(s).");
        let titles: Vec<_> = store.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Essay"]);
        assert!(app.checked.is_empty());
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn toggle_twice_unchecks() {
        let mut app = App::new(RemovalMode::Select);
        app.toggle(1);
        app.toggle(1);
        assert!(app.checked.is_empty());
    }

    #[test]
    fn accomplish_until_empty() {
        let mut store = seeded();
        let mut app = App::new(RemovalMode::Earliest);
        app.accomplish(&mut store);
        assert_eq!(app.status, "Accomplished \"Quiz\".");
        app.accomplish(&mut store);
        app.accomplish(&mut store);
        app.accomplish(&mut store);
        assert_eq!(app.status, "No tasks to accomplish.");
        assert!(store.is_empty());
    }

    #[test]
    fn add_reports_errors() {
        let mut store = seeded();
        let mut app = App::new(RemovalMode::Select);
        app.add(&mut store, "T", "D", "13-40-99");
        assert_eq!(app.status, "Invalid date format. Please use MM-dd-yy.");
        app.add(&mut store, "T", "", "01-01-20");
        assert_eq!(app.status, "Please fill out all fields.");
        app.add(&mut store, "T", "D", "01-01-21");
        assert_eq!(app.status, "Added \"T\".");
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn unsaved_changes_are_flagged() {
        let mut store = seeded();
        store.backend_mut().fail_saves = true;
        let mut app = App::new(RemovalMode::Earliest);
        app.accomplish(&mut store);
        assert!(app.status.ends_with(unsaved_warning()));
    }
}
