//! Filterable list of vault items.

use std::cmp::Ordering;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::error::Result;
use crate::event::{is_ctrl_c, typed_char, Command, ScreenEvent};
use crate::models::Item;
use crate::session::VaultSession;
use crate::ui;

/// Rows taken by borders, filter line and footer.
const CHROME_ROWS: u16 = 5;
/// Every list row is two lines: name and username.
const ROW_HEIGHT: u16 = 2;

const HELP: [(&str, &str); 5] = [
    ("↑/↓", "move"),
    ("type", "filter"),
    ("esc", "clear filter"),
    ("enter", "view item"),
    ("ctrl+c", "quit"),
];

#[derive(Default)]
pub struct ListScreen {
    items: Vec<Item>,
    visible: Vec<usize>,
    filter: String,
    selected: usize,
    title: String,
    viewport_rows: usize,
}

impl ListScreen {
    pub fn new() -> Self {
        Self {
            viewport_rows: 1,
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    /// Items passing the current filter, in display order.
    pub fn visible_items(&self) -> impl Iterator<Item = &Item> {
        self.visible.iter().map(|&idx| &self.items[idx])
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.visible
            .get(self.selected)
            .and_then(|&idx| self.items.get(idx))
    }

    fn populate(&mut self, session: &VaultSession) -> Result<()> {
        self.items = session.items()?.to_vec();
        self.title = format!("Vault | {}", session.status().email());
        self.apply_filter();
        Ok(())
    }

    fn apply_filter(&mut self) {
        self.visible = fuzzy_filter(&self.items, &self.filter);
        self.selected = 0;
    }

    fn move_by(&mut self, delta: isize) {
        if self.visible.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.visible.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn handle(&mut self, event: &ScreenEvent, session: &VaultSession) -> Result<Option<Command>> {
        match event {
            ScreenEvent::ListReady => {
                self.populate(session)?;
                Ok(None)
            }
            ScreenEvent::WindowResized { height, .. } => {
                let rows = height.saturating_sub(CHROME_ROWS) / ROW_HEIGHT;
                self.viewport_rows = usize::from(rows.max(1));
                Ok(None)
            }
            ScreenEvent::KeyPress(key) => Ok(self.handle_key(key)),
            _ => Ok(None),
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<Command> {
        if is_ctrl_c(key) {
            return Some(Command::Quit);
        }
        let page = self.viewport_rows as isize;
        match key.code {
            KeyCode::Enter => {
                return self
                    .selected_item()
                    .map(|item| Command::Emit(ScreenEvent::ItemSelected(Box::new(item.clone()))));
            }
            KeyCode::Up => self.move_by(-1),
            KeyCode::Down => self.move_by(1),
            KeyCode::PageUp => self.move_by(-page),
            KeyCode::PageDown => self.move_by(page),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.move_by(isize::MAX),
            KeyCode::Esc => {
                if !self.filter.is_empty() {
                    self.filter.clear();
                    self.apply_filter();
                }
            }
            KeyCode::Backspace => {
                if self.filter.pop().is_some() {
                    self.apply_filter();
                }
            }
            _ => {
                if let Some(c) = typed_char(key) {
                    self.filter.push(c);
                    self.apply_filter();
                }
            }
        }
        None
    }

    pub fn render(&self, f: &mut Frame<'_>) {
        let (body, footer) = ui::body_and_footer(f.size());
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(body);

        let rows: Vec<ListItem> = if self.visible.is_empty() {
            vec![ListItem::new(Span::styled("No items", ui::muted()))]
        } else {
            self.visible_items()
                .map(|item| {
                    ListItem::new(vec![
                        Line::from(item.name.clone()),
                        Line::from(Span::styled(item.username().to_string(), ui::muted())),
                    ])
                })
                .collect()
        };
        let mut state = ListState::default();
        if !self.visible.is_empty() {
            state.select(Some(self.selected));
        }
        let list = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(ui::title(&self.title)),
            )
            .highlight_symbol("▶ ")
            .highlight_style(ui::selected_row());
        f.render_stateful_widget(list, layout[0], &mut state);

        let filter_line = Line::from(vec![
            Span::styled(" Filter: ", ui::muted()),
            Span::styled(self.filter.clone(), ui::focused()),
            Span::styled(
                format!("  ({}/{})", self.visible.len(), self.items.len()),
                ui::muted(),
            ),
        ]);
        f.render_widget(Paragraph::new(filter_line), layout[1]);
        ui::render_footer(f, footer, ui::help_line(&HELP));
    }
}

/// Indices of items whose name contains `query` as a case-insensitive
/// subsequence, best Jaro-Winkler match first. Empty query keeps order.
pub fn fuzzy_filter(items: &[Item], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..items.len()).collect();
    }
    let needle = query.to_lowercase();
    let mut scored: Vec<(usize, f64)> = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let hay = item.name.to_lowercase();
            is_subsequence(&needle, &hay).then(|| (idx, strsim::jaro_winkler(&needle, &hay)))
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(idx, _)| idx).collect()
}

fn is_subsequence(needle: &str, hay: &str) -> bool {
    let mut hay = hay.chars();
    needle.chars().all(|n| hay.any(|h| h == n))
}
