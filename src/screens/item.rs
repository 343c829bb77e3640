//! Field-by-field view of one item with copy-to-clipboard.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use crate::error::Result;
use crate::event::{is_ctrl_c, Command, ScreenEvent};
use crate::models::Item;
use crate::screens::ScreenContext;
use crate::ui;

pub const DEFAULT_FLASH_TICKS: u8 = 5;
const LABEL_WIDTH: usize = 10;

const HELP: [(&str, &str); 6] = [
    ("↑/k", "up"),
    ("↓/j", "down"),
    ("enter/c/y", "copy"),
    ("u", "copy username"),
    ("p", "copy password"),
    ("q", "back"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
    pub masked: bool,
}

impl DetailRow {
    fn plain(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            masked: false,
        }
    }
}

/// Rows for `item`; organization and folder are omitted when empty.
pub fn build_rows(item: &Item) -> Vec<DetailRow> {
    let mut rows = vec![
        DetailRow::plain("Object", item.object.as_str()),
        DetailRow::plain("ID", item.id.as_str()),
        DetailRow::plain("Type", item.kind.to_string()),
    ];
    if !item.organization_id().is_empty() {
        rows.push(DetailRow::plain("Org ID", item.organization_id()));
    }
    if !item.folder_id().is_empty() {
        rows.push(DetailRow::plain("Folder ID", item.folder_id()));
    }
    rows.push(DetailRow::plain("Username", item.username()));
    rows.push(DetailRow {
        label: "Password",
        value: item.password().to_string(),
        masked: true,
    });
    rows.push(DetailRow::plain("Notes", item.notes()));
    rows
}

pub struct ItemDetailScreen {
    item: Option<Item>,
    rows: Vec<DetailRow>,
    selected: usize,
    flash: String,
    flash_ticks: u8,
    ticks_left: u8,
}

impl Default for ItemDetailScreen {
    fn default() -> Self {
        Self::new(DEFAULT_FLASH_TICKS)
    }
}

impl ItemDetailScreen {
    /// `flash_ticks` is how many one-second ticks a flash message survives.
    pub fn new(flash_ticks: u8) -> Self {
        Self {
            item: None,
            rows: Vec::new(),
            selected: 0,
            flash: String::new(),
            flash_ticks: flash_ticks.max(1),
            ticks_left: 0,
        }
    }

    pub fn rows(&self) -> &[DetailRow] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn flash_message(&self) -> &str {
        &self.flash
    }

    /// Moves the cursor, clamped to the last row.
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.rows.len().saturating_sub(1));
    }

    /// Text shown for row `idx`: the password is hidden unless selected.
    pub fn display_value(&self, idx: usize) -> Option<&str> {
        let row = self.rows.get(idx)?;
        if row.masked && idx != self.selected && !row.value.is_empty() {
            Some(ui::MASK)
        } else {
            Some(&row.value)
        }
    }

    fn flash(&mut self, message: &str) -> Command {
        self.flash = message.to_string();
        self.ticks_left = self.flash_ticks;
        Command::ScheduleTick
    }

    pub fn handle(
        &mut self,
        event: &ScreenEvent,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<Option<Command>> {
        match event {
            ScreenEvent::ItemSelected(item) => {
                self.rows = build_rows(item);
                self.item = Some(item.as_ref().clone());
                self.selected = 0;
                self.flash.clear();
                self.ticks_left = 0;
                Ok(None)
            }
            ScreenEvent::TimerTick => {
                if self.ticks_left == 0 {
                    return Ok(None);
                }
                self.ticks_left -= 1;
                if self.ticks_left == 0 {
                    Ok(Some(Command::Emit(ScreenEvent::TimerExpired)))
                } else {
                    Ok(Some(Command::ScheduleTick))
                }
            }
            ScreenEvent::TimerExpired => {
                self.flash.clear();
                Ok(None)
            }
            ScreenEvent::KeyPress(key) => self.handle_key(key, ctx),
            _ => Ok(None),
        }
    }

    fn handle_key(
        &mut self,
        key: &KeyEvent,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<Option<Command>> {
        if is_ctrl_c(key) {
            return Ok(Some(Command::Quit));
        }
        let Some(item) = self.item.as_ref() else {
            return Ok(None);
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                Ok(Some(Command::Emit(ScreenEvent::ReturnToList)))
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select(self.selected.saturating_sub(1));
                Ok(None)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select(self.selected + 1);
                Ok(None)
            }
            KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('y') => {
                let Some(row) = self.rows.get(self.selected) else {
                    return Ok(None);
                };
                ctx.clipboard.set_text(&row.value)?;
                debug!(field = row.label, "copied field");
                Ok(Some(self.flash("copied to clipboard")))
            }
            KeyCode::Char('p') => {
                let password = ctx.session.lookup_password(&item.id)?;
                ctx.clipboard.set_text(password)?;
                Ok(Some(self.flash("copied password to clipboard")))
            }
            KeyCode::Char('u') => {
                ctx.clipboard.set_text(item.username())?;
                Ok(Some(self.flash("copied username to clipboard")))
            }
            _ => Ok(None),
        }
    }

    pub fn render(&self, f: &mut Frame<'_>) {
        let (body, footer) = ui::body_and_footer(f.size());
        let name = self.item.as_ref().map(|i| i.name.as_str()).unwrap_or_default();

        let mut lines = Vec::new();
        for (idx, row) in self.rows.iter().enumerate() {
            let is_selected = idx == self.selected;
            let value_style = if is_selected { ui::focused() } else { ui::muted() };
            let label_style = if is_selected { ui::selected_row() } else { Style::default() };
            let value = self.display_value(idx).unwrap_or_default();
            let value = if value.is_empty() { "-" } else { value };
            let mut parts = value.lines();
            let first = parts.next().unwrap_or_default().to_string();
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<width$}", format!("{}:", row.label), width = LABEL_WIDTH),
                    label_style,
                ),
                Span::styled(first, value_style),
            ]));
            for rest in parts {
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(LABEL_WIDTH)),
                    Span::styled(rest.to_string(), value_style),
                ]));
            }
        }

        let detail = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(ui::title(&format!("Item | {name}"))),
            );

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(body);
        f.render_widget(detail, layout[0]);
        let flash = Span::styled(self.flash.clone(), Style::default().fg(ui::COLOR_OLIVE));
        f.render_widget(Paragraph::new(flash), layout[1]);
        ui::render_footer(f, footer, ui::help_line(&HELP));
    }
}
