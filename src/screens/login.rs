//! Credential prompts: two fields for login, one for unlock.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::event::{is_ctrl_c, typed_char, AuthMode, Command, Credentials, ScreenEvent};
use crate::ui;

const EMAIL_LIMIT: usize = 64;
const PASSWORD_LIMIT: usize = 128;
const FIELD_WIDTH: u16 = 44;

/// Single-line text input.
pub struct TextField {
    placeholder: &'static str,
    value: String,
    masked: bool,
    limit: usize,
}

impl TextField {
    fn new(placeholder: &'static str, masked: bool, limit: usize) -> Self {
        Self {
            placeholder,
            value: String::new(),
            masked,
            limit,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Editing keys only; anything else (Enter included) is ignored.
    fn input(&mut self, key: &KeyEvent) {
        if key.code == KeyCode::Backspace {
            self.value.pop();
        } else if let Some(c) = typed_char(key) {
            if self.value.chars().count() < self.limit {
                self.value.push(c);
            }
        }
    }

    fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

impl Drop for TextField {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

pub struct CredentialsScreen {
    mode: AuthMode,
    fields: Vec<TextField>,
    focus: usize,
    message: String,
}

impl CredentialsScreen {
    pub fn login() -> Self {
        Self {
            mode: AuthMode::Login,
            fields: vec![
                TextField::new("Email", false, EMAIL_LIMIT),
                TextField::new("Password", true, PASSWORD_LIMIT),
            ],
            focus: 0,
            message: prompt_text(AuthMode::Login).to_string(),
        }
    }

    pub fn unlock() -> Self {
        Self {
            mode: AuthMode::Unlock,
            fields: vec![TextField::new("Master password", true, PASSWORD_LIMIT)],
            focus: 0,
            message: prompt_text(AuthMode::Unlock).to_string(),
        }
    }

    /// Index in `0..=field_count`; `field_count` is the submit button.
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field_value(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(TextField::value)
    }

    fn ring_size(&self) -> usize {
        self.fields.len() + 1
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.ring_size();
    }

    fn focus_prev(&mut self) {
        self.focus = (self.focus + self.ring_size() - 1) % self.ring_size();
    }

    fn credentials(&self) -> Credentials {
        match self.mode {
            AuthMode::Login => Credentials::login(
                self.fields[0].value.trim(),
                self.fields[1].value.as_str(),
            ),
            AuthMode::Unlock => Credentials::unlock(self.fields[0].value.as_str()),
        }
    }

    pub fn handle(&mut self, event: &ScreenEvent) -> Option<Command> {
        match event {
            ScreenEvent::CredentialFailure(mode) if *mode == self.mode => {
                self.message = failure_text(self.mode).to_string();
                None
            }
            ScreenEvent::KeyPress(key) => self.handle_key(key),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<Command> {
        if is_ctrl_c(key) || key.code == KeyCode::Esc {
            return Some(Command::Quit);
        }
        match key.code {
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => self.focus_prev(),
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Enter if self.focus == self.fields.len() => {
                return Some(Command::Emit(ScreenEvent::LoginSubmitted(
                    self.credentials(),
                )));
            }
            _ => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.input(key);
                }
            }
        }
        None
    }

    pub fn render(&self, f: &mut Frame<'_>) {
        let field_rows = self.fields.len() as u16 * 3;
        let height = 3 + 1 + 2 + field_rows + 2;
        let area = ui::centered(f.size(), FIELD_WIDTH + 4, height);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(field_rows),
                Constraint::Length(2),
            ])
            .split(area);

        f.render_widget(
            Paragraph::new(ui::banner()).alignment(Alignment::Center),
            layout[0],
        );
        f.render_widget(
            Paragraph::new(Line::from(ui::title(match self.mode {
                AuthMode::Login => "Login",
                AuthMode::Unlock => "Unlock",
            })))
            .alignment(Alignment::Center),
            layout[1],
        );

        let message_style = if self.message == prompt_text(self.mode) {
            Style::default().fg(ui::COLOR_SAND)
        } else {
            Style::default().fg(ui::COLOR_ERROR)
        };
        f.render_widget(
            Paragraph::new(Span::styled(self.message.clone(), message_style))
                .alignment(Alignment::Center),
            layout[2],
        );

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(3); self.fields.len()])
            .split(layout[3]);
        for (idx, field) in self.fields.iter().enumerate() {
            let is_focused = idx == self.focus;
            let style = if is_focused { ui::focused() } else { Style::default() };
            let content = if field.value.is_empty() {
                Span::styled(field.placeholder, ui::muted())
            } else {
                Span::styled(field.display(), style)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .title(field.placeholder)
                .border_style(if is_focused { ui::focused() } else { ui::muted() });
            let input = Paragraph::new(Line::from(vec![Span::styled("> ", style), content]))
                .block(block);
            f.render_widget(input, rows[idx]);
        }

        let button = if self.focus == self.fields.len() {
            Span::styled("[ Submit ]", ui::focused())
        } else {
            Span::styled("[ Submit ]", ui::muted())
        };
        f.render_widget(
            Paragraph::new(Line::from(button)).alignment(Alignment::Center),
            layout[4],
        );
    }
}

fn prompt_text(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::Login => "Please enter your Bitwarden login",
        AuthMode::Unlock => "Vault is locked. Please enter your master password",
    }
}

fn failure_text(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::Login => "Login failed. Please try again or press 'esc' to exit",
        AuthMode::Unlock => "Unlock failed. Please try again or press 'esc' to exit",
    }
}
