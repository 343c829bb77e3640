//! The only screen that waits on the vault CLI.

use crossterm::event::KeyCode;
use ratatui::{prelude::*, widgets::Paragraph, Frame};
use tracing::warn;

use crate::event::{is_ctrl_c, AuthMode, AuthRequest, Command, ScreenEvent};
use crate::session::VaultSession;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    LoggingIn,
    Unlocking,
    Fetching,
}

pub struct LoadingScreen {
    phase: Phase,
}

impl Default for LoadingScreen {
    fn default() -> Self {
        Self {
            phase: Phase::Fetching,
        }
    }
}

impl LoadingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup path for an already unlocked vault.
    pub fn resume(&mut self) -> Command {
        self.phase = Phase::Fetching;
        Command::Authenticate(AuthRequest::Resume)
    }

    pub fn handle(&mut self, event: &ScreenEvent) -> Option<Command> {
        match event {
            ScreenEvent::LoginSubmitted(credentials) => {
                self.phase = match credentials.mode {
                    AuthMode::Login => Phase::LoggingIn,
                    AuthMode::Unlock => Phase::Unlocking,
                };
                Some(Command::Authenticate(AuthRequest::Submit(
                    credentials.clone(),
                )))
            }
            ScreenEvent::KeyPress(key)
                if is_ctrl_c(key) || matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) =>
            {
                Some(Command::Quit)
            }
            _ => None,
        }
    }

    pub fn render(&self, f: &mut Frame<'_>) {
        let text = match self.phase {
            Phase::LoggingIn => "Logging in. Please wait",
            Phase::Unlocking => "Unlocking vault. Please wait",
            Phase::Fetching => "Loading vault items. Please wait",
        };
        let mut lines = ui::banner();
        lines.push(Line::default());
        lines.push(Line::from(ui::title("Vault")));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(text, Style::default().fg(ui::COLOR_SAND))));
        let height = lines.len() as u16;
        let area = ui::centered(f.size(), 44, height);
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }
}

/// Runs the blocking authenticate-then-list chain and reports the outcome as
/// the event the controller should deliver next.
pub fn authenticate(session: &mut VaultSession, request: &AuthRequest) -> ScreenEvent {
    let (mode, result) = match request {
        AuthRequest::Submit(credentials) => {
            let auth = match credentials.mode {
                AuthMode::Login => session.login(&credentials.username, &credentials.password),
                AuthMode::Unlock => session.unlock(&credentials.password),
            };
            (credentials.mode, auth.and_then(|()| session.refresh_list()))
        }
        AuthRequest::Resume => (AuthMode::Unlock, session.refresh_list()),
    };
    match result {
        Ok(()) => ScreenEvent::ListReady,
        Err(e) => {
            warn!(?mode, error = %e, "authentication chain failed");
            ScreenEvent::CredentialFailure(mode)
        }
    }
}
