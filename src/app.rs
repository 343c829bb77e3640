use std::collections::VecDeque;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tracing::{debug, info};

use crate::clipboard::ClipboardSink;
use crate::error::VaultError;
use crate::event::{AuthMode, Command, ScreenEvent};
use crate::models::AuthState;
use crate::screens::{
    loading, CredentialsScreen, ItemDetailScreen, ListScreen, LoadingScreen, ScreenContext,
};
use crate::session::VaultSession;

pub const TICK: Duration = Duration::from_secs(1);
const IDLE_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveScreen {
    Login,
    Unlock,
    Loading,
    List,
    ItemDetail,
}

impl ActiveScreen {
    /// Screen to show first for a freshly probed vault status.
    pub fn initial(state: AuthState) -> Self {
        match state {
            AuthState::Unauthenticated => Self::Login,
            AuthState::Unlocked => Self::Loading,
            AuthState::Locked | AuthState::Unknown => Self::Unlock,
        }
    }

    /// Global transition table; `None` keeps the current screen.
    pub fn transition(self, event: &ScreenEvent) -> Option<Self> {
        match (self, event) {
            (Self::Login | Self::Unlock, ScreenEvent::LoginSubmitted(_)) => Some(Self::Loading),
            (Self::Loading, ScreenEvent::CredentialFailure(AuthMode::Login)) => Some(Self::Login),
            (Self::Loading, ScreenEvent::CredentialFailure(AuthMode::Unlock)) => {
                Some(Self::Unlock)
            }
            (Self::Loading, ScreenEvent::ListReady) => Some(Self::List),
            (Self::List, ScreenEvent::ItemSelected(_)) => Some(Self::ItemDetail),
            (Self::ItemDetail, ScreenEvent::ReturnToList) => Some(Self::List),
            _ => None,
        }
    }
}

/// Owns every screen, the vault session and the clipboard; routes events to
/// the active screen and runs the commands screens hand back.
pub struct App {
    session: VaultSession,
    clipboard: Box<dyn ClipboardSink>,
    active: ActiveScreen,
    login: CredentialsScreen,
    unlock: CredentialsScreen,
    loading: LoadingScreen,
    list: ListScreen,
    item: ItemDetailScreen,
    pending: VecDeque<Command>,
    timer_due: Option<Instant>,
    should_quit: bool,
}

impl App {
    /// Probes the vault status and picks the first screen from it.
    pub fn start(
        mut session: VaultSession,
        clipboard: Box<dyn ClipboardSink>,
        flash_ticks: u8,
    ) -> Result<Self, VaultError> {
        session.refresh_status()?;
        let active = ActiveScreen::initial(session.auth_state());
        info!(state = ?session.auth_state(), screen = ?active, "starting");
        let mut app = Self {
            session,
            clipboard,
            active,
            login: CredentialsScreen::login(),
            unlock: CredentialsScreen::unlock(),
            loading: LoadingScreen::new(),
            list: ListScreen::new(),
            item: ItemDetailScreen::new(flash_ticks),
            pending: VecDeque::new(),
            timer_due: None,
            should_quit: false,
        };
        if active == ActiveScreen::Loading {
            let resume = app.loading.resume();
            app.pending.push_back(resume);
        }
        Ok(app)
    }

    pub fn active(&self) -> ActiveScreen {
        self.active
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn login_screen(&self) -> &CredentialsScreen {
        &self.login
    }

    pub fn unlock_screen(&self) -> &CredentialsScreen {
        &self.unlock
    }

    pub fn list_screen(&self) -> &ListScreen {
        &self.list
    }

    pub fn item_screen(&self) -> &ItemDetailScreen {
        &self.item
    }

    pub fn timer_due(&self) -> Option<Instant> {
        self.timer_due
    }

    pub fn timer_elapsed(&self, now: Instant) -> bool {
        self.timer_due.is_some_and(|due| now >= due)
    }

    /// Applies the transition table, then forwards the event to whichever
    /// screen is active afterwards.
    pub fn handle_event(&mut self, event: ScreenEvent) -> Result<(), VaultError> {
        if let Some(next) = self.active.transition(&event) {
            debug!(from = ?self.active, to = ?next, "screen transition");
            self.active = next;
        }
        let command = match self.active {
            ActiveScreen::Login => self.login.handle(&event),
            ActiveScreen::Unlock => self.unlock.handle(&event),
            ActiveScreen::Loading => self.loading.handle(&event),
            ActiveScreen::List => self.list.handle(&event, &self.session)?,
            ActiveScreen::ItemDetail => {
                let mut ctx = ScreenContext {
                    session: &mut self.session,
                    clipboard: self.clipboard.as_mut(),
                };
                self.item.handle(&event, &mut ctx)?
            }
        };
        if let Some(command) = command {
            self.pending.push_back(command);
        }
        // The list pages by viewport, so it tracks the size while hidden.
        if matches!(event, ScreenEvent::WindowResized { .. }) && self.active != ActiveScreen::List
        {
            self.list.handle(&event, &self.session)?;
        }
        Ok(())
    }

    /// Runs the oldest pending command. Returns false when none was queued.
    pub fn step(&mut self) -> Result<bool, VaultError> {
        let Some(command) = self.pending.pop_front() else {
            return Ok(false);
        };
        match command {
            Command::Quit => self.should_quit = true,
            Command::Emit(event) => self.handle_event(event)?,
            Command::Authenticate(request) => {
                let outcome = loading::authenticate(&mut self.session, &request);
                self.handle_event(outcome)?;
            }
            Command::ScheduleTick => self.timer_due = Some(Instant::now() + TICK),
        }
        Ok(true)
    }

    /// Drains the command queue. Ticks only arm the timer.
    pub fn settle(&mut self) -> Result<(), VaultError> {
        while !self.should_quit && self.step()? {}
        Ok(())
    }

    /// Delivers the pending timer tick, if one is armed.
    pub fn fire_timer(&mut self) -> Result<(), VaultError> {
        if self.timer_due.take().is_some() {
            self.handle_event(ScreenEvent::TimerTick)?;
        }
        Ok(())
    }

    pub fn render(&self, f: &mut Frame<'_>) {
        match self.active {
            ActiveScreen::Login => self.login.render(f),
            ActiveScreen::Unlock => self.unlock.render(f),
            ActiveScreen::Loading => self.loading.render(f),
            ActiveScreen::List => self.list.render(f),
            ActiveScreen::ItemDetail => self.item.render(f),
        }
    }
}

/// Full-screen event loop. Commands run one at a time with a redraw in
/// between, so the loading screen is on screen before the vault CLI blocks.
pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = (|| -> Result<()> {
        let size = terminal.size()?;
        app.handle_event(ScreenEvent::WindowResized {
            width: size.width,
            height: size.height,
        })?;

        loop {
            terminal.draw(|f| app.render(f))?;
            if app.should_quit() {
                break;
            }
            if app.step()? {
                continue;
            }

            let timeout = match app.timer_due() {
                Some(due) => due.saturating_duration_since(Instant::now()),
                None => IDLE_POLL,
            };
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        app.handle_event(ScreenEvent::KeyPress(key))?;
                    }
                    Event::Resize(width, height) => {
                        terminal.autoresize()?;
                        app.handle_event(ScreenEvent::WindowResized { width, height })?;
                    }
                    _ => {}
                }
            }
            // Checked after every poll so a stream of input cannot hold it off.
            if app.timer_elapsed(Instant::now()) {
                app.fire_timer()?;
            }
        }
        Ok(())
    })();

    teardown_terminal(&mut terminal);
    result
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )
    .ok();
    terminal.show_cursor().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    #[test]
    fn initial_screen_follows_status() {
        assert_eq!(
            ActiveScreen::initial(AuthState::Unauthenticated),
            ActiveScreen::Login
        );
        assert_eq!(
            ActiveScreen::initial(AuthState::Unlocked),
            ActiveScreen::Loading
        );
        assert_eq!(ActiveScreen::initial(AuthState::Locked), ActiveScreen::Unlock);
        assert_eq!(ActiveScreen::initial(AuthState::Unknown), ActiveScreen::Unlock);
    }

    #[test]
    fn transitions_only_from_their_source_screen() {
        use ActiveScreen::*;
        let selected = ScreenEvent::ItemSelected(Box::new(Item::default()));
        assert_eq!(List.transition(&selected), Some(ItemDetail));
        assert_eq!(Login.transition(&selected), None);
        assert_eq!(Loading.transition(&ScreenEvent::ListReady), Some(List));
        assert_eq!(List.transition(&ScreenEvent::ListReady), None);
        assert_eq!(
            Loading.transition(&ScreenEvent::CredentialFailure(AuthMode::Unlock)),
            Some(Unlock)
        );
        assert_eq!(ItemDetail.transition(&ScreenEvent::ReturnToList), Some(List));
        assert_eq!(ItemDetail.transition(&ScreenEvent::TimerTick), None);
    }

    #[test]
    fn timer_elapsed_compares_against_deadline() {
        let session = VaultSession::new(Box::new(crate::session::ProcessCommandRunner), "bw", None);
        let mut app = App {
            session,
            clipboard: Box::new(crate::clipboard::MemoryClipboard::new()),
            active: ActiveScreen::Login,
            login: CredentialsScreen::login(),
            unlock: CredentialsScreen::unlock(),
            loading: LoadingScreen::new(),
            list: ListScreen::new(),
            item: ItemDetailScreen::new(5),
            pending: VecDeque::new(),
            timer_due: None,
            should_quit: false,
        };
        let now = Instant::now();
        assert!(!app.timer_elapsed(now));
        app.timer_due = Some(now + TICK);
        assert!(!app.timer_elapsed(now));
        assert!(app.timer_elapsed(now + TICK));
        app.fire_timer().unwrap();
        assert_eq!(app.timer_due(), None);
    }
}
