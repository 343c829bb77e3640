//! Events delivered to screens and the follow-up commands they return.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::Item;

/// Which credential prompt produced a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Unlock,
}

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    #[zeroize(skip)]
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::Login,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn unlock(password: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::Unlock,
            username: String::new(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("mode", &self.mode)
            .field("username", &self.username)
            .field("password", &"..")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    KeyPress(KeyEvent),
    LoginSubmitted(Credentials),
    CredentialFailure(AuthMode),
    ListReady,
    ItemSelected(Box<Item>),
    /// Leave the item view for the list.
    ReturnToList,
    TimerTick,
    TimerExpired,
    WindowResized { width: u16, height: u16 },
}

impl ScreenEvent {
    pub fn key(code: KeyCode) -> Self {
        Self::KeyPress(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub fn ctrl(c: char) -> Self {
        Self::KeyPress(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }
}

/// Work the controller runs between two events.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthRequest {
    Submit(Credentials),
    /// Vault already unlocked at startup; only the list needs fetching.
    Resume,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Emit(ScreenEvent),
    Authenticate(AuthRequest),
    /// Deliver a `TimerTick` after one second.
    ScheduleTick,
}

pub fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// A printable character typed without Ctrl/Alt.
pub fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}
