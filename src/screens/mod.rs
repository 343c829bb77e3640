//! The five full-screen views. Each exposes `handle` (event in, optional
//! follow-up command out) and `render`.

pub mod item;
pub mod list;
pub mod loading;
pub mod login;

use crate::clipboard::ClipboardSink;
use crate::session::VaultSession;

pub use item::ItemDetailScreen;
pub use list::ListScreen;
pub use loading::LoadingScreen;
pub use login::CredentialsScreen;

/// Collaborators a screen may touch while handling one event.
pub struct ScreenContext<'a> {
    pub session: &'a mut VaultSession,
    pub clipboard: &'a mut dyn ClipboardSink,
}
