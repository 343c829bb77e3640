//! Full-screen terminal front-end for the Bitwarden `bw` CLI.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod event;
pub mod models;
pub mod screens;
pub mod session;
pub mod ui;

pub use app::{ActiveScreen, App};
pub use error::{Result, VaultError};
