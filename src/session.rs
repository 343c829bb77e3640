//! Wrapper around the `bw` command-line tool.
//!
//! Every operation shells out to the vault CLI through a [`CommandRunner`],
//! so tests can script the tool's responses without a real binary.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::{Command, Output};

use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, VaultError};
use crate::models::{AuthState, Item, VaultStatus};

pub trait CommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<Output>;
}

#[derive(Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<Output> {
        Command::new(program).args(args).output()
    }
}

/// Short-lived credential returned by `bw login/unlock --raw`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let mut raw = raw.into();
        let trimmed = raw.trim().to_string();
        raw.zeroize();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Checks that the vault binary can be executed at all.
pub fn preflight(runner: &dyn CommandRunner, binary: &str) -> Result<()> {
    let output = runner
        .run(binary, &[OsString::from("--version")])
        .map_err(|e| VaultError::external("--version", e.to_string()))?;
    if !output.status.success() {
        return Err(VaultError::external(
            "--version",
            format!("exited with {}", output.status),
        ));
    }
    debug!(
        version = %String::from_utf8_lossy(&output.stdout).trim(),
        "vault CLI found"
    );
    Ok(())
}

pub struct VaultSession {
    runner: Box<dyn CommandRunner>,
    binary: String,
    status: VaultStatus,
    items: Vec<Item>,
    token: Option<SessionToken>,
}

impl VaultSession {
    /// `seed_token` is typically the `BW_SESSION` environment variable.
    pub fn new(
        runner: Box<dyn CommandRunner>,
        binary: impl Into<String>,
        seed_token: Option<String>,
    ) -> Self {
        Self {
            runner,
            binary: binary.into(),
            status: VaultStatus::default(),
            items: Vec::new(),
            token: seed_token.and_then(SessionToken::new),
        }
    }

    pub fn status(&self) -> &VaultStatus {
        &self.status
    }

    pub fn auth_state(&self) -> AuthState {
        self.status.auth_state
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn refresh_status(&mut self) -> Result<()> {
        let output = self.invoke("status", &["status"])?;
        if !output.status.success() {
            return Err(failure("status", &output));
        }
        self.status = serde_json::from_slice(&output.stdout).map_err(|source| {
            VaultError::Decode {
                command: "status".to_string(),
                source,
            }
        })?;
        debug!(state = ?self.status.auth_state, "vault status refreshed");
        Ok(())
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if self.status.auth_state != AuthState::Unauthenticated {
            debug!("already logged in, skipping login");
            return Ok(());
        }
        let output = self.invoke("login", &["login", username, password, "--raw"])?;
        self.capture_token("login", output)?;
        info!("logged in");
        self.refresh_status()
    }

    pub fn unlock(&mut self, password: &str) -> Result<()> {
        if self.status.auth_state == AuthState::Unauthenticated {
            return Err(VaultError::NotLoggedIn);
        }
        let output = self.invoke("unlock", &["unlock", password, "--raw"])?;
        self.capture_token("unlock", output)?;
        info!("vault unlocked");
        self.refresh_status()
    }

    pub fn logout(&mut self) -> Result<()> {
        if self.status.auth_state == AuthState::Unauthenticated {
            return Err(VaultError::NotLoggedIn);
        }
        let output = self.invoke("logout", &["logout"])?;
        if !output.status.success() {
            return Err(failure("logout", &output));
        }
        self.token = None;
        info!("logged out");
        self.refresh_status()
    }

    /// Replaces the cached item set with a fresh `bw list items`.
    pub fn refresh_list(&mut self) -> Result<()> {
        if self.status.auth_state == AuthState::Unauthenticated {
            return Err(VaultError::NotLoggedIn);
        }
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| VaultError::Auth("no session token available".to_string()))?;
        let output = self.invoke(
            "list",
            &["list", "items", "--session", token.expose()],
        )?;
        if !output.status.success() {
            return Err(failure("list", &output));
        }
        let items: Vec<Item> =
            serde_json::from_slice(&output.stdout).map_err(|source| VaultError::Decode {
                command: "list".to_string(),
                source,
            })?;
        info!(count = items.len(), "item list refreshed");
        self.items = items;
        Ok(())
    }

    pub fn items(&self) -> Result<&[Item]> {
        if self.status.auth_state == AuthState::Unauthenticated {
            return Err(VaultError::NotLoggedIn);
        }
        Ok(&self.items)
    }

    pub fn lookup_password(&self, id: &str) -> Result<&str> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(Item::password)
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    fn invoke(&self, command: &str, args: &[&str]) -> Result<Output> {
        debug!(command, "invoking vault CLI");
        let args: Vec<OsString> = args.iter().map(OsString::from).collect();
        self.runner.run(&self.binary, &args).map_err(|e| {
            warn!(command, error = %e, "vault CLI could not be started");
            VaultError::external(command, e.to_string())
        })
    }

    fn capture_token(&mut self, command: &str, output: Output) -> Result<()> {
        if !output.status.success() {
            warn!(command, "vault CLI rejected credentials");
            return Err(VaultError::Auth(stderr_message(&output)));
        }
        let token = SessionToken::new(String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| VaultError::Auth(format!("{command} returned an empty session token")))?;
        self.token = Some(token);
        Ok(())
    }
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    }
}

fn failure(command: &str, output: &Output) -> VaultError {
    warn!(command, status = %output.status, "vault CLI failed");
    VaultError::external(command, stderr_message(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }

    fn ok(stdout: &str) -> io::Result<Output> {
        Ok(Output {
            status: exit_status(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    fn fail(stderr: &str) -> io::Result<Output> {
        Ok(Output {
            status: exit_status(1),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        })
    }

    type Calls = Rc<RefCell<Vec<Vec<String>>>>;

    struct StubRunner {
        calls: Calls,
        results: RefCell<VecDeque<io::Result<Output>>>,
    }

    impl CommandRunner for StubRunner {
        fn run(&self, _program: &str, args: &[OsString]) -> io::Result<Output> {
            self.calls.borrow_mut().push(
                args.iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
            );
            self.results.borrow_mut().pop_front().unwrap_or_else(|| {
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "missing stubbed command output",
                ))
            })
        }
    }

    fn session_with(results: Vec<io::Result<Output>>) -> (VaultSession, Calls) {
        let calls: Calls = Rc::default();
        let runner = StubRunner {
            calls: Rc::clone(&calls),
            results: RefCell::new(results.into()),
        };
        (VaultSession::new(Box::new(runner), "bw", None), calls)
    }

    const LOCKED: &str = r#"{"userEmail":"me@example.com","status":"locked"}"#;
    const UNLOCKED: &str = r#"{"userEmail":"me@example.com","status":"unlocked"}"#;
    const UNAUTHENTICATED: &str = r#"{"status":"unauthenticated"}"#;
    const ITEMS: &str = r#"[
        {"object":"item","id":"a1","type":1,"name":"mail","login":{"username":"me","password":"hunter2"}},
        {"object":"item","id":"b2","type":2,"name":"note","notes":"text"}
    ]"#;

    #[test]
    fn unlock_and_logout_require_login_without_invoking_cli() {
        let (mut session, calls) = session_with(vec![]);
        assert!(matches!(session.unlock("pw"), Err(VaultError::NotLoggedIn)));
        assert!(matches!(session.logout(), Err(VaultError::NotLoggedIn)));
        assert!(matches!(session.refresh_list(), Err(VaultError::NotLoggedIn)));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn login_is_noop_when_already_authenticated() {
        let (mut session, calls) = session_with(vec![ok(LOCKED)]);
        session.refresh_status().unwrap();
        session.login("me@example.com", "pw").unwrap();
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(calls.borrow()[0], vec!["status"]);
    }

    #[test]
    fn login_captures_token_and_refreshes_status() {
        let (mut session, calls) = session_with(vec![ok("tok123\n"), ok(UNLOCKED)]);
        session.login("me@example.com", "pw").unwrap();
        assert!(session.has_token());
        assert_eq!(session.auth_state(), AuthState::Unlocked);
        assert_eq!(
            calls.borrow()[0],
            vec!["login", "me@example.com", "pw", "--raw"]
        );
    }

    #[test]
    fn rejected_login_is_auth_error() {
        let (mut session, _) = session_with(vec![fail("Username or password is incorrect.")]);
        let err = session.login("me@example.com", "bad").unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("incorrect"));
    }

    #[test]
    fn empty_token_is_auth_error() {
        let (mut session, _) = session_with(vec![ok(LOCKED), ok("  \n")]);
        session.refresh_status().unwrap();
        assert!(session.unlock("pw").unwrap_err().is_auth());
        assert!(!session.has_token());
    }

    #[test]
    fn refresh_list_passes_session_token() {
        let (mut session, calls) =
            session_with(vec![ok(LOCKED), ok("tok"), ok(UNLOCKED), ok(ITEMS)]);
        session.refresh_status().unwrap();
        session.unlock("pw").unwrap();
        session.refresh_list().unwrap();
        assert_eq!(
            calls.borrow()[3],
            vec!["list", "items", "--session", "tok"]
        );
        assert_eq!(session.items().unwrap().len(), 2);
    }

    #[test]
    fn lookup_password_matches_exact_id() {
        let (mut session, _) = session_with(vec![ok(UNLOCKED), ok(ITEMS)]);
        session.token = SessionToken::new("seed");
        session.refresh_status().unwrap();
        session.refresh_list().unwrap();
        assert_eq!(session.lookup_password("a1").unwrap(), "hunter2");
        assert_eq!(session.lookup_password("b2").unwrap(), "");
        assert!(matches!(
            session.lookup_password("a"),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_list_is_decode_error() {
        let (mut session, _) = session_with(vec![ok(UNLOCKED), ok(ITEMS), ok("[{\"id\":")]);
        session.token = SessionToken::new("seed");
        session.refresh_status().unwrap();
        session.refresh_list().unwrap();
        let err = session.refresh_list().unwrap_err();
        assert!(matches!(err, VaultError::Decode { .. }));
        assert_eq!(session.items().unwrap().len(), 2);
    }

    #[test]
    fn logout_clears_token() {
        let (mut session, _) = session_with(vec![ok(UNLOCKED), ok(""), ok(UNAUTHENTICATED)]);
        session.token = SessionToken::new("seed");
        session.refresh_status().unwrap();
        session.logout().unwrap();
        assert!(!session.has_token());
        assert_eq!(session.auth_state(), AuthState::Unauthenticated);
    }

    #[test]
    fn malformed_status_is_decode_error() {
        let (mut session, _) = session_with(vec![ok("not json")]);
        assert!(matches!(
            session.refresh_status(),
            Err(VaultError::Decode { .. })
        ));
    }

    #[test]
    fn missing_binary_fails_preflight() {
        let runner = StubRunner {
            calls: Rc::default(),
            results: RefCell::new(VecDeque::from(vec![Err(io::Error::new(
                io::ErrorKind::NotFound,
                "not found",
            ))])),
        };
        assert!(matches!(
            preflight(&runner, "bw"),
            Err(VaultError::ExternalTool { .. })
        ));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = SessionToken::new("secret").unwrap();
        assert_eq!(format!("{token:?}"), "SessionToken(..)");
    }
}
