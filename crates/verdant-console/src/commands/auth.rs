//! Session commands (mock auth).

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::session::Session;

fn open_session() -> Result<Session> {
    let path = Session::default_path().context("Could not determine config directory")?;
    Session::load(path)
}

/// Store a registered credential pair.
pub fn cmd_register(username: &str, password: &str, quiet: bool) -> Result<()> {
    let mut session = open_session()?;
    session.register(username, password)?;
    if !quiet {
        eprintln!("Registered user {}", username.trim().bold());
        eprintln!(
            "{}",
            "Note: credentials are stored in plaintext (mock auth).".dimmed()
        );
    }
    Ok(())
}

/// Log in against the registered credentials.
pub fn cmd_login(username: &str, password: &str, quiet: bool) -> Result<()> {
    let mut session = open_session()?;
    session.login(username, password)?;
    if !quiet {
        eprintln!("Logged in as {}", username.bold());
    }
    Ok(())
}

/// Clear the current session token.
pub fn cmd_logout(quiet: bool) -> Result<()> {
    let mut session = open_session()?;
    session.logout()?;
    if !quiet {
        eprintln!("Logged out");
    }
    Ok(())
}
