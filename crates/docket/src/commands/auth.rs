//! Account commands that talk to the auth endpoints directly.

use std::io::Write;

use anyhow::{Context, Result};
use docket_app::{SessionGate, StoreError, TokenStore};
use docket_store_http::{HttpStore, HttpStoreError, NewAccount};

use crate::Command;

pub async fn run<T: TokenStore>(
    command: Command,
    store: &HttpStore,
    gate: &mut SessionGate<T>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let account = NewAccount {
                username,
                email,
                password,
            };
            let user = store
                .register(&account)
                .await
                .map_err(StoreError::from)
                .context("registration failed")?;
            writeln!(out, "registered {}; run `docket login` next", user.username)?;
        }
        Command::Login { username, password } => {
            let token = match store.login(&username, &password).await {
                Ok(token) => token,
                Err(HttpStoreError::InvalidCredentials(message)) => {
                    anyhow::bail!("login failed: {message}")
                }
                Err(err) => return Err(StoreError::from(err)).context("login failed"),
            };
            gate.login(token.clone())?;
            let authed = store.clone().with_token(token);
            let profile = authed
                .current_user()
                .await
                .map_err(StoreError::from)
                .context("logged in, but the profile could not be loaded")?;
            writeln!(out, "logged in as {} <{}>", profile.username, profile.email)?;
            gate.set_profile(profile);
        }
        Command::Logout => {
            if gate.is_authenticated() {
                gate.logout()?;
                writeln!(out, "logged out")?;
            } else {
                writeln!(out, "not logged in")?;
            }
        }
        _ => unreachable!("Unhandled command routed to auth"),
    }
    Ok(())
}
