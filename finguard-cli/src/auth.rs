use anyhow::{bail, Result};
use finguard_store::{CategorizationService, KeyValueStore};
use std::io::{self, Write};

fn prompt_secret(label: &str) -> Result<String> {
    // plain stdin, the token is echoed
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Store the backend bearer token, prompting when it was not passed
pub fn login<S: KeyValueStore>(svc: &mut CategorizationService<S>, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(t) => t.trim().to_string(),
        None => prompt_secret("Paste FinGuard API token")?,
    };
    if token.is_empty() {
        bail!("empty token");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("token must not contain whitespace");
    }
    svc.set_auth_token(&token)?;
    println!("Saved API token");
    Ok(())
}

pub fn logout<S: KeyValueStore>(svc: &mut CategorizationService<S>) -> Result<()> {
    if svc.auth_token()?.is_none() {
        println!("Not logged in");
        return Ok(());
    }
    svc.clear_auth_token()?;
    println!("Removed API token");
    Ok(())
}

/// Token for backend calls, or a hint to log in
pub fn require_token<S: KeyValueStore>(svc: &CategorizationService<S>) -> Result<String> {
    match svc.auth_token()? {
        Some(t) => Ok(t),
        None => bail!("Not logged in. Run: finguard login --token <token>"),
    }
}
