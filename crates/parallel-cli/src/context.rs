//! Shared startup for command handlers.
//!
//! Resolves configuration (file first, then flag overrides), reads the
//! store passphrase, and opens the application. Handlers that sign also
//! unlock here, so the PIN prompt lives in one place.

use parallel_app::App;
use parallel_types::config::{AppConfig, ChainProfile};
use parallel_wallet::Pin;

use crate::GlobalOpts;

/// Environment variable consulted before prompting for the passphrase.
pub const PASSPHRASE_ENV: &str = "PARALLEL_PASSPHRASE";

/// Opens the application with the resolved config and chain profile.
pub fn open_app(opts: &GlobalOpts) -> std::result::Result<App, String> {
    let mut config = match &opts.config_path {
        Some(path) => AppConfig::load(path).map_err(|e| e.to_string())?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &opts.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &opts.governance_url {
        config.governance_url = url.clone();
    }
    if let Some(secs) = opts.timeout_secs {
        config.request_timeout_secs = secs;
    }

    let profile = if opts.testnet {
        ChainProfile::testnet()
    } else {
        ChainProfile::mainnet()
    };

    let passphrase = read_passphrase("Enter store passphrase: ")?;
    App::open(config, profile, &passphrase).map_err(|e| e.to_string())
}

/// Opens the application and unlocks the session.
pub fn open_unlocked(
    opts: &GlobalOpts,
    pin: Option<String>,
) -> std::result::Result<App, String> {
    let mut app = open_app(opts)?;
    let pin = read_pin(pin)?;
    app.unlock(&pin).map_err(|e| e.to_string())?;
    Ok(app)
}

/// Opens, unlocks, and signs in to the governance backend.
pub async fn open_signed_in(
    opts: &GlobalOpts,
    pin: Option<String>,
) -> std::result::Result<App, String> {
    let mut app = open_unlocked(opts, pin)?;
    app.sign_in().await.map_err(|e| e.to_string())?;
    Ok(app)
}

/// Parses a PIN given on the command line, or prompts for one.
pub fn read_pin(provided: Option<String>) -> std::result::Result<Pin, String> {
    let digits = match provided {
        Some(digits) => digits,
        None => prompt_line("Enter PIN: ")?,
    };
    Pin::new(&digits).map_err(|e| e.to_string())
}

fn read_passphrase(prompt: &str) -> std::result::Result<String, String> {
    // Env var first (for non-interactive / CI usage).
    if let Ok(pass) = std::env::var(PASSPHRASE_ENV) {
        return Ok(pass);
    }
    prompt_line(prompt)
}

fn prompt_line(prompt: &str) -> std::result::Result<String, String> {
    eprint!("{prompt}");
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|e| format!("failed to read input: {e}"))?;
    Ok(input.trim().to_string())
}
