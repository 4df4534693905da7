//! Balance commands: chain reads and the mock source switch.

use clap::Subcommand;

use crate::context;
use crate::output;
use crate::GlobalOpts;

#[derive(Subcommand)]
pub enum BalanceAction {
    /// Fetch the RBTC and LUT balances.
    Show,
    /// Switch balance reads to the fixed development values (on|off).
    Mock {
        /// `on` or `off`.
        state: String,
    },
}

pub async fn run(action: BalanceAction, opts: &GlobalOpts) -> std::result::Result<(), String> {
    match action {
        BalanceAction::Show => show(opts).await,
        BalanceAction::Mock { state } => mock(opts, &state),
    }
}

async fn show(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    let (native, token) = app.load_balances().await.map_err(|e| e.to_string())?;

    if opts.json {
        let obj = serde_json::json!({ "rbtc": native, "lut": token });
        println!("{obj}");
    } else {
        output::print_kv("RBTC", &native.formatted, false);
        output::print_kv("LUT", &token.formatted, false);
    }

    Ok(())
}

fn mock(opts: &GlobalOpts, state: &str) -> std::result::Result<(), String> {
    let enabled = match state {
        "on" => true,
        "off" => false,
        other => return Err(format!("expected 'on' or 'off', got '{other}'")),
    };

    let app = context::open_app(opts)?;
    app.set_use_mock_balances(enabled)
        .map_err(|e| e.to_string())?;
    output::print_success(&format!("mock balances {state}"), opts.json);
    Ok(())
}
