//! Wallet commands: lifecycle, PIN, backup.

use clap::Subcommand;

use crate::context;
use crate::output;
use crate::GlobalOpts;

#[derive(Subcommand)]
pub enum WalletAction {
    /// Create a fresh 24-word wallet.
    Create,
    /// Import a wallet from a BIP39 phrase.
    Import {
        /// The full phrase, quoted ("word1 word2 ...").
        words: String,
    },
    /// Show the wallet address.
    Address,
    /// Show stored-wallet and PIN status.
    Status,
    /// Set or replace the 6-digit PIN.
    SetPin {
        /// The new PIN; prompted for when absent.
        pin: Option<String>,
    },
    /// Reveal the recovery phrase (PIN required).
    Reveal {
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
    /// Delete all credentials from this machine.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: WalletAction, opts: &GlobalOpts) -> std::result::Result<(), String> {
    match action {
        WalletAction::Create => create(opts),
        WalletAction::Import { words } => import(opts, &words),
        WalletAction::Address => address(opts),
        WalletAction::Status => status(opts),
        WalletAction::SetPin { pin } => set_pin(opts, pin),
        WalletAction::Reveal { pin } => reveal(opts, pin),
        WalletAction::Clear { yes } => clear(opts, yes),
    }
}

fn create(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    if app.wallet_exists().map_err(|e| e.to_string())? {
        return Err("a wallet already exists; run 'wallet clear' first".into());
    }

    let identity = app.create_wallet().map_err(|e| e.to_string())?;
    let address = identity.checksummed_address();

    if opts.json {
        let obj = serde_json::json!({
            "address": address,
            "mnemonic": identity.mnemonic.as_str(),
        });
        println!("{obj}");
    } else {
        println!();
        println!("============================================================");
        println!("  NEW WALLET CREATED -- SAVE YOUR RECOVERY PHRASE!");
        println!("============================================================");
        println!();
        println!("  {}", identity.mnemonic.as_str());
        println!();
        println!("  Write these words down and store them safely.");
        println!("  They are shown again only with 'wallet reveal' and the PIN.");
        println!("============================================================");
        println!();
        output::print_kv("Address", &address, false);
    }

    app.flush().map_err(|e| e.to_string())
}

fn import(opts: &GlobalOpts, words: &str) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    if app.wallet_exists().map_err(|e| e.to_string())? {
        return Err("a wallet already exists; run 'wallet clear' first".into());
    }

    let identity = app.import_wallet(words).map_err(|e| e.to_string())?;
    let address = identity.checksummed_address();

    if opts.json {
        let obj = serde_json::json!({ "address": address });
        println!("{obj}");
    } else {
        output::print_success("wallet imported", false);
        output::print_kv("Address", &address, false);
    }

    app.flush().map_err(|e| e.to_string())
}

fn address(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    match app.address_display().map_err(|e| e.to_string())? {
        Some(address) => {
            output::print_kv("Address", &address, opts.json);
            Ok(())
        }
        None => Err("no wallet stored; create or import one first".into()),
    }
}

fn status(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    let exists = app.wallet_exists().map_err(|e| e.to_string())?;
    let pin_set = app.has_pin().map_err(|e| e.to_string())?;
    let address = app.address_display().map_err(|e| e.to_string())?;

    if opts.json {
        let obj = serde_json::json!({
            "wallet_exists": exists,
            "pin_set": pin_set,
            "address": address,
        });
        println!("{obj}");
    } else {
        output::print_kv("Wallet", if exists { "stored" } else { "none" }, false);
        output::print_kv("PIN", if pin_set { "set" } else { "not set" }, false);
        if let Some(address) = address {
            output::print_kv("Address", &address, false);
        }
    }

    Ok(())
}

fn set_pin(opts: &GlobalOpts, pin: Option<String>) -> std::result::Result<(), String> {
    let pin = context::read_pin(pin)?;
    let app = context::open_app(opts)?;
    if !app.wallet_exists().map_err(|e| e.to_string())? {
        return Err("no wallet stored; create or import one first".into());
    }
    app.set_pin(&pin).map_err(|e| e.to_string())?;
    app.flush().map_err(|e| e.to_string())?;
    output::print_success("PIN set", opts.json);
    Ok(())
}

fn reveal(opts: &GlobalOpts, pin: Option<String>) -> std::result::Result<(), String> {
    let pin = context::read_pin(pin)?;
    let app = context::open_app(opts)?;
    let mnemonic = app.reveal_mnemonic(&pin).map_err(|e| e.to_string())?;

    if opts.json {
        let obj = serde_json::json!({ "mnemonic": mnemonic.as_str() });
        println!("{obj}");
    } else {
        output::print_kv("Recovery phrase", mnemonic.as_str(), false);
    }

    Ok(())
}

fn clear(opts: &GlobalOpts, yes: bool) -> std::result::Result<(), String> {
    if !yes {
        return Err("refusing to delete the wallet; pass --yes to confirm".into());
    }
    let mut app = context::open_app(opts)?;
    app.clear_wallet().map_err(|e| e.to_string())?;
    output::print_success("wallet cleared", opts.json);
    Ok(())
}
