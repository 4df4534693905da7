//! Transaction commands: fee estimation and sending.

use clap::Subcommand;

use parallel_chain::SendRequest;
use parallel_types::{TokenKind, Wei};

use crate::context;
use crate::output;
use crate::GlobalOpts;

#[derive(Subcommand)]
pub enum TxAction {
    /// Quote the fee for a candidate send.
    Estimate {
        /// Token to send (rbtc|lut).
        token: String,
        /// Recipient address (0x-prefixed).
        to: String,
        /// Amount in whole-token units (e.g. "1.5").
        amount: String,
    },
    /// Sign, broadcast, and record a send.
    Send {
        /// Token to send (rbtc|lut).
        token: String,
        /// Recipient address (0x-prefixed).
        to: String,
        /// Amount in whole-token units (e.g. "1.5").
        amount: String,
        /// Gas limit override; estimated when absent.
        #[arg(long)]
        gas_limit: Option<u64>,
        /// Gas price override in wei; estimated when absent.
        #[arg(long)]
        gas_price: Option<u128>,
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
}

pub async fn run(action: TxAction, opts: &GlobalOpts) -> std::result::Result<(), String> {
    match action {
        TxAction::Estimate { token, to, amount } => estimate(opts, &token, &to, &amount).await,
        TxAction::Send {
            token,
            to,
            amount,
            gas_limit,
            gas_price,
            pin,
        } => send(opts, &token, &to, &amount, gas_limit, gas_price, pin).await,
    }
}

async fn estimate(
    opts: &GlobalOpts,
    token: &str,
    to: &str,
    amount: &str,
) -> std::result::Result<(), String> {
    let token = output::parse_token(token)?;
    let to = output::parse_address(to)?;
    let amount = output::parse_amount(amount, token)?;

    let app = context::open_app(opts)?;
    let estimate = app
        .estimate_send_fee(token, to, amount)
        .await
        .map_err(|e| e.to_string())?;

    match estimate {
        Some(estimate) => {
            if opts.json {
                output::print_value(&estimate, true);
            } else {
                output::print_kv("Gas limit", &estimate.gas_limit.to_string(), false);
                output::print_kv("Gas price", &format!("{} wei", estimate.gas_price), false);
                output::print_kv("Total fee", &format!("{} RBTC", estimate.formatted_fee), false);
            }
            Ok(())
        }
        None => Err("estimate was superseded before it completed".into()),
    }
}

async fn send(
    opts: &GlobalOpts,
    token: &str,
    to: &str,
    amount: &str,
    gas_limit: Option<u64>,
    gas_price: Option<u128>,
    pin: Option<String>,
) -> std::result::Result<(), String> {
    let token = output::parse_token(token)?;
    let to = output::parse_address(to)?;
    let amount = output::parse_amount(amount, token)?;

    let app = context::open_unlocked(opts, pin)?;
    let request = SendRequest {
        token,
        to,
        amount,
        gas_limit,
        gas_price: gas_price.map(Wei::new),
    };
    let record = app.send(&request).await.map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&record, true);
    } else {
        output::print_success("transaction broadcast", false);
        output::print_kv("Hash", &record.hash.to_string(), false);
        output::print_kv("Amount", &format!("{} {}", record.amount, record.token), false);
        if let Some(fee) = record.fee {
            output::print_kv(
                "Max fee",
                &format!("{} RBTC", fee.format_units(TokenKind::Rbtc.decimals())),
                false,
            );
        }
    }

    Ok(())
}
