//! Command handlers, one module per area.

pub mod balance;
pub mod gov;
pub mod history;
pub mod tx;
pub mod wallet;
