//! History list filters.

use std::fmt;
use std::str::FromStr;

use parallel_types::{ParallelError, TokenKind, TxDirection, TxRecord};

/// A pure predicate over history records, matching the filter chips the
/// wallet offers: direction-based or token-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HistoryFilter {
    All,
    Sent,
    Received,
    Contract,
    Token(TokenKind),
}

impl HistoryFilter {
    /// Whether `record` passes this filter.
    pub fn matches(&self, record: &TxRecord) -> bool {
        match self {
            Self::All => true,
            Self::Sent => record.direction == TxDirection::Outgoing,
            Self::Received => record.direction == TxDirection::Incoming,
            Self::Contract => record.direction == TxDirection::Contract,
            Self::Token(kind) => record.token == *kind,
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Sent => write!(f, "Sent"),
            Self::Received => write!(f, "Received"),
            Self::Contract => write!(f, "Contract"),
            Self::Token(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = ParallelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "sent" => Ok(Self::Sent),
            "received" => Ok(Self::Received),
            "contract" => Ok(Self::Contract),
            "rbtc" => Ok(Self::Token(TokenKind::Rbtc)),
            "lut" => Ok(Self::Token(TokenKind::Lut)),
            other => Err(ParallelError::ConfigError {
                reason: format!("unknown history filter '{other}'"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parallel_types::{Address, TxHash, TxStatus, Wei};

    fn record(token: TokenKind, direction: TxDirection) -> TxRecord {
        TxRecord {
            hash: TxHash::new([0x42; 32]),
            token,
            direction,
            title: String::new(),
            from: Address::ZERO,
            to: Address::ZERO,
            amount: "0.00".to_string(),
            raw_amount: Wei::ZERO,
            timestamp_ms: 0,
            status: TxStatus::Confirmed,
            fee: None,
            usd_value: None,
        }
    }

    #[test]
    fn direction_filters_split_sent_received_contract() {
        let sent = record(TokenKind::Rbtc, TxDirection::Outgoing);
        let received = record(TokenKind::Rbtc, TxDirection::Incoming);
        let contract = record(TokenKind::Rbtc, TxDirection::Contract);

        assert!(HistoryFilter::Sent.matches(&sent));
        assert!(!HistoryFilter::Sent.matches(&received));
        assert!(HistoryFilter::Received.matches(&received));
        assert!(!HistoryFilter::Received.matches(&contract));
        assert!(HistoryFilter::Contract.matches(&contract));
        assert!(!HistoryFilter::Contract.matches(&sent));
    }

    #[test]
    fn all_matches_everything() {
        for direction in [
            TxDirection::Incoming,
            TxDirection::Outgoing,
            TxDirection::Contract,
        ] {
            assert!(HistoryFilter::All.matches(&record(TokenKind::Lut, direction)));
        }
    }

    #[test]
    fn token_filter_ignores_direction() {
        let lut_in = record(TokenKind::Lut, TxDirection::Incoming);
        let rbtc_out = record(TokenKind::Rbtc, TxDirection::Outgoing);

        let filter = HistoryFilter::Token(TokenKind::Lut);
        assert!(filter.matches(&lut_in));
        assert!(!filter.matches(&rbtc_out));
    }

    #[test]
    fn filters_parse_case_insensitively() {
        assert_eq!("ALL".parse::<HistoryFilter>().unwrap(), HistoryFilter::All);
        assert_eq!(
            "lut".parse::<HistoryFilter>().unwrap(),
            HistoryFilter::Token(TokenKind::Lut)
        );
        assert_eq!(
            "Sent".parse::<HistoryFilter>().unwrap(),
            HistoryFilter::Sent
        );
        assert!("burned".parse::<HistoryFilter>().is_err());
    }
}
