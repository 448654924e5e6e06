use alloy::primitives::U256;
use std::collections::HashMap;

pub mod amount;
pub mod dataset;

pub use amount::{PLACEHOLDER, TokenAmount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
}

impl Token {
    /// Identity comparison. Addresses are the stable identifier; symbol and
    /// name are display-only and may differ between list revisions.
    pub fn is_same(&self, other: &Token) -> bool {
        self.address.eq_ignore_ascii_case(&other.address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub address: String,
    pub balance_wei: U256,
}

/// Balances keyed by lowercased token address, in display units semantics:
/// every stored [`TokenAmount`] is the raw base-unit quantity, scaled down
/// only when rendered.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBalances {
    amounts: HashMap<String, TokenAmount>,
}

impl NormalizedBalances {
    /// Rebuild the mapping from a balance slice. An empty slice leaves the
    /// previous mapping in place, so a transient absence upstream does not
    /// wipe amounts that were already on screen.
    pub fn absorb(&mut self, balances: &[TokenBalance]) {
        if balances.is_empty() {
            return;
        }
        self.amounts = balances
            .iter()
            .map(|entry| {
                (
                    entry.address.to_ascii_lowercase(),
                    TokenAmount::from_wei(entry.balance_wei),
                )
            })
            .collect();
    }

    pub fn get(&self, address: &str) -> Option<TokenAmount> {
        self.amounts.get(&address.to_ascii_lowercase()).copied()
    }

    /// Formatted amount for a token row: the number when known and above the
    /// display threshold, the placeholder otherwise. "Unknown" and "dust"
    /// are deliberately indistinguishable here.
    pub fn display(&self, address: &str) -> String {
        match self.get(address) {
            Some(amount) if amount.is_displayable() => amount.display(),
            _ => PLACEHOLDER.to_string(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(value: u128) -> U256 {
        U256::from(value)
    }

    #[test]
    fn absorb_replaces_previous_mapping() {
        let mut balances = NormalizedBalances::default();
        balances.absorb(&[TokenBalance {
            address: "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".into(),
            balance_wei: wei(2_000_000_000_000_000_000),
        }]);
        balances.absorb(&[TokenBalance {
            address: "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB".into(),
            balance_wei: wei(1_000_000_000_000_000_000),
        }]);

        assert!(
            balances
                .get("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
                .is_none()
        );
        assert!(
            balances
                .get("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")
                .is_some()
        );
    }

    #[test]
    fn absorb_ignores_empty_input() {
        let mut balances = NormalizedBalances::default();
        balances.absorb(&[TokenBalance {
            address: "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".into(),
            balance_wei: wei(2_000_000_000_000_000_000),
        }]);
        balances.absorb(&[]);

        assert_eq!(
            balances.display("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"),
            "2"
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut balances = NormalizedBalances::default();
        balances.absorb(&[TokenBalance {
            address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".into(),
            balance_wei: wei(1_500_000_000_000_000_000),
        }]);

        assert_eq!(
            balances.display("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
            "1.5"
        );
    }

    #[test]
    fn unknown_address_renders_placeholder() {
        let balances = NormalizedBalances::default();
        assert_eq!(
            balances.display("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"),
            PLACEHOLDER
        );
    }
}
