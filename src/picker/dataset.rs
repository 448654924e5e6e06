use super::{NormalizedBalances, Token};
use std::cmp::Ordering;

/// Derive the displayable token list from the full supported list, the
/// current search term, and the known balances. Pure: the inputs are never
/// mutated and the output is always a filtered permutation of `tokens`.
///
/// Filtering keeps a token when its symbol, name, or address contains the
/// term as a case-insensitive substring. Sorting is stable and descending by
/// balance; a pair where either side has no known balance compares equal, so
/// balance-less tokens keep their supplied relative order.
pub fn derive(tokens: &[Token], search_term: &str, balances: &NormalizedBalances) -> Vec<Token> {
    let mut dataset: Vec<Token> = if search_term.is_empty() {
        tokens.to_vec()
    } else {
        let needle = search_term.to_lowercase();
        tokens
            .iter()
            .filter(|token| matches_term(token, &needle))
            .cloned()
            .collect()
    };

    dataset.sort_by(|first, second| {
        match (balances.get(&first.address), balances.get(&second.address)) {
            (Some(first_amount), Some(second_amount)) => second_amount.cmp(&first_amount),
            _ => Ordering::Equal,
        }
    });
    dataset
}

fn matches_term(token: &Token, needle: &str) -> bool {
    token.symbol.to_lowercase().contains(needle)
        || token.name.to_lowercase().contains(needle)
        || token.address.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::TokenBalance;
    use alloy::primitives::U256;

    fn token(address: &str, symbol: &str, name: &str) -> Token {
        Token {
            address: address.into(),
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    fn sample_tokens() -> Vec<Token> {
        vec![
            token("0x0000000000000000000000000000000000000001", "AAA", "Alpha"),
            token("0x0000000000000000000000000000000000000002", "BBB", "Beta"),
            token("0x0000000000000000000000000000000000000003", "CCC", "Gamma"),
        ]
    }

    fn balances_of(entries: &[(&str, u128)]) -> NormalizedBalances {
        let mut balances = NormalizedBalances::default();
        let list: Vec<TokenBalance> = entries
            .iter()
            .map(|(address, wei)| TokenBalance {
                address: (*address).into(),
                balance_wei: U256::from(*wei),
            })
            .collect();
        balances.absorb(&list);
        balances
    }

    #[test]
    fn empty_term_keeps_every_token() {
        let tokens = sample_tokens();
        let dataset = derive(&tokens, "", &NormalizedBalances::default());
        assert_eq!(dataset, tokens);
    }

    #[test]
    fn term_matches_name_case_insensitively() {
        let tokens = sample_tokens();
        let dataset = derive(&tokens, "al", &NormalizedBalances::default());
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset[0].symbol, "AAA");
    }

    #[test]
    fn term_matches_symbol_and_address_too() {
        let tokens = sample_tokens();

        let by_symbol = derive(&tokens, "bbb", &NormalizedBalances::default());
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].name, "Beta");

        let by_address = derive(&tokens, "0003", &NormalizedBalances::default());
        assert_eq!(by_address.len(), 1);
        assert_eq!(by_address[0].name, "Gamma");
    }

    #[test]
    fn filtered_dataset_is_a_subset() {
        let tokens = sample_tokens();
        let dataset = derive(&tokens, "a", &NormalizedBalances::default());
        assert!(dataset.iter().all(|kept| tokens.contains(kept)));
    }

    #[test]
    fn known_balances_sort_descending() {
        let tokens = sample_tokens();
        let balances = balances_of(&[
            ("0x0000000000000000000000000000000000000001", 2_000_000_000_000_000_000),
            ("0x0000000000000000000000000000000000000002", 1_000_000_000_000_000_000),
            ("0x0000000000000000000000000000000000000003", 3_000_000_000_000_000_000),
        ]);

        let dataset = derive(&tokens, "", &balances);
        let symbols: Vec<&str> = dataset.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["CCC", "AAA", "BBB"]);
    }

    #[test]
    fn tokens_without_balances_keep_their_relative_order() {
        let tokens = sample_tokens();
        let balances = balances_of(&[(
            "0x0000000000000000000000000000000000000003",
            1_000_000_000_000_000_000,
        )]);

        // AAA and BBB have no entries: every comparison involving them is
        // equal, so the stable sort leaves the full sequence untouched.
        let dataset = derive(&tokens, "", &balances);
        let symbols: Vec<&str> = dataset.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn derive_is_idempotent() {
        let tokens = sample_tokens();
        let balances = balances_of(&[
            ("0x0000000000000000000000000000000000000001", 5),
            ("0x0000000000000000000000000000000000000002", 9),
        ]);

        let first = derive(&tokens, "a", &balances);
        let second = derive(&tokens, "a", &balances);
        assert_eq!(first, second);
    }
}
