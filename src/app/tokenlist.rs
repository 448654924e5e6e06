use crate::picker::Token;
use serde::Deserialize;
use std::{collections::HashSet, fmt, time::Duration};

/// Sentinel address conventionally used for the chain's native asset in
/// token lists; balance lookups for it go through `eth_getBalance` instead
/// of an ERC-20 call.
pub const NATIVE_TOKEN_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

pub const MAINNET_CHAIN_ID: u64 = 1;

#[derive(Debug, Clone, Copy)]
struct BuiltinToken {
    address: &'static str,
    symbol: &'static str,
    name: &'static str,
}

const BUILTIN_TOKENS: &[BuiltinToken] = &[
    BuiltinToken {
        address: NATIVE_TOKEN_ADDRESS,
        symbol: "ETH",
        name: "Ether",
    },
    BuiltinToken {
        address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
        symbol: "WETH",
        name: "Wrapped Ether",
    },
    BuiltinToken {
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        symbol: "USDC",
        name: "USD Coin",
    },
    BuiltinToken {
        address: "0x6B175474E89094C44Da98b954EedeAC495271d0F",
        symbol: "DAI",
        name: "Dai Stablecoin",
    },
    BuiltinToken {
        address: "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599",
        symbol: "WBTC",
        name: "Wrapped BTC",
    },
    BuiltinToken {
        address: "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984",
        symbol: "UNI",
        name: "Uniswap",
    },
    BuiltinToken {
        address: "0x514910771AF9Ca656af840dff83E8264EcF986CA",
        symbol: "LINK",
        name: "ChainLink Token",
    },
];

/// Fallback token set used until a token list has been fetched or persisted.
pub fn default_tokens() -> Vec<Token> {
    BUILTIN_TOKENS
        .iter()
        .map(|builtin| Token {
            address: builtin.address.to_string(),
            symbol: builtin.symbol.to_string(),
            name: builtin.name.to_string(),
        })
        .collect()
}

#[derive(Debug)]
pub enum TokenListFetchError {
    Http(reqwest::Error),
    Parse(serde_json::Error),
    Empty(u64),
}

impl fmt::Display for TokenListFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenListFetchError::Http(err) => write!(f, "network error: {err}"),
            TokenListFetchError::Parse(err) => write!(f, "token list parse error: {err}"),
            TokenListFetchError::Empty(chain_id) => {
                write!(f, "token list has no entries for chain id {chain_id}")
            }
        }
    }
}

impl std::error::Error for TokenListFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TokenListFetchError::Http(err) => Some(err),
            TokenListFetchError::Parse(err) => Some(err),
            TokenListFetchError::Empty(_) => None,
        }
    }
}

impl From<reqwest::Error> for TokenListFetchError {
    fn from(value: reqwest::Error) -> Self {
        TokenListFetchError::Http(value)
    }
}

impl From<serde_json::Error> for TokenListFetchError {
    fn from(value: serde_json::Error) -> Self {
        TokenListFetchError::Parse(value)
    }
}

#[derive(Debug, Deserialize)]
struct RawTokenList {
    tokens: Vec<RawTokenEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenEntry {
    chain_id: u64,
    address: String,
    symbol: String,
    name: String,
}

/// Fetch a token-list JSON document (the `{"tokens": [...]}` shape used by
/// public token lists) and reduce it to this app's token model.
pub async fn fetch_token_list(
    url: &str,
    chain_id: u64,
) -> Result<Vec<Token>, TokenListFetchError> {
    let client = reqwest::Client::builder()
        .user_agent("token-tui/0.1.0")
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = client.get(url).send().await?.error_for_status()?;
    let payload: serde_json::Value = response.json().await?;
    parse_token_list(payload, chain_id)
}

pub fn parse_token_list(
    payload: serde_json::Value,
    chain_id: u64,
) -> Result<Vec<Token>, TokenListFetchError> {
    let raw: RawTokenList = serde_json::from_value(payload)?;

    let mut seen = HashSet::new();
    let tokens: Vec<Token> = raw
        .tokens
        .into_iter()
        .filter(|entry| entry.chain_id == chain_id)
        .filter(|entry| seen.insert(entry.address.to_ascii_lowercase()))
        .map(|entry| Token {
            address: entry.address,
            symbol: entry.symbol,
            name: entry.name,
        })
        .collect();

    if tokens.is_empty() {
        return Err(TokenListFetchError::Empty(chain_id));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_filters_to_the_requested_chain() {
        let payload = json!({
            "name": "Test List",
            "tokens": [
                {"chainId": 1, "address": "0x0000000000000000000000000000000000000001", "symbol": "AAA", "name": "Alpha"},
                {"chainId": 10, "address": "0x0000000000000000000000000000000000000002", "symbol": "BBB", "name": "Beta"},
            ]
        });

        let tokens = parse_token_list(payload, MAINNET_CHAIN_ID).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "AAA");
    }

    #[test]
    fn parse_drops_duplicate_addresses() {
        let payload = json!({
            "tokens": [
                {"chainId": 1, "address": "0x0000000000000000000000000000000000000001", "symbol": "AAA", "name": "Alpha"},
                {"chainId": 1, "address": "0x0000000000000000000000000000000000000001", "symbol": "AAA2", "name": "Alpha Again"},
            ]
        });

        let tokens = parse_token_list(payload, MAINNET_CHAIN_ID).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "Alpha");
    }

    #[test]
    fn parse_rejects_an_empty_result() {
        let payload = json!({"tokens": []});
        assert!(matches!(
            parse_token_list(payload, MAINNET_CHAIN_ID),
            Err(TokenListFetchError::Empty(1))
        ));
    }

    #[test]
    fn defaults_include_the_native_asset_first() {
        let tokens = default_tokens();
        assert_eq!(tokens[0].address, NATIVE_TOKEN_ADDRESS);
        assert!(tokens.len() > 1);
    }
}
