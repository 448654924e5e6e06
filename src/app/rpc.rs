use crate::{
    app::tokenlist::NATIVE_TOKEN_ADDRESS,
    picker::{Token, TokenBalance},
};
use alloy::{
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    sol,
};
use color_eyre::{Result, eyre::WrapErr};
use std::str::FromStr;

sol! {
    #[sol(rpc)]
    contract Erc20 {
        function balanceOf(address owner) external view returns (uint256);
    }
}

async fn connect_provider(rpc_url: &str) -> Result<impl Provider + Clone> {
    ProviderBuilder::new()
        .connect(rpc_url)
        .await
        .wrap_err_with(|| format!("failed to connect to RPC provider at {rpc_url}"))
}

/// Query the holder's balance for every supported token. The native asset
/// sentinel goes through `eth_getBalance`; everything else is an ERC-20
/// `balanceOf` call. A token whose lookup fails is simply omitted, which the
/// UI renders as an unknown balance.
pub async fn fetch_token_balances(
    rpc_url: &str,
    holder: &str,
    tokens: Vec<Token>,
) -> Result<Vec<TokenBalance>> {
    let holder = Address::from_str(holder.trim()).wrap_err("holder is not a valid address")?;
    let provider = connect_provider(rpc_url).await?;

    let mut balances = Vec::with_capacity(tokens.len());
    for token in tokens {
        let fetched = if token.address.eq_ignore_ascii_case(NATIVE_TOKEN_ADDRESS) {
            provider.get_balance(holder).await.ok()
        } else {
            match Address::from_str(&token.address) {
                Ok(contract) => Erc20::new(contract, provider.clone())
                    .balanceOf(holder)
                    .call()
                    .await
                    .ok(),
                Err(_) => None,
            }
        };
        if let Some(balance_wei) = fetched {
            balances.push(TokenBalance {
                address: token.address,
                balance_wei,
            });
        }
    }
    Ok(balances)
}
