use color_eyre::{Result, eyre::WrapErr};
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize};
use serde_json;

/// Persisted form of a supported token. Keyed by lowercased address so a
/// checksummed and a lowercased copy of the same token never coexist.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenRecord {
    pub address: String,
    pub symbol: String,
    pub name: String,
}

#[derive(Clone)]
pub struct TokensRepository {
    handle: PartitionHandle,
}

impl TokensRepository {
    pub(crate) fn new(handle: PartitionHandle) -> Self {
        Self { handle }
    }

    pub fn list(&self) -> Result<Vec<TokenRecord>> {
        let mut items = Vec::new();
        for entry in self.handle.iter() {
            let (_, value) = entry?;
            let record: TokenRecord = serde_json::from_slice(value.as_ref())
                .wrap_err("failed to deserialize token record")?;
            items.push(record);
        }
        Ok(items)
    }

    pub fn upsert(&self, record: &TokenRecord) -> Result<()> {
        let stored = serde_json::to_vec(record).wrap_err("failed to serialize token record")?;
        self.handle
            .insert(record.address.to_ascii_lowercase().as_bytes(), stored)
            .wrap_err("failed to insert token")
    }

    /// Swap the stored list wholesale, e.g. after a token-list refresh.
    pub fn replace_all(&self, records: &[TokenRecord]) -> Result<()> {
        let mut stale = Vec::new();
        for entry in self.handle.iter() {
            let (key, _) = entry?;
            stale.push(key.to_vec());
        }
        for key in stale {
            self.handle
                .remove(key.as_slice())
                .wrap_err("failed to clear token record")?;
        }
        for record in records {
            self.upsert(record)?;
        }
        Ok(())
    }
}

/// Settings the user can override through the environment. The fourth kind
/// of persisted value, the last chosen token, is written under a raw key by
/// the app and has no env form.
#[derive(Debug, Clone, Copy)]
pub enum SettingKey {
    RpcUrl,
    Account,
    TokenListUrl,
}

impl SettingKey {
    fn storage_key(self) -> &'static str {
        match self {
            SettingKey::RpcUrl => "v1::setting::rpc_url",
            SettingKey::Account => "v1::setting::account",
            SettingKey::TokenListUrl => "v1::setting::token_list_url",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            SettingKey::RpcUrl => "TOKEN_TUI_RPC_URL",
            SettingKey::Account => "TOKEN_TUI_ACCOUNT",
            SettingKey::TokenListUrl => "TOKEN_TUI_TOKEN_LIST_URL",
        }
    }
}

#[derive(Clone)]
pub struct SettingsRepository {
    handle: PartitionHandle,
}

impl SettingsRepository {
    pub(crate) fn new(handle: PartitionHandle) -> Self {
        Self { handle }
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .handle
            .get(key.as_bytes())
            .wrap_err("failed to read setting")?
            .map(|v| v.to_vec()))
    }

    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.handle
            .insert(key.as_bytes(), value)
            .wrap_err("failed to write setting")
    }

    pub fn get_value(&self, key: SettingKey) -> Result<Option<String>> {
        Ok(self
            .handle
            .get(key.storage_key().as_bytes())
            .wrap_err("failed to read setting")?
            .map(|bytes| {
                String::from_utf8(bytes.to_vec()).wrap_err("setting value is not valid UTF-8")
            })
            .transpose()?)
    }

    pub fn set_value(&self, key: SettingKey, value: &str) -> Result<()> {
        self.handle
            .insert(key.storage_key().as_bytes(), value.as_bytes())
            .wrap_err("failed to write setting")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::Config;
    use tempfile::tempdir;

    #[test]
    fn settings_roundtrip() -> Result<()> {
        let temp = tempdir().unwrap();
        let keyspace = Config::new(temp.path()).open()?;
        let handle = keyspace.open_partition("settings_test", Default::default())?;
        let settings = SettingsRepository::new(handle);

        assert!(settings.get_value(SettingKey::RpcUrl)?.is_none());
        settings.set_value(SettingKey::RpcUrl, "http://127.0.0.1:8545")?;
        assert_eq!(
            settings.get_value(SettingKey::RpcUrl)?,
            Some("http://127.0.0.1:8545".to_string())
        );

        settings.put("app:selected_token", b"0xabc")?;
        assert_eq!(settings.get("app:selected_token")?, Some(b"0xabc".to_vec()));

        Ok(())
    }

    #[test]
    fn tokens_replace_all_swaps_the_list() -> Result<()> {
        let temp = tempdir().unwrap();
        let keyspace = Config::new(temp.path()).open()?;
        let handle = keyspace.open_partition("tokens_test", Default::default())?;
        let tokens = TokensRepository::new(handle);

        tokens.upsert(&TokenRecord {
            address: "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".into(),
            symbol: "AAA".into(),
            name: "Alpha".into(),
        })?;
        assert_eq!(tokens.list()?.len(), 1);

        tokens.replace_all(&[
            TokenRecord {
                address: "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB".into(),
                symbol: "BBB".into(),
                name: "Beta".into(),
            },
            TokenRecord {
                address: "0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC".into(),
                symbol: "CCC".into(),
                name: "Gamma".into(),
            },
        ])?;

        let listed = tokens.list()?;
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|record| record.symbol != "AAA"));

        Ok(())
    }
}
