//! Wallet management tools

use super::*;
use secrecy::ExposeSecret;
use serde_json::json;
use std::sync::Arc;

use crate::config::ChainFamily;
use crate::protocols::evm::types::utils::format_units;
use crate::wallet::session::ConnectRequest;
use crate::wallet::{BarukWallet, WalletKind};

impl ToolAdapter {
    /// Connect a wallet for the user's session.
    ///
    /// Internal kinds accept a `mnemonic` directly, or a stored wallet via
    /// `wallet_name` + `passphrase` (generated and saved on first use).
    /// External kinds cannot be driven over this surface: the injected
    /// provider lives in the embedding application, so the request is
    /// rejected rather than faked.
    pub(super) async fn connect_wallet(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let kind: WalletKind = require_str(&params, "kind")?.parse()?;

        if !kind.is_internal() {
            return Err(Error::NotSupported(format!(
                "Wallet kind '{}' is driven by the embedding application's provider, not the chat surface",
                kind
            )));
        }

        let account_index = opt_u64(&params, "account_index").unwrap_or(0) as u32;
        let mut generated_phrase: Option<String> = None;

        let wallet = if let Some(mnemonic) = opt_str(&params, "mnemonic") {
            BarukWallet::from_mnemonic(mnemonic, account_index)?
        } else if let Some(name) = opt_str(&params, "wallet_name") {
            let passphrase = require_str(&params, "passphrase")?;
            if self.wallet_store.exists(name) {
                let phrase = self.wallet_store.load(name, passphrase)?;
                BarukWallet::from_mnemonic(phrase.expose_secret(), account_index)?
            } else {
                let (wallet, phrase) = BarukWallet::generate()?;
                self.wallet_store.save(name, &phrase, passphrase)?;
                generated_phrase = Some(phrase);
                wallet
            }
        } else {
            return Err(Error::Session(
                "Provide either 'mnemonic' or 'wallet_name' + 'passphrase' to connect an internal wallet"
                    .to_string(),
            ));
        };

        let request = match kind {
            WalletKind::EvmInternal => ConnectRequest::EvmInternal(Arc::new(wallet)),
            WalletKind::CosmosInternal => ConnectRequest::CosmosInternal(Arc::new(wallet)),
            // Rejected above
            WalletKind::EvmExternal | WalletKind::CosmosExternal => unreachable!(),
        };
        session.wallet.connect(request).await?;

        let mut result = json!({
            "status": session.wallet.status(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(phrase) = generated_phrase {
            // Shown once at creation; the store keeps only the encrypted form
            result["generated_mnemonic"] = json!(phrase);
        }
        Ok(result)
    }

    pub(super) async fn disconnect_wallet(&self, session: &mut UserSession) -> Result<Value, Error> {
        session.wallet.disconnect();
        Ok(json!({
            "status": session.wallet.status(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    pub(super) async fn wallet_status(&self, session: &UserSession) -> Result<Value, Error> {
        Ok(json!({
            "session_id": session.session_id,
            "status": session.wallet.status(),
            "risk_tolerance": session.risk_tolerance,
            "preferences": session.preferences,
            "network": session.wallet.network().network_name,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    pub(super) async fn switch_account(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let index = require_u64(&params, "index")? as usize;
        session.wallet.switch_account(index).await?;
        Ok(json!({
            "status": session.wallet.status(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    pub(super) async fn set_preferences(
        &self,
        session: &mut UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        if let Some(risk) = opt_str(&params, "risk_tolerance") {
            session.risk_tolerance = risk.parse()?;
        }
        if let Some(preferences) = params.get("preferences").and_then(Value::as_object) {
            for (key, value) in preferences {
                if let Some(text) = value.as_str() {
                    session.preferences.insert(key.clone(), text.to_string());
                }
            }
        }
        Ok(json!({
            "risk_tolerance": session.risk_tolerance,
            "preferences": session.preferences,
        }))
    }

    /// Formatted token holdings for the session's address (or an explicit one)
    pub(super) async fn get_balances(
        &self,
        session: &UserSession,
        params: Value,
    ) -> Result<Value, Error> {
        let chain = session
            .wallet
            .chain()
            .ok_or_else(|| Error::Session("No wallet connected".to_string()))?;
        let address = match opt_str(&params, "address") {
            Some(explicit) => explicit.to_string(),
            None => session
                .wallet
                .address()
                .ok_or_else(|| Error::Session("No active account".to_string()))?
                .to_string(),
        };
        let precision = self.network().display_precision;

        let balances = match chain {
            ChainFamily::Evm => {
                let parsed = parse_evm_address(&address, "address")?;
                let mut entries = Vec::new();

                let native = self.evm().get_balance(parsed).await?;
                entries.push(json!({
                    "denom": "sei",
                    "raw": native.to_string(),
                    "formatted": format_units(native, 18, precision),
                }));

                // Optional ERC-20 token list
                if let Some(tokens) = params.get("tokens").and_then(Value::as_array) {
                    for token in tokens {
                        let token_address = token
                            .as_str()
                            .ok_or_else(|| Error::Session("Token entries must be addresses".to_string()))?;
                        let erc20 = self.evm().erc20(parse_evm_address(token_address, "tokens")?);
                        let decimals = erc20.decimals().await?;
                        let symbol = erc20.symbol().await.unwrap_or_else(|_| token_address.to_string());
                        let balance = erc20.balance_of(parsed).await?;
                        entries.push(json!({
                            "denom": symbol,
                            "token": token_address,
                            "raw": balance.to_string(),
                            "formatted": format_units(balance, decimals as u32, precision),
                        }));
                    }
                }
                entries
            }
            ChainFamily::Cosmos => {
                let mut entries = Vec::new();
                for (denom, amount) in self.wasm().bank_balances(&address).await? {
                    // Native Sei denoms carry 6 decimals
                    let formatted =
                        crate::protocols::evm::types::utils::format_units_str(&amount, 6, precision)?;
                    entries.push(json!({
                        "denom": denom,
                        "raw": amount,
                        "formatted": formatted,
                    }));
                }
                entries
            }
        };

        let total_tokens = balances.len();
        Ok(json!({
            "address": address,
            "chain": chain,
            "balances": balances,
            "total_tokens": total_tokens,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}
