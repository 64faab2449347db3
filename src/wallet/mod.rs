// Allow deprecated Signature for compatibility with alloy-consensus ecosystem
#![allow(deprecated)]

use bip32::{DerivationPath, Seed, XPrv};
use bip39::Mnemonic;
use cosmrs::{
    crypto::secp256k1::{Signature as CosmosSignature, SigningKey},
    crypto::PublicKey,
    tx::{BodyBuilder, Fee, Raw, SignDoc, SignerInfo},
    AccountId, Coin as CosmosCoin, Denom,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::protocols::evm::tx::{Eip1559Transaction, SignedEip1559Transaction};
use alloy_primitives::{Address, Signature, B256};
use k256::ecdsa::SigningKey as K256SigningKey;
use sha3::{digest::FixedOutput, Digest, Keccak256};
use tiny_keccak::{Hasher, Keccak};

use crate::error::Error;

// Encrypted mnemonic persistence for internal wallets
pub mod storage;
pub use storage::WalletStore;

// Wallet session state machine (the unified connector)
pub mod session;
pub use session::{
    ActiveSigner, ConnectRequest, ExternalCosmosSigner, ExternalEvmProvider, SessionStatus,
    TxPayload, WalletKind, WalletSession,
};

/// BIP-44 path prefix for the Cosmos layer
const COSMOS_HD_PATH: &str = "m/44'/118'/0'/0/";

/// BIP-44 path prefix for the EVM layer
const EVM_HD_PATH: &str = "m/44'/60'/0'/0/";

/// Bech32 prefix for Sei addresses
const ACCOUNT_PREFIX: &str = "sei";

/// Dual-VM wallet holding the Cosmos and EVM keys derived from one mnemonic.
///
/// The mnemonic is retained (as a secret) so sibling accounts can be derived
/// for account switching; the two signing keys for the active index are held
/// directly.
pub struct BarukWallet {
    mnemonic: SecretString,
    account_index: u32,
    account_prefix: String,
    cosmos_key: SigningKey,
    evm_key: K256SigningKey,
}

// No Clone: signing keys should not be silently duplicated. Use
// `derive_account` to obtain another instance from the same mnemonic.

impl std::fmt::Debug for BarukWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarukWallet")
            .field("account_index", &self.account_index)
            .field(
                "public_key",
                &hex::encode(self.cosmos_key.public_key().to_bytes()),
            )
            .finish()
    }
}

/// Wallet info that can be serialized safely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Bech32 address on the Cosmos layer
    pub address: String,
    /// 0x address on the EVM layer
    pub evm_address: String,
    /// Compressed public key as hex
    pub public_key: String,
    /// Derivation index this wallet was created at
    pub account_index: u32,
}

impl BarukWallet {
    /// Create a wallet from a mnemonic at the given account index
    pub fn from_mnemonic(mnemonic: &str, account_index: u32) -> Result<Self, Error> {
        let parsed = Mnemonic::from_str(mnemonic)
            .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;

        let seed = Seed::new(parsed.to_seed(""));

        let cosmos_bytes = derive_key_bytes(&seed, COSMOS_HD_PATH, account_index)?;
        let cosmos_key = SigningKey::from_slice(&cosmos_bytes)
            .map_err(|e| Error::Wallet(format!("Failed to create Cosmos signing key: {}", e)))?;

        let evm_bytes = derive_key_bytes(&seed, EVM_HD_PATH, account_index)?;
        let evm_key = K256SigningKey::from_slice(&evm_bytes)
            .map_err(|e| Error::Wallet(format!("Failed to create EVM signing key: {}", e)))?;

        Ok(Self {
            mnemonic: SecretString::new(mnemonic.to_string()),
            account_index,
            account_prefix: ACCOUNT_PREFIX.to_string(),
            cosmos_key,
            evm_key,
        })
    }

    /// Generate a new random wallet, returning it with its 12-word phrase
    pub fn generate() -> Result<(Self, String), Error> {
        use rand::{thread_rng, RngCore};

        // 16 bytes of entropy for a 12-word mnemonic
        let mut entropy = [0u8; 16];
        thread_rng().fill_bytes(&mut entropy);

        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| Error::Wallet(format!("Failed to generate mnemonic: {}", e)))?;

        let phrase = mnemonic.to_string();
        let wallet = Self::from_mnemonic(&phrase, 0)?;

        Ok((wallet, phrase))
    }

    /// Derive the sibling wallet at another account index from the same mnemonic
    pub fn derive_account(&self, account_index: u32) -> Result<Self, Error> {
        Self::from_mnemonic(self.mnemonic.expose_secret(), account_index)
    }

    pub fn account_index(&self) -> u32 {
        self.account_index
    }

    /// Bech32 address on the Cosmos layer
    pub fn cosmos_address(&self) -> Result<AccountId, Error> {
        self.cosmos_key
            .public_key()
            .account_id(&self.account_prefix)
            .map_err(|e| Error::Wallet(format!("Failed to get account ID: {}", e)))
    }

    /// Ethereum-style address on the EVM layer.
    ///
    /// Keccak-256 of the uncompressed public key (without the 0x04 prefix),
    /// last 20 bytes.
    pub fn evm_address(&self) -> Result<Address, Error> {
        let verifying_key = self.evm_key.verifying_key();
        let point = verifying_key.to_encoded_point(false);
        let pubkey_bytes = point.as_bytes();

        if pubkey_bytes.len() != 65 || pubkey_bytes[0] != 0x04 {
            return Err(Error::Wallet(
                "Invalid public key format for EVM address derivation".to_string(),
            ));
        }

        let mut hasher = Keccak::v256();
        hasher.update(&pubkey_bytes[1..]);
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        let mut address_bytes = [0u8; 20];
        address_bytes.copy_from_slice(&hash[12..]);
        Ok(Address::from(address_bytes))
    }

    /// Cosmos public key
    pub fn public_key(&self) -> PublicKey {
        self.cosmos_key.public_key()
    }

    /// Sign a Cosmos transaction doc
    pub fn sign_doc(&self, sign_doc: SignDoc) -> Result<CosmosSignature, Error> {
        let bytes = sign_doc
            .into_bytes()
            .map_err(|e| Error::Wallet(format!("Failed to convert sign doc to bytes: {}", e)))?;
        self.cosmos_key
            .sign(&bytes)
            .map_err(|e| Error::Wallet(format!("Signing error: {}", e)))
    }

    /// Build and sign a Cosmos transaction
    pub fn sign_tx(
        &self,
        account_number: u64,
        sequence: u64,
        chain_id: &str,
        fee: Fee,
        msgs: Vec<cosmrs::Any>,
        memo: Option<String>,
    ) -> Result<Raw, Error> {
        let mut body_builder = BodyBuilder::new();
        body_builder.msgs(msgs);
        if let Some(memo_text) = memo {
            body_builder.memo(memo_text);
        }
        let tx_body = body_builder.finish();

        let signer_info = SignerInfo::single_direct(Some(self.public_key()), sequence);
        let auth_info = signer_info.auth_info(fee);

        let chain_id = cosmrs::tendermint::chain::Id::from_str(chain_id)
            .map_err(|e| Error::Wallet(format!("Invalid chain ID: {}", e)))?;

        let sign_doc = SignDoc::new(&tx_body, &auth_info, &chain_id, account_number)
            .map_err(|e| Error::Wallet(format!("Failed to create sign doc: {}", e)))?;

        sign_doc
            .sign(&self.cosmos_key)
            .map_err(|e| Error::Wallet(format!("Failed to sign transaction: {}", e)))
    }

    /// Build a Cosmos fee object
    pub fn create_fee(&self, amount: u64, gas_limit: u64, denom: &str) -> Result<Fee, Error> {
        let denom =
            Denom::from_str(denom).map_err(|e| Error::Wallet(format!("Invalid denom: {}", e)))?;

        let coin = CosmosCoin {
            amount: amount.into(),
            denom,
        };

        Ok(Fee::from_amount_and_gas(coin, gas_limit))
    }

    /// Serializable wallet info
    pub fn info(&self) -> Result<WalletInfo, Error> {
        Ok(WalletInfo {
            address: self.cosmos_address()?.to_string(),
            evm_address: format!("{:?}", self.evm_address()?),
            public_key: self.cosmos_key.public_key().to_string(),
            account_index: self.account_index,
        })
    }

    fn sign_with_keccak<F>(&self, builder: F) -> Result<(Signature, B256), Error>
    where
        F: FnOnce(&mut Keccak256),
    {
        let mut digest = Keccak256::new();
        builder(&mut digest);

        let hash_bytes: [u8; 32] = digest.clone().finalize_fixed().into();

        let (sig, recid) = self
            .evm_key
            .sign_digest_recoverable(digest)
            .map_err(|e| Error::Wallet(format!("Failed to sign digest: {}", e)))?;

        Ok((Signature::from((sig, recid)), B256::from(hash_bytes)))
    }

    /// Sign an EIP-1559 transaction and return the broadcastable payload
    pub fn sign_eip1559(&self, tx: &Eip1559Transaction) -> Result<SignedEip1559Transaction, Error> {
        let encoded = tx.encoded_for_signing();
        let (signature, _) = self.sign_with_keccak(|d| d.update(&encoded))?;
        Ok(tx.clone().into_signed(signature))
    }
}

fn derive_key_bytes(seed: &Seed, path_prefix: &str, index: u32) -> Result<[u8; 32], Error> {
    let path = format!("{}{}", path_prefix, index);
    let path = DerivationPath::from_str(&path)
        .map_err(|e| Error::Wallet(format!("Invalid derivation path: {}", e)))?;

    let derived = XPrv::derive_from_path(seed.as_bytes(), &path)
        .map_err(|e| Error::Wallet(format!("Key derivation error: {}", e)))?;

    Ok(derived.to_bytes())
}
