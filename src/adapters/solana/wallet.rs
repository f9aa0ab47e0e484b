use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
    #[error("Invalid base58 secret key: {0}")]
    InvalidBase58(String),
}

/// Wallet manager for loading and signing with Solana keypairs
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Load keypair from a file path (JSON array format, as written by solana-keygen)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| WalletError::LoadError(format!("Failed to read file: {}", e)))?;

        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    /// Load keypair from a base58 encoded 64-byte secret key (wallet export format)
    pub fn from_base58(secret: &str) -> Result<Self, WalletError> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| WalletError::InvalidBase58(e.to_string()))?;

        Self::from_bytes(&bytes)
    }

    /// Load keypair from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::try_from(bytes)
            .map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;

        Ok(Self { keypair })
    }

    /// Create a new random keypair (for paper trading and tests)
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Get the public key as a string
    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Sign an unsigned versioned transaction (as returned by the swap API)
    pub fn sign_versioned(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError> {
        VersionedTransaction::try_new(transaction.message, &[&self.keypair])
            .map_err(|e| WalletError::SigningError(e.to_string()))
    }

    /// Sign a message and return the signature
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        self.keypair.sign_message(message)
    }

    /// Export keypair as bytes (use with caution)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.keypair.to_bytes().to_vec()
    }
}

impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: self.keypair.insecure_clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_random_wallet() {
        let wallet = WalletManager::new_random();
        let pubkey = wallet.public_key();
        assert!(pubkey.len() >= 32 && pubkey.len() <= 44);
    }

    #[test]
    fn test_from_bytes() {
        let wallet1 = WalletManager::new_random();
        let wallet2 = WalletManager::from_bytes(&wallet1.to_bytes()).unwrap();
        assert_eq!(wallet1.public_key(), wallet2.public_key());
    }

    #[test]
    fn test_from_base58() {
        let wallet1 = WalletManager::new_random();
        let secret = bs58::encode(wallet1.to_bytes()).into_string();

        let wallet2 = WalletManager::from_base58(&format!("  {}\n", secret)).unwrap();
        assert_eq!(wallet1.public_key(), wallet2.public_key());
    }

    #[test]
    fn test_invalid_base58() {
        assert!(matches!(
            WalletManager::from_base58("0OIl-not-base58"),
            Err(WalletError::InvalidBase58(_))
        ));
        // Valid base58, wrong length
        assert!(matches!(
            WalletManager::from_base58("3mJr7AoUXx2Wqd"),
            Err(WalletError::InvalidKeypair(_))
        ));
    }

    #[test]
    fn test_sign_message() {
        let wallet = WalletManager::new_random();
        let signature = wallet.sign_message(b"Hello, Solana!");
        assert!(signature.verify(wallet.pubkey().as_ref(), b"Hello, Solana!"));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let wallet1 = WalletManager::new_random();

        let json = serde_json::to_string(&wallet1.to_bytes()).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let wallet2 = WalletManager::from_file(temp_file.path()).unwrap();
        assert_eq!(wallet1.public_key(), wallet2.public_key());
    }

    #[test]
    fn test_clone_wallet() {
        let wallet1 = WalletManager::new_random();
        let wallet2 = wallet1.clone();
        assert_eq!(wallet1.public_key(), wallet2.public_key());
    }

    #[test]
    fn test_invalid_json_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not valid json").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(
            WalletManager::from_file(temp_file.path()),
            Err(WalletError::LoadError(_))
        ));
    }
}
