use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolanaClientError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Unknown commitment level: {0}")]
    InvalidCommitment(String),
}

/// Parse "processed" / "confirmed" / "finalized"
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig, SolanaClientError> {
    match level.to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(SolanaClientError::InvalidCommitment(other.to_string())),
    }
}

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl SolanaClient {
    /// Create a new Solana RPC client at `confirmed` commitment
    pub fn new(rpc_url: String) -> Self {
        Self::with_commitment(rpc_url, CommitmentConfig::confirmed())
    }

    pub fn with_commitment(rpc_url: String, commitment: CommitmentConfig) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, commitment));
        Self { client, commitment }
    }

    /// Get SOL balance for a public key
    pub async fn get_balance(&self, pubkey: &str) -> Result<u64, SolanaClientError> {
        let pubkey = Pubkey::from_str(pubkey)
            .map_err(|e| SolanaClientError::InvalidPublicKey(e.to_string()))?;

        // Spawn blocking to make sync RPC call async-compatible
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_balance(&pubkey)
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))?
    }

    /// Send a signed versioned transaction and wait for it to reach the
    /// client's commitment level. Preflight is skipped and the node retries
    /// the broadcast at most twice.
    pub async fn send_and_confirm_versioned(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<String, SolanaClientError> {
        let tx = transaction.clone();
        let client = Arc::clone(&self.client);
        let commitment = self.commitment;

        tokio::task::spawn_blocking(move || {
            let config = RpcSendTransactionConfig {
                skip_preflight: true,
                max_retries: Some(2),
                ..Default::default()
            };

            let signature = client
                .send_transaction_with_config(&tx, config)
                .map_err(|e| SolanaClientError::TransactionError(e.to_string()))?;

            client
                .poll_for_signature_with_commitment(&signature, commitment)
                .map_err(|e| SolanaClientError::RpcError(format!("{} ({})", e, signature)))?;

            match client.get_signature_status_with_commitment(&signature, commitment) {
                Ok(Some(Err(e))) => Err(SolanaClientError::TransactionError(format!(
                    "{} ({})",
                    e, signature
                ))),
                Ok(_) => Ok(signature.to_string()),
                Err(e) => Err(SolanaClientError::RpcError(e.to_string())),
            }
        })
        .await
        .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))?
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }
}
