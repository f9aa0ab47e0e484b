pub mod rpc;
pub mod wallet;

pub use rpc::{parse_commitment, SolanaClient, SolanaClientError};
pub use wallet::{WalletError, WalletManager};
