//! Jupiter Adapter
//!
//! Price quotes, token decimals and swap execution through the Jupiter
//! DEX aggregator.

mod client;
mod executor;
mod quote;
mod swap;
mod token;

pub use client::{JupiterClient, JupiterConfig, JupiterError};
pub use executor::{decode_swap_transaction, JupiterSwapExecutor};
pub use quote::{QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo};
pub use swap::{SwapRequest, SwapResponse};
pub use token::TokenInfo;
