//! Batched Contract Reader - Multicall3 Edition
//!
//! Bundles N independent view calls into one `eth_call` against Multicall3's
//! `aggregate3`. Every call goes out with `allowFailure = true`, so a
//! reverting call only flips its own slot to `success = false`.
//!
//! Callers build a [`CallBatch`], keep the typed [`Slot`] handles it returns
//! and decode each one with the ABI of the call that produced it.

use alloy_primitives::{address, Address, Bytes};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use eyre::{eyre, Result};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::trace;

// ============================================
// MULTICALL3 INTERFACE
// ============================================

sol! {
    /// Multicall3 - deployed at same address on all EVM chains
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls)
            external payable returns (Result[] memory returnData);
    }
}

/// Multicall3 address (same on all EVM chains)
pub const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

// ============================================
// CALLS AND OUTCOMES
// ============================================

/// One encoded call inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub target: Address,
    pub call_data: Bytes,
}

impl Call {
    pub fn new<C: SolCall>(target: Address, call: &C) -> Self {
        Self {
            target,
            call_data: call.abi_encode().into(),
        }
    }
}

/// Raw per-call result as returned by `aggregate3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    pub return_data: Bytes,
}

/// Why a single slot produced no value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The call reverted inside the batch
    Reverted(Bytes),
    /// The call succeeded but the return data did not match the ABI
    Decode(String),
    /// The batch came back shorter than the request
    Missing(usize),
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotError::Reverted(data) if data.is_empty() => write!(f, "reverted"),
            SlotError::Reverted(data) => write!(f, "reverted: 0x{}", hex::encode(data)),
            SlotError::Decode(e) => write!(f, "decode failed: {}", e),
            SlotError::Missing(i) => write!(f, "slot {} missing from batch result", i),
        }
    }
}

impl std::error::Error for SlotError {}

impl CallOutcome {
    /// Decode this slot with the ABI of the call that produced it
    pub fn decode<C: SolCall>(&self) -> Result<C::Return, SlotError> {
        if !self.success {
            return Err(SlotError::Reverted(self.return_data.clone()));
        }
        C::abi_decode_returns(&self.return_data).map_err(|e| SlotError::Decode(e.to_string()))
    }
}

// ============================================
// TYPED BATCH
// ============================================

/// Handle to one call in a [`CallBatch`], typed by the call it was built from
pub struct Slot<C> {
    index: usize,
    _call: PhantomData<fn() -> C>,
}

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Slot<C> {}

impl<C> fmt::Debug for Slot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.index)
    }
}

/// Ordered list of calls for one chain
#[derive(Debug, Default)]
pub struct CallBatch {
    calls: Vec<Call>,
}

impl CallBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a call and get back the slot to decode it from
    pub fn add<C: SolCall>(&mut self, target: Address, call: C) -> Slot<C> {
        let index = self.calls.len();
        self.calls.push(Call::new(target, &call));
        Slot {
            index,
            _call: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn into_calls(self) -> Vec<Call> {
        self.calls
    }
}

/// Outcomes of an executed [`CallBatch`], same order as the calls
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    outcomes: Vec<CallOutcome>,
}

impl BatchResults {
    pub fn new(outcomes: Vec<CallOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcome(&self, index: usize) -> Result<&CallOutcome, SlotError> {
        self.outcomes.get(index).ok_or(SlotError::Missing(index))
    }

    /// Decode one slot; failures stay local to that slot
    pub fn get<C: SolCall>(&self, slot: Slot<C>) -> Result<C::Return, SlotError> {
        self.outcome(slot.index)?.decode::<C>()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}

// ============================================
// AGGREGATE3 CODEC
// ============================================

/// Encode calldata for `aggregate3`, every call with `allowFailure = true`
pub fn encode_aggregate3(calls: &[Call]) -> Bytes {
    let calls = calls
        .iter()
        .map(|c| IMulticall3::Call3 {
            target: c.target,
            allowFailure: true,
            callData: c.call_data.clone(),
        })
        .collect();
    IMulticall3::aggregate3Call { calls }.abi_encode().into()
}

/// Decode `aggregate3` return data, checking it lines up with the request
pub fn decode_aggregate3(data: &[u8], expected: usize) -> Result<Vec<CallOutcome>> {
    let decoded = IMulticall3::aggregate3Call::abi_decode_returns(data)
        .map_err(|e| eyre!("Failed to decode multicall: {}", e))?;

    if decoded.len() != expected {
        return Err(eyre!(
            "Multicall3 returned {} results for {} calls",
            decoded.len(),
            expected
        ));
    }

    Ok(decoded
        .into_iter()
        .map(|r| CallOutcome {
            success: r.success,
            return_data: r.returnData,
        })
        .collect())
}

// ============================================
// CHAIN READER
// ============================================

/// Read-only access to one chain
#[allow(async_fn_in_trait)]
pub trait ChainReader {
    /// Plain `eth_call`
    async fn call(&self, target: Address, call_data: Bytes) -> Result<Bytes>;

    /// Single typed call outside of any batch
    async fn read<C: SolCall>(&self, target: Address, call: C) -> Result<C::Return> {
        let data = self.call(target, call.abi_encode().into()).await?;
        C::abi_decode_returns(&data)
            .map_err(|e| eyre!("Failed to decode {} from {}: {}", C::SIGNATURE, target, e))
    }

    /// Execute a batch in exactly one round trip through Multicall3
    async fn execute(&self, batch: CallBatch) -> Result<BatchResults> {
        if batch.is_empty() {
            return Ok(BatchResults::default());
        }

        let expected = batch.len();
        let calls = batch.into_calls();
        let data = self.call(MULTICALL3, encode_aggregate3(&calls)).await?;
        let results = BatchResults::new(decode_aggregate3(&data, expected)?);

        trace!(
            "Multicall3: {} calls, {} failed",
            results.len(),
            results.failed_count()
        );

        Ok(results)
    }
}

/// [`ChainReader`] backed by a JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcReader {
    rpc_url: String,
    timeout: Duration,
}

impl RpcReader {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            timeout,
        }
    }
}

impl ChainReader for RpcReader {
    async fn call(&self, target: Address, call_data: Bytes) -> Result<Bytes> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.parse()?);

        let tx = TransactionRequest::default().to(target).input(call_data.into());

        tokio::time::timeout(self.timeout, provider.call(tx))
            .await
            .map_err(|_| eyre!("eth_call to {} timed out after {:?}", target, self.timeout))?
            .map_err(|e| eyre!("eth_call to {} failed: {}", target, e))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeChain;
    use super::*;
    use alloy_primitives::U256;

    sol! {
        interface IToken {
            function decimals() external view returns (uint8);
            function totalSupply() external view returns (uint256);
            function symbol() external view returns (string memory);
        }
    }

    const TOKEN_A: Address = address!("1111111111111111111111111111111111111111");
    const TOKEN_B: Address = address!("2222222222222222222222222222222222222222");

    #[test]
    fn test_slots_follow_insertion_order() {
        let mut batch = CallBatch::new();
        let a = batch.add(TOKEN_A, IToken::decimalsCall {});
        let b = batch.add(TOKEN_B, IToken::totalSupplyCall {});
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 1);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_decode_aggregate3_length_mismatch() {
        let results = vec![IMulticall3::Result {
            success: true,
            returnData: Bytes::new(),
        }];
        let data = IMulticall3::aggregate3Call::abi_encode_returns(&results);
        assert!(decode_aggregate3(&data, 1).is_ok());
        assert!(decode_aggregate3(&data, 2).is_err());
    }

    #[test]
    fn test_failed_outcome_is_reverted_slot() {
        let outcome = CallOutcome {
            success: false,
            return_data: Bytes::from(vec![0xde, 0xad]),
        };
        let err = outcome.decode::<IToken::decimalsCall>().unwrap_err();
        assert_eq!(err, SlotError::Reverted(Bytes::from(vec![0xde, 0xad])));
        assert_eq!(err.to_string(), "reverted: 0xdead");
    }

    #[test]
    fn test_garbage_return_is_decode_error() {
        let outcome = CallOutcome {
            success: true,
            return_data: Bytes::from(vec![0x01]),
        };
        assert!(matches!(
            outcome.decode::<IToken::totalSupplyCall>(),
            Err(SlotError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_reverting_call_is_isolated() {
        let mut chain = FakeChain::new();
        chain.respond(TOKEN_A, IToken::decimalsCall {}, 6u8);
        chain.revert(TOKEN_A, IToken::totalSupplyCall {}, b"nope");
        chain.respond(TOKEN_B, IToken::symbolCall {}, "USDC".to_string());

        let mut batch = CallBatch::new();
        let decimals = batch.add(TOKEN_A, IToken::decimalsCall {});
        let supply = batch.add(TOKEN_A, IToken::totalSupplyCall {});
        let symbol = batch.add(TOKEN_B, IToken::symbolCall {});

        let results = chain.execute(batch).await.unwrap();

        assert_eq!(chain.round_trips.get(), 1);
        assert_eq!(results.len(), 3);
        assert_eq!(results.failed_count(), 1);
        assert_eq!(results.get(decimals).unwrap(), 6u8);
        assert!(matches!(results.get(supply), Err(SlotError::Reverted(_))));
        assert_eq!(results.get(symbol).unwrap(), "USDC");
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let chain = FakeChain::unreachable();
        let results = chain.execute(CallBatch::new()).await.unwrap();
        assert_eq!(results.len(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_chain_fails_whole_batch() {
        let chain = FakeChain::unreachable();
        let mut batch = CallBatch::new();
        batch.add(TOKEN_A, IToken::decimalsCall {});
        assert!(chain.execute(batch).await.is_err());
    }

    #[tokio::test]
    async fn test_single_read() {
        let mut chain = FakeChain::new();
        chain.respond(TOKEN_B, IToken::totalSupplyCall {}, U256::from(42u64));
        let supply = chain.read(TOKEN_B, IToken::totalSupplyCall {}).await.unwrap();
        assert_eq!(supply, U256::from(42u64));
        assert!(chain.read(TOKEN_A, IToken::totalSupplyCall {}).await.is_err());
    }
}
