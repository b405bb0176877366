use alloy::primitives::{TxHash, B256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use splits_evm::MinedTransaction;

use crate::{Error, OperationDescriptor};

/// Decoded protocol event together with the log it comes from
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub data: E,
    pub log: Log,
}

impl<E> Event<E> {
    pub fn block_number(&self) -> Option<u64> {
        self.log.block_number
    }

    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.log.transaction_hash
    }
}

/// Finds the protocol event emitted by a mined transaction
pub struct EventExtractor;

impl EventExtractor {
    /// Returns the first log matching a candidate topic. Candidates are tried in order, so an
    /// earlier candidate wins over a later one even if its log comes after.
    pub fn find<'a>(transaction: &'a MinedTransaction, candidates: &[B256]) -> Option<&'a Log> {
        candidates
            .iter()
            .find_map(|topic| transaction.logs.iter().find(|log| log.topics().first() == Some(topic)))
    }

    /// Same as [`EventExtractor::find`] and decodes the matching log as `E`
    pub fn extract<E: SolEvent>(transaction: &MinedTransaction, candidates: &[B256]) -> Result<Option<Event<E>>, Error> {
        let Some(log) = Self::find(transaction, candidates) else {
            return Ok(None);
        };

        let data = E::decode_log_data(&log.inner.data).map_err(|e| Error::InvalidResponse(format!("could not decode {} event: {}", E::SIGNATURE, e)))?;

        Ok(Some(Event { data, log: log.clone() }))
    }

    /// Decodes the event proving that `descriptor` succeeded. A reverted transaction or a missing
    /// event means the operation failed.
    pub fn expect<E: SolEvent>(transaction: &MinedTransaction, descriptor: &OperationDescriptor) -> Result<Event<E>, Error> {
        if !transaction.success {
            return Err(Error::TransactionFailed {
                hash: transaction.transaction_hash,
                reason: format!("{} reverted", descriptor.name),
            });
        }

        Self::extract(transaction, descriptor.events)?.ok_or_else(|| Error::TransactionFailed {
            hash: transaction.transaction_hash,
            reason: format!("{} emitted no expected event", descriptor.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address, B256};
    use alloy::sol_types::SolEvent;
    use splits_evm::contract::ISwapper;
    use splits_evm::testing::InMemoryTransport;
    use splits_evm::MinedTransaction;

    use crate::events::EventExtractor;
    use crate::{ContractKind, Error, OperationDescriptor};

    const SWAPPER: Address = address!("00000000000000000000000000000000000000aa");

    const SET_PAUSED: OperationDescriptor = OperationDescriptor {
        name: "setPaused",
        contract: ContractKind::Swapper,
        parameters: &["paused"],
        events: &[ISwapper::SetPaused::SIGNATURE_HASH],
    };

    fn mined(logs: Vec<alloy::rpc::types::Log>, success: bool) -> MinedTransaction {
        MinedTransaction {
            transaction_hash: B256::with_last_byte(7),
            block_hash: None,
            block_number: Some(12),
            gas_used: 50_000,
            success,
            logs: logs.into_iter().map(|log| alloy::rpc::types::Log { block_number: Some(12), ..log }).collect(),
        }
    }

    #[test]
    fn first_candidate_wins_over_log_order() {
        let transaction = mined(
            vec![
                InMemoryTransport::log(SWAPPER, &ISwapper::SetBeneficiary { beneficiary: Address::ZERO }),
                InMemoryTransport::log(SWAPPER, &ISwapper::SetPaused { paused: false }),
                InMemoryTransport::log(SWAPPER, &ISwapper::SetPaused { paused: true }),
            ],
            true,
        );

        let candidates = [ISwapper::SetPaused::SIGNATURE_HASH, ISwapper::SetBeneficiary::SIGNATURE_HASH];
        let log = EventExtractor::find(&transaction, &candidates).unwrap();
        assert_eq!(log.topics()[0], ISwapper::SetPaused::SIGNATURE_HASH);

        let event = EventExtractor::extract::<ISwapper::SetPaused>(&transaction, &candidates).unwrap().unwrap();
        assert!(!event.data.paused);
        assert_eq!(event.block_number(), Some(12));
    }

    #[test]
    fn unrelated_logs_are_ignored() {
        let transaction = mined(vec![InMemoryTransport::log(SWAPPER, &ISwapper::SetPaused { paused: true })], true);

        let result = EventExtractor::extract::<ISwapper::SetBeneficiary>(&transaction, &[ISwapper::SetBeneficiary::SIGNATURE_HASH]);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn missing_event_fails_the_transaction() {
        let transaction = mined(vec![], true);

        let result = EventExtractor::expect::<ISwapper::SetPaused>(&transaction, &SET_PAUSED);
        assert!(matches!(result, Err(Error::TransactionFailed { hash, .. }) if hash == B256::with_last_byte(7)));
    }

    #[test]
    fn reverted_receipt_fails_the_transaction() {
        let transaction = mined(vec![InMemoryTransport::log(SWAPPER, &ISwapper::SetPaused { paused: true })], false);

        assert!(matches!(
            EventExtractor::expect::<ISwapper::SetPaused>(&transaction, &SET_PAUSED),
            Err(Error::TransactionFailed { .. })
        ));
    }

    #[test]
    fn matching_log_that_does_not_decode_is_an_invalid_response() {
        let mut log = InMemoryTransport::log(SWAPPER, &ISwapper::SetPaused { paused: true });
        log.inner.data = alloy::primitives::LogData::new_unchecked(vec![ISwapper::SetPaused::SIGNATURE_HASH], vec![1u8, 2].into());
        let transaction = mined(vec![log], true);

        let result = EventExtractor::expect::<ISwapper::SetPaused>(&transaction, &SET_PAUSED);
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }
}
