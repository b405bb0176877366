mod descriptor;
pub use descriptor::{ContractKind, OperationDescriptor};

mod dispatch;

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use splits_evm::MinedTransaction;

use crate::Error;

/// How an operation is carried out. Fixed for the lifetime of a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Sign, submit and wait for inclusion
    #[default]
    Execute,

    /// Simulate and return the gas needed
    EstimateGas,

    /// Return the unsigned payload without touching the network
    BuildCallData,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::EstimateGas => "estimate_gas",
            Self::BuildCallData => "build_call_data",
        }
    }
}

/// Unsigned payload of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallData {
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Contract an operation is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The deployment registered for the operation's contract kind on the client's chain
    Deployment,

    /// A contract instance created by a registered deployment, e.g. a swapper
    Instance(Address),
}

/// Raw result of a dispatch, shaped by the execution mode
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionResult {
    Execute(MinedTransaction),
    EstimateGas(u64),
    BuildCallData(CallData),
}

impl TransactionResult {
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Execute(_) => ExecutionMode::Execute,
            Self::EstimateGas(_) => ExecutionMode::EstimateGas,
            Self::BuildCallData(_) => ExecutionMode::BuildCallData,
        }
    }

    /// Maps a mined transaction into a domain result, other modes pass through
    pub fn into_outcome<T>(self, f: impl FnOnce(MinedTransaction) -> Result<T, Error>) -> Result<Outcome<T>, Error> {
        match self {
            Self::Execute(transaction) => f(transaction).map(Outcome::Executed),
            Self::EstimateGas(gas) => Ok(Outcome::GasEstimate(gas)),
            Self::BuildCallData(call_data) => Ok(Outcome::CallData(call_data)),
        }
    }
}

/// Result of an operation as seen by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Executed(T),
    GasEstimate(u64),
    CallData(CallData),
}

impl<T> Outcome<T> {
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Executed(_) => ExecutionMode::Execute,
            Self::GasEstimate(_) => ExecutionMode::EstimateGas,
            Self::CallData(_) => ExecutionMode::BuildCallData,
        }
    }

    pub fn executed(self) -> Result<T, Error> {
        match self {
            Self::Executed(value) => Ok(value),
            outcome => Err(Self::mismatch(ExecutionMode::Execute, outcome.mode())),
        }
    }

    pub fn gas_estimate(self) -> Result<u64, Error> {
        match self {
            Self::GasEstimate(gas) => Ok(gas),
            outcome => Err(Self::mismatch(ExecutionMode::EstimateGas, outcome.mode())),
        }
    }

    pub fn call_data(self) -> Result<CallData, Error> {
        match self {
            Self::CallData(call_data) => Ok(call_data),
            outcome => Err(Self::mismatch(ExecutionMode::BuildCallData, outcome.mode())),
        }
    }

    fn mismatch(expected: ExecutionMode, actual: ExecutionMode) -> Error {
        Error::InvalidResponse(format!("expected a {} result, got a {} result", expected.as_str(), actual.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes, U256};

    use crate::{CallData, Error, ExecutionMode, Outcome, TransactionResult};

    #[test]
    fn non_executed_results_pass_through_the_mapping() {
        let outcome = TransactionResult::EstimateGas(21_000).into_outcome(|_| Ok(())).unwrap();
        assert_eq!(outcome, Outcome::GasEstimate(21_000));

        let call_data = CallData {
            target: Address::ZERO,
            value: U256::ZERO,
            data: Bytes::new(),
        };
        let outcome = TransactionResult::BuildCallData(call_data.clone()).into_outcome(|_| Ok(())).unwrap();
        assert_eq!(outcome.call_data().unwrap(), call_data);
    }

    #[test]
    fn accessor_of_another_mode_is_an_invalid_response() {
        let outcome: Outcome<()> = Outcome::GasEstimate(1);

        assert_eq!(outcome.mode(), ExecutionMode::EstimateGas);
        assert!(matches!(outcome.clone().executed(), Err(Error::InvalidResponse(_))));
        assert!(matches!(outcome.call_data(), Err(Error::InvalidResponse(_))));
    }
}
