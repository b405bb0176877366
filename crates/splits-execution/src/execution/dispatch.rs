use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use splits_common::{measure_duration, metric};
use splits_evm::{CallRequest, MinedTransaction, Signer, Transport};
use tracing::{debug, info, instrument};

use crate::{CallData, Client, Error, ExecutionMode, OperationDescriptor, Target, TransactionResult};

impl Client {
    /// Sends `call` to `target` according to `mode`.
    ///
    /// Preconditions are checked in order, before any network access: a transport must be
    /// configured, a signer must be configured when executing, and the target must be supported
    /// on the client's chain. Every mode encodes `call` the same way, so the estimated, built and
    /// submitted payloads are identical.
    #[instrument(name = "dispatch", skip_all, fields(operation = descriptor.name, chain_id = %self.chain_id, mode = mode.as_str()))]
    pub async fn dispatch<C: SolCall>(
        &self,
        descriptor: &OperationDescriptor,
        target: Target,
        call: &C,
        value: U256,
        mode: ExecutionMode,
    ) -> Result<TransactionResult, Error> {
        let transport = self.transport()?;
        let signer = match mode {
            ExecutionMode::Execute => Some(self.signer()?),
            _ => None,
        };

        let target = self.resolve_target(descriptor, target)?;
        let request = CallRequest::new(target, value, call.abi_encode().into());
        debug!(target = %target, parameters = ?descriptor.parameters, "dispatching operation");

        metric!(counter [ splits_dispatch ] = 1, operation = descriptor.name, mode = mode.as_str());
        // A signer is only resolved in execute mode
        let (result, duration) = measure_duration!(match (signer, mode) {
            (Some(signer), _) => self.execute(transport, signer, request).await.map(TransactionResult::Execute),
            (None, ExecutionMode::EstimateGas) => self.estimate(transport, request).await.map(TransactionResult::EstimateGas),
            (None, _) => Ok(TransactionResult::BuildCallData(CallData {
                target: request.to,
                value: request.value,
                data: request.data,
            })),
        });

        metric!(histogram [ splits_dispatch_duration_milliseconds ] = duration.as_millis(), operation = descriptor.name, mode = mode.as_str());
        metric!(on error result => counter [ splits_dispatch_error ] = 1, operation = descriptor.name, mode = mode.as_str());

        result
    }

    /// Queries `target` with `call` and decodes the returned value. Only requires a transport.
    #[instrument(name = "read", skip_all, fields(operation = descriptor.name, chain_id = %self.chain_id))]
    pub async fn read<C: SolCall>(&self, descriptor: &OperationDescriptor, target: Target, call: &C) -> Result<C::Return, Error> {
        let transport = self.transport()?;
        let target = self.resolve_target(descriptor, target)?;
        let request = CallRequest::new(target, U256::ZERO, call.abi_encode().into());

        let (result, duration) = measure_duration!(transport.call(&request).await);
        metric!(histogram [ splits_read_duration_milliseconds ] = duration.as_millis(), operation = descriptor.name);
        metric!(on error result => counter [ splits_read_error ] = 1, operation = descriptor.name);

        C::abi_decode_returns(&result?).map_err(|e| Error::InvalidResponse(format!("could not decode {} result: {}", descriptor.name, e)))
    }

    fn transport(&self) -> Result<&Arc<dyn Transport>, Error> {
        self.transport.as_ref().ok_or(Error::MissingProvider)
    }

    fn signer(&self) -> Result<&Arc<dyn Signer>, Error> {
        self.signer.as_ref().ok_or(Error::MissingSigner)
    }

    fn resolve_target(&self, descriptor: &OperationDescriptor, target: Target) -> Result<Address, Error> {
        match target {
            Target::Deployment => self.registry.resolve_address(self.chain_id, descriptor.contract),
            Target::Instance(address) => {
                self.registry.assert_supported(self.chain_id, descriptor.contract)?;
                Ok(address)
            },
        }
    }

    async fn estimate(&self, transport: &Arc<dyn Transport>, request: CallRequest) -> Result<u64, Error> {
        // Access control depends on the sender, simulate as the signer when there is one
        let request = match &self.signer {
            Some(signer) => request.with_from(signer.address()),
            None => request,
        };

        Ok(transport.estimate_gas(&request).await?)
    }

    async fn execute(&self, transport: &Arc<dyn Transport>, signer: &Arc<dyn Signer>, request: CallRequest) -> Result<MinedTransaction, Error> {
        let request = request.with_from(signer.address());

        let transaction = transport.fill_transaction(&request).await?;
        let raw = signer.sign_transaction(transaction).await?;
        let hash = transport.send_raw_transaction(&raw).await?;
        info!(transaction_hash = %hash, "transaction submitted");

        let mined = transport.wait_for_transaction(hash).await?;
        info!(transaction_hash = %hash, block_number = ?mined.block_number, success = mined.success, "transaction mined");

        Ok(mined)
    }
}
