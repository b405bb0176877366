mod descriptors;
use descriptors::*;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use splits_evm::contract::{ISwapper, ISwapperFactory};
use splits_evm::math::scaled_offer_factor_to_discount;
use splits_evm::MinedTransaction;
use splits_execution::events::{Event, EventExtractor};
use splits_execution::{Client, Error, ExecutionMode, OperationDescriptor, Outcome, Target};
use tracing::instrument;

use crate::format::{format_create_swapper, format_quote_pair, format_scaled_offer_factor, format_scaled_offer_factor_overrides, format_swapper_calls};
use crate::types::{CreateSwapperConfig, QuotePairConfig, ScaledOfferFactorOverride, SwapperCallConfig};
use crate::validation::{
    validate_address, validate_create_swapper, validate_quote_pairs, validate_scaled_offer_factor, validate_scaled_offer_factor_overrides, validate_swapper_calls,
};

/// Discount applied to a pair, as read back from the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairScaledOfferFactor {
    pub base_token: Address,
    pub quote_token: Address,
    pub scaled_offer_factor_percent: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSwapperResult {
    pub swapper: Address,
    pub event: Event<ISwapperFactory::CreateSwapper>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetBeneficiaryResult {
    pub beneficiary: Address,
    pub event: Event<ISwapper::SetBeneficiary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetTokenToBeneficiaryResult {
    pub token_to_beneficiary: Address,
    pub event: Event<ISwapper::SetTokenToBeneficiary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOracleResult {
    pub oracle: Address,
    pub event: Event<ISwapper::SetOracle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetDefaultScaledOfferFactorResult {
    /// Discount percent
    pub default_scaled_offer_factor: BigDecimal,
    pub event: Event<ISwapper::SetDefaultScaledOfferFactor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetScaledOfferFactorOverridesResult {
    pub overrides: Vec<PairScaledOfferFactor>,
    pub event: Event<ISwapper::SetPairScaledOfferFactors>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetPausedResult {
    pub paused: bool,
    pub event: Event<ISwapper::SetPaused>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecCallsResult {
    pub event: Event<ISwapper::ExecCalls>,
}

/// Creates swappers through the factory and drives existing ones on behalf of their owner
#[derive(Clone)]
pub struct SwapperClient {
    client: Client,
    mode: ExecutionMode,
}

impl SwapperClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            mode: ExecutionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    #[instrument(name = "create_swapper", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn create_swapper(&self, config: &CreateSwapperConfig) -> Result<Outcome<CreateSwapperResult>, Error> {
        let parameters = validate_create_swapper(config)?;
        let call = ISwapperFactory::createSwapperCall {
            params: format_create_swapper(&parameters),
        };

        self.submit(&CREATE_SWAPPER, Target::Deployment, &call, U256::ZERO, |transaction| {
            let event = EventExtractor::expect::<ISwapperFactory::CreateSwapper>(&transaction, &CREATE_SWAPPER)?;
            Ok(CreateSwapperResult {
                swapper: event.data.swapper,
                event,
            })
        })
        .await
    }

    #[instrument(name = "set_beneficiary", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn set_beneficiary(&self, swapper: &str, beneficiary: &str) -> Result<Outcome<SetBeneficiaryResult>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let call = ISwapper::setBeneficiaryCall {
            beneficiary: validate_address("beneficiary", beneficiary)?,
        };

        self.submit(&SET_BENEFICIARY, Target::Instance(swapper), &call, U256::ZERO, |transaction| {
            let event = EventExtractor::expect::<ISwapper::SetBeneficiary>(&transaction, &SET_BENEFICIARY)?;
            Ok(SetBeneficiaryResult {
                beneficiary: event.data.beneficiary,
                event,
            })
        })
        .await
    }

    #[instrument(name = "set_token_to_beneficiary", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn set_token_to_beneficiary(&self, swapper: &str, token: &str) -> Result<Outcome<SetTokenToBeneficiaryResult>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let call = ISwapper::setTokenToBeneficiaryCall {
            tokenToBeneficiary: validate_address("token_to_beneficiary", token)?,
        };

        self.submit(&SET_TOKEN_TO_BENEFICIARY, Target::Instance(swapper), &call, U256::ZERO, |transaction| {
            let event = EventExtractor::expect::<ISwapper::SetTokenToBeneficiary>(&transaction, &SET_TOKEN_TO_BENEFICIARY)?;
            Ok(SetTokenToBeneficiaryResult {
                token_to_beneficiary: event.data.tokenToBeneficiary,
                event,
            })
        })
        .await
    }

    /// Points the swapper to an already deployed oracle
    #[instrument(name = "set_oracle", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn set_oracle(&self, swapper: &str, oracle: &str) -> Result<Outcome<SetOracleResult>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let oracle = validate_address("oracle", oracle)?;
        if oracle.is_zero() {
            return Err(Error::validation("oracle", "oracle cannot be the zero address"));
        }

        let call = ISwapper::setOracleCall { oracle };
        self.submit(&SET_ORACLE, Target::Instance(swapper), &call, U256::ZERO, |transaction| {
            let event = EventExtractor::expect::<ISwapper::SetOracle>(&transaction, &SET_ORACLE)?;
            Ok(SetOracleResult {
                oracle: event.data.oracle,
                event,
            })
        })
        .await
    }

    #[instrument(name = "set_default_scaled_offer_factor", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn set_default_scaled_offer_factor(&self, swapper: &str, percent: &BigDecimal) -> Result<Outcome<SetDefaultScaledOfferFactorResult>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let discount = validate_scaled_offer_factor("default_scaled_offer_factor_percent", percent)?;
        let call = ISwapper::setDefaultScaledOfferFactorCall {
            defaultScaledOfferFactor: format_scaled_offer_factor(discount),
        };

        self.submit(&SET_DEFAULT_SCALED_OFFER_FACTOR, Target::Instance(swapper), &call, U256::ZERO, |transaction| {
            let event = EventExtractor::expect::<ISwapper::SetDefaultScaledOfferFactor>(&transaction, &SET_DEFAULT_SCALED_OFFER_FACTOR)?;
            Ok(SetDefaultScaledOfferFactorResult {
                default_scaled_offer_factor: scaled_offer_factor_to_discount(event.data.defaultScaledOfferFactor),
                event,
            })
        })
        .await
    }

    /// A discount of 100% clears the override of its pair on-chain
    #[instrument(name = "set_scaled_offer_factor_overrides", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn set_scaled_offer_factor_overrides(
        &self,
        swapper: &str,
        overrides: &[ScaledOfferFactorOverride],
    ) -> Result<Outcome<SetScaledOfferFactorOverridesResult>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        if overrides.is_empty() {
            return Err(Error::validation("scaled_offer_factor_overrides", "at least one override is required"));
        }

        let overrides = validate_scaled_offer_factor_overrides("scaled_offer_factor_overrides", overrides)?;
        let call = ISwapper::setPairScaledOfferFactorsCall {
            params: format_scaled_offer_factor_overrides(&overrides),
        };

        self.submit(&SET_PAIR_SCALED_OFFER_FACTORS, Target::Instance(swapper), &call, U256::ZERO, |transaction| {
            let event = EventExtractor::expect::<ISwapper::SetPairScaledOfferFactors>(&transaction, &SET_PAIR_SCALED_OFFER_FACTORS)?;
            let overrides = event
                .data
                .params
                .iter()
                .map(|value| PairScaledOfferFactor {
                    base_token: value.quotePair.base,
                    quote_token: value.quotePair.quote,
                    scaled_offer_factor_percent: scaled_offer_factor_to_discount(value.scaledOfferFactor),
                })
                .collect();

            Ok(SetScaledOfferFactorOverridesResult { overrides, event })
        })
        .await
    }

    #[instrument(name = "set_paused", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn set_paused(&self, swapper: &str, paused: bool) -> Result<Outcome<SetPausedResult>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let call = ISwapper::setPausedCall { paused };

        self.submit(&SET_PAUSED, Target::Instance(swapper), &call, U256::ZERO, |transaction| {
            let event = EventExtractor::expect::<ISwapper::SetPaused>(&transaction, &SET_PAUSED)?;
            Ok(SetPausedResult {
                paused: event.data.paused,
                event,
            })
        })
        .await
    }

    /// Makes the swapper perform `calls`. The transaction carries the sum of their values.
    #[instrument(name = "exec_calls", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn exec_calls(&self, swapper: &str, calls: &[SwapperCallConfig]) -> Result<Outcome<ExecCallsResult>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let (calls, value) = validate_swapper_calls("calls", calls)?;
        let call = ISwapper::execCallsCall {
            calls: format_swapper_calls(&calls),
        };

        self.submit(&EXEC_CALLS, Target::Instance(swapper), &call, value, |transaction| {
            let event = EventExtractor::expect::<ISwapper::ExecCalls>(&transaction, &EXEC_CALLS)?;
            Ok(ExecCallsResult { event })
        })
        .await
    }

    pub async fn get_owner(&self, swapper: &str) -> Result<Address, Error> {
        let swapper = validate_address("swapper", swapper)?;
        self.client.read(&OWNER, Target::Instance(swapper), &ISwapper::ownerCall {}).await
    }

    pub async fn get_paused(&self, swapper: &str) -> Result<bool, Error> {
        let swapper = validate_address("swapper", swapper)?;
        self.client.read(&PAUSED, Target::Instance(swapper), &ISwapper::pausedCall {}).await
    }

    pub async fn get_beneficiary(&self, swapper: &str) -> Result<Address, Error> {
        let swapper = validate_address("swapper", swapper)?;
        self.client.read(&BENEFICIARY, Target::Instance(swapper), &ISwapper::beneficiaryCall {}).await
    }

    pub async fn get_token_to_beneficiary(&self, swapper: &str) -> Result<Address, Error> {
        let swapper = validate_address("swapper", swapper)?;
        self.client
            .read(&TOKEN_TO_BENEFICIARY, Target::Instance(swapper), &ISwapper::tokenToBeneficiaryCall {})
            .await
    }

    pub async fn get_oracle(&self, swapper: &str) -> Result<Address, Error> {
        let swapper = validate_address("swapper", swapper)?;
        self.client.read(&ORACLE, Target::Instance(swapper), &ISwapper::oracleCall {}).await
    }

    /// Returns the default discount percent. Premiums are negative discounts.
    pub async fn get_default_scaled_offer_factor(&self, swapper: &str) -> Result<BigDecimal, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let factor = self
            .client
            .read(&DEFAULT_SCALED_OFFER_FACTOR, Target::Instance(swapper), &ISwapper::defaultScaledOfferFactorCall {})
            .await?;

        Ok(scaled_offer_factor_to_discount(factor))
    }

    /// Returns the overrides of `pairs`, in order. Pairs without an override are left out.
    pub async fn get_scaled_offer_factor_overrides(&self, swapper: &str, pairs: &[QuotePairConfig]) -> Result<Vec<PairScaledOfferFactor>, Error> {
        let swapper = validate_address("swapper", swapper)?;
        let pairs = validate_quote_pairs("pairs", pairs)?;
        let call = ISwapper::getPairScaledOfferFactorsCall {
            quotePairs: pairs.iter().map(format_quote_pair).collect(),
        };

        let factors = self.client.read(&GET_PAIR_SCALED_OFFER_FACTORS, Target::Instance(swapper), &call).await?;
        if factors.len() != pairs.len() {
            return Err(Error::InvalidResponse(format!("expected {} scaled offer factors, got {}", pairs.len(), factors.len())));
        }

        Ok(pairs
            .iter()
            .zip(factors)
            .filter(|(_, factor)| *factor != 0)
            .map(|(pair, factor)| PairScaledOfferFactor {
                base_token: pair.base,
                quote_token: pair.quote,
                scaled_offer_factor_percent: scaled_offer_factor_to_discount(factor),
            })
            .collect())
    }

    async fn submit<C: SolCall, T>(
        &self,
        descriptor: &OperationDescriptor,
        target: Target,
        call: &C,
        value: U256,
        map: impl FnOnce(MinedTransaction) -> Result<T, Error>,
    ) -> Result<Outcome<T>, Error> {
        self.client.dispatch(descriptor, target, call, value, self.mode).await?.into_outcome(map)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::{address, Address, Bytes, U256};
    use alloy::sol_types::{SolCall, SolValue};
    use bigdecimal::BigDecimal;
    use splits_evm::contract::{self, ISwapper, ISwapperFactory};
    use splits_evm::testing::{InMemoryTransport, RecordedRequest};
    use splits_execution::testing::TestEnvironment;
    use splits_execution::{Error, ExecutionMode};

    use crate::swapper::SwapperClient;
    use crate::types::{CreateSwapperConfig, OracleConfig, QuotePairConfig, ScaledOfferFactorOverride, SwapperCallConfig};

    const OWNER: Address = address!("00000000000000000000000000000000000000a1");
    const BENEFICIARY: Address = address!("00000000000000000000000000000000000000b0");
    const WETH: Address = address!("00000000000000000000000000000000000000e7");
    const USDC: Address = address!("00000000000000000000000000000000000000c0");
    const ORACLE: Address = address!("00000000000000000000000000000000000000d0");
    const SWAPPER: Address = address!("00000000000000000000000000000000000000aa");

    fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn config() -> CreateSwapperConfig {
        CreateSwapperConfig {
            owner: OWNER.to_string(),
            paused: false,
            beneficiary: BENEFICIARY.to_string(),
            token_to_beneficiary: WETH.to_string(),
            oracle: OracleConfig::Existing { address: ORACLE.to_string() },
            default_scaled_offer_factor_percent: decimal("1"),
            scaled_offer_factor_overrides: vec![ScaledOfferFactorOverride {
                base_token: USDC.to_string(),
                quote_token: WETH.to_string(),
                scaled_offer_factor_percent: decimal("0.5"),
            }],
        }
    }

    fn encoded_params() -> contract::CreateSwapperParams {
        contract::CreateSwapperParams {
            owner: OWNER,
            paused: false,
            beneficiary: BENEFICIARY,
            tokenToBeneficiary: WETH,
            oracleParams: contract::OracleParams {
                oracle: ORACLE,
                createOracleParams: contract::CreateOracleParams {
                    factory: Address::ZERO,
                    data: Bytes::new(),
                },
            },
            defaultScaledOfferFactor: 990_000,
            pairScaledOfferFactors: vec![contract::SetPairScaledOfferFactorParams {
                quotePair: contract::QuotePair { base: USDC, quote: WETH },
                scaledOfferFactor: 995_000,
            }],
        }
    }

    fn created_swapper_log() -> alloy::rpc::types::Log {
        InMemoryTransport::log(
            TestEnvironment::SWAPPER_FACTORY,
            &ISwapperFactory::CreateSwapper {
                swapper: SWAPPER,
                params: encoded_params(),
            },
        )
    }

    #[tokio::test]
    async fn create_swapper_submits_the_encoded_tuple_and_returns_the_event() {
        let environment = TestEnvironment::with_transport(InMemoryTransport::default().with_logs(vec![created_swapper_log()]));
        let client = SwapperClient::new(environment.client());

        let result = client.create_swapper(&config()).await.unwrap().executed().unwrap();

        assert_eq!(result.swapper, SWAPPER);
        assert_eq!(result.event.data.params, encoded_params());
        assert_eq!(result.event.block_number(), Some(InMemoryTransport::BLOCK_NUMBER));

        let submitted = environment
            .transport
            .requests()
            .into_iter()
            .find_map(|request| match request {
                RecordedRequest::FillTransaction(request) => Some(request),
                _ => None,
            })
            .unwrap();

        assert_eq!(submitted.to, TestEnvironment::SWAPPER_FACTORY);
        assert_eq!(submitted.from, Some(environment.signer_address()));

        let params = ISwapperFactory::createSwapperCall::abi_decode(&submitted.data).unwrap().params;
        assert_eq!(params.owner, OWNER);
        assert!(!params.paused);
        assert_eq!(params.beneficiary, BENEFICIARY);
        assert_eq!(params.tokenToBeneficiary, WETH);
        assert_eq!(params, encoded_params());
    }

    #[tokio::test]
    async fn create_swapper_on_an_unsupported_chain_never_reaches_the_transport() {
        let environment = TestEnvironment::with_transport(InMemoryTransport::default().with_logs(vec![created_swapper_log()]));
        let client = SwapperClient::new(environment.client().with_chain(TestEnvironment::UNSUPPORTED_CHAIN_ID));

        let result = client.create_swapper(&config()).await;

        assert!(matches!(result, Err(Error::UnsupportedChain { chain_id, .. }) if chain_id == TestEnvironment::UNSUPPORTED_CHAIN_ID));
        assert!(environment.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn build_call_data_targets_the_factory_without_traffic() {
        let environment = TestEnvironment::new();
        let client = SwapperClient::new(environment.client_without_signer()).with_mode(ExecutionMode::BuildCallData);

        let call_data = client.create_swapper(&config()).await.unwrap().call_data().unwrap();

        assert_eq!(call_data.target, TestEnvironment::SWAPPER_FACTORY);
        assert_eq!(call_data.value, U256::ZERO);
        assert_eq!(
            call_data.data.as_ref(),
            ISwapperFactory::createSwapperCall { params: encoded_params() }.abi_encode().as_slice()
        );
        assert!(environment.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn estimate_gas_returns_the_simulated_gas() {
        let environment = TestEnvironment::new();
        let client = SwapperClient::new(environment.client()).with_mode(ExecutionMode::EstimateGas);

        let gas = client.set_paused(&SWAPPER.to_string(), true).await.unwrap().gas_estimate().unwrap();

        assert_eq!(gas, InMemoryTransport::GAS_ESTIMATE);
        assert!(matches!(environment.transport.requests()[..], [RecordedRequest::EstimateGas(_)]));
    }

    #[tokio::test]
    async fn invalid_arguments_are_reported_before_the_missing_provider() {
        let environment = TestEnvironment::new();
        let client = SwapperClient::new(environment.client_without_transport());

        let mut invalid = config();
        invalid.default_scaled_offer_factor_percent = decimal("101");
        assert!(matches!(
            client.create_swapper(&invalid).await,
            Err(Error::Validation { ref field, .. }) if field == "default_scaled_offer_factor_percent"
        ));

        assert!(matches!(client.create_swapper(&config()).await, Err(Error::MissingProvider)));
    }

    #[tokio::test]
    async fn missing_event_fails_the_operation() {
        let environment = TestEnvironment::new();
        let client = SwapperClient::new(environment.client());

        let result = client.set_paused(&SWAPPER.to_string(), true).await;

        assert!(matches!(result, Err(Error::TransactionFailed { .. })));
        assert_eq!(environment.transport.submitted_transactions().len(), 1);
    }

    #[tokio::test]
    async fn set_default_scaled_offer_factor_reports_the_discount() {
        let log = InMemoryTransport::log(SWAPPER, &ISwapper::SetDefaultScaledOfferFactor { defaultScaledOfferFactor: 987_500 });
        let environment = TestEnvironment::with_transport(InMemoryTransport::default().with_logs(vec![log]));
        let client = SwapperClient::new(environment.client());

        let result = client
            .set_default_scaled_offer_factor(&SWAPPER.to_string(), &decimal("1.25"))
            .await
            .unwrap()
            .executed()
            .unwrap();

        assert_eq!(result.default_scaled_offer_factor, decimal("1.25"));
        assert_eq!(result.event.log.inner.address, SWAPPER);
    }

    #[tokio::test]
    async fn exec_calls_carries_the_total_value() {
        let environment = TestEnvironment::new();
        let client = SwapperClient::new(environment.client_without_signer()).with_mode(ExecutionMode::BuildCallData);

        let calls = [
            SwapperCallConfig {
                to: WETH.to_string(),
                value: U256::from(3),
                data: Bytes::new(),
            },
            SwapperCallConfig {
                to: USDC.to_string(),
                value: U256::from(4),
                data: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
            },
        ];

        let call_data = client.exec_calls(&SWAPPER.to_string(), &calls).await.unwrap().call_data().unwrap();

        assert_eq!(call_data.target, SWAPPER);
        assert_eq!(call_data.value, U256::from(7));
        assert_eq!(ISwapper::execCallsCall::abi_decode(&call_data.data).unwrap().calls.len(), 2);
    }

    #[tokio::test]
    async fn set_oracle_rejects_the_zero_address() {
        let client = SwapperClient::new(TestEnvironment::new().client());

        let result = client.set_oracle(&SWAPPER.to_string(), &Address::ZERO.to_string()).await;

        assert!(matches!(result, Err(Error::Validation { ref field, .. }) if field == "oracle"));
    }

    #[tokio::test]
    async fn reads_only_need_a_transport() {
        let transport = InMemoryTransport::default()
            .with_response(ISwapper::ownerCall::SELECTOR, OWNER.abi_encode())
            .with_response(ISwapper::pausedCall::SELECTOR, true.abi_encode())
            .with_response(ISwapper::defaultScaledOfferFactorCall::SELECTOR, 990_000u32.abi_encode())
            .with_response(ISwapper::getPairScaledOfferFactorsCall::SELECTOR, vec![1_010_000u32, 0].abi_encode());
        let environment = TestEnvironment::with_transport(transport);
        let client = SwapperClient::new(environment.client_without_signer()).with_mode(ExecutionMode::BuildCallData);
        let swapper = SWAPPER.to_string();

        assert_eq!(client.get_owner(&swapper).await.unwrap(), OWNER);
        assert!(client.get_paused(&swapper).await.unwrap());
        assert_eq!(client.get_default_scaled_offer_factor(&swapper).await.unwrap(), decimal("1"));

        let pairs = [
            QuotePairConfig {
                base_token: USDC.to_string(),
                quote_token: WETH.to_string(),
            },
            QuotePairConfig {
                base_token: WETH.to_string(),
                quote_token: USDC.to_string(),
            },
        ];
        let overrides = client.get_scaled_offer_factor_overrides(&swapper, &pairs).await.unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].base_token, USDC);
        assert_eq!(overrides[0].scaled_offer_factor_percent, decimal("-1"));
    }

    #[tokio::test]
    async fn read_without_a_transport_is_a_missing_provider() {
        let client = SwapperClient::new(TestEnvironment::new().client_without_transport());

        assert!(matches!(client.get_beneficiary(&SWAPPER.to_string()).await, Err(Error::MissingProvider)));
    }
}
