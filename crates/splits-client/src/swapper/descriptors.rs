use alloy::sol_types::SolEvent;
use splits_evm::contract::{ISwapper, ISwapperFactory};
use splits_execution::{ContractKind, OperationDescriptor};

pub const CREATE_SWAPPER: OperationDescriptor = OperationDescriptor {
    name: "createSwapper",
    contract: ContractKind::SwapperFactory,
    parameters: &["params"],
    events: &[ISwapperFactory::CreateSwapper::SIGNATURE_HASH],
};

pub const SET_BENEFICIARY: OperationDescriptor = OperationDescriptor {
    name: "setBeneficiary",
    contract: ContractKind::Swapper,
    parameters: &["beneficiary"],
    events: &[ISwapper::SetBeneficiary::SIGNATURE_HASH],
};

pub const SET_TOKEN_TO_BENEFICIARY: OperationDescriptor = OperationDescriptor {
    name: "setTokenToBeneficiary",
    contract: ContractKind::Swapper,
    parameters: &["tokenToBeneficiary"],
    events: &[ISwapper::SetTokenToBeneficiary::SIGNATURE_HASH],
};

pub const SET_ORACLE: OperationDescriptor = OperationDescriptor {
    name: "setOracle",
    contract: ContractKind::Swapper,
    parameters: &["oracle"],
    events: &[ISwapper::SetOracle::SIGNATURE_HASH],
};

pub const SET_DEFAULT_SCALED_OFFER_FACTOR: OperationDescriptor = OperationDescriptor {
    name: "setDefaultScaledOfferFactor",
    contract: ContractKind::Swapper,
    parameters: &["defaultScaledOfferFactor"],
    events: &[ISwapper::SetDefaultScaledOfferFactor::SIGNATURE_HASH],
};

pub const SET_PAIR_SCALED_OFFER_FACTORS: OperationDescriptor = OperationDescriptor {
    name: "setPairScaledOfferFactors",
    contract: ContractKind::Swapper,
    parameters: &["params"],
    events: &[ISwapper::SetPairScaledOfferFactors::SIGNATURE_HASH],
};

pub const SET_PAUSED: OperationDescriptor = OperationDescriptor {
    name: "setPaused",
    contract: ContractKind::Swapper,
    parameters: &["paused"],
    events: &[ISwapper::SetPaused::SIGNATURE_HASH],
};

pub const EXEC_CALLS: OperationDescriptor = OperationDescriptor {
    name: "execCalls",
    contract: ContractKind::Swapper,
    parameters: &["calls"],
    events: &[ISwapper::ExecCalls::SIGNATURE_HASH],
};

// Queries
pub const OWNER: OperationDescriptor = OperationDescriptor {
    name: "owner",
    contract: ContractKind::Swapper,
    parameters: &[],
    events: &[],
};

pub const PAUSED: OperationDescriptor = OperationDescriptor {
    name: "paused",
    contract: ContractKind::Swapper,
    parameters: &[],
    events: &[],
};

pub const BENEFICIARY: OperationDescriptor = OperationDescriptor {
    name: "beneficiary",
    contract: ContractKind::Swapper,
    parameters: &[],
    events: &[],
};

pub const TOKEN_TO_BENEFICIARY: OperationDescriptor = OperationDescriptor {
    name: "tokenToBeneficiary",
    contract: ContractKind::Swapper,
    parameters: &[],
    events: &[],
};

pub const ORACLE: OperationDescriptor = OperationDescriptor {
    name: "oracle",
    contract: ContractKind::Swapper,
    parameters: &[],
    events: &[],
};

pub const DEFAULT_SCALED_OFFER_FACTOR: OperationDescriptor = OperationDescriptor {
    name: "defaultScaledOfferFactor",
    contract: ContractKind::Swapper,
    parameters: &[],
    events: &[],
};

pub const GET_PAIR_SCALED_OFFER_FACTORS: OperationDescriptor = OperationDescriptor {
    name: "getPairScaledOfferFactors",
    contract: ContractKind::Swapper,
    parameters: &["quotePairs"],
    events: &[],
};
