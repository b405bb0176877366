//! ABI definitions of the Splits modules driven by this workspace.
//!
//! Only the functions and events used by the clients are declared. Struct names are local to
//! this crate; the ABI only depends on field types and order.

use alloy::sol;

sol! {
    #![sol(all_derives)]

    struct QuotePair {
        address base;
        address quote;
    }

    struct SetPairScaledOfferFactorParams {
        QuotePair quotePair;
        uint32 scaledOfferFactor;
    }

    struct CreateOracleParams {
        address factory;
        bytes data;
    }

    struct OracleParams {
        address oracle;
        CreateOracleParams createOracleParams;
    }

    struct CreateSwapperParams {
        address owner;
        bool paused;
        address beneficiary;
        address tokenToBeneficiary;
        OracleParams oracleParams;
        uint32 defaultScaledOfferFactor;
        SetPairScaledOfferFactorParams[] pairScaledOfferFactors;
    }

    struct SwapperCall {
        address to;
        uint256 value;
        bytes data;
    }

    struct Tranche {
        address[] recipients;
        uint32[] percentAllocations;
        address controller;
        uint32 distributorFee;
        uint256 size;
    }

    interface ISwapperFactory {
        event CreateSwapper(address indexed swapper, CreateSwapperParams params);

        function createSwapper(CreateSwapperParams calldata params) external returns (address swapper);
    }

    interface ISwapper {
        event SetBeneficiary(address beneficiary);
        event SetTokenToBeneficiary(address tokenToBeneficiary);
        event SetOracle(address oracle);
        event SetDefaultScaledOfferFactor(uint32 defaultScaledOfferFactor);
        event SetPairScaledOfferFactors(SetPairScaledOfferFactorParams[] params);
        event SetPaused(bool paused);
        event ExecCalls(SwapperCall[] calls);

        function owner() external view returns (address);
        function paused() external view returns (bool);
        function beneficiary() external view returns (address);
        function tokenToBeneficiary() external view returns (address);
        function oracle() external view returns (address);
        function defaultScaledOfferFactor() external view returns (uint32);
        function getPairScaledOfferFactors(QuotePair[] calldata quotePairs) external view returns (uint32[] memory);

        function setBeneficiary(address beneficiary) external;
        function setTokenToBeneficiary(address tokenToBeneficiary) external;
        function setOracle(address oracle) external;
        function setDefaultScaledOfferFactor(uint32 defaultScaledOfferFactor) external;
        function setPairScaledOfferFactors(SetPairScaledOfferFactorParams[] calldata params) external;
        function setPaused(bool paused) external;
        function execCalls(SwapperCall[] calldata calls) external payable returns (uint256 blockNumber, bytes[] memory returnData);
    }

    interface IRecoup {
        event CreateRecoup(address waterfallModule);

        function createRecoup(
            address token,
            address nonWaterfallRecipientAddress,
            uint256 nonWaterfallRecipientTrancheIndex,
            Tranche[] calldata tranches
        ) external;
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address};
    use alloy::sol_types::{SolCall, SolEvent};

    use crate::contract::{IRecoup, ISwapper, ISwapperFactory};

    #[test]
    fn event_signatures_use_canonical_types() {
        assert_eq!(ISwapper::ExecCalls::SIGNATURE, "ExecCalls((address,uint256,bytes)[])");
        assert_eq!(ISwapper::SetPairScaledOfferFactors::SIGNATURE, "SetPairScaledOfferFactors(((address,address),uint32)[])");
        assert_eq!(IRecoup::CreateRecoup::SIGNATURE, "CreateRecoup(address)");
        assert_eq!(
            ISwapperFactory::CreateSwapper::SIGNATURE,
            "CreateSwapper(address,(address,bool,address,address,(address,(address,bytes)),uint32,((address,address),uint32)[]))"
        );
    }

    #[test]
    fn selectors_match_the_deployed_functions() {
        assert_eq!(ISwapper::setPausedCall::SIGNATURE, "setPaused(bool)");
        assert_eq!(ISwapper::ownerCall::SELECTOR, [0x8d, 0xa5, 0xcb, 0x5b]);

        let call = ISwapper::setBeneficiaryCall {
            beneficiary: address!("00000000000000000000000000000000000000b0"),
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(ISwapper::setBeneficiaryCall::abi_decode(&data).unwrap().beneficiary, call.beneficiary);
        assert_ne!(call.beneficiary, Address::ZERO);
    }
}
