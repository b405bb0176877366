use alloy::primitives::{Address, U256};
use alloy::sol_types::SolEvent;
use splits_evm::contract::IRecoup;
use splits_execution::events::{Event, EventExtractor};
use splits_execution::{Client, ContractKind, Error, ExecutionMode, OperationDescriptor, Outcome, Target};
use tracing::{debug, instrument};

use crate::format::{format_non_waterfall_recipient, format_tranches};
use crate::types::CreateRecoupConfig;
use crate::validation::validate_create_recoup;

const CREATE_RECOUP: OperationDescriptor = OperationDescriptor {
    name: "createRecoup",
    contract: ContractKind::Recoup,
    parameters: &["token", "nonWaterfallRecipientAddress", "nonWaterfallRecipientTrancheIndex", "tranches"],
    events: &[IRecoup::CreateRecoup::SIGNATURE_HASH],
};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRecoupResult {
    pub waterfall_module: Address,
    pub event: Event<IRecoup::CreateRecoup>,
}

/// Deploys compositions of Splits modules in a single transaction
#[derive(Clone)]
pub struct TemplatesClient {
    client: Client,
    mode: ExecutionMode,
}

impl TemplatesClient {
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

    /// Creates a waterfall paying each tranche in turn, splitting a tranche when it has more than
    /// one recipient.
    #[instrument(name = "create_recoup", skip_all, fields(mode = self.mode.as_str()))]
    pub async fn create_recoup(&self, config: &CreateRecoupConfig) -> Result<Outcome<CreateRecoupResult>, Error> {
        let parameters = validate_create_recoup(config)?;
        let (recipient, tranche_index) = format_non_waterfall_recipient(parameters.non_waterfall_recipient.as_ref(), parameters.tranches.len());
        debug!(tranches = parameters.tranches.len(), non_waterfall_recipient = %recipient, "creating recoup");

        let call = IRecoup::createRecoupCall {
            token: parameters.token,
            nonWaterfallRecipientAddress: recipient,
            nonWaterfallRecipientTrancheIndex: tranche_index,
            tranches: format_tranches(&parameters.tranches),
        };

        self.client
            .dispatch(&CREATE_RECOUP, Target::Deployment, &call, U256::ZERO, self.mode)
            .await?
            .into_outcome(|transaction| {
                let event = EventExtractor::expect::<IRecoup::CreateRecoup>(&transaction, &CREATE_RECOUP)?;
                Ok(CreateRecoupResult {
                    waterfall_module: event.data.waterfallModule,
                    event,
                })
            })
    }
}
