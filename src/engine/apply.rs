//! Budget application through the campaign store

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::common::errors::{AdjusterError, Result};
use crate::common::traits::CampaignStore;
use crate::common::types::{AccountRef, ChannelType};

/// Applies budget decisions through a campaign store
pub struct BudgetApplier<'a> {
    store: &'a dyn CampaignStore,
}

impl<'a> BudgetApplier<'a> {
    pub fn new(store: &'a dyn CampaignStore) -> Self {
        Self { store }
    }

    /// Resolve the campaign by name and commit the new daily budget
    ///
    /// Returns the committed amount. Fails with `CampaignNotFound`
    /// when the name resolves to nothing in the store, and with
    /// `StoreMutation` when the lookup or the commit is rejected.
    /// A failed application is never retried within a run.
    pub async fn apply(
        &self,
        account: &AccountRef,
        channel_type: ChannelType,
        campaign_name: &str,
        new_budget: Decimal,
    ) -> Result<Decimal> {
        debug!(
            account = %account.id,
            campaign = campaign_name,
            %channel_type,
            "resolving campaign for budget change"
        );

        let handle = match self
            .store
            .find_campaign(account, channel_type, campaign_name)
            .await
        {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                return Err(AdjusterError::CampaignNotFound(format!(
                    "{campaign_name} ({channel_type})"
                )))
            }
            Err(e) => return Err(AdjusterError::StoreMutation(e.to_string())),
        };

        self.store
            .set_daily_budget(account, &handle, new_budget)
            .await
            .map_err(|e| AdjusterError::StoreMutation(e.to_string()))?;

        info!(
            account = %account.id,
            campaign = campaign_name,
            budget = %new_budget,
            "daily budget committed"
        );
        Ok(new_budget)
    }
}
