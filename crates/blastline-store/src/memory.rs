//! In-memory campaign store — used by tests and demos.

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use blastline_core::campaign::Campaign;
use blastline_core::error::{BlastlineError, Result};
use blastline_core::traits::CampaignStore;

/// Campaign store with no persistence. Same semantics as the JSON store,
/// minus the file.
#[derive(Default)]
pub struct MemoryCampaignStore {
    campaigns: Mutex<Vec<Campaign>>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn insert(&self, campaign: Campaign) -> Result<()> {
        let mut campaigns = self.campaigns.lock().await;
        if campaigns.iter().any(|c| c.id == campaign.id) {
            return Err(BlastlineError::Store(format!(
                "campaign {} already exists",
                campaign.id
            )));
        }
        campaigns.push(campaign);
        Ok(())
    }

    async fn update(&self, campaign: &Campaign) -> Result<()> {
        let mut campaigns = self.campaigns.lock().await;
        match campaigns.iter_mut().find(|c| c.id == campaign.id) {
            Some(slot) => {
                *slot = campaign.clone();
                Ok(())
            }
            None => Err(BlastlineError::Store(format!(
                "campaign {} not found",
                campaign.id
            ))),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Campaign>> {
        let campaigns = self.campaigns.lock().await;
        Ok(campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Campaign>> {
        let campaigns = self.campaigns.lock().await;
        Ok(campaigns
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}
