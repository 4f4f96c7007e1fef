//! File-based campaign store — lightweight persistence.
//! Campaigns saved as one JSON file — human-readable, git-friendly.
//! Only writes on campaign changes, not on every scheduler tick.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use blastline_core::campaign::Campaign;
use blastline_core::error::{BlastlineError, Result};
use blastline_core::traits::CampaignStore;

/// JSON file campaign store.
///
/// The full campaign list lives in memory behind a mutex; every mutation
/// rewrites the file. Suits the intended scale (one user, a handful of
/// campaigns), not thousands of rows.
pub struct JsonCampaignStore {
    path: PathBuf,
    campaigns: Mutex<Vec<Campaign>>,
}

impl JsonCampaignStore {
    /// Open (or create) the store at the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let campaigns = Self::load(&path);
        Ok(Self {
            path,
            campaigns: Mutex::new(campaigns),
        })
    }

    fn load(path: &Path) -> Vec<Campaign> {
        if !path.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Failed to parse {}: {e}", path.display());
                Vec::new()
            }),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    fn persist(&self, campaigns: &[Campaign]) -> Result<()> {
        let json = serde_json::to_string_pretty(campaigns)?;
        std::fs::write(&self.path, &json)?;
        tracing::debug!("💾 Saved {} campaigns to {}", campaigns.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl CampaignStore for JsonCampaignStore {
    async fn insert(&self, campaign: Campaign) -> Result<()> {
        let mut campaigns = self.campaigns.lock().await;
        if campaigns.iter().any(|c| c.id == campaign.id) {
            return Err(BlastlineError::Store(format!(
                "campaign {} already exists",
                campaign.id
            )));
        }
        campaigns.push(campaign);
        self.persist(&campaigns)
    }

    async fn update(&self, campaign: &Campaign) -> Result<()> {
        let mut campaigns = self.campaigns.lock().await;
        match campaigns.iter_mut().find(|c| c.id == campaign.id) {
            Some(slot) => {
                *slot = campaign.clone();
                self.persist(&campaigns)
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
