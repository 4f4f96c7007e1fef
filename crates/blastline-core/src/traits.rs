//! Core traits — the seams between scheduler, store and channels.

use async_trait::async_trait;
use uuid::Uuid;

use crate::campaign::{Attachment, Campaign};
use crate::error::Result;

/// Outbound message transport.
///
/// One send per recipient; the dispatcher owns ordering and pacing. Any `Err`
/// counts as a failed delivery for that recipient and the campaign moves on.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Channel name ("whatsapp", "console", ...).
    fn name(&self) -> &str;

    /// Send a plain text message.
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;

    /// Send a single media attachment with a caption.
    async fn send_media(&self, to: &str, caption: &str, attachment: &Attachment) -> Result<()>;
}

/// Campaign persistence.
///
/// Implementations serialize their own access; callers never hold a lock
/// across a send. Updates replace the stored campaign wholesale by ID, so the
/// dispatcher can push log/status changes incrementally.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Persist a new campaign.
    async fn insert(&self, campaign: Campaign) -> Result<()>;

    /// Replace the stored campaign with the same ID. Errors if unknown.
    async fn update(&self, campaign: &Campaign) -> Result<()>;

    /// Fetch one campaign by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Campaign>>;

    /// All campaigns owned by `user_id`, in insertion order.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Campaign>>;
}
