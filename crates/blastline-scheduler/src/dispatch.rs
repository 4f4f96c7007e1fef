//! Campaign dispatch — claims a due campaign and walks its recipient list
//! at the configured pace, one send at a time.

use std::sync::Arc;

use blastline_core::campaign::{Campaign, Contact, MessageKind};
use blastline_core::error::{BlastlineError, Result};
use blastline_core::traits::{CampaignStore, MessageSender};

use crate::notify::{NotifyPriority, NotifyRouter};

/// Substitute `{name}` in the message template with the contact's name.
pub fn personalize(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}

/// Claim a campaign for dispatch: flip it to `InProgress`, record the start,
/// and persist before any send happens. Once claimed, no later scheduler scan
/// can pick the campaign up again.
pub async fn claim(mut campaign: Campaign, store: &Arc<dyn CampaignStore>) -> Result<Campaign> {
    campaign.begin()?;
    campaign.log("Campaign dispatch started");
    store.update(&campaign).await?;
    tracing::info!("🔔 Campaign triggered: '{}'", campaign.name);
    Ok(campaign)
}

/// Run a claimed campaign to completion.
///
/// Recipients are contacted strictly in list order. Each attempt appends one
/// log entry (sent or failed) and is followed by the pacing pause, the last
/// attempt included. A failed recipient never stops the loop; the campaign
/// always ends `Completed` with a summary log and an owner notification.
pub async fn run_campaign(
    mut campaign: Campaign,
    store: Arc<dyn CampaignStore>,
    sender: Arc<dyn MessageSender>,
    router: Arc<NotifyRouter>,
) -> Campaign {
    let delay = campaign.pacing.delay();
    let mut sent = 0usize;
    let mut failed = 0usize;

    for i in 0..campaign.contacts.len() {
        let contact = campaign.contacts[i].clone();
        match send_one(&campaign, &contact, sender.as_ref()).await {
            Ok(()) => {
                sent += 1;
                tracing::debug!("Sent to {} ({})", contact.name, contact.phone);
                campaign.log(format!("Message sent to {} ({})", contact.name, contact.phone));
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("⚠️ Send to {} ({}) failed: {e}", contact.name, contact.phone);
                campaign.log(format!(
                    "Failed to send to {} ({}): {e}",
                    contact.name, contact.phone
                ));
            }
        }
        persist_progress(&store, &campaign).await;

        // Pacing pause applies after every attempt, the last one included.
        tokio::time::sleep(delay).await;
    }

    if let Err(e) = campaign.complete() {
        tracing::warn!("⚠️ Campaign '{}' could not be completed: {e}", campaign.name);
    }
    campaign.log(format!("Campaign completed: {sent} sent, {failed} failed"));
    persist_progress(&store, &campaign).await;
    tracing::info!("✅ Campaign '{}' completed: {sent} sent, {failed} failed", campaign.name);

    router
        .send(NotifyRouter::create(
            &campaign.name,
            &format!(
                "Campaign '{}' completed: {sent} sent, {failed} failed",
                campaign.name
            ),
            "dispatcher",
            NotifyPriority::Normal,
        ))
        .await;

    campaign
}

/// One delivery attempt. Media campaigns send the first attachment with the
/// personalized text as caption; a media campaign without attachments fails
/// the recipient without touching the channel.
async fn send_one(campaign: &Campaign, contact: &Contact, sender: &dyn MessageSender) -> Result<()> {
    let text = personalize(&campaign.message, &contact.name);
    match campaign.kind {
        MessageKind::Text => sender.send_text(&contact.phone, &text).await,
        MessageKind::Media => match campaign.attachments.first() {
            Some(attachment) => sender.send_media(&contact.phone, &text, attachment).await,
            None => Err(BlastlineError::Campaign(
                "media campaign has no attachment".into(),
            )),
        },
    }
}

/// Push log/status changes to the store. Store trouble is logged and
/// swallowed; it must not alter the campaign run or its log trail.
async fn persist_progress(store: &Arc<dyn CampaignStore>, campaign: &Campaign) {
    if let Err(e) = store.update(campaign).await {
        tracing::warn!("⚠️ Failed to persist campaign '{}': {e}", campaign.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{media_campaign, text_campaign, RecordingSender};
    use blastline_core::campaign::{Attachment, CampaignStatus, MediaKind, Pacing};
    use blastline_core::traits::CampaignStore;
    use blastline_store::MemoryCampaignStore;
    use std::time::Duration;

    #[test]
    fn personalize_replaces_every_placeholder() {
        assert_eq!(personalize("Hi {name}!", "Ana"), "Hi Ana!");
        assert_eq!(personalize("{name}, it's for you, {name}", "Bo"), "Bo, it's for you, Bo");
        assert_eq!(personalize("no placeholder", "Ana"), "no placeholder");
    }

    async fn claimed(
        campaign: Campaign,
        store: &Arc<dyn CampaignStore>,
    ) -> Campaign {
        store.insert(campaign.clone()).await.unwrap();
        claim(campaign, store).await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn sends_in_contact_order_with_full_log_trail() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let sender = Arc::new(RecordingSender::new());
        let router = Arc::new(NotifyRouter::new());

        let campaign = text_campaign("user-1", &["Ana", "Bruno", "Carla"], Pacing::Steady);
        let campaign = claimed(campaign, &store).await;

        let done = run_campaign(
            campaign,
            Arc::clone(&store),
            sender.clone(),
            Arc::clone(&router),
        )
        .await;

        let attempts = sender.attempts();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0].to, "+550000000000");
        assert_eq!(attempts[1].to, "+550000000001");
        assert_eq!(attempts[2].to, "+550000000002");
        assert_eq!(attempts[0].text, "Hi Ana");

        // One entry per recipient, plus the start and completion entries.
        assert_eq!(done.logs.len(), 5);
        assert_eq!(done.logs[0].message, "Campaign dispatch started");
        assert!(done.logs[1].message.contains("Message sent to Ana"));
        assert_eq!(done.logs[4].message, "Campaign completed: 3 sent, 0 failed");
        assert_eq!(done.status, CampaignStatus::Completed);

        // Progress reached the store, not just the returned value.
        let stored = store.get(done.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Completed);
        assert_eq!(stored.logs.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_recipient_does_not_stop_the_run() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let sender = Arc::new(RecordingSender::failing_for(&["+550000000001"]));
        let router = Arc::new(NotifyRouter::new());

        let campaign = text_campaign("user-1", &["Ana", "Bruno", "Carla"], Pacing::Brisk);
        let campaign = claimed(campaign, &store).await;
        let done = run_campaign(campaign, store, sender.clone(), router).await;

        assert_eq!(sender.attempts().len(), 3);
        assert_eq!(done.status, CampaignStatus::Completed);
        assert!(done.logs[2].message.starts_with("Failed to send to Bruno"));
        assert_eq!(done.logs[4].message, "Campaign completed: 2 sent, 1 failed");
    }

    #[tokio::test(start_paused = true)]
    async fn media_without_attachment_fails_recipients_without_sending() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let sender = Arc::new(RecordingSender::new());
        let router = Arc::new(NotifyRouter::new());

        let mut campaign = media_campaign("user-1", &["Ana", "Bruno"], Pacing::Brisk);
        campaign.attachments.clear();
        let campaign = claimed(campaign, &store).await;
        let done = run_campaign(campaign, store, sender.clone(), router).await;

        assert!(sender.attempts().is_empty());
        assert_eq!(done.status, CampaignStatus::Completed);
        assert!(done.logs[1].message.starts_with("Failed to send to Ana"));
        assert_eq!(done.logs[3].message, "Campaign completed: 0 sent, 2 failed");
    }

    #[tokio::test(start_paused = true)]
    async fn media_sends_first_attachment_only() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let sender = Arc::new(RecordingSender::new());
        let router = Arc::new(NotifyRouter::new());

        let mut campaign = media_campaign("user-1", &["Ana"], Pacing::Brisk);
        campaign.attachments.push(Attachment {
            url: "https://cdn.example.com/second.jpg".into(),
            kind: MediaKind::Image,
        });
        let campaign = claimed(campaign, &store).await;
        let done = run_campaign(campaign, store, sender.clone(), router).await;

        let attempts = sender.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(
            attempts[0].media_url.as_deref(),
            Some("https://cdn.example.com/promo.jpg")
        );
        assert_eq!(done.status, CampaignStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_pause_follows_every_attempt() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let sender = Arc::new(RecordingSender::new());
        let router = Arc::new(NotifyRouter::new());

        let campaign = text_campaign("user-1", &["Ana", "Bruno", "Carla"], Pacing::Steady);
        let campaign = claimed(campaign, &store).await;

        let started = tokio::time::Instant::now();
        run_campaign(campaign, store, sender, router).await;

        // Three attempts at one per minute: a full minute after each,
        // including the last.
        assert_eq!(started.elapsed(), Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_contact_list_completes_with_summary() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let sender = Arc::new(RecordingSender::new());
        let router = Arc::new(NotifyRouter::new());

        let campaign = text_campaign("user-1", &[], Pacing::Steady);
        let campaign = claimed(campaign, &store).await;

        let started = tokio::time::Instant::now();
        let done = run_campaign(campaign, store, sender.clone(), router).await;

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(sender.attempts().is_empty());
        assert_eq!(done.status, CampaignStatus::Completed);
        assert_eq!(done.logs.len(), 2);
        assert_eq!(done.logs[1].message, "Campaign completed: 0 sent, 0 failed");
    }

    #[tokio::test(start_paused = true)]
    async fn completion_notification_is_always_sent() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let sender = Arc::new(RecordingSender::failing_for(&["+550000000000"]));
        let router = Arc::new(NotifyRouter::new());

        let campaign = text_campaign("user-1", &["Ana"], Pacing::Brisk);
        let campaign = claimed(campaign, &store).await;
        run_campaign(campaign, store, sender, Arc::clone(&router)).await;

        let history = router.history();
        assert_eq!(history.len(), 1);
        assert!(history[0].body.contains("0 sent, 1 failed"));
    }

    #[tokio::test]
    async fn claim_rejects_campaign_already_running() {
        let store: Arc<dyn CampaignStore> = Arc::new(MemoryCampaignStore::new());
        let campaign = text_campaign("user-1", &["Ana"], Pacing::Brisk);
        store.insert(campaign.clone()).await.unwrap();

        let running = claim(campaign.clone(), &store).await.unwrap();
        assert_eq!(running.status, CampaignStatus::InProgress);
        assert!(claim(running, &store).await.is_err());
    }
}
