//! Test doubles shared across the scheduler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use blastline_core::campaign::{
    ActiveWindow, Attachment, Campaign, Contact, MediaKind, MessageKind, Pacing,
};
use blastline_core::error::{BlastlineError, Result};
use blastline_core::traits::{CampaignStore, MessageSender};
use blastline_store::MemoryCampaignStore;

/// One recorded delivery attempt.
#[derive(Debug, Clone)]
pub struct SentAttempt {
    pub to: String,
    pub text: String,
    pub media_url: Option<String>,
}

/// Sender that records every attempt and can be told to fail specific phones.
pub struct RecordingSender {
    attempts: Mutex<Vec<SentAttempt>>,
    fail_phones: Vec<String>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            fail_phones: Vec::new(),
        }
    }

    pub fn failing_for(phones: &[&str]) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            fail_phones: phones.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn attempts(&self) -> Vec<SentAttempt> {
        self.attempts.lock().unwrap().clone()
    }

    fn push(&self, to: &str, text: &str, media_url: Option<String>) -> Result<()> {
        self.attempts.lock().unwrap().push(SentAttempt {
            to: to.to_string(),
            text: text.to_string(),
            media_url,
        });
        if self.fail_phones.iter().any(|p| p == to) {
            Err(BlastlineError::Channel("simulated delivery failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        self.push(to, text, None)
    }

    async fn send_media(&self, to: &str, caption: &str, attachment: &Attachment) -> Result<()> {
        self.push(to, caption, Some(attachment.url.clone()))
    }
}

/// Store whose updates always fail. Reads and inserts behave normally.
pub struct FailingUpdateStore {
    pub inner: MemoryCampaignStore,
}

impl FailingUpdateStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryCampaignStore::new(),
        }
    }
}

#[async_trait]
impl CampaignStore for FailingUpdateStore {
    async fn insert(&self, campaign: Campaign) -> Result<()> {
        self.inner.insert(campaign).await
    }

    async fn update(&self, _campaign: &Campaign) -> Result<()> {
        Err(BlastlineError::Store("disk full".into()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Campaign>> {
        self.inner.get(id).await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Campaign>> {
        self.inner.list_for_user(user_id).await
    }
}

fn contacts(names: &[&str]) -> Vec<Contact> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Contact {
            name: name.to_string(),
            phone: format!("+55000000000{i}"),
        })
        .collect()
}

/// Window that matches every weekday and hour.
pub fn always_open() -> ActiveWindow {
    ActiveWindow::new(vec![0, 1, 2, 3, 4, 5, 6], 0, 24)
}

/// Text campaign scheduled an hour ago with an always-open window.
pub fn text_campaign(user: &str, names: &[&str], pacing: Pacing) -> Campaign {
    Campaign::new(
        user,
        "test-blast",
        "Hi {name}",
        MessageKind::Text,
        vec![],
        Utc::now() - chrono::Duration::hours(1),
        always_open(),
        pacing,
        contacts(names),
    )
}

/// Media campaign scheduled an hour ago with an always-open window.
pub fn media_campaign(user: &str, names: &[&str], pacing: Pacing) -> Campaign {
    Campaign::new(
        user,
        "test-media-blast",
        "Check this out, {name}",
        MessageKind::Media,
        vec![Attachment {
            url: "https://cdn.example.com/promo.jpg".into(),
            kind: MediaKind::Image,
        }],
        Utc::now() - chrono::Duration::hours(1),
        always_open(),
        pacing,
        contacts(names),
    )
}
