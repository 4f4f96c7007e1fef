//! Campaign definitions — the core data model for scheduled bulk messaging.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BlastlineError, Result};

/// A bulk-messaging campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique campaign ID, assigned at creation.
    pub id: Uuid,
    /// Owning user. Store queries are scoped by this field.
    pub user_id: String,
    /// Human-readable name.
    pub name: String,
    /// Message template. `{name}` is substituted with each contact's name.
    pub message: String,
    /// Text-only or media message.
    pub kind: MessageKind,
    /// Media refs for media campaigns. Empty for text campaigns.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Dispatch becomes eligible at/after this instant.
    pub scheduled_at: DateTime<Utc>,
    /// Weekday/hour window during which dispatch may start.
    pub window: ActiveWindow,
    /// Send pacing profile.
    pub pacing: Pacing,
    /// Recipients, contacted strictly in list order.
    pub contacts: Vec<Contact>,
    /// Lifecycle status.
    pub status: CampaignStatus,
    /// Append-only run log. Never reordered or pruned.
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    /// Created timestamp. Set once.
    pub created_at: DateTime<Utc>,
}

/// Campaign payload type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Media,
}

/// Media attachment reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Publicly reachable URL of the asset.
    pub url: String,
    pub kind: MediaKind,
}

/// Attachment media type, mapped onto the transport's message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Document,
    Audio,
}

/// One campaign recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    /// Destination number in international format.
    pub phone: String,
}

/// The weekday/hour window during which a campaign may start dispatching.
///
/// Hours form a half-open range `[start_hour, end_hour)` with no overnight
/// wraparound: a window with `end_hour <= start_hour` never matches. Weekdays
/// are numbered 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveWindow {
    pub days_of_week: Vec<u8>,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl ActiveWindow {
    pub fn new(days_of_week: Vec<u8>, start_hour: u32, end_hour: u32) -> Self {
        Self { days_of_week, start_hour, end_hour }
    }

    /// True when `now` falls inside the window. Pure wall-clock predicate;
    /// the scheduler re-evaluates it on every tick, nothing is cached.
    pub fn is_open_at<T: Datelike + Timelike>(&self, now: &T) -> bool {
        let weekday = now.weekday().num_days_from_sunday() as u8;
        if !self.days_of_week.contains(&weekday) {
            return false;
        }
        let hour = now.hour();
        self.start_hour <= hour && hour < self.end_hour
    }
}

/// Send pacing profile. The delay between sends is `60000ms / rate`.
///
/// A closed table rather than free-form rates, so a campaign can only be
/// created with a pacing the engine knows how to honor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// One message every two minutes.
    Relaxed,
    /// One message per minute.
    Steady,
    /// Three messages every two minutes.
    Grouped,
    /// Three messages per minute.
    Brisk,
}

impl Pacing {
    /// Average send rate in messages per minute.
    pub fn messages_per_minute(&self) -> f64 {
        match self {
            Pacing::Relaxed => 0.5,
            Pacing::Steady => 1.0,
            Pacing::Grouped => 1.5,
            Pacing::Brisk => 3.0,
        }
    }

    /// Pause inserted after every send, including the last one.
    pub fn delay(&self) -> Duration {
        Duration::from_millis((60_000.0 / self.messages_per_minute()) as u64)
    }
}

impl fmt::Display for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pacing::Relaxed => write!(f, "relaxed"),
            Pacing::Steady => write!(f, "steady"),
            Pacing::Grouped => write!(f, "grouped"),
            Pacing::Brisk => write!(f, "brisk"),
        }
    }
}

impl FromStr for Pacing {
    type Err = BlastlineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relaxed" => Ok(Pacing::Relaxed),
            "steady" => Ok(Pacing::Steady),
            "grouped" => Ok(Pacing::Grouped),
            "brisk" => Ok(Pacing::Brisk),
            other => Err(BlastlineError::Campaign(format!(
                "unknown pacing '{other}' (expected relaxed, steady, grouped or brisk)"
            ))),
        }
    }
}

impl FromStr for MessageKind {
    type Err = BlastlineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(MessageKind::Text),
            "media" => Ok(MessageKind::Media),
            other => Err(BlastlineError::Campaign(format!(
                "unknown message kind '{other}' (expected text or media)"
            ))),
        }
    }
}

impl FromStr for MediaKind {
    type Err = BlastlineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "document" => Ok(MediaKind::Document),
            "audio" => Ok(MediaKind::Audio),
            other => Err(BlastlineError::Campaign(format!(
                "unknown media kind '{other}' (expected image, video, document or audio)"
            ))),
        }
    }
}

/// Campaign lifecycle status.
///
/// Transitions are one-directional: `Scheduled -> InProgress -> Completed`,
/// with `Canceled` reachable from `Scheduled` only. There is no way back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Scheduled,
    InProgress,
    Completed,
    Canceled,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignStatus::Scheduled => write!(f, "scheduled"),
            CampaignStatus::InProgress => write!(f, "in_progress"),
            CampaignStatus::Completed => write!(f, "completed"),
            CampaignStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// One timestamped entry in a campaign's run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%Y-%m-%d %H:%M:%S"), self.message)
    }
}

impl Campaign {
    /// Create a new campaign in `Scheduled` state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: &str,
        name: &str,
        message: &str,
        kind: MessageKind,
        attachments: Vec<Attachment>,
        scheduled_at: DateTime<Utc>,
        window: ActiveWindow,
        pacing: Pacing,
        contacts: Vec<Contact>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            message: message.to_string(),
            kind,
            attachments,
            scheduled_at,
            window,
            pacing,
            contacts,
            status: CampaignStatus::Scheduled,
            logs: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Creation-time validation: media campaigns need at least one attachment,
    /// text campaigns must not carry any.
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            MessageKind::Media if self.attachments.is_empty() => Err(BlastlineError::Campaign(
                "media campaign needs at least one attachment".into(),
            )),
            MessageKind::Text if !self.attachments.is_empty() => Err(BlastlineError::Campaign(
                "text campaign must not carry attachments".into(),
            )),
            _ => Ok(()),
        }
    }

    /// True when the scheduler should pick this campaign up: still
    /// `Scheduled`, past its scheduled instant, and inside the active window.
    pub fn is_due<T: Datelike + Timelike>(&self, now: DateTime<Utc>, local_now: &T) -> bool {
        self.status == CampaignStatus::Scheduled
            && self.scheduled_at <= now
            && self.window.is_open_at(local_now)
    }

    /// `Scheduled -> InProgress`. The scheduler flips this before handing the
    /// campaign to a dispatch task, so a later scan can never pick it twice.
    pub fn begin(&mut self) -> Result<()> {
        match self.status {
            CampaignStatus::Scheduled => {
                self.status = CampaignStatus::InProgress;
                Ok(())
            }
            other => Err(BlastlineError::Campaign(format!(
                "cannot begin dispatch of '{}' from status {other}",
                self.name
            ))),
        }
    }

    /// `InProgress -> Completed`.
    pub fn complete(&mut self) -> Result<()> {
        match self.status {
            CampaignStatus::InProgress => {
                self.status = CampaignStatus::Completed;
                Ok(())
            }
            other => Err(BlastlineError::Campaign(format!(
                "cannot complete '{}' from status {other}",
                self.name
            ))),
        }
    }

    /// `Scheduled -> Canceled`. A campaign that already started (or finished)
    /// cannot be canceled.
    pub fn cancel(&mut self) -> Result<()> {
        match self.status {
            CampaignStatus::Scheduled => {
                self.status = CampaignStatus::Canceled;
                Ok(())
            }
            other => Err(BlastlineError::Campaign(format!(
                "cannot cancel '{}' from status {other}",
                self.name
            ))),
        }
    }

    /// Append a timestamped entry to the run log.
    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(LogEntry {
            at: Utc::now(),
            message: message.into(),
        });
    }
}
