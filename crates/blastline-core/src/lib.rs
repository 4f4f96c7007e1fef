//! # Blastline Core
//!
//! Shared types for the Blastline campaign engine: the campaign data model,
//! configuration, errors, and the traits that connect the scheduler to
//! stores and message channels.

pub mod campaign;
pub mod config;
pub mod error;
pub mod traits;

pub use campaign::{
    ActiveWindow, Attachment, Campaign, CampaignStatus, Contact, LogEntry, MediaKind, MessageKind,
    Pacing,
};
pub use config::{BlastlineConfig, ChannelConfig, SchedulerConfig, StoreConfig, WhatsAppChannelConfig};
pub use error::{BlastlineError, Result};
pub use traits::{CampaignStore, MessageSender};
