//! # Blastline Scheduler
//!
//! The campaign engine: a periodic scan picks up due campaigns, a dispatch
//! task walks each recipient list at the configured pace, and a notification
//! router tells the owner how the run went.
//!
//! ## Architecture
//! ```text
//! CampaignScheduler (tokio interval, one scan at a time)
//!   ├── due? status == Scheduled && scheduled_at reached && window open
//!   ├── claim: Scheduled → InProgress, persisted before spawn
//!   └── spawn → dispatch::run_campaign
//!                 ├── per contact: personalize → send → log → pause
//!                 ├── status → Completed + summary log
//!                 └── NotifyRouter → owner notification
//! ```

pub mod dispatch;
pub mod engine;
pub mod notify;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{personalize, run_campaign};
pub use engine::{CampaignScheduler, SchedulerHandle};
pub use notify::{Notification, NotifyPriority, NotifyRouter, NotifySink, TracingSink};
