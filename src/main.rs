//! # Blastline CLI
//!
//! Create, inspect and run scheduled bulk-messaging campaigns.
//!
//! Usage:
//!   blastline run                          # Start the scheduler loop
//!   blastline create --name promo ...      # Schedule a campaign
//!   blastline list                         # Show campaigns and their status
//!   blastline logs <id>                    # Show a campaign's run log
//!   blastline cancel <id>                  # Cancel a scheduled campaign

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use blastline_channels::{ConsoleSender, WhatsAppSender};
use blastline_core::campaign::{
    ActiveWindow, Attachment, Campaign, Contact, MediaKind, MessageKind, Pacing,
};
use blastline_core::config::BlastlineConfig;
use blastline_core::traits::{CampaignStore, MessageSender};
use blastline_scheduler::{CampaignScheduler, NotifyRouter, TracingSink};
use blastline_store::JsonCampaignStore;

#[derive(Parser)]
#[command(
    name = "blastline",
    version,
    about = "📨 Blastline — scheduled bulk-messaging campaigns"
)]
struct Cli {
    /// Config file path (defaults to ~/.blastline/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the scheduler loop for a user's campaigns
    Run {
        /// User whose campaigns to run (defaults to config)
        #[arg(long)]
        user: Option<String>,

        /// Print sends to the console instead of using a channel
        #[arg(long)]
        console: bool,
    },

    /// Schedule a new campaign
    Create {
        /// Owning user (defaults to config)
        #[arg(long)]
        user: Option<String>,

        /// Campaign name
        #[arg(long)]
        name: String,

        /// Message template; `{name}` is replaced per recipient
        #[arg(long)]
        message: String,

        /// text or media
        #[arg(long, default_value = "text")]
        kind: String,

        /// Attachment URL (repeatable; only the first is sent)
        #[arg(long = "attachment")]
        attachments: Vec<String>,

        /// image, video, document or audio
        #[arg(long, default_value = "image")]
        media_kind: String,

        /// Local date/time the campaign becomes eligible ("YYYY-MM-DD HH:MM")
        #[arg(long = "at")]
        scheduled_at: String,

        /// Active weekdays, 0=Sunday..6=Saturday (comma-separated)
        #[arg(long, default_value = "1,2,3,4,5")]
        days: String,

        /// First hour of the active window (inclusive)
        #[arg(long, default_value = "9")]
        start_hour: u32,

        /// End hour of the active window (exclusive)
        #[arg(long, default_value = "18")]
        end_hour: u32,

        /// relaxed, steady, grouped or brisk
        #[arg(long, default_value = "steady")]
        pacing: String,

        /// Recipient as "Name:+5511999998888" (repeatable)
        #[arg(long = "contact")]
        contacts: Vec<String>,
    },

    /// List campaigns for a user
    List {
        #[arg(long)]
        user: Option<String>,
    },

    /// Show a campaign's run log
    Logs {
        /// Campaign ID
        id: String,
    },

    /// Cancel a campaign that has not started yet
    Cancel {
        /// Campaign ID
        id: String,
    },
}

fn expand_path(p: &str) -> String {
    shellexpand::tilde(p).to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => BlastlineConfig::load_from(Path::new(&expand_path(path)))?,
        None => BlastlineConfig::load()?,
    };

    match cli.command {
        Command::Run { user, console } => cmd_run(config, user, console).await,
        Command::Create {
            user,
            name,
            message,
            kind,
            attachments,
            media_kind,
            scheduled_at,
            days,
            start_hour,
            end_hour,
            pacing,
            contacts,
        } => {
            cmd_create(
                config,
                user,
                name,
                message,
                kind,
                attachments,
                media_kind,
                scheduled_at,
                days,
                start_hour,
                end_hour,
                pacing,
                contacts,
            )
            .await
        }
        Command::List { user } => cmd_list(config, user).await,
        Command::Logs { id } => cmd_logs(config, id).await,
        Command::Cancel { id } => cmd_cancel(config, id).await,
    }
}

fn open_store(config: &BlastlineConfig) -> Result<Arc<dyn CampaignStore>> {
    let path = expand_path(&config.store.path);
    Ok(Arc::new(JsonCampaignStore::new(path)?))
}

async fn cmd_run(config: BlastlineConfig, user: Option<String>, console: bool) -> Result<()> {
    let user = user.unwrap_or_else(|| config.default_user.clone());
    let store = open_store(&config)?;

    let sender: Arc<dyn MessageSender> = if console {
        Arc::new(ConsoleSender)
    } else if let Some(wa) = config.channel.whatsapp.clone().filter(|w| w.enabled) {
        let sender = WhatsAppSender::new(wa);
        sender.verify().await?;
        Arc::new(sender)
    } else {
        tracing::info!("No channel configured; sends go to the console");
        Arc::new(ConsoleSender)
    };

    let router = Arc::new(NotifyRouter::with_sinks(vec![Arc::new(TracingSink)]));
    let scheduler = Arc::new(CampaignScheduler::new(
        store,
        sender,
        router,
        Duration::from_secs(config.scheduler.tick_interval_secs),
    ));

    let handle = scheduler.start(user.clone());
    println!("📨 Blastline running for '{user}' — Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    println!("\n🛑 Stopping; in-flight campaigns will finish...");
    handle.shutdown().await;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_create(
    config: BlastlineConfig,
    user: Option<String>,
    name: String,
    message: String,
    kind: String,
    attachment_urls: Vec<String>,
    media_kind: String,
    scheduled_at: String,
    days: String,
    start_hour: u32,
    end_hour: u32,
    pacing: String,
    contact_args: Vec<String>,
) -> Result<()> {
    let user = user.unwrap_or_else(|| config.default_user.clone());
    let kind: MessageKind = kind.parse()?;
    let media_kind: MediaKind = media_kind.parse()?;
    let pacing: Pacing = pacing.parse()?;
    let scheduled_at = parse_local_datetime(&scheduled_at)?;
    check_window_hours(start_hour, end_hour)?;
    let window = ActiveWindow::new(parse_days(&days)?, start_hour, end_hour);

    if contact_args.is_empty() {
        bail!("at least one --contact is required");
    }
    let contacts = contact_args
        .iter()
        .map(|c| parse_contact(c))
        .collect::<Result<Vec<_>>>()?;

    let attachments = attachment_urls
        .into_iter()
        .map(|url| Attachment { url, kind: media_kind })
        .collect();

    let campaign = Campaign::new(
        &user,
        &name,
        &message,
        kind,
        attachments,
        scheduled_at,
        window,
        pacing,
        contacts,
    );
    campaign.validate()?;

    if campaign.window.days_of_week.is_empty() || campaign.window.end_hour <= campaign.window.start_hour {
        println!("⚠️  This active window can never open; the campaign will stay scheduled forever.");
    }

    let store = open_store(&config)?;
    store.insert(campaign.clone()).await?;

    println!("✅ Campaign '{}' scheduled", campaign.name);
    println!("   ID:         {}", campaign.id);
    println!(
        "   Eligible:   {} (local)",
        campaign.scheduled_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    println!(
        "   Window:     days {:?}, {:02}:00-{:02}:00",
        campaign.window.days_of_week, campaign.window.start_hour, campaign.window.end_hour
    );
    println!(
        "   Recipients: {} at {} pace",
        campaign.contacts.len(),
        campaign.pacing
    );
    Ok(())
}

async fn cmd_list(config: BlastlineConfig, user: Option<String>) -> Result<()> {
    let user = user.unwrap_or_else(|| config.default_user.clone());
    let store = open_store(&config)?;
    let campaigns = store.list_for_user(&user).await?;

    if campaigns.is_empty() {
        println!("No campaigns for '{user}'");
        return Ok(());
    }

    println!(
        "{:<38} {:<20} {:<12} {:<17} {:>10}",
        "ID", "NAME", "STATUS", "SCHEDULED", "RECIPIENTS"
    );
    for c in campaigns {
        println!(
            "{:<38} {:<20} {:<12} {:<17} {:>10}",
            c.id.to_string(),
            c.name,
            c.status.to_string(),
            c.scheduled_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            c.contacts.len()
        );
    }
    Ok(())
}

async fn cmd_logs(config: BlastlineConfig, id: String) -> Result<()> {
    let id = Uuid::parse_str(&id).context("invalid campaign ID")?;
    let store = open_store(&config)?;
    let campaign = store
        .get(id)
        .await?
        .with_context(|| format!("campaign {id} not found"))?;

    println!("📋 {} — {}", campaign.name, campaign.status);
    if campaign.logs.is_empty() {
        println!("No log entries yet");
    }
    for entry in &campaign.logs {
        println!("{entry}");
    }
    Ok(())
}

async fn cmd_cancel(config: BlastlineConfig, id: String) -> Result<()> {
    let id = Uuid::parse_str(&id).context("invalid campaign ID")?;
    let store = open_store(&config)?;
    let mut campaign = store
        .get(id)
        .await?
        .with_context(|| format!("campaign {id} not found"))?;

    campaign.cancel()?;
    campaign.log("Campaign canceled");
    store.update(&campaign).await?;
    println!("🛑 Campaign '{}' canceled", campaign.name);
    Ok(())
}

/// Parse "YYYY-MM-DD HH:MM" as local time.
fn parse_local_datetime(s: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .with_context(|| format!("invalid date/time '{s}' (expected YYYY-MM-DD HH:MM)"))?;
    let local = naive
        .and_local_timezone(Local)
        .single()
        .with_context(|| format!("'{s}' is not an unambiguous local time"))?;
    Ok(local.with_timezone(&Utc))
}

/// Parse "Name:+5511999998888" into a contact. The last colon splits name
/// from phone, so names may contain colons.
fn parse_contact(s: &str) -> Result<Contact> {
    let (name, phone) = s
        .rsplit_once(':')
        .with_context(|| format!("invalid contact '{s}' (expected Name:+PHONE)"))?;
    if name.is_empty() || phone.is_empty() {
        bail!("invalid contact '{s}' (expected Name:+PHONE)");
    }
    Ok(Contact {
        name: name.to_string(),
        phone: phone.to_string(),
    })
}

/// Check window hours are within 0..=23. An in-range window may still never
/// open (end <= start); that only draws a warning at creation.
fn check_window_hours(start_hour: u32, end_hour: u32) -> Result<()> {
    for hour in [start_hour, end_hour] {
        if hour > 23 {
            bail!("invalid hour '{hour}' (0..=23)");
        }
    }
    Ok(())
}

/// Parse "1,2,3" into weekday numbers 0..=6.
fn parse_days(s: &str) -> Result<Vec<u8>> {
    let mut days = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let day: u8 = part
            .parse()
            .with_context(|| format!("invalid weekday '{part}'"))?;
        if day > 6 {
            bail!("invalid weekday '{day}' (0=Sunday..6=Saturday)");
        }
        days.push(day);
    }
    Ok(days)
}
