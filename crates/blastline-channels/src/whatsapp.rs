//! WhatsApp Business Cloud API channel.
//!
//! Uses the official WhatsApp Business Platform (Cloud API) for messaging.
//! Requires: Access Token + Phone Number ID from Meta Business Suite.

use async_trait::async_trait;

use blastline_core::campaign::{Attachment, MediaKind};
use blastline_core::config::WhatsAppChannelConfig;
use blastline_core::error::{BlastlineError, Result};
use blastline_core::traits::MessageSender;

const GRAPH_API: &str = "https://graph.facebook.com/v21.0";

/// WhatsApp Business message sender.
pub struct WhatsAppSender {
    config: WhatsAppChannelConfig,
    client: reqwest::Client,
}

impl WhatsAppSender {
    pub fn new(config: WhatsAppChannelConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Verify the configured credentials against the Graph API.
    pub async fn verify(&self) -> Result<()> {
        if self.config.access_token.is_empty() {
            return Err(BlastlineError::Config(
                "WhatsApp access_token not configured".into(),
            ));
        }
        if self.config.phone_number_id.is_empty() {
            return Err(BlastlineError::Config(
                "WhatsApp phone_number_id not configured".into(),
            ));
        }

        let url = format!("{GRAPH_API}/{}", self.config.phone_number_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.access_token))
            .send()
            .await
            .map_err(|e| BlastlineError::Channel(format!("WhatsApp verification failed: {e}")))?;

        if response.status().is_success() {
            tracing::info!(
                "✅ WhatsApp Business: verified (phone_id={})",
                self.config.phone_number_id
            );
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(BlastlineError::Channel(format!(
                "WhatsApp token verification failed: {text}"
            )))
        }
    }

    async fn post_message(&self, to: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{GRAPH_API}/{}/messages", self.config.phone_number_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.access_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BlastlineError::Channel(format!("WhatsApp API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BlastlineError::Channel(format!(
                "WhatsApp API error {status}: {error_text}"
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BlastlineError::Channel(format!("Invalid WhatsApp response: {e}")))?;

        let msg_id = result["messages"][0]["id"].as_str().unwrap_or("unknown");
        tracing::debug!("WhatsApp message sent: {} → {}", msg_id, to);
        Ok(())
    }
}

/// Text message request body.
fn text_body(to: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": "text",
        "text": {
            "preview_url": false,
            "body": text
        }
    })
}

/// Media message request body. Captions ride along for everything except
/// audio, which the Cloud API does not caption.
fn media_body(to: &str, caption: &str, attachment: &Attachment) -> serde_json::Value {
    let kind = media_type(attachment.kind);
    let mut media = serde_json::json!({ "link": attachment.url });
    if attachment.kind != MediaKind::Audio && !caption.is_empty() {
        media["caption"] = serde_json::Value::String(caption.to_string());
    }
    let mut body = serde_json::json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": kind
    });
    body[kind] = media;
    body
}

fn media_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
        MediaKind::Document => "document",
        MediaKind::Audio => "audio",
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        self.post_message(to, text_body(to, text)).await
    }

    async fn send_media(&self, to: &str, caption: &str, attachment: &Attachment) -> Result<()> {
        self.post_message(to, media_body(to, caption, attachment)).await
    }
}
