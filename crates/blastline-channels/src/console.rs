//! Console channel — prints instead of sending. Useful for dry runs and
//! local development without WhatsApp credentials.

use async_trait::async_trait;

use blastline_core::campaign::Attachment;
use blastline_core::error::Result;
use blastline_core::traits::MessageSender;

pub struct ConsoleSender;

#[async_trait]
impl MessageSender for ConsoleSender {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        tracing::info!("📨 [console] → {to}: {text}");
        Ok(())
    }

    async fn send_media(&self, to: &str, caption: &str, attachment: &Attachment) -> Result<()> {
        tracing::info!(
            "📨 [console] → {to}: {caption} ({:?} {})",
            attachment.kind,
            attachment.url
        );
        Ok(())
    }
}
