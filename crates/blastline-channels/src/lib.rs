//! # Blastline Channels
//! Outbound message channel implementations.

pub mod console;
pub mod whatsapp;

pub use console::ConsoleSender;
pub use whatsapp::WhatsAppSender;
