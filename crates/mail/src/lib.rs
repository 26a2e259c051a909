//! Mail integration: inbox search, chat-facing formatting, HTML
//! composition, and the outbound webhook transport.

pub mod compose;
pub mod format;
pub mod graph;
pub mod outbound;
pub mod provider;
pub mod timeexpr;

pub use compose::{compose, plain_text, ComposeData, ComposedEmail, EmailType};
pub use format::format_messages;
pub use graph::GraphMail;
pub use outbound::{OutboundEmail, WebhookSender};
pub use provider::{search, MailMessage, MailProvider};
pub use timeexpr::{resolve, ResolvedTime};
