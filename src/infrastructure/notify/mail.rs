use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::alert::{AlertEvent, Notifier};
use crate::shared::config::NotifyCfg;
use crate::shared::errors::NotifyError;

/// Alert mail ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub body: String,
}

impl MailMessage {
    /// HTML message with a minimal header block; there is no subject line
    pub fn to_mime(&self) -> String {
        let mut msg = String::from("MIME-version: 1.0;\nContent-Type: text/html; charset=\"UTF-8\";\r\n");
        msg.push_str(&format!("From: {}\r\n", self.from));
        msg.push_str(&format!("To: {}\r\n", self.to.join(";")));
        msg.push_str(&format!("\r\n{}\r\n", self.body));
        msg
    }
}

/// Composes an alert mail and queues it on the outbox channel.
///
/// The receiving half belongs to the mail submission side; this notifier
/// never waits on delivery.
#[derive(Clone)]
pub struct OutboxNotifier {
    from: String,
    to: Vec<String>,
    outbox: mpsc::UnboundedSender<MailMessage>,
}

impl OutboxNotifier {
    pub fn new(cfg: &NotifyCfg) -> (Self, mpsc::UnboundedReceiver<MailMessage>) {
        let (outbox, rx) = mpsc::unbounded_channel();
        let notifier = Self {
            from: cfg.from.clone(),
            to: cfg.to.clone(),
            outbox,
        };
        (notifier, rx)
    }

    pub fn compose(&self, event: &AlertEvent) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            body: event.message.clone(),
        }
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        self.outbox
            .send(self.compose(event))
            .map_err(|_| NotifyError::Closed)
    }
}
