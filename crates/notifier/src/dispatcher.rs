use std::sync::Arc;

use eyre::Result;
use slotbook_core::notifications::Notification;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{error, info};

use crate::{mailer::Mailer, messages::Composer};

/// Consumes the outbox and delivers one email per notification.
///
/// Delivery is best effort: a failed send is logged and the next
/// notification is processed. Nothing is retried.
pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    composer: Composer,
}

impl Dispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, composer: Composer) -> Self {
        Self { mailer, composer }
    }

    /// Compose and send a single notification.
    pub async fn deliver(&self, notification: &Notification) -> Result<()> {
        let message = self.composer.compose(notification);
        self.mailer.send(&message).await?;
        info!(
            "Sent {} notification for {} to {}",
            notification.kind(),
            notification.appointment().short_id,
            message.to
        );
        Ok(())
    }

    /// Process notifications until every sender has been dropped.
    pub async fn run(self, mut receiver: UnboundedReceiver<Notification>) {
        while let Some(notification) = receiver.recv().await {
            if let Err(e) = self.deliver(&notification).await {
                error!(
                    "Failed to send {} notification for {}: {:?}",
                    notification.kind(),
                    notification.appointment().short_id,
                    e
                );
            }
        }
        info!("Notification queue closed, dispatcher stopping");
    }

    pub fn spawn(self, receiver: UnboundedReceiver<Notification>) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver))
    }
}
