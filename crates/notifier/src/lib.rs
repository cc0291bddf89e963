//! Email delivery for appointment notifications.
//!
//! The API enqueues [`Notification`]s on an [`Outbox`]; this crate owns the
//! receiving half, turns each notification into a plain-text email and hands
//! it to a [`mailer::Mailer`].
//!
//! [`Notification`]: slotbook_core::notifications::Notification
//! [`Outbox`]: slotbook_core::notifications::Outbox

use std::sync::Arc;

use eyre::Result;
use slotbook_core::notifications::Notification;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::info;

pub mod config;
pub mod dispatcher;
pub mod mailer;
pub mod messages;

use crate::{
    config::NotifierConfig,
    dispatcher::Dispatcher,
    mailer::{LogMailer, Mailer, SmtpMailer},
    messages::Composer,
};

/// Start the notification dispatcher on its own task.
///
/// Picks the SMTP mailer when SMTP is configured and the log mailer
/// otherwise, then consumes `receiver` until every sender is dropped.
///
/// # Arguments
///
/// * `config` - The notifier configuration
/// * `receiver` - Receiving half of the outbox channel
///
/// # Returns
///
/// * `Ok(handle)` of the running dispatcher task
/// * `Err` if the SMTP transport could not be built
pub fn start_dispatcher(
    config: &NotifierConfig,
    receiver: UnboundedReceiver<Notification>,
) -> Result<JoinHandle<()>> {
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(settings) => {
            info!(
                "Sending notifications through SMTP relay {}:{}",
                settings.host, settings.port
            );
            Arc::new(SmtpMailer::new(settings)?)
        }
        None => {
            info!("SMTP_HOST not set, notifications will only be logged");
            Arc::new(LogMailer)
        }
    };

    let composer = Composer::new(config.frontend_url.clone());
    Ok(Dispatcher::new(mailer, composer).spawn(receiver))
}
