use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, eyre};
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties};

use crate::ports::queue::MessageProducer;

/// Publishes messages to an AMQP broker.
///
/// Every call opens its own connection, declares the target queue as
/// durable and publishes with publisher confirms on. After a confirmed
/// publish the connection closes `close_delay` later on a detached task; on
/// failure it is closed before the error is returned. Connections are not
/// pooled.
pub struct AmqpProducer {
    amqp_url: String,
    close_delay: Duration,
}

impl AmqpProducer {
    pub fn new(amqp_url: String, close_delay: Duration) -> Self {
        Self {
            amqp_url,
            close_delay,
        }
    }
}

#[async_trait::async_trait]
impl MessageProducer for AmqpProducer {
    async fn send_message(&self, queue: &str, message: Vec<u8>) -> Result<()> {
        let connection = Connection::connect(&self.amqp_url, ConnectionProperties::default())
            .await
            .wrap_err("Failed to connect to message broker")?;

        if let Err(e) = publish(&connection, queue, &message).await {
            if let Err(close_err) = connection.close(200, "OK").await {
                tracing::warn!(error = %close_err, "Failed to close broker connection");
            }
            return Err(e);
        }

        tracing::debug!(queue, bytes = message.len(), "Published message");

        let close_delay = self.close_delay;
        tokio::spawn(async move {
            tokio::time::sleep(close_delay).await;
            if let Err(e) = connection.close(200, "OK").await {
                tracing::warn!(error = %e, "Failed to close broker connection");
            }
        });

        Ok(())
    }
}

async fn publish(connection: &Connection, queue: &str, message: &[u8]) -> Result<()> {
    let channel = connection
        .create_channel()
        .await
        .wrap_err("Failed to open broker channel")?;

    channel
        .confirm_select(ConfirmSelectOptions::default())
        .await
        .wrap_err("Failed to enable publisher confirms")?;

    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .wrap_err_with(|| format!("Failed to declare queue {}", queue))?;

    let confirmation = channel
        .basic_publish(
            "",
            queue,
            BasicPublishOptions::default(),
            message,
            // 2 = persistent
            BasicProperties::default().with_delivery_mode(2),
        )
        .await
        .wrap_err_with(|| format!("Failed to publish to queue {}", queue))?
        .await
        .wrap_err_with(|| format!("Broker did not confirm publish to queue {}", queue))?;

    check_confirmation(queue, confirmation)
}

fn check_confirmation(queue: &str, confirmation: Confirmation) -> Result<()> {
    if confirmation.is_nack() {
        return Err(eyre!("Broker rejected message for queue {}", queue));
    }
    Ok(())
}
