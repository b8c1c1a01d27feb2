use color_eyre::eyre::Result;

/// Port trait for publishing jobs to an out-of-process worker queue.
///
/// `send_message` returns `Ok` only after the broker has confirmed the
/// message; it says nothing about whether the job ran. Implementations live in
/// `services::producer` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MessageProducer: Send + Sync {
    async fn send_message(&self, queue: &str, message: Vec<u8>) -> Result<()>;
}
