//! Stand-in for the real background-extraction pipeline.

use std::time::Duration;

use graxpert_mock::{OutboundEvent, ProcessImageRequest};

/// Pretends to process an image by waiting a fixed amount of time.
///
/// The wait is a timer suspension, not a blocking sleep, so other connections
/// keep being served. Once started it always runs to completion.
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    delay: Duration,
}

impl SimulatedProcessor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn process(&self, request: &ProcessImageRequest) -> OutboundEvent {
        tracing::debug!(
            filename = %request.filename,
            delay_ms = self.delay.as_millis() as u64,
            "Simulating background extraction"
        );
        tokio::time::sleep(self.delay).await;
        OutboundEvent::processed(&request.filename)
    }
}
