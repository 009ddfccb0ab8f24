use std::sync::Arc;

use async_nats::jetstream::Message;
use tracing::{debug, error, warn};

use homelink_domain::{DeviceService, DomainError, HomeAssignment};

use crate::consumer::{BatchProcessor, ProcessingResult};

/// Create a [`BatchProcessor`] that applies home-assignment messages
/// through the device service, one message at a time.
pub fn create_assignment_processor(service: Arc<DeviceService>) -> BatchProcessor {
    Box::new(move |messages: &[Message]| {
        let service = Arc::clone(&service);

        // Extract payloads before moving into the async block; Message
        // borrows from the slice.
        let payloads: Vec<(usize, Vec<u8>)> = messages
            .iter()
            .enumerate()
            .map(|(idx, msg)| (idx, msg.payload.to_vec()))
            .collect();

        Box::pin(async move { Ok(process_assignments(&service, payloads).await) })
    })
}

/// Apply each assignment payload independently. A bad payload or a failed
/// write affects only its own message, never the rest of the batch.
///
/// Disposition: undecodable payloads and validation failures are acked and
/// dropped (redelivery cannot fix them); storage failures are nak'd so the
/// transport may redeliver.
pub async fn process_assignments(
    service: &DeviceService,
    payloads: Vec<(usize, Vec<u8>)>,
) -> ProcessingResult {
    let mut ack = Vec::new();
    let mut nak = Vec::new();

    for (idx, payload) in payloads {
        let assignment: HomeAssignment = match serde_json::from_slice(&payload) {
            Ok(assignment) => assignment,
            Err(e) => {
                error!(
                    error = %e,
                    index = idx,
                    "Failed to decode home-assignment message, dropping"
                );
                ack.push(idx);
                continue;
            }
        };

        let device_id = assignment.id.clone();
        match service.assign_home(assignment).await {
            Ok(()) => {
                debug!(device_id = %device_id, index = idx, "Applied home assignment");
                ack.push(idx);
            }
            Err(DomainError::StorageFailure(e)) => {
                warn!(
                    error = %e,
                    device_id = %device_id,
                    index = idx,
                    "Storage failure applying home assignment"
                );
                nak.push((idx, Some(e.to_string())));
            }
            Err(e) => {
                error!(
                    error = %e,
                    device_id = %device_id,
                    index = idx,
                    "Rejected home-assignment message, dropping"
                );
                ack.push(idx);
            }
        }
    }

    ProcessingResult::new(ack, nak)
}
