mod assignment_processor;
mod client;
mod consumer;

pub use assignment_processor::{create_assignment_processor, process_assignments};
pub use client::NatsClient;
pub use consumer::{AssignmentConsumer, BatchProcessor, ProcessingResult};
