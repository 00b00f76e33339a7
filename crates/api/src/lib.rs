pub mod client;
pub mod composition;
pub mod wire;

pub use client::ApiClient;
pub use composition::{
    Composition, ExecutionResult, Prose, Service, SimulationResult, ValidationResult,
};
pub use wire::{sensor_data, CompositionRequest};
