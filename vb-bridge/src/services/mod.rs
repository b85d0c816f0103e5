//! Outbound vision provider services

pub mod read_poller;
pub mod vision_client;

pub use read_poller::{ReadOutcome, ReadPoller};
pub use vision_client::{
    build_http_client, OperationLocation, ProviderJson, ProviderStage, ReadStatus, VisionClient,
    VisionError,
};
