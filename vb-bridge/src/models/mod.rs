//! Request and provider data types

pub mod features;
pub mod read_operation;

pub use features::{FeatureParam, FeatureSelection, UnknownFeature, VisualFeature};
pub use read_operation::{OperationStatus, ReadLine, ReadOperation};
