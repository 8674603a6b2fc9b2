//! Vision service abstraction
//!
//! Providers implement [`VisionClient`]; the pipeline only sees the trait and
//! the tagged [`OperationResponse`] it returns.

mod client;
mod error;
pub mod google;
mod image;
mod lazy;
mod mock;
mod operation;
mod operation_macro;
mod response;

pub use client::VisionClient;
pub use error::VisionError;
pub use google::GoogleVisionClient;
pub use image::ImageSource;
pub use lazy::LazyVisionClient;
pub use mock::MockVisionClient;
pub use operation::{expand_operations, DetectionOperation};
pub use response::OperationResponse;
