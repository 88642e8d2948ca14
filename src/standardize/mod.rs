//! Response standardization: format detection, section parsing, smart
//! limiting and metadata, wrapped into one envelope per tool call.

pub mod detect;
pub mod envelope;
pub mod error;
pub mod limiter;
pub mod metadata;
pub mod parsers;
pub mod render;
pub mod standardizer;

pub use envelope::{
    DetectedFormat, Envelope, ErrorInfo, Metadata, RawPayload, ResponseFormat, Standardized,
    Status, TokenBreakdown,
};
pub use error::StandardizeError;
pub use standardizer::{ResponseStandardizer, StandardizeRequest};
