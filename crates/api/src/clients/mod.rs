//! HTTP clients for the external collaborators.

pub mod extraction;
pub mod stamper;

pub use extraction::HttpExtractor;
pub use stamper::HttpStamper;
