//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{from_response, from_storage, from_transport};
