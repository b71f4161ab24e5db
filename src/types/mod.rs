//! Shared data types: uploaded files and HTTP response schemas.

pub mod response;
pub mod upload;
