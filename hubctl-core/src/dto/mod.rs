//! Data Transfer Objects for the hub API
//!
//! Request and response bodies that are not full domain entities: creation
//! requests, patches, lifecycle command responses and secret payloads.

pub mod instance;
pub mod secret;
