//! Core domain types
//!
//! This module contains the structures decoded from the hub API. They are
//! shared between the client (which fetches and mutates them) and the CLI
//! (which renders them).

pub mod files;
pub mod instance;
pub mod operation;
pub mod status;
pub mod value;
