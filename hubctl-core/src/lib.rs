//! Hubctl Core
//!
//! Core types for the hub stack instance client.
//!
//! This crate contains:
//! - Domain types: the stack instance as returned by the hub API
//! - DTOs: request and response payloads exchanged with the hub API

pub mod domain;
pub mod dto;
