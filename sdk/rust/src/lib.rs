//! Client for the canary controller HTTP API.

pub mod client;

pub use client::{CanaryClient, ClientError, CookieDecision, VersionedRecord};
