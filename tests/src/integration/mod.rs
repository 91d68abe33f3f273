//! # Integration Flows
//!
//! End-to-end scenarios: a real relay (runtime, gateway, reqwest upstream
//! client, file-backed permissions) in front of an in-process mock upstream.

#[cfg(test)]
pub mod support;

pub mod discovery_flows;
pub mod publish_flows;
pub mod refresh_flows;
