//! hello-lambda workspace - end-to-end tests for the function and its telemetry client.
//!
//! This is a virtual package that only hosts workspace-level integration tests.
//! The functionality lives in the member crates:
//!
//! - `lambda-telemetry`: dataset-labelled telemetry client with drop-based shutdown
//! - `hello-lambda`: the API Gateway proxy handler, its middleware and the `hello` binary
