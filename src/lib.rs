// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// that harnesses can import types via `k53prep::store::*` / `k53prep::telemetry::*`.
// Most code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

// Public: used directly by tests and benchmarks
pub mod config;
pub mod gateway;
pub mod router;
pub mod session;
pub mod store;
pub mod telemetry;

// Private: required transitively (the profile view borrows the app's form types)
mod app;
mod event;
mod logging;
mod ui;
