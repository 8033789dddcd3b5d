//! Integration tests against a server bound to a local port

mod api_tests;
mod client_tests;
mod common;
