//! Integration tests for the Flexgen generation client

mod config_integration;
mod generation_flow;
mod http_transport;
mod test_utils;
