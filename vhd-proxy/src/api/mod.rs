//! HTTP API handlers for vhd-proxy

pub mod examples;
pub mod health;
pub mod proxy;

pub use examples::example_routes;
pub use health::health_routes;
pub use proxy::proxy_routes;
