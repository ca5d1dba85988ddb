pub mod executor;
pub mod response_builder;
pub mod service;
pub mod types;

pub use executor::{build_headers, encode_body, execute_request, parse_method};
pub use response_builder::{build_response, collect_headers, parse_body, ResponseBuildParams};
pub use service::{HttpProxyService, ProxyFuture, ProxyService};
pub use types::*;
