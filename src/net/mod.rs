//! Network layer: wire types, the transport seam, and the intercepting
//! HTTP client wrapper.

pub mod http;
pub mod transport;
pub mod types;

pub use http::HttpClient;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
