//! HTTP transport with ambient cookie credentials.

mod connectivity;

pub use connectivity::HttpTransport;
