//! Port implementations: the REST client, the in-memory sandbox and the scripted gateway.

pub mod gateway;
pub mod http;
pub mod in_memory;
