//! Interaction layer for TaxSync: talks to the remote calculation service.

mod http_client;

pub use http_client::HttpStateSyncClient;
