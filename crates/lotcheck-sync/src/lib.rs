//! Remote collaborators of a check session: the warehouse order API, the
//! confirmation log, and the station that drives a session against both.

mod error;
mod station;

#[cfg(feature = "http")]
pub mod http;

pub use error::SyncError;
pub use station::{
    CheckStation, ConfirmationSink, DiscardLog, LoadSummary, Logged, OrderSource,
};

#[cfg(feature = "http")]
pub use http::{ConfirmationLog, OrderClient};
