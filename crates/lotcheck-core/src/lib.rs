//! Core of the order check station: typed order model, checklist
//! reconciliation, progress aggregation, and the session state machine.
//!
//! Nothing in this crate performs I/O. Remote collaborators live in
//! `lotcheck-sync`, PDF rendering in `lotcheck-report`.

pub mod checklist;
pub mod client;
pub mod document;
pub mod error;
pub mod order;
pub mod progress;
pub mod record;
pub mod session;

pub use checklist::{CheckUnit, Checklist, LotRef, UnitKey};
pub use client::{Client, ClientDirectory};
pub use document::DocumentKey;
pub use error::{CheckError, ErrorKind};
pub use order::{Lot, MAX_ORDER_UNITS, OrderLine, normalize_order};
pub use progress::{ProgressRow, ReportRow, Totals};
pub use record::ConfirmationRecord;
pub use session::{BatchOutcome, Report, Request, ScanOutcome, Session, SessionState};
