//! The check station: a [`Session`] wired to its remote collaborators.
//!
//! The session is marked in flight for the duration of every remote call.
//! Order lookups apply nothing until the payload has been fetched and
//! normalized. Confirmation log writes happen after the local update and
//! are best-effort: a failed write is reported, not rolled back.

use async_trait::async_trait;
use chrono::Utc;
use lotcheck_core::{
    BatchOutcome, ConfirmationRecord, DocumentKey, LotRef, Request, ScanOutcome, Session,
    normalize_order,
};
use tracing::{debug, info, warn};

use crate::SyncError;

/// Source of raw order payloads, keyed by document number and owner.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_order(
        &self,
        document: &str,
        owner: &str,
    ) -> Result<serde_json::Value, SyncError>;
}

/// Append-only sink for confirmation events.
#[async_trait]
pub trait ConfirmationSink: Send + Sync {
    async fn record(&self, record: &ConfirmationRecord) -> Result<(), SyncError>;
}

#[async_trait]
impl<T: ConfirmationSink + ?Sized> ConfirmationSink for Box<T> {
    async fn record(&self, record: &ConfirmationRecord) -> Result<(), SyncError> {
        (**self).record(record).await
    }
}

/// Sink used when no confirmation log is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardLog;

#[async_trait]
impl ConfirmationSink for DiscardLog {
    async fn record(&self, record: &ConfirmationRecord) -> Result<(), SyncError> {
        debug!(document = %record.document, lot = %record.lot, "confirmation log disabled");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub document: DocumentKey,
    pub lines: usize,
    pub units: usize,
}

/// A local outcome plus whether its log entry reached the remote log.
#[derive(Debug, Clone, PartialEq)]
pub struct Logged<T> {
    pub outcome: T,
    pub logged: bool,
}

pub struct CheckStation<O, L> {
    orders: O,
    log: L,
    session: Session,
}

impl<O: OrderSource, L: ConfirmationSink> CheckStation<O, L> {
    pub fn new(orders: O, log: L, session: Session) -> Self {
        Self {
            orders,
            log,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Fetch the order for `input` and load it, replacing any current order.
    ///
    /// Nothing is changed when the lookup fails.
    pub async fn search(&mut self, input: &str) -> Result<LoadSummary, SyncError> {
        let document = DocumentKey::parse(input)?;
        self.session.begin_request(Request::OrderLookup)?;
        let owner = self.session.client().owner_id.clone();

        info!(document = %document.lookup, owner = %owner, "looking up order");
        let fetched = self.orders.fetch_order(&document.lookup, &owner).await;
        self.session.end_request();

        let lines = normalize_order(&fetched?)?;
        let summary = LoadSummary {
            document: document.clone(),
            lines: lines.len(),
            units: lines.iter().map(|l| l.unit_count() as usize).sum(),
        };
        self.session.load(document, lines)?;
        Ok(summary)
    }

    /// Confirm one unit for a scanned code and log it.
    pub async fn scan(&mut self, code: &str) -> Result<Logged<ScanOutcome>, SyncError> {
        let outcome = self.session.scan(code, Utc::now())?;
        let logged = self.write_log(&outcome.record).await;
        Ok(Logged { outcome, logged })
    }

    pub fn select_lot(&mut self, code: &str) -> Result<LotRef, SyncError> {
        Ok(self.session.select_lot(code)?)
    }

    /// Confirm `quantity` units of the active lot with a single log entry.
    pub async fn confirm(&mut self, quantity: &str) -> Result<Logged<BatchOutcome>, SyncError> {
        let outcome = self.session.confirm_batch(quantity, Utc::now())?;
        let logged = self.write_log(&outcome.record).await;
        Ok(Logged { outcome, logged })
    }

    async fn write_log(&mut self, record: &ConfirmationRecord) -> bool {
        if let Err(e) = self.session.begin_request(Request::ConfirmationLog) {
            warn!(error = %e, "confirmation log skipped");
            return false;
        }
        let result = self.log.record(record).await;
        self.session.end_request();

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    document = %record.document,
                    item = %record.item,
                    lot = %record.lot,
                    checked = record.checked,
                    "confirmation log write failed"
                );
                false
            }
        }
    }
}
