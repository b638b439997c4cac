//! One order check session: the loaded document, its checklist, and the
//! operator's position in the workflow.
//!
//! ```text
//! Empty -> Loaded -> (scans) -> Complete -> Exported -> Empty (reset)
//! ```
//!
//! All mutation of check units goes through [`Session::scan`] and
//! [`Session::confirm_batch`]. Remote calls are made by the caller; the
//! session only tracks that one is outstanding and refuses to change state
//! until it settles.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::progress::{self, ProgressRow, ReportRow, Totals};
use crate::{
    CheckError, Checklist, Client, ClientDirectory, ConfirmationRecord, DocumentKey, LotRef,
    OrderLine, UnitKey,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
    Complete,
    Exported,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loaded => "loaded",
            Self::Complete => "complete",
            Self::Exported => "exported",
        }
    }
}

/// A remote call the session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    OrderLookup,
    ConfirmationLog,
}

impl Request {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderLookup => "order lookup",
            Self::ConfirmationLog => "confirmation log write",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub lot: LotRef,
    pub unit: UnitKey,
    /// Units of this item+lot still to check.
    pub outstanding: usize,
    pub complete: bool,
    pub record: ConfirmationRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub lot: LotRef,
    pub confirmed: usize,
    pub outstanding: usize,
    pub complete: bool,
    pub record: ConfirmationRecord,
}

/// Content of the final confirmation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub document: String,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone)]
pub struct Session {
    document: Option<DocumentKey>,
    lines: Vec<OrderLine>,
    checklist: Checklist,
    active: Option<LotRef>,
    client: Client,
    in_flight: Option<Request>,
    exported: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ClientDirectory::default().default_client().clone())
    }
}

impl Session {
    pub fn new(client: Client) -> Self {
        Self {
            document: None,
            lines: Vec::new(),
            checklist: Checklist::default(),
            active: None,
            client,
            in_flight: None,
            exported: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.document.is_none() {
            SessionState::Empty
        } else if self.exported {
            SessionState::Exported
        } else if self.checklist.is_complete() {
            SessionState::Complete
        } else {
            SessionState::Loaded
        }
    }

    pub fn document(&self) -> Option<&DocumentKey> {
        self.document.as_ref()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn active_lot(&self) -> Option<&LotRef> {
        self.active.as_ref()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn in_flight(&self) -> Option<Request> {
        self.in_flight
    }

    /// Mark a remote call as outstanding.
    pub fn begin_request(&mut self, request: Request) -> Result<(), CheckError> {
        self.ensure_idle()?;
        self.in_flight = Some(request);
        Ok(())
    }

    pub fn end_request(&mut self) {
        self.in_flight = None;
    }

    pub fn set_client(&mut self, client: Client) -> Result<(), CheckError> {
        self.ensure_idle()?;
        info!(client = %client.name, "client selected");
        self.client = client;
        Ok(())
    }

    /// Replace whatever was loaded with a freshly fetched order.
    pub fn load(&mut self, document: DocumentKey, lines: Vec<OrderLine>) -> Result<(), CheckError> {
        self.ensure_idle()?;
        self.checklist = Checklist::build(&lines);
        info!(
            document = %document,
            lines = lines.len(),
            units = self.checklist.len(),
            "order loaded"
        );
        self.document = Some(document);
        self.lines = lines;
        self.active = None;
        self.exported = false;
        Ok(())
    }

    /// Discard the loaded order.
    pub fn reset(&mut self) -> Result<(), CheckError> {
        self.ensure_idle()?;
        self.document = None;
        self.lines.clear();
        self.checklist = Checklist::default();
        self.active = None;
        self.exported = false;
        Ok(())
    }

    /// Confirm one unit of whatever `code` resolves to.
    pub fn scan(&mut self, code: &str, now: DateTime<Utc>) -> Result<ScanOutcome, CheckError> {
        let code = self.prepare_code(code)?;
        let lot = self.checklist.resolve(code)?;
        let unit = self.checklist.check_one(&lot, now)?.key.clone();
        let outstanding = self.checklist.outstanding(&lot);
        debug!(unit = %unit, lot = %lot, outstanding, "unit checked");

        if outstanding == 0 && self.active.as_ref() == Some(&lot) {
            self.active = None;
        }
        let record = self.record(&lot, 1, now);
        Ok(ScanOutcome {
            lot,
            unit,
            outstanding,
            complete: self.checklist.is_complete(),
            record,
        })
    }

    /// Make the group `code` resolves to the target of the next batch.
    pub fn select_lot(&mut self, code: &str) -> Result<LotRef, CheckError> {
        let code = self.prepare_code(code)?;
        let lot = self.checklist.resolve(code)?;
        debug!(lot = %lot, outstanding = self.checklist.outstanding(&lot), "active lot selected");
        self.active = Some(lot.clone());
        Ok(lot)
    }

    pub fn clear_active_lot(&mut self) {
        self.active = None;
    }

    /// Confirm `quantity` units of the active lot in one step.
    pub fn confirm_batch(
        &mut self,
        quantity: &str,
        now: DateTime<Utc>,
    ) -> Result<BatchOutcome, CheckError> {
        self.ensure_idle()?;
        self.ensure_loaded()?;
        let lot = self.active.clone().ok_or(CheckError::NoActiveLot)?;
        let count = parse_quantity(quantity)?;

        let outstanding = self.checklist.check_many(&lot, count, now)?;
        info!(lot = %lot, confirmed = count, outstanding, "batch confirmed");
        if outstanding == 0 {
            self.active = None;
        }
        let record = self.record(&lot, count as u32, now);
        Ok(BatchOutcome {
            lot,
            confirmed: count,
            outstanding,
            complete: self.checklist.is_complete(),
            record,
        })
    }

    pub fn progress(&self) -> Vec<ProgressRow> {
        progress::aggregate(self.checklist.units())
    }

    /// Progress rows in display order.
    pub fn progress_for_display(&self) -> Vec<ProgressRow> {
        progress::display_order(self.progress())
    }

    pub fn totals(&self) -> Totals {
        progress::totals(&self.progress())
    }

    pub fn can_finalize(&self) -> bool {
        self.document.is_some() && self.totals().is_complete()
    }

    /// Build the report for a fully checked order.
    pub fn finalize(&self) -> Result<Report, CheckError> {
        let document = self.document.as_ref().ok_or(CheckError::NotLoaded)?;
        if !self.can_finalize() {
            return Err(CheckError::Incomplete {
                outstanding: self.checklist.outstanding_total(),
            });
        }
        Ok(Report {
            document: document.display.clone(),
            rows: progress::report_rows(self.checklist.units()),
        })
    }

    pub fn mark_exported(&mut self) {
        if self.document.is_some() {
            self.exported = true;
        }
    }

    fn ensure_idle(&self) -> Result<(), CheckError> {
        match self.in_flight {
            Some(request) => Err(CheckError::RequestInFlight(request)),
            None => Ok(()),
        }
    }

    fn ensure_loaded(&self) -> Result<(), CheckError> {
        if self.document.is_none() {
            return Err(CheckError::NotLoaded);
        }
        Ok(())
    }

    fn prepare_code<'a>(&self, code: &'a str) -> Result<&'a str, CheckError> {
        self.ensure_idle()?;
        self.ensure_loaded()?;
        let code = code.trim();
        if code.is_empty() {
            return Err(CheckError::EmptyScan);
        }
        Ok(code)
    }

    fn record(&self, lot: &LotRef, checked: u32, now: DateTime<Utc>) -> ConfirmationRecord {
        let document = self.document.as_ref().map(|d| d.display.as_str()).unwrap_or("");
        ConfirmationRecord::new(
            document,
            lot,
            self.checklist.expected(lot),
            checked,
            &self.client.owner_id,
            now,
        )
    }
}

fn parse_quantity(input: &str) -> Result<usize, CheckError> {
    match input.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CheckError::InvalidQuantity(input.trim().to_string())),
    }
}
