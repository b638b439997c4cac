//! Per item+lot view of the checklist.
//!
//! Everything here is derived from the check units on demand; no totals are
//! stored anywhere else.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::CheckUnit;

/// Expected vs. checked units for one item+lot group.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub item: String,
    pub lot: String,
    pub expected: u32,
    pub checked: u32,
    pub touched: bool,
    pub last_update: Option<DateTime<Utc>>,
}

impl ProgressRow {
    pub fn is_complete(&self) -> bool {
        self.checked >= self.expected
    }

    fn rank(&self) -> u8 {
        match (self.touched, self.is_complete()) {
            (true, false) => 0,
            (_, true) => 1,
            (false, false) => 2,
        }
    }
}

/// One line of the exported report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub item: String,
    pub lot: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub expected: u32,
    pub checked: u32,
}

impl Totals {
    pub fn outstanding(&self) -> u32 {
        self.expected.saturating_sub(self.checked)
    }

    /// Finalizing is allowed only with something to check and nothing left.
    pub fn is_complete(&self) -> bool {
        self.expected > 0 && self.checked == self.expected
    }
}

/// Group units by item+lot, in order of first appearance.
pub fn aggregate(units: &[CheckUnit]) -> Vec<ProgressRow> {
    let mut rows: Vec<ProgressRow> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for unit in units {
        let slot = *index
            .entry((unit.item.as_str(), unit.lot.as_str()))
            .or_insert_with(|| {
                rows.push(ProgressRow {
                    item: unit.item.clone(),
                    lot: unit.lot.clone(),
                    expected: 0,
                    checked: 0,
                    touched: false,
                    last_update: None,
                });
                rows.len() - 1
            });
        let row = &mut rows[slot];
        row.expected += unit.expected;
        row.checked += unit.checked;
        row.touched = row.checked > 0;
        row.last_update = row.last_update.max(unit.updated_at);
    }
    rows
}

/// Sort rows for display: in-progress groups first, then complete ones,
/// then untouched ones; most recently updated first within each band.
pub fn display_order(mut rows: Vec<ProgressRow>) -> Vec<ProgressRow> {
    rows.sort_by(|a, b| {
        a.rank()
            .cmp(&b.rank())
            .then_with(|| b.last_update.cmp(&a.last_update))
    });
    rows
}

pub fn totals(rows: &[ProgressRow]) -> Totals {
    rows.iter().fold(Totals::default(), |acc, r| Totals {
        expected: acc.expected + r.expected,
        checked: acc.checked + r.checked,
    })
}

pub fn report_rows(units: &[CheckUnit]) -> Vec<ReportRow> {
    aggregate(units)
        .into_iter()
        .map(|r| ReportRow {
            item: r.item,
            lot: r.lot,
            quantity: r.expected,
        })
        .collect()
}
