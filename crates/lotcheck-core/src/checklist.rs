//! Per-unit checklist: expansion of order lines into check units and
//! resolution of scanned codes against them.
//!
//! Every unit of expected quantity is tracked on its own. A line with lots
//! yields one unit per lot quantity; a line without lots yields one unit per
//! line quantity, using the item code as its lot.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{CheckError, OrderLine};

/// Unique identifier of a check unit within one checklist.
///
/// The index comes from a single counter for the whole checklist, so two
/// lots sharing a code never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitKey {
    pub code: String,
    pub index: usize,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.code, self.index)
    }
}

/// One indivisible unit of expected quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckUnit {
    pub key: UnitKey,
    pub item: String,
    /// Lot code, or the item code when the line carries no lots.
    pub lot: String,
    pub expected: u32,
    pub checked: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckUnit {
    pub fn is_outstanding(&self) -> bool {
        self.checked < self.expected
    }

    fn matches(&self, lot_ref: &LotRef) -> bool {
        self.item == lot_ref.item && self.lot == lot_ref.lot
    }
}

/// An item+lot group a scan resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotRef {
    pub item: String,
    pub lot: String,
}

impl fmt::Display for LotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.item == self.lot {
            f.write_str(&self.item)
        } else {
            write!(f, "{} / lot {}", self.item, self.lot)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checklist {
    units: Vec<CheckUnit>,
}

impl Checklist {
    /// Expand order lines into a fresh checklist.
    pub fn build(lines: &[OrderLine]) -> Self {
        let mut units = Vec::new();
        let mut next_index = 0usize;
        let mut push = |code: &str, item: &str| {
            units.push(CheckUnit {
                key: UnitKey {
                    code: code.to_string(),
                    index: next_index,
                },
                item: item.to_string(),
                lot: code.to_string(),
                expected: 1,
                checked: 0,
                updated_at: None,
            });
            next_index += 1;
        };

        for line in lines {
            if line.lots.is_empty() {
                for _ in 0..line.quantity {
                    push(&line.item_code, &line.item_code);
                }
            } else {
                for lot in &line.lots {
                    for _ in 0..lot.quantity {
                        push(&lot.code, &line.item_code);
                    }
                }
            }
        }

        debug!(units = units.len(), "built checklist");
        Self { units }
    }

    pub fn units(&self) -> &[CheckUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// True once every unit is checked. An empty checklist is never complete.
    pub fn is_complete(&self) -> bool {
        !self.units.is_empty() && self.units.iter().all(|u| !u.is_outstanding())
    }

    pub fn outstanding_total(&self) -> usize {
        self.units.iter().filter(|u| u.is_outstanding()).count()
    }

    pub fn outstanding(&self, lot_ref: &LotRef) -> usize {
        self.units
            .iter()
            .filter(|u| u.matches(lot_ref) && u.is_outstanding())
            .count()
    }

    /// Expected units in an item+lot group, checked or not.
    pub fn expected(&self, lot_ref: &LotRef) -> u32 {
        self.units
            .iter()
            .filter(|u| u.matches(lot_ref))
            .map(|u| u.expected)
            .sum()
    }

    /// Resolve a scanned code to the item+lot group it refers to.
    ///
    /// Lot codes win over item codes. An item code resolves only when its
    /// outstanding units sit in a single lot.
    pub fn resolve(&self, code: &str) -> Result<LotRef, CheckError> {
        if let Some(unit) = self
            .units
            .iter()
            .find(|u| u.lot == code && u.is_outstanding())
        {
            return Ok(LotRef {
                item: unit.item.clone(),
                lot: unit.lot.clone(),
            });
        }

        let mut lots: Vec<&str> = Vec::new();
        for unit in self
            .units
            .iter()
            .filter(|u| u.item == code && u.is_outstanding())
        {
            if !lots.contains(&unit.lot.as_str()) {
                lots.push(&unit.lot);
            }
        }
        match lots.as_slice() {
            [lot] => {
                return Ok(LotRef {
                    item: code.to_string(),
                    lot: lot.to_string(),
                });
            }
            [] => {}
            _ => {
                return Err(CheckError::AmbiguousItem {
                    item: code.to_string(),
                    lots: lots.iter().map(|l| l.to_string()).collect(),
                });
            }
        }

        if self.units.iter().any(|u| u.lot == code || u.item == code) {
            Err(CheckError::AlreadyChecked(code.to_string()))
        } else {
            Err(CheckError::UnknownCode(code.to_string()))
        }
    }

    /// Check the first outstanding unit of `lot_ref`.
    pub fn check_one(
        &mut self,
        lot_ref: &LotRef,
        now: DateTime<Utc>,
    ) -> Result<&CheckUnit, CheckError> {
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.matches(lot_ref) && u.is_outstanding())
            .ok_or_else(|| CheckError::AlreadyChecked(lot_ref.lot.clone()))?;
        unit.checked += 1;
        unit.updated_at = Some(now);
        Ok(&*unit)
    }

    /// Check the first `count` outstanding units of `lot_ref`, or none at all.
    pub fn check_many(
        &mut self,
        lot_ref: &LotRef,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<usize, CheckError> {
        let available = self.outstanding(lot_ref);
        if available < count {
            return Err(CheckError::InsufficientUnits {
                lot: lot_ref.lot.clone(),
                available,
                requested: count,
            });
        }

        for unit in self
            .units
            .iter_mut()
            .filter(|u| u.matches(lot_ref) && u.is_outstanding())
            .take(count)
        {
            unit.checked += 1;
            unit.updated_at = Some(now);
        }
        Ok(available - count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lot;

    fn line(item: &str, quantity: u32, lots: &[(&str, u32)]) -> OrderLine {
        OrderLine {
            line_number: 1,
            item_code: item.into(),
            unit_price: 0.0,
            unit_of_measure: "UN".into(),
            quantity,
            lots: lots
                .iter()
                .map(|(code, q)| Lot {
                    code: (*code).into(),
                    manufactured: String::new(),
                    expires: String::new(),
                    quantity: *q,
                })
                .collect(),
        }
    }

    fn lot(item: &str, lot: &str) -> LotRef {
        LotRef {
            item: item.into(),
            lot: lot.into(),
        }
    }

    #[test]
    fn line_without_lots_uses_item_as_lot() {
        let list = Checklist::build(&[line("A1", 3, &[])]);
        assert_eq!(list.len(), 3);
        assert!(list.units().iter().all(|u| u.lot == "A1" && u.item == "A1"));
        assert!(list.units().iter().all(|u| u.expected == 1 && u.checked == 0));
    }

    #[test]
    fn unit_count_matches_lot_quantities() {
        let lines = [
            line("B2", 99, &[("L1", 2), ("L2", 1)]),
            line("C3", 4, &[]),
            line("D4", 5, &[("L9", 0)]),
        ];
        let list = Checklist::build(&lines);
        assert_eq!(list.len(), 3 + 4);
        let expected: u32 = lines.iter().map(OrderLine::unit_count).sum();
        assert_eq!(list.len() as u32, expected);
    }

    #[test]
    fn keys_unique_when_lot_codes_repeat() {
        let list = Checklist::build(&[line("X", 0, &[("L", 2)]), line("Y", 0, &[("L", 2)])]);
        let keys: Vec<String> = list.units().iter().map(|u| u.key.to_string()).collect();
        assert_eq!(keys, ["L-0", "L-1", "L-2", "L-3"]);
    }

    #[test]
    fn resolve_prefers_lot_code() {
        let list = Checklist::build(&[line("B2", 0, &[("L1", 2), ("L2", 1)])]);
        assert_eq!(list.resolve("L2").unwrap(), lot("B2", "L2"));
    }

    #[test]
    fn resolve_item_with_several_lots_is_ambiguous() {
        let list = Checklist::build(&[line("B2", 0, &[("L1", 2), ("L2", 1)])]);
        assert_eq!(
            list.resolve("B2").unwrap_err(),
            CheckError::AmbiguousItem {
                item: "B2".into(),
                lots: vec!["L1".into(), "L2".into()],
            }
        );
    }

    #[test]
    fn resolve_item_with_single_outstanding_lot() {
        let mut list = Checklist::build(&[line("B2", 0, &[("L1", 1), ("L2", 1)])]);
        let now = Utc::now();
        list.check_one(&lot("B2", "L1"), now).unwrap();
        assert_eq!(list.resolve("B2").unwrap(), lot("B2", "L2"));
    }

    #[test]
    fn resolve_unknown_and_exhausted_codes() {
        let mut list = Checklist::build(&[line("A1", 1, &[])]);
        assert_eq!(
            list.resolve("ZZ").unwrap_err(),
            CheckError::UnknownCode("ZZ".into())
        );
        list.check_one(&lot("A1", "A1"), Utc::now()).unwrap();
        assert_eq!(
            list.resolve("A1").unwrap_err(),
            CheckError::AlreadyChecked("A1".into())
        );
    }

    #[test]
    fn check_one_never_exceeds_expected() {
        let mut list = Checklist::build(&[line("A1", 2, &[])]);
        let target = lot("A1", "A1");
        list.check_one(&target, Utc::now()).unwrap();
        list.check_one(&target, Utc::now()).unwrap();
        assert!(list.check_one(&target, Utc::now()).is_err());
        assert!(list.units().iter().all(|u| u.checked <= u.expected));
        assert!(list.is_complete());
    }

    #[test]
    fn check_many_is_all_or_nothing() {
        let mut list = Checklist::build(&[line("B2", 0, &[("L1", 2)])]);
        let target = lot("B2", "L1");
        let err = list.check_many(&target, 3, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            CheckError::InsufficientUnits {
                lot: "L1".into(),
                available: 2,
                requested: 3,
            }
        );
        assert_eq!(list.outstanding(&target), 2);

        let left = list.check_many(&target, 2, Utc::now()).unwrap();
        assert_eq!(left, 0);
        assert!(list.is_complete());
    }

    #[test]
    fn empty_checklist_is_not_complete() {
        let list = Checklist::build(&[line("A1", 0, &[])]);
        assert!(list.is_empty());
        assert!(!list.is_complete());
    }
}
