//! Typed order model and the normalization boundary for the order API payload.
//!
//! The warehouse API is inconsistent about key casing: the same record may
//! carry `codigo` or `Codigo`, `lotes` or `Lotes`. [`normalize_order`] is the
//! only place that looks at the raw payload; everything downstream works on
//! [`OrderLine`] and [`Lot`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::CheckError;

/// A manufacturing batch subdividing an order line's quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub code: String,
    pub manufactured: String,
    pub expires: String,
    pub quantity: u32,
}

/// One line item of a shipping document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_number: u32,
    pub item_code: String,
    pub unit_price: f64,
    pub unit_of_measure: String,
    pub quantity: u32,
    pub lots: Vec<Lot>,
}

impl OrderLine {
    /// Units this line contributes to the checklist.
    pub fn unit_count(&self) -> u32 {
        if self.lots.is_empty() {
            self.quantity
        } else {
            self.lots
                .iter()
                .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
        }
    }
}

const ITEMS_KEYS: &[&str] = &["itens", "Itens", "items", "Items"];

/// Most units one document may expand to. Every unit becomes a checklist
/// entry, so the payload's quantities are bounded before anything is built.
pub const MAX_ORDER_UNITS: u32 = 100_000;

/// Map a raw order API response into typed order lines.
///
/// Fails with [`CheckError::OrderNotFound`] when the payload carries no
/// non-empty items array, and with [`CheckError::OrderTooLarge`] when the
/// lines add up to more than [`MAX_ORDER_UNITS`].
pub fn normalize_order(payload: &Value) -> Result<Vec<OrderLine>, CheckError> {
    let items = ITEMS_KEYS
        .iter()
        .find_map(|k| payload.get(*k).and_then(Value::as_array))
        .filter(|a| !a.is_empty())
        .ok_or(CheckError::OrderNotFound)?;

    let lines: Vec<OrderLine> = items
        .iter()
        .map(|raw| normalize_line(raw.as_object().unwrap_or(&Map::new())))
        .collect();

    let units: u64 = lines
        .iter()
        .flat_map(|line| {
            let lots = line.lots.iter().map(|l| l.quantity);
            let bare = line.lots.is_empty().then_some(line.quantity);
            lots.chain(bare)
        })
        .map(u64::from)
        .sum();
    if units > u64::from(MAX_ORDER_UNITS) {
        return Err(CheckError::OrderTooLarge {
            units,
            limit: MAX_ORDER_UNITS,
        });
    }

    debug!(lines = lines.len(), units, "normalized order payload");
    Ok(lines)
}

fn normalize_line(raw: &Map<String, Value>) -> OrderLine {
    let lots = field(raw, "lotes")
        .and_then(Value::as_array)
        .map(|lots| {
            lots.iter()
                .map(|l| normalize_lot(l.as_object().unwrap_or(&Map::new())))
                .collect()
        })
        .unwrap_or_default();

    OrderLine {
        line_number: whole_units(number(field(raw, "nrItem"))),
        item_code: text(field(raw, "codigo")),
        unit_price: number(field(raw, "valor")),
        unit_of_measure: text(field(raw, "unidade")),
        quantity: whole_units(number(field(raw, "quantidade"))),
        lots,
    }
}

fn normalize_lot(raw: &Map<String, Value>) -> Lot {
    Lot {
        code: text(field(raw, "codigo")),
        manufactured: text(field(raw, "fabricacao")),
        expires: text(field(raw, "vencimento")),
        quantity: whole_units(number(field(raw, "quantidade"))),
    }
}

/// Look up `key` as written, falling back to its capitalized form.
/// A `null` under the preferred key counts as missing.
fn field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key)
        .filter(|v| !v.is_null())
        .or_else(|| raw.get(&capitalize(key)).filter(|v| !v.is_null()))
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Number of whole units a quantity expands to: `ceil(q)` for positive `q`.
fn whole_units(q: f64) -> u32 {
    if q > 0.0 {
        q.ceil().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lower_case_payload() {
        let payload = json!({
            "itens": [{
                "nrItem": 1,
                "codigo": "A1",
                "valor": 12.5,
                "unidade": "UN",
                "quantidade": 3,
                "lotes": []
            }]
        });
        let lines = normalize_order(&payload).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[0].item_code, "A1");
        assert_eq!(lines[0].unit_price, 12.5);
        assert_eq!(lines[0].unit_of_measure, "UN");
        assert_eq!(lines[0].quantity, 3);
        assert!(lines[0].lots.is_empty());
    }

    #[test]
    fn capitalized_payload() {
        let payload = json!({
            "itens": [{
                "NrItem": 2,
                "Codigo": "B2",
                "Valor": "7.25",
                "Unidade": "CX",
                "Quantidade": "3",
                "Lotes": [
                    {"Codigo": "L1", "Fabricacao": "2025-01-01", "Vencimento": "2027-01-01", "Quantidade": 2},
                    {"codigo": "L2", "fabricacao": "2025-02-01", "vencimento": "2027-02-01", "quantidade": "1"}
                ]
            }]
        });
        let lines = normalize_order(&payload).unwrap();
        let line = &lines[0];
        assert_eq!(line.item_code, "B2");
        assert_eq!(line.unit_price, 7.25);
        assert_eq!(line.quantity, 3);
        assert_eq!(line.lots.len(), 2);
        assert_eq!(line.lots[0].code, "L1");
        assert_eq!(line.lots[0].expires, "2027-01-01");
        assert_eq!(line.lots[1].quantity, 1);
        assert_eq!(line.unit_count(), 3);
    }

    #[test]
    fn lower_case_key_wins() {
        let payload = json!({"items": [{"codigo": "low", "Codigo": "UP", "quantidade": 1}]});
        let lines = normalize_order(&payload).unwrap();
        assert_eq!(lines[0].item_code, "low");
    }

    #[test]
    fn missing_fields_default() {
        let payload = json!({"itens": [{"quantidade": "abc", "lotes": "not-a-list"}]});
        let lines = normalize_order(&payload).unwrap();
        let line = &lines[0];
        assert_eq!(line.line_number, 0);
        assert_eq!(line.item_code, "");
        assert_eq!(line.unit_price, 0.0);
        assert_eq!(line.quantity, 0);
        assert!(line.lots.is_empty());
    }

    #[test]
    fn fractional_quantity_rounds_up() {
        let payload = json!({"itens": [{"codigo": "F", "quantidade": 2.5}]});
        assert_eq!(normalize_order(&payload).unwrap()[0].quantity, 3);
    }

    #[test]
    fn negative_quantity_is_zero() {
        let payload = json!({"itens": [{"codigo": "N", "quantidade": -4}]});
        assert_eq!(normalize_order(&payload).unwrap()[0].quantity, 0);
    }

    #[test]
    fn missing_items_is_not_found() {
        assert_eq!(
            normalize_order(&json!({})).unwrap_err(),
            CheckError::OrderNotFound
        );
        assert_eq!(
            normalize_order(&json!({"itens": []})).unwrap_err(),
            CheckError::OrderNotFound
        );
        assert_eq!(
            normalize_order(&json!({"itens": "x"})).unwrap_err(),
            CheckError::OrderNotFound
        );
    }

    #[test]
    fn null_items_key_falls_through() {
        let payload = json!({"itens": null, "items": [{"codigo": "A1", "quantidade": 1}]});
        let lines = normalize_order(&payload).unwrap();
        assert_eq!(lines[0].item_code, "A1");

        let payload = json!({"itens": "x", "Items": [{"codigo": "B2"}]});
        assert_eq!(normalize_order(&payload).unwrap()[0].item_code, "B2");
    }

    #[test]
    fn oversized_lots_are_rejected() {
        let payload = json!({"itens": [{
            "codigo": "X",
            "lotes": [
                {"codigo": "L1", "quantidade": 3_000_000_000u64},
                {"codigo": "L2", "quantidade": 3_000_000_000u64}
            ]
        }]});
        let err = normalize_order(&payload).unwrap_err();
        assert!(matches!(
            err,
            CheckError::OrderTooLarge { units, limit: MAX_ORDER_UNITS } if units > 5_000_000_000
        ));
    }

    #[test]
    fn order_total_is_bounded_across_lines() {
        let line = |q: u32| json!({"codigo": "X", "quantidade": q});
        let at_limit = json!({"itens": [line(60_000), line(40_000)]});
        assert_eq!(normalize_order(&at_limit).unwrap().len(), 2);

        let over = json!({"itens": [line(60_000), line(40_001)]});
        assert!(matches!(
            normalize_order(&over).unwrap_err(),
            CheckError::OrderTooLarge { units: 100_001, .. }
        ));
    }

    #[test]
    fn unit_count_saturates() {
        let lot = |quantity| Lot {
            code: "L".into(),
            manufactured: String::new(),
            expires: String::new(),
            quantity,
        };
        let line = OrderLine {
            line_number: 1,
            item_code: "X".into(),
            unit_price: 0.0,
            unit_of_measure: String::new(),
            quantity: 0,
            lots: vec![lot(u32::MAX), lot(5)],
        };
        assert_eq!(line.unit_count(), u32::MAX);
    }

    #[test]
    fn non_object_item_becomes_empty_line() {
        let payload = json!({"itens": [42]});
        let lines = normalize_order(&payload).unwrap();
        assert_eq!(lines[0].item_code, "");
        assert_eq!(lines[0].unit_count(), 0);
    }
}
