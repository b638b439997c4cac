//! Terminal rendering of orders, progress, and outcomes.

use lotcheck_core::{Client, OrderLine, ProgressRow, Session, Totals};

// ── Orders ──

/// Print the normalized order lines with their lots.
pub fn print_order(lines: &[OrderLine]) {
    println!(
        "  {:>4}  {:<18} {:>6} {:<4} {:>10}",
        "#", "item", "qty", "unit", "price"
    );
    for line in lines {
        println!(
            "  {:>4}  {:<18} {:>6} {:<4} {:>10.2}",
            line.line_number, line.item_code, line.quantity, line.unit_of_measure, line.unit_price
        );
        for lot in &line.lots {
            println!(
                "        lot {:<14} {:>6}  made {}  expires {}",
                lot.code,
                lot.quantity,
                dash_if_empty(&lot.manufactured),
                dash_if_empty(&lot.expires)
            );
        }
    }
}

// ── Progress ──

pub fn print_progress(session: &Session) {
    let rows = session.progress_for_display();
    if rows.is_empty() {
        println!("  (nothing to check)");
        return;
    }

    println!("  {:<18} {:<18} {:>9} {:>9}", "item", "lot", "expected", "checked");
    for row in &rows {
        println!(
            "{} {:<18} {:<18} {:>9} {:>9}",
            marker(row),
            row.item,
            row.lot,
            row.expected,
            format!("{}/{}", row.checked, row.expected)
        );
    }
    print_totals(&session.totals());
    if let Some(lot) = session.active_lot() {
        println!(
            "  active lot: {lot} ({} outstanding)",
            session.checklist().outstanding(lot)
        );
    }
}

pub fn print_totals(totals: &Totals) {
    if totals.is_complete() {
        println!("  {}/{} checked. Ready to finish.", totals.checked, totals.expected);
    } else {
        println!(
            "  {}/{} checked, {} pending.",
            totals.checked,
            totals.expected,
            totals.outstanding()
        );
    }
}

fn marker(row: &ProgressRow) -> &'static str {
    if row.is_complete() {
        " ✓"
    } else if row.touched {
        " ~"
    } else {
        "  "
    }
}

// ── Clients ──

pub fn print_clients(clients: &[Client], selected: Option<&Client>) {
    for client in clients {
        let mark = if Some(client) == selected { "*" } else { " " };
        println!("  {mark} {:<16} {}", client.name, client.owner_id);
    }
}

/// Short prompt reflecting where the session is.
pub fn prompt(session: &Session) -> String {
    let Some(document) = session.document() else {
        return "lotcheck> ".to_string();
    };
    let totals = session.totals();
    match session.active_lot() {
        Some(lot) => format!(
            "{document} [{}/{}] lot {}> ",
            totals.checked, totals.expected, lot.lot
        ),
        None => format!("{document} [{}/{}]> ", totals.checked, totals.expected),
    }
}

fn dash_if_empty(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
