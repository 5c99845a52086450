//! Query building for the dashboard statistics.
//!
//! Statistics only need totals, so every query asks for `limit=0` and
//! filters on today's creation date plus an optional state predicate.

use chrono::NaiveDate;

pub const OPEN_ORDERS: &str = r#"orderState = "Open""#;
pub const COMPLETE_ORDERS: &str = r#"orderState = "Complete""#;
pub const ACTIVE_CARTS: &str = r#"cartState = "Active""#;
pub const ORDERED_CARTS: &str = r#"cartState = "Ordered""#;

/// `createdAt > "YYYY-MM-DD"` for `today`, joined with `predicate` if any.
pub fn where_predicate(today: NaiveDate, predicate: Option<&str>) -> String {
    let today_predicate = format!(r#"createdAt > "{}""#, today.format("%Y-%m-%d"));
    match predicate {
        Some(predicate) => format!("{today_predicate} and {predicate}"),
        None => today_predicate,
    }
}

/// Query parameters for a count request. Values are not yet URL-encoded.
pub fn count_query(today: NaiveDate, predicate: Option<&str>) -> [(&'static str, String); 2] {
    [
        ("limit", "0".to_string()),
        ("where", where_predicate(today, predicate)),
    ]
}
