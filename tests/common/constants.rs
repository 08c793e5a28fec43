//! Shared fixture data for tests.
#![allow(dead_code)]

use invite_schema::Record;
use serde_json::json;

pub const SERVICE_KEY: &str = "test-service-role-key";

/// Every table outside the catalog, in declaration order.
pub const ROSTER: [&str; 13] = [
    "users",
    "orgs",
    "org_members",
    "events",
    "event_details",
    "venues",
    "schedules",
    "guests",
    "rsvps",
    "messages",
    "media",
    "donations",
    "analytics_events",
];

pub const THEME_1_SLUG: &str = "classic";
pub const THEME_1_NAME: &str = "Classic";
pub const THEME_2_SLUG: &str = "garden";
pub const THEME_2_NAME: &str = "Garden Party";
pub const THEME_3_SLUG: &str = "noir";
pub const THEME_3_NAME: &str = "Noir";

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("fixture is not an object: {}", other),
    }
}

/// The catalog projection, already ordered by name.
pub fn theme_rows() -> Vec<Record> {
    vec![
        record(json!({"slug": THEME_1_SLUG, "name": THEME_1_NAME, "is_premium": false})),
        record(json!({"slug": THEME_2_SLUG, "name": THEME_2_NAME, "is_premium": true})),
        record(json!({"slug": THEME_3_SLUG, "name": THEME_3_NAME, "is_premium": true})),
    ]
}

/// Full theme rows as inserted into a SQLite mirror, deliberately out of
/// name order.
pub fn theme_inserts() -> Vec<Record> {
    vec![
        record(json!({"slug": THEME_3_SLUG, "name": THEME_3_NAME, "is_premium": true})),
        record(json!({
            "slug": THEME_1_SLUG,
            "name": THEME_1_NAME,
            "is_premium": false,
            "tokens": {"primary": "#222222"},
        })),
        record(json!({"slug": THEME_2_SLUG, "name": THEME_2_NAME, "is_premium": true})),
    ]
}
