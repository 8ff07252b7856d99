//! Fixtures shared by the unit tests.

use serde_json::Value;

/// A reservation page with `payload` embedded the way the site embeds it.
pub fn page_with(payload: &Value) -> String {
    let escaped = payload
        .to_string()
        .replace('&', "&amp;")
        .replace('"', "&quot;");
    format!(
        r#"<html><body><div id="app" prop-initial-display-rooms="{}"></div></body></html>"#,
        escaped
    )
}

/// One room, vacant on `date`.
pub fn single_room_payload(name: &str, date: &str) -> Value {
    serde_json::json!({
        "calendarRooms": {
            "A": {"room": [
                {"room_id": 1, "date": null, "text": name},
                {"room_id": 1, "date": date, "vacancyFlg": 1}
            ]},
            "B": {"room": [
                {"room_id": 2, "date": null, "text": "Room B"},
                {"room_id": 2, "date": date, "vacancyFlg": 0}
            ]}
        }
    })
}
