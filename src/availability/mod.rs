//! Room-name resolution and the vacancy filter for one target date.

use crate::models::{Payload, RoomId, RoomNameMap};

/// Map room ids to display names using the header cells.
/// A later header for the same id replaces an earlier one.
pub fn build_room_names(payload: &Payload) -> RoomNameMap {
    let mut names = RoomNameMap::new();
    for cell in payload.cells() {
        if let (Some(id), Some(text)) = (&cell.room_id, cell.header_text()) {
            names.insert(id.clone(), text.to_string());
        }
    }
    names
}

/// Names of rooms vacant on `target_date`, in document order.
///
/// The date is compared verbatim against the site's own representation.
/// Duplicate cells yield duplicate names.
pub fn list_available(payload: &Payload, target_date: &str) -> Vec<String> {
    let names = build_room_names(payload);
    payload
        .cells()
        .filter(|cell| cell.date_str() == Some(target_date) && cell.is_vacant())
        .map(|cell| {
            cell.room_id
                .as_ref()
                .and_then(|id| names.get(id).cloned())
                .unwrap_or_else(|| fallback_label(cell.room_id.as_ref()))
        })
        .collect()
}

fn fallback_label(id: Option<&RoomId>) -> String {
    match id {
        Some(id) => format!("room_id={}", id),
        None => "room_id=none".to_string(),
    }
}
