use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;

// ── Room payload ──────────────────────────────────────────────────────────────

/// The JSON blob embedded in the reservation page.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Payload {
    /// Room groups in document order, keyed by the site's group key.
    #[serde(rename = "calendarRooms", default, deserialize_with = "ordered_groups")]
    pub calendar_rooms: Vec<(String, RoomGroup)>,
}

impl Payload {
    /// Every cell of every group, in document order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.calendar_rooms
            .iter()
            .flat_map(|(_, group)| group.room.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RoomGroup {
    #[serde(default)]
    pub room: Vec<Cell>,
}

/// One calendar cell. Header cells carry a room name, day cells a date.
///
/// Attributes are kept loosely typed: an off-type value only stops the cell
/// from matching, it never fails the whole payload.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Cell {
    pub room_id: Option<RoomId>,
    pub date: Option<Value>,
    pub text: Option<Value>,
    #[serde(rename = "vacancyFlg")]
    pub vacancy_flg: Option<Value>,
}

impl Cell {
    /// Room name if this is a header cell (no date, non-empty string text).
    pub fn header_text(&self) -> Option<&str> {
        if self.date.is_some() {
            return None;
        }
        self.text
            .as_ref()
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }

    /// The cell's date, when it is a string.
    pub fn date_str(&self) -> Option<&str> {
        self.date.as_ref().and_then(Value::as_str)
    }

    /// `vacancyFlg == 1`; a missing flag means no vacancy.
    pub fn is_vacant(&self) -> bool {
        match &self.vacancy_flg {
            Some(Value::Number(n)) => n.as_f64() == Some(1.0),
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }
}

/// Room identifier as the site sends it (usually an integer).
///
/// Numbers and strings stay distinct keys (`1` is not `"1"`); any other JSON
/// value is keyed by its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "Value")]
pub enum RoomId {
    Number(Number),
    Text(String),
    Other(String),
}

impl From<Value> for RoomId {
    fn from(v: Value) -> Self {
        match v {
            Value::Number(n) => RoomId::Number(n),
            Value::String(s) => RoomId::Text(s),
            other => RoomId::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Number(n) => write!(f, "{}", n),
            RoomId::Text(s) | RoomId::Other(s) => f.write_str(s),
        }
    }
}

pub type RoomNameMap = HashMap<RoomId, String>;

/// `calendarRooms` is normally an object; a plain array is accepted too and
/// keyed by index.
fn ordered_groups<'de, D>(deserializer: D) -> Result<Vec<(String, RoomGroup)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct GroupsVisitor;

    impl<'de> Visitor<'de> for GroupsVisitor {
        type Value = Vec<(String, RoomGroup)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map or list of room groups")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut groups = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, group)) = map.next_entry::<String, RoomGroup>()? {
                groups.push((key, group));
            }
            Ok(groups)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut groups = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(group) = seq.next_element::<RoomGroup>()? {
                groups.push((groups.len().to_string(), group));
            }
            Ok(groups)
        }
    }

    deserializer.deserialize_any(GroupsVisitor)
}

// ── Run log ───────────────────────────────────────────────────────────────────

/// Snapshot of one run, written to the per-day log file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub timestamp: String,
    pub target_date: String,
    pub available_rooms: Vec<String>,
    pub url: String,
}
