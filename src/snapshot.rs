//! Logical snapshot of a window or tab stack.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "entries": [<route blob>, ...],
//!   "perEntityState": [{"rect": {"x":0,"y":0,"w":640,"h":480}, "state": "floating", "savedRect": {...}}, ...],
//!   "activeIndex": 1
//! }
//! ```
//!
//! `entries` and `perEntityState` correlate by position. A short
//! `perEntityState` is padded with defaults; an out-of-range `activeIndex`
//! means "no active entity". A route blob that fails to decode rejects the
//! whole snapshot. Transport and storage are the caller's concern.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StackError, StackResult};
use crate::geometry::{Rect, Size};
use crate::window::{WindowEntry, WindowState};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSnapshot {
    pub entries: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_entity_state: Vec<EntityStateRecord>,
    /// Position in `entries`, not an identity.
    #[serde(default)]
    pub active_index: Option<i64>,
}

impl StackSnapshot {
    pub fn to_json(&self) -> StackResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> StackResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStateRecord {
    pub rect: Rect,
    #[serde(default)]
    pub state: WindowState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_rect: Option<Rect>,
}

impl EntityStateRecord {
    pub fn from_window(window: &WindowEntry) -> Self {
        Self {
            rect: window.rect(),
            state: window.state(),
            saved_rect: window.saved_floating_rect(),
        }
    }

    /// Replays the record onto a freshly created window: rect first, then
    /// the state transition, then the stashed rect.
    pub(crate) fn apply(&self, window: &mut WindowEntry, available: Size) {
        window.update_rect(self.rect);
        match self.state {
            WindowState::Floating => {}
            WindowState::Minimized => {
                window.minimize();
            }
            WindowState::Maximized => window.maximize(available),
            WindowState::Pinned => window.toggle_pin(),
        }
        window.set_saved_floating_rect(self.saved_rect);
    }
}

/// Converts routes to and from opaque blobs. The managers never look inside
/// a blob.
pub trait RouteCodec<T> {
    fn encode(&self, route: &T) -> serde_json::Result<Value>;
    fn decode(&self, blob: &Value) -> serde_json::Result<T>;
}

/// Codec for routes that already implement serde's traits.
#[derive(Debug)]
pub struct JsonCodec<T>(PhantomData<fn() -> T>);

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> RouteCodec<T> for JsonCodec<T> {
    fn encode(&self, route: &T) -> serde_json::Result<Value> {
        serde_json::to_value(route)
    }

    fn decode(&self, blob: &Value) -> serde_json::Result<T> {
        T::deserialize(blob)
    }
}

/// Decoded snapshot, ready to be handed to a manager's `restore`.
#[derive(Debug)]
pub struct SnapshotModel<T> {
    pub routes: Vec<T>,
    /// Same length as `routes`; `None` where the snapshot had no state.
    pub states: Vec<Option<EntityStateRecord>>,
    /// Bounds-checked against `routes`.
    pub active_index: Option<usize>,
}

impl<T> SnapshotModel<T> {
    pub fn decode<C: RouteCodec<T>>(snapshot: &StackSnapshot, codec: &C) -> StackResult<Self> {
        let mut routes = Vec::with_capacity(snapshot.entries.len());
        for (index, blob) in snapshot.entries.iter().enumerate() {
            let route = codec
                .decode(blob)
                .map_err(|err| StackError::MalformedSnapshot {
                    index,
                    reason: err.to_string(),
                })?;
            routes.push(route);
        }
        let states = (0..routes.len())
            .map(|idx| snapshot.per_entity_state.get(idx).cloned())
            .collect();
        let active_index = match snapshot.active_index {
            Some(idx) if idx >= 0 && (idx as usize) < routes.len() => Some(idx as usize),
            Some(idx) => {
                tracing::warn!(
                    active_index = idx,
                    len = routes.len(),
                    "snapshot active index out of range; no active entity"
                );
                None
            }
            None => None,
        };
        Ok(Self {
            routes,
            states,
            active_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn decode_pads_state_and_drops_bad_active_index() {
        let snapshot = StackSnapshot::from_json(indoc! {r#"
            {
              "entries": ["a", "b", "c"],
              "perEntityState": [
                {"rect": {"x": 1, "y": 2, "w": 300, "h": 200}, "state": "pinned"}
              ],
              "activeIndex": 7
            }
        "#})
        .unwrap();
        let model = SnapshotModel::decode(&snapshot, &JsonCodec::<String>::new()).unwrap();
        assert_eq!(model.routes, vec!["a", "b", "c"]);
        assert_eq!(model.states.len(), 3);
        assert_eq!(model.states[0].as_ref().unwrap().state, WindowState::Pinned);
        assert!(model.states[1].is_none());
        assert_eq!(model.active_index, None);
    }

    #[test]
    fn negative_active_index_is_ignored() {
        let snapshot = StackSnapshot {
            entries: vec![Value::from("x")],
            per_entity_state: Vec::new(),
            active_index: Some(-1),
        };
        let model = SnapshotModel::decode(&snapshot, &JsonCodec::<String>::new()).unwrap();
        assert_eq!(model.active_index, None);
    }

    #[test]
    fn corrupt_entry_is_fatal() {
        let snapshot = StackSnapshot {
            entries: vec![Value::from("ok"), Value::from(12)],
            per_entity_state: Vec::new(),
            active_index: Some(0),
        };
        let err = SnapshotModel::decode(&snapshot, &JsonCodec::<String>::new()).unwrap_err();
        assert!(matches!(err, StackError::MalformedSnapshot { index: 1, .. }));
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let record = EntityStateRecord {
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            state: WindowState::Maximized,
            saved_rect: Some(Rect::new(10.0, 10.0, 300.0, 200.0)),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["state"], "maximized");
        assert_eq!(value["rect"]["w"], 800.0);
        assert_eq!(value["savedRect"]["x"], 10.0);
    }

    #[test]
    fn apply_reinstates_saved_rect_after_maximize() {
        let record = EntityStateRecord {
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            state: WindowState::Maximized,
            saved_rect: Some(Rect::new(10.0, 10.0, 300.0, 200.0)),
        };
        let mut window = WindowEntry::new(Rect::new(40.0, 40.0, 640.0, 480.0));
        record.apply(&mut window, Size::new(800.0, 600.0));
        assert_eq!(EntityStateRecord::from_window(&window), record);
        window.maximize(Size::new(800.0, 600.0));
        assert_eq!(window.rect(), Rect::new(10.0, 10.0, 300.0, 200.0));
    }
}
