use serde::{Deserialize, Serialize};

/// A tile position on a named map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCoord {
    pub map_name: String,
    pub x: i64,
    pub y: i64,
}

impl MapCoord {
    pub fn new(map_name: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            map_name: map_name.into(),
            x,
            y,
        }
    }
}
