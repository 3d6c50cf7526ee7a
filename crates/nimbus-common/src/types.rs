use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a backend view. Stable for the lifetime of the
/// view; never reused within one engine instance. Distinct from the dense
/// tab index, which is reassigned when tabs close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Load lifecycle of a view. Transitions are driven by engine events, not
/// by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    Loading,
    Loaded,
}

/// A raw viewport capture: tightly packed RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Whether the pixel buffer matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

/// Snapshot of the tab registry, as reported by `/internal/tab_info`.
/// `active` is `None` only while the registry is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub count: usize,
    pub active: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_id_display() {
        assert_eq!(ViewId(7).to_string(), "view-7");
    }

    #[test]
    fn frame_well_formed() {
        let frame = Frame {
            width: 2,
            height: 2,
            rgba: vec![0; 16],
        };
        assert!(frame.is_well_formed());
    }

    #[test]
    fn frame_rejects_short_buffer() {
        let frame = Frame {
            width: 2,
            height: 2,
            rgba: vec![0; 15],
        };
        assert!(!frame.is_well_formed());

        let empty = Frame {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        };
        assert!(!empty.is_well_formed());
    }

    #[test]
    fn tab_info_serialization() {
        let info = TabInfo {
            count: 2,
            active: Some(1),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: TabInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);

        let empty = TabInfo {
            count: 0,
            active: None,
        };
        let json = serde_json::to_string(&empty).unwrap();
        assert!(json.contains("null"));
    }
}
