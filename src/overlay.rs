use ratatui::layout::Rect;
use std::collections::HashMap;

/// Horizontal sentinel used when the overlay cannot be positioned yet: the
/// trigger element was not rendered this frame, or the overlay has no
/// measured size. Callers keep rendering; the overlay just sits off screen.
pub const OFFSCREEN_LEFT: i32 = -9999;

const RIGHT_MARGIN: i32 = 6;
const GAP_DEFAULT: i32 = 6;
const GAP_COMPACT: i32 = 14;
// Triggers above this line never flip the overlay upward, so it cannot
// collide with fixed chrome at the top of the viewport.
const FLIP_THRESHOLD: i32 = 100;

/// Measured bounds of a rendered element, in the same units as the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn from_rect(rect: Rect) -> Self {
        Bounds {
            left: i32::from(rect.x),
            top: i32::from(rect.y),
            width: i32::from(rect.width),
            height: i32::from(rect.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Right edge of the overlay: pinned offset or left-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RightEdge {
    Auto,
    At(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPosition {
    pub left: i32,
    pub right: RightEdge,
    pub top: i32,
}

impl OverlayPosition {
    pub fn offscreen() -> Self {
        OverlayPosition {
            left: OFFSCREEN_LEFT,
            right: RightEdge::Auto,
            top: 0,
        }
    }
}

/// Bounds of named elements recorded during the current render pass, the
/// lookup an overlay uses to find its trigger.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    bounds: HashMap<String, Bounds>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        ElementRegistry::default()
    }

    pub fn clear(&mut self) {
        self.bounds.clear();
    }

    pub fn record(&mut self, element: impl Into<String>, bounds: Bounds) {
        self.bounds.insert(element.into(), bounds);
    }

    pub fn record_rect(&mut self, element: impl Into<String>, rect: Rect) {
        self.record(element, Bounds::from_rect(rect));
    }

    pub fn get(&self, element: &str) -> Option<Bounds> {
        self.bounds.get(element).copied()
    }

    /// Hit-test all recorded elements. Elements nest (a button sits inside
    /// its note row), so the smallest containing bounds win.
    pub fn hit(&self, x: i32, y: i32) -> Option<&str> {
        self.bounds
            .iter()
            .filter(|(_, b)| {
                x >= b.left && x < b.left + b.width && y >= b.top && y < b.top + b.height
            })
            .min_by_key(|(_, b)| b.width.saturating_mul(b.height))
            .map(|(name, _)| name.as_str())
    }
}

/// Place a floating overlay relative to a trigger element.
///
/// Horizontal: flush left with the trigger unless that would overflow the
/// viewport, in which case the overlay is right-aligned `RIGHT_MARGIN` in
/// from the edge. Vertical: a small gap below the trigger; when the trigger
/// sits lower than `FLIP_THRESHOLD` and the overlay would run past the
/// bottom, it is raised to clear the bottom edge instead (never above 0).
/// Missing trigger or unmeasured overlay degrades to the off-screen
/// sentinel rather than failing.
pub fn overlay_position(
    trigger: Option<Bounds>,
    overlay: Option<Size>,
    viewport: Size,
    compact: bool,
) -> OverlayPosition {
    let (Some(trigger), Some(overlay)) = (trigger, overlay) else {
        return OverlayPosition::offscreen();
    };

    let left = if trigger.left + overlay.width > viewport.width {
        viewport.width - RIGHT_MARGIN - overlay.width
    } else {
        trigger.left
    };

    let gap = if compact { GAP_COMPACT } else { GAP_DEFAULT };
    let mut top = trigger.bottom() + gap;
    if trigger.bottom() > FLIP_THRESHOLD && trigger.bottom() + overlay.height > viewport.height {
        top = (viewport.height - overlay.height - gap).max(0);
    }

    OverlayPosition {
        left: left.max(0),
        right: RightEdge::Auto,
        top,
    }
}

/// Resolve the trigger through the registry, then position.
pub fn overlay_position_for(
    registry: &ElementRegistry,
    element: &str,
    overlay: Option<Size>,
    viewport: Size,
    compact: bool,
) -> OverlayPosition {
    overlay_position(registry.get(element), overlay, viewport, compact)
}
