use crate::editor::{ScreenPosition, ViewportMetrics};
use super::color::{ColorAssigner, Rgb};

/// Height of the marker line and the space reserved for its label
pub const LABEL_HEIGHT: i32 = 40;
/// Text row of the label when it hangs below the marker
pub const LABEL_TEXT_HEIGHT: i32 = 18;
pub const MARKER_WIDTH: i32 = 3;
/// Opacity of a marker whose cursor lies outside the visible rows
pub const CLIPPED_OPACITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    /// Cursor near the top edge, label hangs below the marker start
    Below,
    /// Label sits above the cursor line
    Above,
}

/// Geometry of one remote cursor overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorMarker {
    pub identity: String,
    pub color: Rgb,
    /// Cursor top after clamping to the viewport
    pub cursor_top: i32,
    pub marker_top: i32,
    pub label_top: i32,
    pub left: i32,
    pub placement: LabelPlacement,
    /// Set when the real cursor is outside the visible rows
    pub clipped: bool,
}

impl CursorMarker {
    pub fn opacity(&self) -> f32 {
        if self.clipped {
            CLIPPED_OPACITY
        } else {
            1.0
        }
    }

    /// Marker line followed by the name label, as inline-styled HTML.
    pub fn to_markup(&self) -> String {
        let opacity = if self.clipped {
            format!(" opacity: {};", CLIPPED_OPACITY)
        } else {
            String::new()
        };
        let marker = format!(
            "<div style='position: absolute; top: {}px; left: {}px; height: {}px; border-left: {}px solid {};{}'></div>",
            self.marker_top, self.left, LABEL_HEIGHT, MARKER_WIDTH, self.color, opacity
        );
        let label = format!(
            "<div style='position: absolute; top: {}px; left: {}px; background-color: {};{} color: #f0f0f0; padding: 4px; font-size: 10px;'>{}</div>",
            self.label_top,
            self.left,
            self.color,
            opacity,
            ammonia::clean_text(&self.identity)
        );
        marker + &label
    }
}

/// Lays out remote cursor markers so that neither the marker nor its label is
/// pushed off either edge of the viewport.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceOverlayRenderer {
    colors: ColorAssigner,
}

impl PresenceOverlayRenderer {
    pub fn render(
        &self,
        identity: &str,
        line_height: i32,
        position: ScreenPosition,
        visible_height: i32,
    ) -> CursorMarker {
        let color = self.colors.assign(identity);
        let mut top = position.top;
        let mut clipped = false;

        if top.saturating_add(line_height) < LABEL_HEIGHT {
            if top < 0 {
                top = 0;
                clipped = true;
            }
            CursorMarker {
                identity: identity.to_string(),
                color,
                cursor_top: top,
                marker_top: top,
                label_top: top + (LABEL_HEIGHT - LABEL_TEXT_HEIGHT),
                left: position.left,
                placement: LabelPlacement::Below,
                clipped,
            }
        } else {
            if top > visible_height {
                top = visible_height - line_height;
                clipped = true;
            }
            let marker_top = top - (LABEL_HEIGHT - line_height);
            CursorMarker {
                identity: identity.to_string(),
                color,
                cursor_top: top,
                marker_top,
                label_top: marker_top,
                left: position.left,
                placement: LabelPlacement::Above,
                clipped,
            }
        }
    }

    pub fn render_in_viewport(
        &self,
        identity: &str,
        viewport: ViewportMetrics,
        position: ScreenPosition,
    ) -> CursorMarker {
        self.render(identity, viewport.line_height, position, viewport.visible_height())
    }
}
