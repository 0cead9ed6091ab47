use std::collections::HashMap;
use tracing::debug;

use crate::presence::overlay::CursorMarker;

/// Visible portion of an editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportMetrics {
    pub line_height: i32,
    pub first_visible_row: u32,
    pub last_visible_row: u32,
}

impl ViewportMetrics {
    /// Pixel height of the visible row span
    pub fn visible_height(&self) -> i32 {
        let rows = self.last_visible_row.saturating_sub(self.first_visible_row) as i32;
        rows * self.line_height
    }
}

/// Pixel offset relative to the top-left corner of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPosition {
    pub top: i32,
    pub left: i32,
}

/// The rich-text editing surface a session is bound to.
///
/// Rendering, undo and highlighting belong to the implementation; the lifecycle
/// manager only configures it, asks it for cursor geometry and hands it overlay
/// markers.
pub trait EditorSurface {
    fn set_theme(&mut self, theme: &str);
    fn set_keyboard_handler(&mut self, binding: Option<&str>);
    fn set_mode(&mut self, mode: &str);
    fn viewport(&self) -> ViewportMetrics;
    fn cursor_coordinates(&self, line: u32, column: u32) -> Option<ScreenPosition>;
    fn show_remote_cursor(&mut self, identity: &str, marker: CursorMarker);
    fn destroy(&mut self);
}

pub trait EditorFactory {
    fn create(&self) -> Box<dyn EditorSurface>;
}

/// In-process editor surface without a display.
///
/// Configuration calls and overlays are only logged and kept in memory.
#[derive(Debug, Clone)]
pub struct HeadlessEditor {
    viewport: ViewportMetrics,
    char_width: i32,
    overlays: HashMap<String, CursorMarker>,
    destroyed: bool,
}

impl HeadlessEditor {
    pub fn new(rows: u32, line_height: i32, char_width: i32) -> Self {
        Self {
            viewport: ViewportMetrics {
                line_height,
                first_visible_row: 0,
                last_visible_row: rows,
            },
            char_width,
            overlays: HashMap::new(),
            destroyed: false,
        }
    }

    /// Scroll so that `row` is the first visible row
    #[cfg(test)]
    pub(crate) fn scroll_to(&mut self, row: u32) {
        let rows = self.viewport.last_visible_row - self.viewport.first_visible_row;
        self.viewport.first_visible_row = row;
        self.viewport.last_visible_row = row + rows;
    }

    #[cfg(test)]
    pub(crate) fn overlay(&self, identity: &str) -> Option<&CursorMarker> {
        self.overlays.get(identity)
    }

    #[cfg(test)]
    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Clamp a pixel offset into the range the overlay works in.
fn to_pixels(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl EditorSurface for HeadlessEditor {
    fn set_theme(&mut self, theme: &str) {
        debug!("Editor theme: {}", theme);
    }

    fn set_keyboard_handler(&mut self, binding: Option<&str>) {
        debug!("Editor key binding: {}", binding.unwrap_or("default"));
    }

    fn set_mode(&mut self, mode: &str) {
        debug!("Editor mode: {}", mode);
    }

    fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    // Line and column arrive from remote peers and may be arbitrarily large.
    fn cursor_coordinates(&self, line: u32, column: u32) -> Option<ScreenPosition> {
        if self.destroyed {
            return None;
        }
        let row_offset = i64::from(line) - i64::from(self.viewport.first_visible_row);
        Some(ScreenPosition {
            top: to_pixels(row_offset.saturating_mul(i64::from(self.viewport.line_height))),
            left: to_pixels(i64::from(column).saturating_mul(i64::from(self.char_width))),
        })
    }

    fn show_remote_cursor(&mut self, identity: &str, marker: CursorMarker) {
        debug!("Cursor overlay for {}: {}", identity, marker.to_markup());
        self.overlays.insert(identity.to_string(), marker);
    }

    fn destroy(&mut self) {
        self.overlays.clear();
        self.destroyed = true;
    }
}

/// Builds headless surfaces of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessEditorFactory {
    pub rows: u32,
    pub line_height: i32,
    pub char_width: i32,
}

impl Default for HeadlessEditorFactory {
    fn default() -> Self {
        Self {
            rows: 40,
            line_height: 16,
            char_width: 7,
        }
    }
}

impl EditorFactory for HeadlessEditorFactory {
    fn create(&self) -> Box<dyn EditorSurface> {
        Box::new(HeadlessEditor::new(self.rows, self.line_height, self.char_width))
    }
}
