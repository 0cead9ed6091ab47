pub mod surface;
pub mod tables;

pub use surface::*;
pub use tables::*;

/// Theme and key binding applied to every freshly created editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    pub theme: String,
    pub binding: String,
}

impl EditorSettings {
    pub fn new(theme: impl Into<String>, binding: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            binding: binding.into(),
        }
    }

    /// Configure theme, key binding and the syntax mode derived from `document_id`.
    pub fn apply(&self, editor: &mut dyn EditorSurface, document_id: &str) -> &'static str {
        editor.set_theme(&self.theme);
        editor.set_keyboard_handler(keyboard_handler(&self.binding));
        let mode = mode_for_path(document_id);
        editor.set_mode(mode);
        mode
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self::new(DEFAULT_THEME, DEFAULT_BINDING)
    }
}
