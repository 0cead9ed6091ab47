use tracing::{debug, info};

/// One row of the document list; `id` is the document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListEntry {
    pub id: String,
    pub selected: bool,
}

/// Result of activating an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The entry was already selected; nothing to do
    AlreadySelected,
    /// Selection moved, the caller must switch to this document
    Switch(String),
    /// No entry with that id
    Unknown,
}

/// Selectable list of documents; at most one entry is selected.
#[derive(Debug, Clone, Default)]
pub struct DocumentList {
    entries: Vec<DocumentListEntry>,
}

impl DocumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a fresh listing, keeping the selection when the
    /// selected id is still present.
    pub fn reconcile<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let previous = self.selected().map(str::to_string);
        let mut restored = false;

        self.entries = paths
            .into_iter()
            .map(|path| {
                let id = path.into();
                let selected = !restored && previous.as_deref() == Some(id.as_str());
                restored |= selected;
                DocumentListEntry { id, selected }
            })
            .collect();

        match (&previous, restored) {
            (Some(id), false) => info!("Selected document {} no longer listed", id),
            _ => debug!("Document list reconciled ({} entries)", self.entries.len()),
        }
    }

    /// Selection handler bound to an entry id.
    pub fn activate(&mut self, id: &str) -> Activation {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return Activation::Unknown;
        };
        if self.entries[index].selected {
            return Activation::AlreadySelected;
        }
        for entry in self.entries.iter_mut() {
            entry.selected = false;
        }
        self.entries[index].selected = true;
        Activation::Switch(self.entries[index].id.clone())
    }

    pub fn selected(&self) -> Option<&str> {
        self.entries.iter().find(|e| e.selected).map(|e| e.id.as_str())
    }

    pub fn entries(&self) -> &[DocumentListEntry] {
        &self.entries
    }
}
