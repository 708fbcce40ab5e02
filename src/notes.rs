use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{InkpadError, InkpadResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteItemKind {
    Text,
    Checkbox,
}

/// One line of a note: plain text or a checkbox.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NoteItem {
    pub id: Uuid,
    pub kind: NoteItemKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl NoteItem {
    pub fn new(kind: NoteItemKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: String::new(),
            completed: (kind == NoteItemKind::Checkbox).then_some(false),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub items: Vec<NoteItem>,
    pub canvas_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: "Untitled Note".to_string(),
            items: Vec::new(),
            canvas_data: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

/// The slice of the note store the drawing widget depends on.
pub trait NoteStore {
    fn canvas_data(&self, note: Uuid) -> Option<String>;
    fn save_canvas_data(&mut self, note: Uuid, data: &str);
}

/// The full notes collection, newest first, with an active-note pointer.
/// Persisted as one JSON file, the local-storage analog.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Notebook {
    notes: Vec<Note>,
    #[serde(skip)]
    active: Option<Uuid>,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active.and_then(|id| self.note(id))
    }

    pub fn set_active(&mut self, id: Uuid) -> bool {
        if self.note(id).is_some() {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    pub fn create_note(&mut self) -> Uuid {
        let note = Note::new();
        let id = note.id;
        self.notes.insert(0, note);
        self.active = Some(id);
        id
    }

    pub fn delete_note(&mut self, id: Uuid) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            return false;
        }
        if self.active == Some(id) {
            self.active = self.notes.first().map(|n| n.id);
        }
        true
    }

    pub fn rename_note(&mut self, id: Uuid, title: impl Into<String>) -> bool {
        let Some(note) = self.note_mut(id) else {
            return false;
        };
        note.title = title.into();
        note.updated_at = Utc::now();
        true
    }

    /// Adds an item, optionally right after an existing one (the editor's
    /// enter-key behavior). Returns the new item's id.
    pub fn add_item(
        &mut self,
        note: Uuid,
        kind: NoteItemKind,
        after: Option<Uuid>,
    ) -> Option<Uuid> {
        let entry = self.note_mut(note)?;
        let item = NoteItem::new(kind);
        let id = item.id;
        let index = after
            .and_then(|a| entry.items.iter().position(|i| i.id == a))
            .map(|i| i + 1)
            .unwrap_or(entry.items.len());
        entry.items.insert(index, item);
        entry.updated_at = Utc::now();
        Some(id)
    }

    pub fn set_item_content(&mut self, note: Uuid, item: Uuid, content: impl Into<String>) -> bool {
        self.with_item(note, item, |i| i.content = content.into())
    }

    pub fn set_item_completed(&mut self, note: Uuid, item: Uuid, completed: bool) -> bool {
        self.with_item(note, item, |i| i.completed = Some(completed))
    }

    pub fn delete_item(&mut self, note: Uuid, item: Uuid) -> bool {
        let Some(entry) = self.note_mut(note) else {
            return false;
        };
        let before = entry.items.len();
        entry.items.retain(|i| i.id != item);
        if entry.items.len() == before {
            return false;
        }
        entry.updated_at = Utc::now();
        true
    }

    pub fn insert_note(&mut self, note: Note) -> Uuid {
        let id = note.id;
        self.notes.insert(0, note);
        self.active = Some(id);
        id
    }

    /// Loads a notebook file. A missing or malformed file is logged and
    /// treated as an empty notebook, never an error.
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                tracing::debug!(%err, path = %path.display(), "no notebook file, starting empty");
                return Self::new();
            }
        };
        match serde_json::from_str::<Self>(&json) {
            Ok(mut notebook) => {
                notebook.active = notebook.notes.first().map(|n| n.id);
                notebook
            }
            Err(err) => {
                tracing::warn!(%err, path = %path.display(), "notebook file unreadable, starting empty");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> InkpadResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| InkpadError::document(format!("serialize notebook: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| InkpadError::document(format!("write notebook: {e}")))?;
        Ok(())
    }

    fn note_mut(&mut self, id: Uuid) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    fn with_item(&mut self, note: Uuid, item: Uuid, f: impl FnOnce(&mut NoteItem)) -> bool {
        let Some(entry) = self.note_mut(note) else {
            return false;
        };
        let Some(found) = entry.items.iter_mut().find(|i| i.id == item) else {
            return false;
        };
        f(found);
        entry.updated_at = Utc::now();
        true
    }
}

impl NoteStore for Notebook {
    fn canvas_data(&self, note: Uuid) -> Option<String> {
        self.note(note).and_then(|n| n.canvas_data.clone())
    }

    fn save_canvas_data(&mut self, note: Uuid, data: &str) {
        if let Some(entry) = self.note_mut(note) {
            entry.canvas_data = Some(data.to_string());
            entry.updated_at = Utc::now();
        }
    }
}
