use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{InkpadError, InkpadResult},
    notes::{Note, NoteItem, NoteItemKind},
};

/// Compact wire form of a shared note. Single-letter keys keep the resulting
/// link short; the canvas payload rides along as-is.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct SharePayload {
    #[serde(default)]
    t: String,
    #[serde(default)]
    i: Vec<ShareItem>,
    #[serde(default)]
    d: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ShareItem {
    y: NoteItemKind,
    c: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<bool>,
}

/// Encodes a note as a URL-safe token for a share link.
pub fn encode_note(note: &Note) -> InkpadResult<String> {
    let payload = SharePayload {
        t: note.title.clone(),
        i: note
            .items
            .iter()
            .map(|item| ShareItem {
                y: item.kind,
                c: item.content.clone(),
                d: item.completed,
            })
            .collect(),
        d: note.canvas_data.clone(),
    };
    let json = serde_json::to_string(&payload)
        .map_err(|e| InkpadError::document(format!("serialize share payload: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Decodes a share token into a fresh note: new ids and timestamps, shared
/// content. A malformed token is a document error; callers log and ignore.
pub fn decode_note(encoded: &str) -> InkpadResult<Note> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim())
        .map_err(|e| InkpadError::document(format!("decode share token: {e}")))?;
    let payload: SharePayload = serde_json::from_slice(&bytes)
        .map_err(|e| InkpadError::document(format!("parse share payload: {e}")))?;

    let now = Utc::now();
    Ok(Note {
        id: Uuid::new_v4(),
        title: if payload.t.is_empty() {
            "Shared Note".to_string()
        } else {
            payload.t
        },
        items: payload
            .i
            .into_iter()
            .map(|item| NoteItem {
                id: Uuid::new_v4(),
                kind: item.y,
                content: item.c,
                completed: item.d,
                created_at: now,
            })
            .collect(),
        canvas_data: payload.d,
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_content_with_fresh_identity() {
        let mut note = Note::new();
        note.title = "Groceries".to_string();
        note.canvas_data = Some("{\"version\":1}".to_string());
        let mut item = NoteItem::new(NoteItemKind::Checkbox);
        item.content = "milk".to_string();
        item.completed = Some(true);
        note.items.push(item);

        let token = encode_note(&note).unwrap();
        let decoded = decode_note(&token).unwrap();

        assert_ne!(decoded.id, note.id);
        assert_eq!(decoded.title, "Groceries");
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].kind, NoteItemKind::Checkbox);
        assert_eq!(decoded.items[0].content, "milk");
        assert_eq!(decoded.items[0].completed, Some(true));
        assert_eq!(decoded.canvas_data.as_deref(), Some("{\"version\":1}"));
    }

    #[test]
    fn empty_title_becomes_placeholder() {
        let note = Note {
            title: String::new(),
            ..Note::new()
        };
        let decoded = decode_note(&encode_note(&note).unwrap()).unwrap();
        assert_eq!(decoded.title, "Shared Note");
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(decode_note("%%%").is_err());
        assert!(decode_note(&URL_SAFE_NO_PAD.encode(b"[1,2,3]")).is_err());
    }
}
