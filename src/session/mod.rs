//! Session persistence
//!
//! A session is a JSON document with an explicit format tag and schema
//! version. Decoding builds a complete, validated [`Workspace`] before
//! anything is handed back, so a bad file never leaves a half-restored
//! workspace behind.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::folders::FolderSet;
use crate::history::HistoryManager;
use crate::models::{Phrase, StopWords};
use crate::workspace::{GlobalScope, PhraseList, Workspace};

pub const FORMAT_TAG: &str = "phrasedesk-session";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Not a phrasedesk session (format tag '{0}')")]
    WrongFormat(String),

    #[error("Session schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Inconsistent session: {0}")]
    Inconsistent(String),
}

/// Top-level persisted document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDocument {
    pub format: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    #[serde(default)]
    pub active_list: Option<usize>,
    #[serde(default)]
    pub global: ScopeRecord,
    #[serde(default)]
    pub lists: Vec<ListRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeRecord {
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub folders: Vec<FolderRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRecord {
    pub name: String,
    #[serde(default)]
    pub phrases: Vec<Phrase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub capacity: usize,
    pub cursor: usize,
    #[serde(default)]
    pub snapshots: Vec<Vec<Phrase>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRecord {
    pub name: String,
    #[serde(default)]
    pub phrases: Vec<Phrase>,
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub folders: Vec<FolderRecord>,
    pub history: HistoryRecord,
}

pub struct SessionStore;

impl SessionStore {
    pub fn to_document(workspace: &Workspace) -> SessionDocument {
        SessionDocument {
            format: FORMAT_TAG.to_string(),
            version: SCHEMA_VERSION,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
            active_list: workspace.active_index(),
            global: ScopeRecord {
                stop_words: stop_word_record(&workspace.global().stop_words),
                folders: folder_records(&workspace.global().folders),
            },
            lists: workspace.lists().iter().map(list_record).collect(),
        }
    }

    pub fn from_document(doc: SessionDocument) -> Result<Workspace, SessionError> {
        if doc.format != FORMAT_TAG {
            return Err(SessionError::WrongFormat(doc.format));
        }
        if doc.version > SCHEMA_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: doc.version,
                supported: SCHEMA_VERSION,
            });
        }

        let mut names = HashSet::new();
        let mut lists = Vec::with_capacity(doc.lists.len());
        for record in doc.lists {
            if !names.insert(record.name.clone()) {
                return Err(inconsistent(format!("duplicate list name '{}'", record.name)));
            }
            lists.push(restore_list(record)?);
        }

        if let Some(index) = doc.active_list {
            if index >= lists.len() {
                return Err(inconsistent(format!(
                    "active list {} out of range ({} lists)",
                    index,
                    lists.len()
                )));
            }
        }

        let global = GlobalScope {
            stop_words: restore_stop_words(doc.global.stop_words),
            folders: restore_folders(doc.global.folders, "global")?,
        };

        Ok(Workspace::from_parts(lists, global, doc.active_list))
    }

    pub fn encode(workspace: &Workspace) -> Result<Vec<u8>, SessionError> {
        Ok(serde_json::to_vec_pretty(&Self::to_document(workspace))?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Workspace, SessionError> {
        let doc: SessionDocument = serde_json::from_slice(bytes)?;
        Self::from_document(doc)
    }

    /// Replace `workspace` with the decoded session, or leave it untouched
    /// on any error.
    pub fn restore_into(workspace: &mut Workspace, bytes: &[u8]) -> Result<(), SessionError> {
        let mut restored = Self::decode(bytes).map_err(|e| {
            tracing::warn!(error = %e, "rejected session");
            e
        })?;
        restored.adopt_settings(workspace);
        *workspace = restored;
        Ok(())
    }

    /// Write via a sibling temp file and rename, so a crash mid-write keeps
    /// the previous session intact.
    pub fn save(workspace: &Workspace, path: &Path) -> Result<(), SessionError> {
        let bytes = Self::encode(workspace)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        tracing::info!(path = %path.display(), lists = workspace.lists().len(), "saved session");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Workspace, SessionError> {
        let bytes = fs::read(path)?;
        let workspace = Self::decode(&bytes)?;
        tracing::info!(path = %path.display(), lists = workspace.lists().len(), "loaded session");
        Ok(workspace)
    }
}

fn inconsistent(message: String) -> SessionError {
    SessionError::Inconsistent(message)
}

fn stop_word_record(words: &StopWords) -> Vec<String> {
    words.iter().cloned().collect()
}

fn folder_records(folders: &FolderSet) -> Vec<FolderRecord> {
    folders
        .iter()
        .map(|f| FolderRecord {
            name: f.name.clone(),
            phrases: f.phrases.clone(),
        })
        .collect()
}

fn list_record(list: &PhraseList) -> ListRecord {
    let history = list.history();
    ListRecord {
        name: list.name().to_string(),
        phrases: list.phrases().to_vec(),
        stop_words: stop_word_record(&list.stop_words),
        folders: folder_records(&list.folders),
        history: HistoryRecord {
            capacity: history.capacity(),
            cursor: history.current_index(),
            snapshots: history.snapshots().cloned().collect(),
        },
    }
}

fn restore_stop_words(words: Vec<String>) -> StopWords {
    words.iter().map(String::as_str).collect()
}

fn restore_folders(records: Vec<FolderRecord>, scope: &str) -> Result<FolderSet, SessionError> {
    let mut folders = FolderSet::new();
    for record in records {
        let folder = folders
            .create(&record.name)
            .map_err(|e| inconsistent(format!("{} folders: {}", scope, e)))?;
        for phrase in record.phrases {
            folder.add_phrase(&phrase.text, phrase.frequency);
        }
    }
    Ok(folders)
}

fn restore_list(record: ListRecord) -> Result<PhraseList, SessionError> {
    let name = record.name;
    if name.trim().is_empty() {
        return Err(inconsistent("list with empty name".to_string()));
    }
    let HistoryRecord {
        capacity,
        cursor,
        snapshots,
    } = record.history;

    let history = HistoryManager::from_parts(capacity, cursor, snapshots).ok_or_else(|| {
        inconsistent(format!(
            "list '{}': history cursor {} does not fit capacity {}",
            name, cursor, capacity
        ))
    })?;

    match history.current() {
        Some(current) if current != record.phrases => {
            return Err(inconsistent(format!(
                "list '{}': phrases differ from the history cursor snapshot",
                name
            )));
        }
        None if !record.phrases.is_empty() => {
            return Err(inconsistent(format!("list '{}': populated list has no history", name)));
        }
        _ => {}
    }

    let folders = restore_folders(record.folders, &name)?;
    Ok(PhraseList::from_parts(
        name,
        record.phrases,
        restore_stop_words(record.stop_words),
        folders,
        history,
    ))
}
