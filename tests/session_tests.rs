// Integration tests for session persistence
// Save/load through the filesystem and the command layer on top of it

use anyhow::Result;
use phrasedesk::commands::{self, FolderOperation, Session, StopOperation};
use phrasedesk::config::Config;
use phrasedesk::models::{Phrase, Transfer};
use phrasedesk::processor::Transform;
use phrasedesk::session::{SessionError, SessionStore};
use phrasedesk::workspace::{FolderScope, Workspace};
use std::fs;
use tempfile::TempDir;

fn phrases(items: &[(&str, u64)]) -> Vec<Phrase> {
    items.iter().map(|&(t, f)| Phrase::new(t, f)).collect()
}

fn populated() -> Result<Workspace> {
    let mut ws = Workspace::default();
    ws.open_list("cars")?;
    ws.merge_batch(
        "cars",
        &phrases(&[("Banana 50", 50), ("buy car", 100), ("Buy Car ", 5), ("cheap car", 7)]),
    )?;
    ws.apply("cars", Transform::RemoveDuplicates)?;
    ws.apply("cars", Transform::SortByFrequency { descending: true })?;
    ws.add_stop_word("cars", "cheap")?;
    ws.create_folder(FolderScope::Local("cars"), "fruit")?;
    let banana = ws.list("cars")?.select(&["banana 50".to_string()]);
    ws.send_to_folder("cars", FolderScope::Local("cars"), "fruit", &banana, Transfer::Move)?;
    ws.add_global_stop_word("Used");
    ws.create_folder(FolderScope::Global, "later")?;
    Ok(ws)
}

#[test]
fn test_save_and_load_round_trip() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("sessions/work.json");
    let ws = populated()?;

    SessionStore::save(&ws, &path)?;
    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let loaded = SessionStore::load(&path)?;
    assert_eq!(loaded, ws);
    assert_eq!(loaded.counts("cars")?, (2, 1));
    Ok(())
}

#[test]
fn test_undo_chain_survives_reload() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("s.json");
    SessionStore::save(&populated()?, &path)?;

    let mut ws = SessionStore::load(&path)?;
    // move to folder, sort, dedup
    assert!(ws.undo("cars")?);
    assert_eq!(ws.list("cars")?.len(), 3);
    assert!(ws.undo("cars")?);
    assert!(ws.undo("cars")?);
    assert_eq!(ws.list("cars")?.len(), 4);
    // the loaded batch is the bottom of the chain
    assert!(!ws.undo("cars")?);
    assert_eq!(ws.list("cars")?.len(), 4);

    assert!(ws.redo("cars")?);
    assert_eq!(ws.list("cars")?.len(), 3);
    Ok(())
}

#[test]
fn test_corrupt_file_is_rejected() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("bad.json");
    fs::write(&path, "{ not json")?;
    assert!(matches!(SessionStore::load(&path), Err(SessionError::Malformed(_))));

    fs::write(&path, r#"{"format": "something-else", "version": 1}"#)?;
    assert!(matches!(SessionStore::load(&path), Err(SessionError::WrongFormat(_))));

    let missing = temp.path().join("missing.json");
    assert!(matches!(SessionStore::load(&missing), Err(SessionError::Io(_))));
    Ok(())
}

#[test]
fn test_stop_words_are_normalised_on_load() -> Result<()> {
    let json = r#"{
        "format": "phrasedesk-session",
        "version": 1,
        "global": {"stop_words": ["  FREE ", ""], "folders": []},
        "lists": []
    }"#;
    let ws = SessionStore::decode(json.as_bytes())?;
    assert_eq!(ws.global().stop_words.len(), 1);
    assert!(ws.global().stop_words.contains("free"));
    assert_eq!(ws.active_index(), None);
    Ok(())
}

#[test]
fn test_commands_persist_between_sessions() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("cli.json");

    let mut session = Session::open_with(path.clone(), Config::default())?;
    session.workspace.open_list("seo")?;
    commands::add(&mut session, "  garden hose ", None)?;
    commands::add(&mut session, "garden tools", None)?;
    commands::stop(
        &mut session,
        StopOperation::Add {
            words: vec!["Tools".to_string()],
        },
        true,
        None,
    )?;
    commands::folder(
        &mut session,
        FolderOperation::Create {
            name: "keep".to_string(),
        },
        false,
        None,
    )?;
    commands::folder(
        &mut session,
        FolderOperation::Send {
            folder: "keep".to_string(),
            texts: vec!["GARDEN HOSE".to_string()],
            transfer: Transfer::Move,
        },
        false,
        None,
    )?;

    let reopened = Session::open_with(path, Config::default())?;
    let ws = &reopened.workspace;
    assert_eq!(ws.active_name()?, "seo");
    assert_eq!(ws.list("seo")?.phrases(), phrases(&[("garden tools", 0)]).as_slice());
    assert_eq!(ws.counts("seo")?, (1, 0));
    assert_eq!(
        ws.folders(FolderScope::Local("seo"))?.require("keep")?.phrases,
        phrases(&[("garden hose", 0)])
    );
    Ok(())
}

#[test]
fn test_broken_session_is_not_overwritten() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("cli.json");
    fs::write(&path, "[]")?;

    assert!(Session::open_with(path.clone(), Config::default()).is_err());
    assert_eq!(fs::read_to_string(&path)?, "[]");
    Ok(())
}
