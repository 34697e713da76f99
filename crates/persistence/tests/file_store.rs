use std::path::PathBuf;

use persistence::{decode, encode, FileStore, PersistenceError, SaveStore};
use proptest::prelude::*;
use sim_core::{CellCoord, ColorId, GameState, StateError};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gridpaint-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn file_store_creates_directories_and_round_trips() {
    let dir = scratch_dir("roundtrip");
    let store = FileStore::new(dir.join("nested").join("save.json"));
    assert!(store.load().unwrap().is_none());

    let mut state = GameState::new();
    let _ = state.add_money(250).unwrap();
    let _ = state.set_cell(2, 1, Some(ColorId::from("white")));
    store.save(&state.to_document()).unwrap();
    assert!(store.path().exists());

    let doc = store.load().unwrap().unwrap();
    let mut restored = GameState::new();
    restored.load_document(doc).unwrap();
    assert_eq!(restored.money(), 250);
    assert_eq!(
        restored.grid().get_cell(2, 1).map(ColorId::as_str),
        Some("white")
    );

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    store.clear().unwrap();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_store_reports_corrupt_saves() {
    let dir = scratch_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("save.json");
    std::fs::write(&path, "{ definitely not json").unwrap();
    let store = FileStore::new(&path);
    assert!(matches!(
        store.load(),
        Err(PersistenceError::Invalid(StateError::InvalidSave(_)))
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

proptest! {
    #[test]
    fn export_survives_arbitrary_progress(
        money in 1u64..1_000_000,
        cells in proptest::collection::vec((0i32..4, 0i32..4), 0..16),
    ) {
        let mut state = GameState::new();
        let _ = state.add_money(money).unwrap();
        let _ = state.set_cells(
            cells.into_iter().map(|(x, y)| (CellCoord::new(x, y), Some(ColorId::from("black")))),
        );
        let doc = state.to_document();
        let text = encode(&doc).unwrap();
        let decoded = decode(&format!("  {text}\n")).unwrap();
        prop_assert_eq!(decoded, doc);
    }
}
