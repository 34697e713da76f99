#![deny(warnings)]

//! Rewrites a save file in the current format version.

use std::path::PathBuf;

use persistence::{default_save_path, FileStore, SaveStore};
use sim_core::GameState;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_save_path);
    let store = FileStore::new(&path);
    let Some(doc) = store.load()? else {
        println!("No save at {}", path.display());
        return Ok(());
    };
    let from = doc.version;
    // Loading applies defaults for fields older versions lack.
    let mut state = GameState::new();
    state.load_document(doc)?;
    let upgraded = state.to_document();
    store.save(&upgraded)?;
    println!(
        "Save migrated at {} (v{} -> v{})",
        path.display(),
        from,
        upgraded.version
    );
    Ok(())
}
