use crate::storage::memory::{StagedTransaction, StoreState};
use crate::storage::traits::MintStore;
use crate::storage::StoreError;
use log::*;
use ron::ser::PrettyConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const STATE_FILE: &str = "mint.ron";

/// A file-based store for the mint state.
///
/// The whole state lives in memory and is rewritten to `<path>/mint.ron` on every commit.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: PathBuf,
    state: Mutex<StoreState>,
}

impl FileStore {
    /// Opens the store in `path`, creating the directory if needed and loading any previously saved state.
    pub fn new(path: PathBuf) -> Result<Self, StoreError> {
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        let file = path.join(STATE_FILE);
        let state = if file.exists() {
            let val = fs::read_to_string(&file)?;
            let state: StoreState = ron::de::from_str(&val)?;
            debug!("Loaded mint state from {}", file.display());
            state
        } else {
            StoreState::default()
        };
        Ok(Self { path, file, state: Mutex::new(state) })
    }

    /// Returns the path to the directory where the mint state is stored.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl MintStore for FileStore {
    type Tx<'a> = StagedTransaction<'a>;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        StagedTransaction::begin(&self.state, Some(self.file.as_path()))
    }
}

/// Writes to a sibling temp file first so a crash mid-write leaves the previous state intact.
pub(super) fn write_state(file: &Path, state: &StoreState) -> Result<(), StoreError> {
    let config = PrettyConfig::new().compact_arrays(true).compact_maps(true);
    let val = ron::ser::to_string_pretty(state, config)?;
    let tmp = file.with_extension("ron.tmp");
    fs::write(&tmp, &val)?;
    fs::rename(&tmp, file)?;
    Ok(())
}
