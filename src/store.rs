use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::bingo_machine::BingoMachine;

/// Everything that survives between two runs: the numbers called so far,
/// in call order, and the pending settai number if the operator set one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub drawn_numbers: Vec<u32>,
    pub settai_number: Option<u32>,
}

pub struct SessionStore {
    path: PathBuf,
    session: Session,
}

impl SessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let session = if path.exists() {
            let file = File::open(&path).with_context(|| format!("failed to open session {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse session {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "no session file yet, starting empty");
            Session::default()
        };
        Ok(Self { path, session })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn drawn(&self) -> &[u32] {
        &self.session.drawn_numbers
    }

    pub fn settai(&self) -> Option<u32> {
        self.session.settai_number
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = File::create(&self.path).with_context(|| format!("failed to write session {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.session)
            .with_context(|| format!("failed to serialize session to {}", self.path.display()))?;
        // BufWriter's Drop swallows errors, so the flush has to be explicit.
        writer.flush().with_context(|| format!("failed to write session {}", self.path.display()))?;
        Ok(())
    }

    pub fn set_settai(&mut self, n: u32) {
        self.session.settai_number = Some(n);
    }

    pub fn clear_settai(&mut self) {
        self.session.settai_number = None;
    }

    /// Removes and returns the pending settai number. It is single-use.
    pub fn take_settai(&mut self) -> Option<u32> {
        self.session.settai_number.take()
    }

    pub fn record_draw(&mut self, n: u32) {
        self.session.drawn_numbers.push(n);
    }

    pub fn reset(&mut self) {
        self.session = Session::default();
    }

    /// Draws the next number, consuming any pending settai number, records it
    /// and persists the session. `Ok(None)` means every number is out.
    pub fn draw_next<R: Rng + ?Sized>(&mut self, machine: &BingoMachine, rng: &mut R) -> Result<Option<u32>> {
        let forced = self.take_settai();
        let drawn = machine.draw(self.drawn(), forced, rng);
        match (drawn, forced) {
            (Some(n), Some(f)) if n == f => tracing::info!(number = n, "settai number drawn"),
            (Some(n), _) => tracing::info!(number = n, "number drawn"),
            (None, _) => tracing::info!("all numbers drawn"),
        }
        if let Some(n) = drawn {
            self.record_draw(n);
        }
        self.save()?;
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).unwrap();
        assert!(store.drawn().is_empty());
        assert_eq!(store.settai(), None);
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = SessionStore::open(&path).unwrap();
        store.record_draw(5);
        store.record_draw(17);
        store.set_settai(33);
        store.save().unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.drawn(), &[5, 17]);
        assert_eq!(reopened.settai(), Some(33));
    }

    #[test]
    fn test_settai_is_consumed_by_one_draw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let machine = BingoMachine::default();
        let mut rng = StdRng::seed_from_u64(9);

        let mut store = SessionStore::open(&path).unwrap();
        store.set_settai(64);
        assert_eq!(store.draw_next(&machine, &mut rng).unwrap(), Some(64));
        assert_eq!(store.settai(), None);

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.drawn(), &[64]);
        assert_eq!(reopened.settai(), None);
    }

    #[test]
    fn test_stale_settai_is_dropped_and_draw_is_random() {
        let dir = tempfile::tempdir().unwrap();
        let machine = BingoMachine::new(3);
        let mut rng = StdRng::seed_from_u64(2);

        let mut store = SessionStore::open(dir.path().join("session.json")).unwrap();
        store.record_draw(1);
        store.record_draw(2);
        store.set_settai(2);
        assert_eq!(store.draw_next(&machine, &mut rng).unwrap(), Some(3));
        assert_eq!(store.settai(), None);
        assert_eq!(store.draw_next(&machine, &mut rng).unwrap(), None);
        assert_eq!(store.drawn(), &[1, 2, 3]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_save_reports_write_failure() {
        let mut store = SessionStore { path: PathBuf::from("/dev/full"), session: Session::default() };
        store.record_draw(12);
        store.set_settai(40);
        assert!(store.save().is_err(), "a full device must not be reported as saved");
    }

    #[test]
    fn test_reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(dir.path().join("session.json")).unwrap();
        store.record_draw(4);
        store.set_settai(8);
        store.reset();
        assert!(store.drawn().is_empty());
        assert_eq!(store.settai(), None);
    }
}
