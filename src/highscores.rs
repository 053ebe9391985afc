//! Best-score persistence
//!
//! A single scalar, stored as the bare number under `highScore`. A
//! `{"best": N}` object is also accepted on load.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage, StorageError};

/// Best score across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHighScore {
    Record(HighScore),
    Bare(f64),
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highScore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Parse a stored value in either format
    pub fn parse(json: &str) -> Result<Self, StorageError> {
        let best = match serde_json::from_str::<StoredHighScore>(json.trim())? {
            StoredHighScore::Record(record) => record.best,
            StoredHighScore::Bare(n) if n.is_finite() && n > 0.0 => n.floor() as u64,
            StoredHighScore::Bare(_) => 0,
        };
        Ok(Self { best })
    }

    /// Read from storage; `Ok(None)` if nothing was saved yet
    pub fn try_load(storage: &impl Storage) -> Result<Option<Self>, StorageError> {
        storage
            .get(Self::STORAGE_KEY)?
            .map(|json| Self::parse(&json))
            .transpose()
    }

    /// Load from storage, falling back to zero on any failure
    pub fn load(storage: &impl Storage) -> Self {
        match Self::try_load(storage) {
            Ok(Some(score)) => {
                log::info!("Loaded high score: {}", score.best);
                score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable high score: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut impl Storage) -> Result<(), StorageError> {
        persistence::save_json(storage, Self::STORAGE_KEY, &self.best)?;
        log::info!("High score saved ({})", self.best);
        Ok(())
    }

    /// Would `score` set a new record?
    pub fn is_beaten_by(&self, score: u64) -> bool {
        score > self.best
    }

    /// Keep the max of the stored best and `score`. Returns true on a new record.
    pub fn record(&mut self, score: u64) -> bool {
        if self.is_beaten_by(score) {
            self.best = score;
            true
        } else {
            false
        }
    }
}
