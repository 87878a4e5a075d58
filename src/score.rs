use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "bonus-snake";
const SCORE_FILE_NAME: &str = "scores.json";

/// Get/set surface for the persisted high score.
pub trait HighScoreStore {
    /// Stored high score, or 0 when nothing was stored yet.
    fn load_high_score(&self) -> u32;

    fn save_high_score(&mut self, score: u32) -> io::Result<()>;
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Box<T> {
    fn load_high_score(&self) -> u32 {
        (**self).load_high_score()
    }

    fn save_high_score(&mut self, score: u32) -> io::Result<()> {
        (**self).save_high_score(score)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    high_score: u32,
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// High score kept in a small JSON file.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
    cached: u32,
}

impl JsonScoreStore {
    /// Opens the store at the default data directory.
    ///
    /// Returns `Err` when the file exists but cannot be read or parsed, so the
    /// caller can surface a warning before entering raw terminal mode.
    pub fn open_default() -> io::Result<Self> {
        Self::open(scores_path())
    }

    pub fn open(path: PathBuf) -> io::Result<Self> {
        let cached = load_high_score_from_path(&path)?;
        Ok(Self { path, cached })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonScoreStore {
    fn load_high_score(&self) -> u32 {
        self.cached
    }

    fn save_high_score(&mut self, score: u32) -> io::Result<()> {
        save_high_score_to_path(&self.path, score)?;
        self.cached = score;
        Ok(())
    }
}

/// In-memory store that counts writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    pub high_score: u32,
    pub writes: usize,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn with_high_score(high_score: u32) -> Self {
        Self {
            high_score,
            writes: 0,
        }
    }
}

impl HighScoreStore for MemoryScoreStore {
    fn load_high_score(&self) -> u32 {
        self.high_score
    }

    fn save_high_score(&mut self, score: u32) -> io::Result<()> {
        self.high_score = score;
        self.writes += 1;
        Ok(())
    }
}

fn load_high_score_from_path(path: &Path) -> io::Result<u32> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    serde_json::from_str::<ScoreFile>(&raw)
        .map(|file| file.high_score)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_high_score_to_path(path: &Path, score: u32) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = ScoreFile { high_score: score };
    let json = serde_json::to_string_pretty(&payload)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    fs::write(path, json)
}
