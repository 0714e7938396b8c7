use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Durable home of the single high score value.
pub trait HighScoreStore {
    /// `None` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<u32>>;

    fn save(&mut self, high_score: u32) -> Result<()>;
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn load(&mut self) -> Result<Option<u32>> {
        (**self).load()
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        (**self).save(high_score)
    }
}

#[derive(Serialize, Deserialize)]
struct HighScoreFile {
    #[serde(rename = "highScore")]
    high_score: u32,
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<u32>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let file: HighScoreFile = serde_json::from_str(&contents)?;
        Ok(Some(file.high_score))
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&HighScoreFile { high_score })?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Option<u32>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_value(high_score: u32) -> Self {
        MemoryStore { value: Some(high_score), saves: 0 }
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    /// How many times `save` was called
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&mut self) -> Result<Option<u32>> {
        Ok(self.value)
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        self.value = Some(high_score);
        self.saves += 1;
        Ok(())
    }
}
