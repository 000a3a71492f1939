//! JSON guide document: everything a `MemoryBackend` serves, in one file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::backend::MemoryBackend;
use crate::model::{Channel, EpgCandidate, Program, Recording};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideFile {
    #[serde(default)]
    pub channels: Vec<Channel>,
    /// Flat program list; each program names its channel key
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub recordings: Vec<Recording>,
    #[serde(default)]
    pub epg_candidates: Vec<EpgCandidate>,
}

impl GuideFile {
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open guide file: {}", path.display()))?;
        let guide: GuideFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse guide file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            channels = guide.channels.len(),
            programs = guide.programs.len(),
            recordings = guide.recordings.len(),
            "read guide file"
        );
        Ok(guide)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write guide file: {}", path.display()))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn into_backend(self) -> MemoryBackend {
        MemoryBackend::new(self.channels, self.programs, self.recordings, self.epg_candidates)
    }
}
