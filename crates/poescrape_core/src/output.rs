use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Overlay data file. Creating it truncates and writes the header; data is appended
/// afterwards, so a rerun replaces the previous file instead of growing it.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    pub fn create_with_header(path: &Path, header: &[String]) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        write_lines(file, header).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the number of lines written.
    pub fn append_lines(&self, lines: &[String]) -> Result<usize> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {} for append", self.path.display()))?;
        write_lines(file, lines)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(lines.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_lines(file: File, lines: &[String]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(LINE_ENDING.as_bytes())?;
    }
    writer.flush()
}
