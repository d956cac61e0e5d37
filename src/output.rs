use formatx::formatx;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(self.directory_path.join(
            formatx!(&self.file_template, location_key).unwrap(),
        ))?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// An output that collects each "file" into a shared in-memory buffer keyed by
/// its location key, so callers such as API handlers or tests can read back what
/// a run wrote without touching the filesystem.
#[derive(Clone, Debug, Default)]
pub struct MemoryOutput {
    files: Arc<Mutex<IndexMap<String, Vec<u8>>>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn location_keys(&self) -> Vec<String> {
        self.files.lock().keys().cloned().collect()
    }

    pub fn bytes_for_location_key(&self, location_key: &str) -> Option<Vec<u8>> {
        self.files.lock().get(location_key).cloned()
    }

    pub fn string_for_location_key(&self, location_key: &str) -> Option<String> {
        self.bytes_for_location_key(location_key)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Output for MemoryOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        self.files
            .lock()
            .entry(location_key.to_string())
            .or_default();
        Ok(MemoryWriter {
            files: self.files.clone(),
            location_key: location_key.to_string(),
        })
    }
}

impl Output for &MemoryOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <MemoryOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// Represents a writer for an individual in-memory "file".
struct MemoryWriter {
    files: Arc<Mutex<IndexMap<String, Vec<u8>>>>,
    location_key: String,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .lock()
            .entry(self.location_key.clone())
            .or_default()
            .extend_from_slice(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
