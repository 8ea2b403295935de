use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use polyglot_config::OutputLayout;
use polyglot_types::{LanguageTable, OutputRow};

use crate::error::SinkError;

/// CSV output shared by all workers
///
/// Every row is flushed as soon as it is written; `sync` additionally forces the
/// file to stable storage and is called at checkpoints.
pub struct OutputSink {
    path: PathBuf,
    layout: OutputLayout,
    writer: Mutex<csv::Writer<File>>,
}

impl OutputSink {
    /// Create (or truncate) `path` and write the header for `layout`
    pub fn create(
        path: impl Into<PathBuf>,
        layout: OutputLayout,
        languages: &LanguageTable,
    ) -> Result<Self, SinkError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_writer(File::create(&path)?);
        match layout {
            OutputLayout::Long => writer.write_record(["text", "language"])?,
            OutputLayout::Wide => writer.write_record(languages.column_names())?,
        }
        writer.flush()?;

        Ok(Self {
            path,
            layout,
            writer: Mutex::new(writer),
        })
    }

    fn lock(&self) -> MutexGuard<'_, csv::Writer<File>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write_row(&self, row: &OutputRow) -> Result<(), SinkError> {
        let mut writer = self.lock();

        match self.layout {
            OutputLayout::Long => {
                for (text, language) in row.long_records() {
                    writer.write_record([text, language])?;
                }
            }
            OutputLayout::Wide => writer.write_record(row.wide_record())?,
        }

        writer.flush()?;
        Ok(())
    }

    pub fn sync(&self) -> Result<(), SinkError> {
        let mut writer = self.lock();
        writer.flush()?;
        writer.get_ref().sync_data()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> OutputLayout {
        self.layout
    }
}
