//! Временные файлы для синтезированного аудио
//!
//! Каждый вызов синтеза владеет своим файлом: `create` его захватывает,
//! `close` удаляет, а `Drop` удаляет на всех остальных путях выхода.

use std::io::Write;
use std::path::Path;

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::errors::AppResult;

pub struct TempAudioFile {
    file: Option<NamedTempFile>,
}

impl TempAudioFile {
    /// Создает пустой временный файл в `dir` (или в системной временной директории)
    pub fn create(dir: Option<&Path>, suffix: &str) -> AppResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tutor_tts_").suffix(suffix);

        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        debug!("Acquired temp audio file {}", file.path().display());

        Ok(Self { file: Some(file) })
    }

    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> AppResult<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(bytes)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Удаляет файл и сообщает об ошибке удаления
    pub fn close(mut self) -> AppResult<()> {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            file.close()?;
            debug!("Released temp audio file {}", path.display());
        }
        Ok(())
    }
}

impl Drop for TempAudioFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                warn!("Failed to remove temp audio file {}: {}", path.display(), e);
            }
        }
    }
}
