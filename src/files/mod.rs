//! On-disk storage for course backups and screenshots. One file per course
//! backup; uploads land in a temp file and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufReader};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BackupStorageError {
    #[error("file not found")]
    NotFound,
    #[error("empty upload")]
    EmptyUpload,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackupStorageError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

pub struct BackupStorage {
    base_path: PathBuf,
}

impl BackupStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("backups"),
        }
    }

    /// Root directory the relative backup handles resolve against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.base_path
    }

    fn backup_path(&self, site_id: i64, course_id: i64) -> PathBuf {
        self.base_path
            .join(site_id.to_string())
            .join(format!("{course_id}.mbz"))
    }

    fn screenshot_path(&self, site_id: i64, course_id: i64, index: i64) -> PathBuf {
        self.base_path
            .join(site_id.to_string())
            .join("screenshots")
            .join(format!("{course_id}_{index}.png"))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }

    /// Stores a course backup, replacing any previous one. Returns the
    /// relative handle persisted in the directory entry.
    pub async fn put_backup(
        &self,
        site_id: i64,
        course_id: i64,
        data: &[u8],
    ) -> Result<String, BackupStorageError> {
        if data.is_empty() {
            return Err(BackupStorageError::EmptyUpload);
        }

        let final_path = self.backup_path(site_id, course_id);
        self.write_atomic(&final_path, data).await?;

        Ok(format!("{site_id}/{course_id}.mbz"))
    }

    pub async fn get_backup(
        &self,
        site_id: i64,
        course_id: i64,
    ) -> Result<(BufReader<File>, i64), BackupStorageError> {
        let path = self.backup_path(site_id, course_id);
        let file = File::open(&path).await.map_err(BackupStorageError::from_io)?;

        let metadata = file.metadata().await?;
        let size = metadata.len() as i64;

        Ok((BufReader::new(file), size))
    }

    /// The absolute path of a stored backup, for consumers that read the
    /// file directly (demo course restores).
    pub fn backup_file_path(&self, site_id: i64, course_id: i64) -> PathBuf {
        self.backup_path(site_id, course_id)
    }

    pub async fn backup_exists(&self, site_id: i64, course_id: i64) -> bool {
        fs::metadata(self.backup_path(site_id, course_id))
            .await
            .is_ok()
    }

    pub async fn put_screenshot(
        &self,
        site_id: i64,
        course_id: i64,
        index: i64,
        data: &[u8],
    ) -> Result<(), BackupStorageError> {
        if data.is_empty() {
            return Err(BackupStorageError::EmptyUpload);
        }
        let final_path = self.screenshot_path(site_id, course_id, index);
        self.write_atomic(&final_path, data).await
    }

    pub async fn get_screenshot(
        &self,
        site_id: i64,
        course_id: i64,
        index: i64,
    ) -> Result<Vec<u8>, BackupStorageError> {
        fs::read(self.screenshot_path(site_id, course_id, index))
            .await
            .map_err(BackupStorageError::from_io)
    }

    /// Removes every stored file of a course. Missing files are fine.
    pub async fn delete_course_files(
        &self,
        site_id: i64,
        course_id: i64,
        screenshot_count: i64,
    ) -> Result<(), BackupStorageError> {
        match fs::remove_file(self.backup_path(site_id, course_id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(BackupStorageError::Io(e)),
        }
        for index in 1..=screenshot_count {
            match fs::remove_file(self.screenshot_path(site_id, course_id, index)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(BackupStorageError::Io(e)),
            }
        }
        Ok(())
    }

    async fn write_atomic(&self, final_path: &Path, data: &[u8]) -> Result<(), BackupStorageError> {
        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::rename(&temp_path, final_path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_put_and_get_backup() {
        let temp_dir = TempDir::new().unwrap();
        let storage = BackupStorage::new(temp_dir.path());

        let handle = storage.put_backup(1, 42, b"backup bytes").await.unwrap();
        assert_eq!(handle, "1/42.mbz");
        assert!(storage.backup_exists(1, 42).await);

        let (mut reader, size) = storage.get_backup(1, 42).await.unwrap();
        assert_eq!(size, 12);

        let mut content = Vec::new();
        reader.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"backup bytes");
    }

    #[tokio::test]
    async fn test_put_backup_replaces_previous() {
        let temp_dir = TempDir::new().unwrap();
        let storage = BackupStorage::new(temp_dir.path());

        storage.put_backup(1, 42, b"first").await.unwrap();
        storage.put_backup(1, 42, b"second").await.unwrap();

        let (mut reader, _) = storage.get_backup(1, 42).await.unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"second");
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let storage = BackupStorage::new(temp_dir.path());

        assert!(matches!(
            storage.put_backup(1, 42, b"").await,
            Err(BackupStorageError::EmptyUpload)
        ));
    }

    #[tokio::test]
    async fn test_missing_backup_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let storage = BackupStorage::new(temp_dir.path());

        assert!(!storage.backup_exists(9, 9).await);
        assert!(matches!(
            storage.get_backup(9, 9).await,
            Err(BackupStorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_screenshots_round_trip_and_cleanup() {
        let temp_dir = TempDir::new().unwrap();
        let storage = BackupStorage::new(temp_dir.path());

        storage.put_backup(1, 42, b"backup").await.unwrap();
        storage.put_screenshot(1, 42, 1, b"png1").await.unwrap();
        storage.put_screenshot(1, 42, 2, b"png2").await.unwrap();

        assert_eq!(storage.get_screenshot(1, 42, 2).await.unwrap(), b"png2");

        storage.delete_course_files(1, 42, 2).await.unwrap();
        assert!(!storage.backup_exists(1, 42).await);
        assert!(matches!(
            storage.get_screenshot(1, 42, 1).await,
            Err(BackupStorageError::NotFound)
        ));
    }
}
