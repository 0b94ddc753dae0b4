//! File Reader Adapter
//! Reads a selected file on a background thread and hands the text back over a channel.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a text file", path.display())]
    NotUtf8 { path: PathBuf },
    #[error("Reading {} was interrupted", path.display())]
    Interrupted { path: PathBuf },
}

/// State of an in-flight read.
#[derive(Debug)]
pub enum ReadPoll {
    /// Not finished; poll the returned handle again later.
    Pending(ReadHandle),
    Ready {
        path: PathBuf,
        result: Result<String, ReadError>,
    },
}

/// Receiving end of a single background read. Polling consumes it, so the
/// result can only be taken once.
#[derive(Debug)]
pub struct ReadHandle {
    path: PathBuf,
    rx: Receiver<Result<String, ReadError>>,
}

impl ReadHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check for the result without blocking.
    pub fn try_recv(self) -> ReadPoll {
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return ReadPoll::Pending(self),
            // The worker exited without sending
            Err(TryRecvError::Disconnected) => Err(ReadError::Interrupted {
                path: self.path.clone(),
            }),
        };
        ReadPoll::Ready {
            path: self.path,
            result,
        }
    }

    /// Block until the read finishes.
    #[cfg(test)]
    pub fn wait(self) -> Result<String, ReadError> {
        self.rx.recv().unwrap_or(Err(ReadError::Interrupted { path: self.path }))
    }
}

/// Spawns file reads off the UI thread.
pub struct FileReader;

impl FileReader {
    /// Start reading `path` in the background.
    pub fn read(path: impl Into<PathBuf>) -> ReadHandle {
        let path = path.into();
        let (tx, rx) = channel();

        let worker_path = path.clone();
        thread::spawn(move || {
            let result = Self::read_text(&worker_path);
            // The receiver is gone if the upload was superseded.
            let _ = tx.send(result);
        });

        ReadHandle { path, rx }
    }

    fn read_text(path: &Path) -> Result<String, ReadError> {
        let bytes = fs::read(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| ReadError::NotUtf8 {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_full_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "month,savings,predictedSavings\n1,100,120\n").unwrap();

        let content = FileReader::read(file.path()).wait().unwrap();
        assert_eq!(content, "month,savings,predictedSavings\n1,100,120\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        let err = FileReader::read(&path).wait().unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }

    #[test]
    fn binary_content_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x9f]).unwrap();

        let err = FileReader::read(file.path()).wait().unwrap_err();
        assert!(matches!(err, ReadError::NotUtf8 { .. }));
    }

    #[test]
    fn result_is_delivered_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "month,savings,predictedSavings\n").unwrap();

        let mut handle = FileReader::read(file.path());
        let mut polls = 0;
        let (path, result) = loop {
            match handle.try_recv() {
                ReadPoll::Pending(next) => {
                    handle = next;
                    polls += 1;
                    assert!(polls < 1000, "read never completed");
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
                ReadPoll::Ready { path, result } => break (path, result),
            }
        };

        assert_eq!(path, file.path());
        assert_eq!(result.unwrap(), "month,savings,predictedSavings\n");
    }

    #[test]
    fn vanished_worker_is_interrupted() {
        let (tx, rx) = channel();
        drop(tx);
        let handle = ReadHandle {
            path: PathBuf::from("gone.csv"),
            rx,
        };

        match handle.try_recv() {
            ReadPoll::Ready { result, .. } => {
                assert!(matches!(result, Err(ReadError::Interrupted { .. })))
            }
            ReadPoll::Pending(_) => panic!("disconnected channel reported as pending"),
        }
    }
}
