//! Descriptor-backed raw source over `std::fs::File`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use bufio_core::{Error, OpenMode, Result, StreamConfig};

use super::{RawSource, Whence};

pub struct FileSource {
    file: Option<File>,
    mode: OpenMode,
    path: Option<PathBuf>,
    // Flush written data to the device after every write.
    sync: bool,
}

impl FileSource {
    /// Open `path` with an `fopen`-style mode string (`"r"`, `"w+"`, ...).
    pub fn sysopen<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self> {
        Self::open_with_mode(path.as_ref(), OpenMode::parse(mode)?)
    }

    fn open_with_mode(path: &Path, mode: OpenMode) -> Result<Self> {
        let file = OpenOptions::new()
            .read(mode.read)
            .write(mode.write && !mode.append)
            .append(mode.append)
            .create(mode.create)
            .truncate(mode.truncate)
            .open(path)?;
        Ok(Self {
            file: Some(file),
            mode,
            path: Some(path.to_path_buf()),
            sync: false,
        })
    }

    /// Open `path` with `mode`, or with the config's default mode when
    /// `mode` is `None`.
    pub fn sysopen_with<P: AsRef<Path>>(
        path: P,
        mode: Option<&str>,
        config: &StreamConfig,
    ) -> Result<Self> {
        let mode = match mode {
            Some(mode) => OpenMode::parse(mode)?,
            None => config.open_mode()?,
        };
        Self::open_with_mode(path.as_ref(), mode)
    }

    /// Wrap an already-open file. The caller states which directions it was
    /// opened for.
    pub fn from_file(file: File, mode: OpenMode) -> Self {
        Self {
            file: Some(file),
            mode,
            path: None,
            sync: false,
        }
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn is_sync(&self) -> bool {
        self.sync
    }

    /// When set, every `syswrite` calls `sync_data` before returning.
    pub fn set_sync(&mut self, sync: bool) -> Result<()> {
        self.file_mut()?;
        self.sync = sync;
        Ok(())
    }

    /// Path this source was opened from; still available after close.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(Error::closed_stream)
    }
}

impl RawSource for FileSource {
    fn sysread(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let file = self.file_mut()?;
        if max_bytes == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0u8; max_bytes];
        let n = file.read(&mut buf)?;
        if n == 0 {
            return Err(Error::EndOfStream);
        }
        buf.truncate(n);
        Ok(buf)
    }

    fn syswrite(&mut self, bytes: &[u8]) -> Result<usize> {
        let sync = self.sync;
        let file = self.file_mut()?;
        let written = file.write(bytes)?;
        if sync {
            file.sync_data()?;
        }
        Ok(written)
    }

    fn sysseek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let target = whence.to_seek_from(offset)?;
        let file = self.file_mut()?;
        Ok(file.seek(target)?)
    }

    fn close(&mut self) -> Result<()> {
        match self.file.take() {
            Some(mut file) => {
                if self.mode.write {
                    file.flush()?;
                }
                Ok(())
            }
            None => Err(Error::closed_stream()),
        }
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("bufio-file-source-{}-{name}", std::process::id()));
        let _ = fs::remove_file(&p);
        p
    }

    #[test]
    fn test_sysread_then_eof() {
        let path = temp_path("read");
        fs::write(&path, b"mruby is fun\n").unwrap();

        let mut src = FileSource::sysopen(&path, "r").unwrap();
        assert_eq!(src.sysread(5).unwrap(), b"mruby");
        assert_eq!(src.sysread(10_000).unwrap(), b" is fun\n");
        assert!(src.sysread(10_000).unwrap_err().is_end_of_stream());
        assert_eq!(src.sysread(0).unwrap(), b"");
        src.close().unwrap();
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_syswrite_and_seek() {
        let path = temp_path("write");
        let mut src = FileSource::sysopen(&path, "w+").unwrap();
        assert_eq!(src.syswrite(b"abcdefg").unwrap(), 7);
        assert_eq!(src.sysseek(2, Whence::Start).unwrap(), 2);
        assert_eq!(src.sysread(3).unwrap(), b"cde");
        assert_eq!(src.sysseek(-1, Whence::End).unwrap(), 6);
        assert_eq!(src.sysseek(-2, Whence::Current).unwrap(), 4);
        src.close().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"abcdefg");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_close_twice_fails_and_path_survives() {
        let path = temp_path("close");
        fs::write(&path, b"x").unwrap();

        let mut src = FileSource::sysopen(&path, "r").unwrap();
        assert!(!src.is_closed());
        src.close().unwrap();
        assert!(src.is_closed());
        assert!(matches!(src.close(), Err(Error::Io(_))));
        assert!(matches!(src.sysread(1), Err(Error::Io(_))));
        assert_eq!(src.path(), Some(path.as_path()));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_sysopen_with_falls_back_to_config_mode() {
        let path = temp_path("default-mode");
        let cfg = StreamConfig {
            default_mode: "w+".to_string(),
            ..StreamConfig::default()
        };

        let mut src = FileSource::sysopen_with(&path, None, &cfg).unwrap();
        assert!(src.mode().write && src.mode().read);
        assert_eq!(src.syswrite(b"abc").unwrap(), 3);
        src.close().unwrap();

        let mut src = FileSource::sysopen_with(&path, Some("r"), &cfg).unwrap();
        assert!(!src.mode().write);
        assert_eq!(src.sysread(10).unwrap(), b"abc");
        src.close().unwrap();

        let _ = fs::remove_file(&path);
        let bad = StreamConfig {
            default_mode: "q".to_string(),
            ..StreamConfig::default()
        };
        assert!(matches!(
            FileSource::sysopen_with(&path, None, &bad),
            Err(Error::Argument(_))
        ));
    }

    #[test]
    fn test_sync_mode_writes_through() {
        let path = temp_path("sync");
        let mut src = FileSource::sysopen(&path, "w").unwrap();
        assert!(!src.is_sync());
        src.set_sync(true).unwrap();
        assert!(src.is_sync());
        assert_eq!(src.syswrite(b"durable").unwrap(), 7);
        assert_eq!(fs::read(&path).unwrap(), b"durable");
        src.close().unwrap();
        assert!(matches!(src.set_sync(false), Err(Error::Io(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_sysopen_rejects_bad_mode_and_missing_file() {
        let path = temp_path("missing");
        assert!(matches!(
            FileSource::sysopen(&path, "z"),
            Err(Error::Argument(_))
        ));
        assert!(matches!(FileSource::sysopen(&path, "r"), Err(Error::Sys(_))));
    }
}
