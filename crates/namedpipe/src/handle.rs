use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use namedpipe_data::{DataConfig, DataError, DataReader, DataWriter};
use tracing::{debug, info, warn};

use crate::error::{PipeError, Result};
use crate::options::{CreationMode, Direction, PipeOptions, PipeState};

#[cfg(unix)]
use crate::lock::CreationLock;

/// Per-direction stream slot: `Unopened → Open → Closed`, never backwards.
enum Slot<T> {
    Unopened,
    Open(T),
    Closed,
}

impl<T> Slot<T> {
    fn state(&self) -> PipeState {
        match self {
            Slot::Unopened => PipeState::Unopened,
            Slot::Open(_) => PipeState::Open,
            Slot::Closed => PipeState::Closed,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A Unix named pipe (FIFO) owned as a typed byte-stream resource.
///
/// Construction runs the creation/validation protocol under an
/// inter-process creation lock. The read and write streams are opened
/// lazily, on the first operation in their direction, and cached for the
/// handle's remaining lifetime; per standard FIFO semantics, opening one
/// direction blocks until a peer opens the other. [`close`](Self::close)
/// tears down whatever was opened and, if configured, removes the
/// filesystem entry; it also runs on drop.
///
/// The two directions are independently locked, so one thread may drive
/// writes while another drives reads on the same handle (via `Arc`).
pub struct PipeHandle {
    path: PathBuf,
    delete_on_close: bool,
    creation_mode: CreationMode,
    data_config: DataConfig,
    closed: AtomicBool,
    reader: Mutex<Slot<DataReader<File>>>,
    writer: Mutex<Slot<DataWriter<File>>>,
}

impl PipeHandle {
    /// Create a FIFO at `path` with default options.
    ///
    /// Fails with `PathAlreadyExists` if the path is taken; see
    /// [`PipeOptions`] for open-existing and overwrite behavior.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with(path, PipeOptions::default())
    }

    /// Create or open a FIFO at `path` per `options`.
    ///
    /// The existence check and any creation run under an advisory
    /// inter-process lock on a sibling `<path>.lock` file, so concurrent
    /// constructions targeting the same path serialize instead of racing.
    #[cfg(unix)]
    pub fn create_with(path: impl AsRef<Path>, options: PipeOptions) -> Result<Self> {
        use std::os::unix::fs::FileTypeExt;

        let path = path.as_ref().to_path_buf();

        let creation_mode = {
            let _lock = CreationLock::acquire(&path).map_err(|source| {
                PipeError::LockUnavailable {
                    path: CreationLock::lock_path(&path),
                    source,
                }
            })?;

            match std::fs::symlink_metadata(&path) {
                Ok(metadata) => {
                    // open_existing wins over overwrite_existing by design:
                    // opening intent beats destructive intent.
                    if options.open_existing {
                        if !metadata.file_type().is_fifo() {
                            return Err(PipeError::ExistingEntryNotAPipe { path });
                        }
                        debug!(?path, "reusing existing FIFO");
                        CreationMode::OpenExisting
                    } else if !options.overwrite_existing {
                        return Err(PipeError::PathAlreadyExists { path });
                    } else {
                        std::fs::remove_file(&path).map_err(|source| {
                            PipeError::CreationFailed {
                                path: path.clone(),
                                source,
                            }
                        })?;
                        options.creator.create(&path, options.mode).map_err(|source| {
                            PipeError::CreationFailed {
                                path: path.clone(),
                                source,
                            }
                        })?;
                        info!(?path, "replaced existing entry with new FIFO");
                        CreationMode::CreateOrOverwrite
                    }
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    options.creator.create(&path, options.mode).map_err(|source| {
                        PipeError::CreationFailed {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    info!(?path, "created FIFO");
                    CreationMode::CreateNew
                }
                Err(source) => return Err(PipeError::CreationFailed { path, source }),
            }
            // _lock drops here, before any stream can be opened
        };

        Ok(Self {
            path,
            delete_on_close: options.delete_on_close,
            creation_mode,
            data_config: options.data_config,
            closed: AtomicBool::new(false),
            reader: Mutex::new(Slot::Unopened),
            writer: Mutex::new(Slot::Unopened),
        })
    }

    /// FIFO special files only exist on Unix-like systems.
    #[cfg(not(unix))]
    pub fn create_with(_path: impl AsRef<Path>, _options: PipeOptions) -> Result<Self> {
        Err(PipeError::UnsupportedPlatform)
    }

    /// The path of the FIFO special file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How this handle came to refer to its FIFO. Diagnostics only.
    pub fn creation_mode(&self) -> CreationMode {
        self.creation_mode
    }

    /// Whether `close` removes the filesystem entry.
    pub fn delete_on_close(&self) -> bool {
        self.delete_on_close
    }

    /// Lifecycle state of the read direction.
    pub fn read_state(&self) -> PipeState {
        lock(&self.reader).state()
    }

    /// Lifecycle state of the write direction.
    pub fn write_state(&self) -> PipeState {
        lock(&self.writer).state()
    }

    /// Whether `close` has completed at least once.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Run `f` against the read stream, opening it first if necessary.
    ///
    /// The first call blocks until a writer opens the other end of the
    /// FIFO. Fails with `UseAfterClose` once the handle is closed.
    pub fn with_reader<R>(
        &self,
        f: impl FnOnce(&mut DataReader<File>) -> std::result::Result<R, DataError>,
    ) -> Result<R> {
        let mut slot = lock(&self.reader);
        let reader = self.ensure_reader(&mut slot)?;
        f(reader).map_err(PipeError::from)
    }

    /// Run `f` against the write stream, opening it first if necessary.
    ///
    /// The first call blocks until a reader opens the other end of the
    /// FIFO. Fails with `UseAfterClose` once the handle is closed.
    pub fn with_writer<R>(
        &self,
        f: impl FnOnce(&mut DataWriter<File>) -> std::result::Result<R, DataError>,
    ) -> Result<R> {
        let mut slot = lock(&self.writer);
        let writer = self.ensure_writer(&mut slot)?;
        f(writer).map_err(PipeError::from)
    }

    fn ensure_reader<'a>(
        &self,
        slot: &'a mut Slot<DataReader<File>>,
    ) -> Result<&'a mut DataReader<File>> {
        if let Slot::Closed = slot {
            return Err(PipeError::UseAfterClose {
                direction: Direction::Read,
            });
        }
        if let Slot::Unopened = slot {
            debug!(path = ?self.path, "opening read stream");
            let file = File::open(&self.path).map_err(|source| PipeError::StreamOpenFailed {
                direction: Direction::Read,
                path: self.path.clone(),
                source,
            })?;
            *slot = Slot::Open(DataReader::with_config(file, self.data_config.clone()));
        }
        match slot {
            Slot::Open(reader) => Ok(reader),
            _ => unreachable!("slot was just opened"),
        }
    }

    fn ensure_writer<'a>(
        &self,
        slot: &'a mut Slot<DataWriter<File>>,
    ) -> Result<&'a mut DataWriter<File>> {
        if let Slot::Closed = slot {
            return Err(PipeError::UseAfterClose {
                direction: Direction::Write,
            });
        }
        if let Slot::Unopened = slot {
            debug!(path = ?self.path, "opening write stream");
            let file = std::fs::OpenOptions::new()
                .write(true)
                .open(&self.path)
                .map_err(|source| PipeError::StreamOpenFailed {
                    direction: Direction::Write,
                    path: self.path.clone(),
                    source,
                })?;
            *slot = Slot::Open(DataWriter::with_config(file, self.data_config.clone()));
        }
        match slot {
            Slot::Open(writer) => Ok(writer),
            _ => unreachable!("slot was just opened"),
        }
    }

    /// Close the handle: tear down opened streams and, if configured,
    /// remove the filesystem entry.
    ///
    /// Idempotent — later calls are no-ops returning `Ok(())`. The write
    /// side is torn down first so a peer blocked in a read sees EOF.
    /// Directions never opened transition straight to `Closed` without
    /// touching the OS. A deletion failure is reported but never masks the
    /// stream closure that already happened.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut first_error: Option<PipeError> = None;

        {
            let mut slot = lock(&self.writer);
            if let Slot::Open(mut writer) = std::mem::replace(&mut *slot, Slot::Closed) {
                if let Err(err) = writer.flush() {
                    warn!(path = ?self.path, error = %err, "flush during close failed");
                    first_error.get_or_insert(PipeError::from(err));
                }
                debug!(path = ?self.path, "closed write stream");
            }
        }
        {
            let mut slot = lock(&self.reader);
            if let Slot::Open(_) = std::mem::replace(&mut *slot, Slot::Closed) {
                debug!(path = ?self.path, "closed read stream");
            }
        }

        if self.delete_on_close {
            match std::fs::remove_file(&self.path) {
                Ok(()) => debug!(path = ?self.path, "removed FIFO"),
                // Already absent: the post-close contract (entry gone) holds.
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    warn!(path = ?self.path, error = %source, "failed to remove FIFO during close");
                    first_error.get_or_insert(PipeError::DeletionFailed {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Flush the write stream if it is open; a no-op if it was never opened.
    pub fn flush(&self) -> Result<()> {
        let mut slot = lock(&self.writer);
        match &mut *slot {
            Slot::Open(writer) => writer.flush().map_err(PipeError::from),
            Slot::Unopened => Ok(()),
            Slot::Closed => Err(PipeError::UseAfterClose {
                direction: Direction::Write,
            }),
        }
    }

    // Typed reads — routed to the lazily opened read stream.

    pub fn read_u8(&self) -> Result<u8> {
        self.with_reader(|r| r.read_u8())
    }

    pub fn read_i8(&self) -> Result<i8> {
        self.with_reader(|r| r.read_i8())
    }

    pub fn read_u16(&self) -> Result<u16> {
        self.with_reader(|r| r.read_u16())
    }

    pub fn read_i16(&self) -> Result<i16> {
        self.with_reader(|r| r.read_i16())
    }

    pub fn read_u32(&self) -> Result<u32> {
        self.with_reader(|r| r.read_u32())
    }

    pub fn read_i32(&self) -> Result<i32> {
        self.with_reader(|r| r.read_i32())
    }

    pub fn read_u64(&self) -> Result<u64> {
        self.with_reader(|r| r.read_u64())
    }

    pub fn read_i64(&self) -> Result<i64> {
        self.with_reader(|r| r.read_i64())
    }

    pub fn read_f32(&self) -> Result<f32> {
        self.with_reader(|r| r.read_f32())
    }

    pub fn read_f64(&self) -> Result<f64> {
        self.with_reader(|r| r.read_f64())
    }

    pub fn read_bool(&self) -> Result<bool> {
        self.with_reader(|r| r.read_bool())
    }

    pub fn read_text(&self) -> Result<String> {
        self.with_reader(|r| r.read_text())
    }

    pub fn read_blob(&self) -> Result<Bytes> {
        self.with_reader(|r| r.read_blob())
    }

    pub fn read_bytes(&self, buf: &mut [u8]) -> Result<()> {
        self.with_reader(|r| r.read_bytes(buf))
    }

    pub fn read_range(&self, buf: &mut [u8], off: usize, len: usize) -> Result<()> {
        self.with_reader(|r| r.read_range(buf, off, len))
    }

    pub fn skip(&self, n: usize) -> Result<()> {
        self.with_reader(|r| r.skip(n))
    }

    // Typed writes — routed to the lazily opened write stream.

    pub fn write_u8(&self, v: u8) -> Result<()> {
        self.with_writer(|w| w.write_u8(v))
    }

    pub fn write_i8(&self, v: i8) -> Result<()> {
        self.with_writer(|w| w.write_i8(v))
    }

    pub fn write_u16(&self, v: u16) -> Result<()> {
        self.with_writer(|w| w.write_u16(v))
    }

    pub fn write_i16(&self, v: i16) -> Result<()> {
        self.with_writer(|w| w.write_i16(v))
    }

    pub fn write_u32(&self, v: u32) -> Result<()> {
        self.with_writer(|w| w.write_u32(v))
    }

    pub fn write_i32(&self, v: i32) -> Result<()> {
        self.with_writer(|w| w.write_i32(v))
    }

    pub fn write_u64(&self, v: u64) -> Result<()> {
        self.with_writer(|w| w.write_u64(v))
    }

    pub fn write_i64(&self, v: i64) -> Result<()> {
        self.with_writer(|w| w.write_i64(v))
    }

    pub fn write_f32(&self, v: f32) -> Result<()> {
        self.with_writer(|w| w.write_f32(v))
    }

    pub fn write_f64(&self, v: f64) -> Result<()> {
        self.with_writer(|w| w.write_f64(v))
    }

    pub fn write_bool(&self, v: bool) -> Result<()> {
        self.with_writer(|w| w.write_bool(v))
    }

    pub fn write_text(&self, text: &str) -> Result<()> {
        self.with_writer(|w| w.write_text(text))
    }

    pub fn write_blob(&self, blob: &[u8]) -> Result<()> {
        self.with_writer(|w| w.write_blob(blob))
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.with_writer(|w| w.write_bytes(bytes))
    }

    pub fn write_range(&self, bytes: &[u8], off: usize, len: usize) -> Result<()> {
        self.with_writer(|w| w.write_range(bytes, off, len))
    }
}

impl Drop for PipeHandle {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(path = ?self.path, error = %err, "close during drop failed");
        }
    }
}

impl std::fmt::Debug for PipeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeHandle")
            .field("path", &self.path)
            .field("creation_mode", &self.creation_mode)
            .field("delete_on_close", &self.delete_on_close)
            .field("read_state", &self.read_state())
            .field("write_state", &self.write_state())
            .finish()
    }
}
