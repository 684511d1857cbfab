//! End-to-end lifecycle tests over real FIFOs.

#![cfg(unix)]

use std::os::unix::fs::FileTypeExt;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};

use namedpipe::{CreationMode, Direction, PipeError, PipeHandle, PipeOptions, PipeState};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("namedpipe-it-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn fresh_path_creates_exactly_one_fifo() {
    let dir = temp_dir("fresh");
    let path = dir.join("p1");

    let handle = PipeHandle::create(&path).unwrap();
    let metadata = std::fs::symlink_metadata(&path).unwrap();
    assert!(metadata.file_type().is_fifo());
    assert_eq!(handle.creation_mode(), CreationMode::CreateNew);

    handle.close().unwrap();
    assert!(!path.exists(), "delete_on_close defaults to true");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn integer_crosses_threads() {
    let dir = temp_dir("int-roundtrip");
    let pipe = Arc::new(PipeHandle::create(dir.join("p1")).unwrap());

    let to_write = 2739847i32;
    let writer = {
        let pipe = Arc::clone(&pipe);
        std::thread::spawn(move || pipe.write_i32(to_write).unwrap())
    };

    assert_eq!(pipe.read_i32().unwrap(), to_write);
    writer.join().unwrap();

    assert_eq!(pipe.read_state(), PipeState::Open);
    assert_eq!(pipe.write_state(), PipeState::Open);
    pipe.close().unwrap();

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn typed_sequence_crosses_threads_in_order() {
    let dir = temp_dir("typed-roundtrip");
    let pipe = Arc::new(PipeHandle::create(dir.join("p")).unwrap());

    let writer = {
        let pipe = Arc::clone(&pipe);
        std::thread::spawn(move || {
            pipe.write_i32(2739847).unwrap();
            pipe.write_bool(true).unwrap();
            pipe.write_text("over the pipe").unwrap();
            pipe.write_f64(-2.5).unwrap();
            pipe.write_blob(b"raw payload").unwrap();
            pipe.flush().unwrap();
        })
    };

    assert_eq!(pipe.read_i32().unwrap(), 2739847);
    assert!(pipe.read_bool().unwrap());
    assert_eq!(pipe.read_text().unwrap(), "over the pipe");
    assert_eq!(pipe.read_f64().unwrap(), -2.5);
    assert_eq!(pipe.read_blob().unwrap().as_ref(), b"raw payload");

    writer.join().unwrap();
    pipe.close().unwrap();

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn raw_ranges_cross_threads() {
    let dir = temp_dir("ranges");
    let pipe = Arc::new(PipeHandle::create(dir.join("p")).unwrap());

    let writer = {
        let pipe = Arc::clone(&pipe);
        std::thread::spawn(move || {
            pipe.write_range(&[0, 1, 2, 3, 4, 5], 1, 4).unwrap();
        })
    };

    let mut buf = [0u8; 4];
    pipe.read_bytes(&mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3, 4]);

    writer.join().unwrap();
    pipe.close().unwrap();

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn close_without_ever_opening_streams() {
    let dir = temp_dir("close-unopened");
    let path = dir.join("p2");
    let handle = PipeHandle::create(&path).unwrap();

    handle.close().unwrap();
    handle.close().unwrap();
    assert!(!path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn reads_and_writes_rejected_after_close() {
    let dir = temp_dir("after-close");
    let handle = PipeHandle::create(dir.join("p")).unwrap();
    handle.close().unwrap();

    assert!(matches!(
        handle.read_text().unwrap_err(),
        PipeError::UseAfterClose {
            direction: Direction::Read
        }
    ));
    assert!(matches!(
        handle.write_text("late").unwrap_err(),
        PipeError::UseAfterClose {
            direction: Direction::Write
        }
    ));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn existing_regular_file_is_left_untouched() {
    let dir = temp_dir("regular-file");
    let path = dir.join("p");
    std::fs::write(&path, b"do not touch").unwrap();

    let err = PipeHandle::create_with(
        &path,
        PipeOptions {
            open_existing: true,
            ..PipeOptions::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, PipeError::ExistingEntryNotAPipe { .. }));
    assert_eq!(std::fs::read(&path).unwrap(), b"do not touch");

    let err = PipeHandle::create(&path).unwrap_err();
    assert!(matches!(err, PipeError::PathAlreadyExists { .. }));
    assert_eq!(std::fs::read(&path).unwrap(), b"do not touch");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn concurrent_creation_exactly_one_creates() {
    let dir = temp_dir("race-default");
    let path = dir.join("p");
    let barrier = Arc::new(Barrier::new(2));

    let contenders: Vec<_> = (0..2)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                PipeHandle::create_with(
                    &path,
                    PipeOptions {
                        delete_on_close: false,
                        ..PipeOptions::default()
                    },
                )
            })
        })
        .collect();

    let results: Vec<_> = contenders
        .into_iter()
        .map(|t| t.join().unwrap())
        .collect();

    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok_count, 1, "exactly one construction may create the FIFO");
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, PipeError::PathAlreadyExists { .. }));
        }
    }
    let metadata = std::fs::symlink_metadata(&path).unwrap();
    assert!(metadata.file_type().is_fifo(), "never a corrupted entry");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn concurrent_creation_with_open_existing_both_succeed() {
    let dir = temp_dir("race-open");
    let path = dir.join("p");
    let barrier = Arc::new(Barrier::new(2));

    let contenders: Vec<_> = (0..2)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                PipeHandle::create_with(
                    &path,
                    PipeOptions {
                        open_existing: true,
                        delete_on_close: false,
                        ..PipeOptions::default()
                    },
                )
            })
        })
        .collect();

    let handles: Vec<_> = contenders
        .into_iter()
        .map(|t| t.join().unwrap().unwrap())
        .collect();

    let created = handles
        .iter()
        .filter(|h| h.creation_mode() == CreationMode::CreateNew)
        .count();
    let opened = handles
        .iter()
        .filter(|h| h.creation_mode() == CreationMode::OpenExisting)
        .count();
    assert_eq!((created, opened), (1, 1));

    let metadata = std::fs::symlink_metadata(&path).unwrap();
    assert!(metadata.file_type().is_fifo());

    drop(handles);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn deletion_failure_during_close_is_reported() {
    let dir = temp_dir("deletion-failure");
    let path = dir.join("p");
    let handle = PipeHandle::create(&path).unwrap();

    // Swap the FIFO for a directory so remove_file must fail.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let err = handle.close().unwrap_err();
    assert!(matches!(err, PipeError::DeletionFailed { .. }));
    // Streams are still torn down and the handle stays closed.
    assert!(handle.is_closed());
    assert_eq!(handle.read_state(), PipeState::Closed);
    assert_eq!(handle.write_state(), PipeState::Closed);
    // A later close is a no-op, not a second failure.
    handle.close().unwrap();

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn handle_drop_closes_and_deletes() {
    let dir = temp_dir("scope-exit");
    let path = dir.join("p");
    {
        let pipe = Arc::new(PipeHandle::create(&path).unwrap());
        let writer = {
            let pipe = Arc::clone(&pipe);
            std::thread::spawn(move || pipe.write_u8(7).unwrap())
        };
        assert_eq!(pipe.read_u8().unwrap(), 7);
        writer.join().unwrap();
    }
    assert!(!path.exists(), "drop must close streams and delete the entry");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stream_open_failure_when_pipe_vanishes() {
    let dir = temp_dir("vanished");
    let path = dir.join("p");
    let handle = PipeHandle::create_with(
        &path,
        PipeOptions {
            delete_on_close: false,
            ..PipeOptions::default()
        },
    )
    .unwrap();
    std::fs::remove_file(&path).unwrap();

    let err = handle.read_u8().unwrap_err();
    assert!(matches!(
        err,
        PipeError::StreamOpenFailed {
            direction: Direction::Read,
            ..
        }
    ));
    assert_eq!(handle.read_state(), PipeState::Unopened);

    let _ = std::fs::remove_dir_all(&dir);
}
