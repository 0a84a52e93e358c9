//! Integration Tests for the Serial Reader Lifecycle
//!
//! The reader runs on its own thread for the whole session. These tests
//! cover how it stops: on request, on disconnect and on repeated failure.

use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serialterm::serial::{spawn_reader, MockSerialDevice, ReaderExit, SerialDevice};
use serialterm::{MemorySink, SharedState};

/// An idle port: every read times out like a real port with a read timeout
struct IdlePort {
    script: Arc<Mutex<Vec<u8>>>,
}

impl Read for IdlePort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut script = self.script.lock();
        if script.is_empty() {
            std::thread::sleep(Duration::from_millis(5));
            return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        }
        let n = buf.len().min(script.len());
        buf[..n].copy_from_slice(&script[..n]);
        script.drain(..n);
        Ok(n)
    }
}

#[tokio::test]
async fn test_shutdown_cancels_idle_reader() {
    let state = Arc::new(SharedState::default());
    let sink = Arc::new(MemorySink::new());
    let script = Arc::new(Mutex::new(b"partial".to_vec()));

    let reader = spawn_reader(
        IdlePort {
            script: script.clone(),
        },
        state,
        sink.clone(),
    )
    .unwrap();

    // Give the reader time to consume the scripted bytes
    for _ in 0..100 {
        if script.lock().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let exit = reader.shutdown(Duration::from_secs(2)).await;
    assert_eq!(exit, Some(ReaderExit::Cancelled));
    // Unterminated output is flushed when the reader stops
    assert_eq!(sink.lines(), vec!["partial"]);
}

#[tokio::test]
async fn test_disconnect_is_reported_as_fault() {
    let device = MockSerialDevice::with_incoming(b"last words\n");
    let state = Arc::new(SharedState::default());
    let sink = Arc::new(MemorySink::new());

    let mut reader =
        spawn_reader(device.try_clone_reader().unwrap(), state, sink.clone()).unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(2), reader.finished())
        .await
        .expect("reader should stop at end of stream");
    assert_eq!(exit, ReaderExit::Disconnected);
    assert!(exit.is_fault());
    assert_eq!(sink.lines(), vec!["last words"]);
}

#[tokio::test]
async fn test_filter_edits_apply_while_running() {
    let state = Arc::new(SharedState::default());
    let sink = Arc::new(MemorySink::new());
    let script = Arc::new(Mutex::new(b"keep 1\ndrop 1\n".to_vec()));

    let reader = spawn_reader(
        IdlePort {
            script: script.clone(),
        },
        state.clone(),
        sink.clone(),
    )
    .unwrap();

    let wait_for = |count: usize| {
        let sink = sink.clone();
        async move {
            for _ in 0..200 {
                if sink.lines().len() >= count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
    };

    wait_for(2).await;
    state.filter_mut().add_filter("keep").unwrap();
    script.lock().extend_from_slice(b"keep 2\ndrop 2\n");
    wait_for(3).await;

    reader.shutdown(Duration::from_secs(2)).await;
    assert_eq!(sink.lines(), vec!["keep 1", "drop 1", "keep 2"]);
}
