//! External process bridge
//!
//! Owns one rendering client process and the framed protocol over its
//! standard pipes. One writer thread drains an outbound channel to the
//! child's stdin; one reader thread decodes frames from the child's stdout
//! into an inbound buffer. Any framing or pipe failure is fatal to the
//! session: the affected thread clears the alive flag and exits, leaving
//! the bridge observable as `good() == false` without touching the rest of
//! the process.
//!
//! Lifecycle: `Created → Running → ShuttingDown → Stopped`; teardown never
//! skips the draining state. Shutdown closes the outbound channel and gives
//! the writer a bounded grace period to flush its backlog, then kills the
//! child so threads parked in pipe I/O unblock, then joins both threads.

use crossbeam_channel::{unbounded, Sender};
use std::io::BufReader;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{Result, VizError};
use crate::io_buffer::IoBuffer;
use crate::protocol::framing::{read_frame, write_frame};
use crate::protocol::messages::WireMessage;

/// Bridge lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Created,
    Running,
    ShuttingDown,
    Stopped,
}

/// How long `close()` waits for the writer to flush its backlog before the
/// child is killed. A child that stopped reading its stdin leaves the
/// writer parked in a pipe write that only the kill can unblock.
const WRITER_DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Tear down a partially launched bridge: reap the child and join whatever
/// threads already started. The outbound sender must be dropped first so a
/// running writer sees the channel close.
fn abort_launch(mut child: Child, writer: Option<JoinHandle<()>>) {
    let _ = child.kill();
    if let Some(writer) = writer {
        let _ = writer.join();
    }
    let _ = child.wait();
}

#[derive(Debug)]
pub struct ProcessBridge {
    alive: Arc<AtomicBool>,
    child: Child,
    outbound: Option<Sender<WireMessage>>,
    inbound: Arc<IoBuffer<WireMessage>>,
    writer: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
    state: BridgeState,
}

impl ProcessBridge {
    /// Launch the rendering client and start both pipe threads.
    ///
    /// A client that cannot start is a fatal, immediate error; no threads
    /// are left behind and nothing is retried.
    pub fn launch(path_to_client: &str, config: &EngineConfig) -> Result<Self> {
        let mut child = Command::new(path_to_client)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| VizError::Launch {
                path: path_to_client.to_string(),
                source,
            })?;

        // both pipes were requested above
        let mut stdin = child.stdin.take().ok_or(VizError::BridgeClosed)?;
        let stdout = child.stdout.take().ok_or(VizError::BridgeClosed)?;

        let alive = Arc::new(AtomicBool::new(true));
        let inbound = Arc::new(IoBuffer::new());
        let max_frame_len = config.max_frame_len;

        let (tx, rx) = unbounded::<WireMessage>();

        let writer_alive = Arc::clone(&alive);
        let writer = std::thread::Builder::new()
            .name("viz-bridge-writer".to_string())
            .spawn(move || {
                // recv blocks while the queue is empty and yields the
                // remaining backlog after the sender side closes
                while let Ok(msg) = rx.recv() {
                    if let Err(e) = write_frame(&mut stdin, &msg, max_frame_len) {
                        warn!("bridge writer stopping: {e}");
                        writer_alive.store(false, Ordering::SeqCst);
                        break;
                    }
                }
                debug!("bridge writer exited");
            });
        let writer = match writer {
            Ok(handle) => handle,
            Err(e) => {
                drop(tx);
                abort_launch(child, None);
                return Err(VizError::Spawn(e));
            }
        };

        let reader_alive = Arc::clone(&alive);
        let reader_inbound = Arc::clone(&inbound);
        let reader = std::thread::Builder::new()
            .name("viz-bridge-reader".to_string())
            .spawn(move || {
                let mut stdout = BufReader::new(stdout);
                while reader_alive.load(Ordering::SeqCst) {
                    match read_frame(&mut stdout, max_frame_len) {
                        Ok(msg) => reader_inbound.write(msg),
                        Err(VizError::Io(e))
                            if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                        {
                            debug!("bridge reader: pipe closed");
                            reader_alive.store(false, Ordering::SeqCst);
                            break;
                        }
                        Err(e) => {
                            // protocol violation; no resynchronization
                            warn!("bridge reader stopping: {e}");
                            reader_alive.store(false, Ordering::SeqCst);
                            break;
                        }
                    }
                }
                debug!("bridge reader exited");
            });
        let reader = match reader {
            Ok(handle) => handle,
            Err(e) => {
                drop(tx);
                abort_launch(child, Some(writer));
                return Err(VizError::Spawn(e));
            }
        };

        Ok(ProcessBridge {
            alive,
            child,
            outbound: Some(tx),
            inbound,
            writer: Some(writer),
            reader: Some(reader),
            state: BridgeState::Running,
        })
    }

    /// True while the client process is attached and the bridge has not
    /// been torn down. Every loop uses this as its continuation condition.
    pub fn good(&self) -> bool {
        self.state == BridgeState::Running && self.alive.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Enqueue a message for the writer thread. Dropped silently when the
    /// bridge is no longer good; callers gate on `good()`.
    pub fn send(&self, msg: WireMessage) {
        if self.good() {
            if let Some(tx) = &self.outbound {
                let _ = tx.send(msg);
            }
        }
    }

    /// Pop the next decoded message from the client, if any
    pub fn try_recv(&self) -> Option<WireMessage> {
        self.inbound.read()
    }

    /// Number of inbound messages waiting
    pub fn pending_inbound(&self) -> usize {
        self.inbound.size()
    }

    /// Tear down the session: drain the writer, unblock the reader, join
    /// both threads, reap the child. Idempotent.
    pub fn close(&mut self) {
        if self.state == BridgeState::Stopped {
            return;
        }
        self.state = BridgeState::ShuttingDown;
        self.alive.store(false, Ordering::SeqCst);

        // closing the channel lets the writer finish its backlog and exit;
        // the drain wait is bounded because a stalled child can leave the
        // writer parked in a pipe write forever
        self.outbound.take();
        if let Some(writer) = &self.writer {
            let deadline = Instant::now() + WRITER_DRAIN_GRACE;
            while !writer.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(5));
            }
        }

        // killing the child breaks both pipes: a writer parked in
        // write_all and a reader parked in read_exact both unblock
        let _ = self.child.kill();
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        let _ = self.child.wait();

        self.state = BridgeState::Stopped;
        debug!("bridge stopped");
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_FRAME_LEN;
    use crate::protocol::messages::{data_message, ScatterData, ScatterPointData};

    fn test_config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_launch_failure_is_fatal_and_clean() {
        let err = ProcessBridge::launch("/nonexistent/render-client", &test_config()).unwrap_err();
        assert!(matches!(err, VizError::Launch { .. }));
    }

    // `cat` echoes stdin to stdout byte for byte, which makes it a perfect
    // loopback client: every frame we write comes back through the reader's
    // framing logic.
    #[cfg(unix)]
    #[test]
    fn test_echo_roundtrip_through_child() {
        let mut bridge = ProcessBridge::launch("cat", &test_config()).unwrap();
        assert!(bridge.good());
        assert_eq!(bridge.state(), BridgeState::Running);

        let messages = vec![
            WireMessage::spec("{\"mark\": \"point\"}"),
            WireMessage::data(
                "source_2",
                1.0,
                data_message::Payload::Scatter(ScatterData {
                    points: vec![ScatterPointData { x: 1.0, y: -0.5 }],
                }),
            ),
        ];
        for msg in &messages {
            bridge.send(msg.clone());
        }

        let mut received = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while received.len() < messages.len() && Instant::now() < deadline {
            match bridge.try_recv() {
                Some(msg) => received.push(msg),
                None => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        assert_eq!(received, messages);

        bridge.close();
        assert_eq!(bridge.state(), BridgeState::Stopped);
        assert!(!bridge.good());
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_output_is_fatal_protocol_violation() {
        // `yes` floods stdout with text that cannot be a valid frame; the
        // reader must treat it as fatal and clear the alive flag
        let mut bridge = ProcessBridge::launch("yes", &test_config()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        while bridge.good() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!bridge.good());
        bridge.close();
        assert_eq!(bridge.state(), BridgeState::Stopped);
    }

    #[cfg(unix)]
    #[test]
    fn test_dead_child_flips_good() {
        // `true` exits immediately; both pipes die and the flag clears
        let bridge = ProcessBridge::launch("true", &test_config()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        while bridge.good() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!bridge.good());
    }

    // A client that neither exits nor reads its stdin: once the pipe
    // buffer fills, the writer parks in write_all and only the kill in
    // close() can unblock it.
    #[cfg(unix)]
    fn stalled_client_script() -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = std::env::temp_dir().join(format!("viz-stalled-client-{}", std::process::id()));
        std::fs::write(&path, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_close_unblocks_writer_parked_on_full_pipe() {
        let script = stalled_client_script();
        let mut bridge = ProcessBridge::launch(script.to_str().unwrap(), &test_config()).unwrap();

        // well past any OS pipe buffer size
        let big_spec = "x".repeat(512 * 1024);
        for _ in 0..8 {
            bridge.send(WireMessage::spec(big_spec.clone()));
        }

        let start = Instant::now();
        bridge.close();
        assert!(
            start.elapsed() < Duration::from_secs(10),
            "close() hung on a stalled child"
        );
        assert_eq!(bridge.state(), BridgeState::Stopped);
        assert!(!bridge.good());
        let _ = std::fs::remove_file(script);
    }

    #[cfg(unix)]
    #[test]
    fn test_aborted_launch_reaps_child_and_writer() {
        let mut child = Command::new("cat")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let mut stdin = child.stdin.take().unwrap();
        let (tx, rx) = unbounded::<WireMessage>();
        let writer = std::thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                if write_frame(&mut stdin, &msg, DEFAULT_MAX_FRAME_LEN).is_err() {
                    break;
                }
            }
        });

        tx.send(WireMessage::spec("{}")).unwrap();
        drop(tx);
        // must join the writer and reap the child without hanging
        abort_launch(child, Some(writer));
    }

    #[cfg(unix)]
    #[test]
    fn test_send_after_close_is_dropped() {
        let mut bridge = ProcessBridge::launch("cat", &test_config()).unwrap();
        bridge.close();
        // must not panic or block
        bridge.send(WireMessage::spec("{}"));
        assert!(!bridge.good());
    }
}
