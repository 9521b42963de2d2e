use crate::STDERR_TAIL_LINES;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Readers are abandoned after this long once the process has exited;
/// an orphaned grandchild may still hold the pipe open.
const READER_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Line readers attached to a child's piped stdout and stderr.
pub(crate) struct OutputCapture {
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
    readers: Vec<JoinHandle<()>>,
}

impl OutputCapture {
    /// Take the child's pipes and start reading them.
    ///
    /// With `forward` set, every line is logged under the `server` target.
    pub(crate) fn attach(child: &mut Child, label: &'static str, forward: bool) -> Self {
        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        let mut readers = Vec::with_capacity(2);

        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, label, Stream::Stdout, forward, None));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(
                stderr,
                label,
                Stream::Stderr,
                forward,
                Some(stderr_tail.clone()),
            ));
        }

        Self {
            stderr_tail,
            readers,
        }
    }

    /// Most recent stderr lines, oldest first.
    pub(crate) fn stderr_tail(&self) -> String {
        let tail = self
            .stderr_tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tail.iter().cloned().collect::<Vec<_>>().join("\n")
    }

    /// Wait for the readers to hit EOF so the tail is complete.
    pub(crate) async fn drain(&mut self) {
        for reader in self.readers.drain(..) {
            if tokio::time::timeout(READER_DRAIN_TIMEOUT, reader)
                .await
                .is_err()
            {
                debug!("Output reader still open after process exit, detaching");
            }
        }
    }
}

fn spawn_reader<R>(
    reader: R,
    label: &'static str,
    stream: Stream,
    forward: bool,
    tail: Option<Arc<Mutex<VecDeque<String>>>>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            if forward {
                match stream {
                    Stream::Stdout => info!(target: "server", "[{label}] {line}"),
                    Stream::Stderr => warn!(target: "server", "[{label}] {line}"),
                }
            }

            if let Some(ref tail) = tail {
                let mut tail = tail.lock().unwrap_or_else(PoisonError::into_inner);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }
    })
}
