//! Driver subprocess channel.
//!
//! Each exchange spawns the driver, writes one matrix request, reads the
//! single reply line and reaps the process. A `DriverSession` guard kills and
//! reaps the child on every exit path, so no exchange leaves an orphan.
//!
//! The timeout bounds the whole exchange. Pipes held open by processes the
//! driver left behind are not waited on past the deadline.

use std::fmt;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::error::{HarnessError, HarnessResult};
use crate::matrix::TestCase;
use crate::protocol::{self, ProtocolError};

/// Default timeout for a single exchange (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Longest wait for stderr and the request writer once the driver has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Configuration for driver exchanges.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Upper bound on one exchange, from spawn to process exit.
    pub timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DriverConfig {
    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Errors from a single driver exchange.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Driver executable does not exist.
    #[error("driver executable not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Driver could not be started.
    #[error("failed to launch driver {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Driver did not follow the reply framing.
    #[error("driver {} violated the protocol: {source}", program.display())]
    Protocol {
        program: PathBuf,
        #[source]
        source: ProtocolError,
        stderr: String,
    },

    /// Driver produced no reply in time and was killed.
    #[error("driver {} timed out after {timeout:?}", program.display())]
    Timeout { program: PathBuf, timeout: Duration },
}

impl DriverError {
    /// Launch failures abort the run; the rest become failing cases.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::NotFound { .. } | DriverError::Launch { .. })
    }
}

/// Fatal driver errors convert into the harness taxonomy. Non-fatal errors
/// are handed back unchanged.
impl TryFrom<DriverError> for HarnessError {
    type Error = DriverError;

    fn try_from(err: DriverError) -> Result<Self, Self::Error> {
        match err {
            DriverError::NotFound { path } => Ok(HarnessError::DriverNotFound { path }),
            DriverError::Launch { program, source } => {
                Ok(HarnessError::LaunchFailed { program, source })
            }
            other => Err(other),
        }
    }
}

/// Abnormal process end observed after a reply line was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDiagnostic {
    /// Exit code, `None` when terminated by a signal or killed.
    pub exit_code: Option<i32>,
    /// Everything the driver wrote to stderr.
    pub stderr: String,
    /// Set when the driver replied but did not exit within the timeout.
    pub killed_after: Option<Duration>,
}

impl fmt::Display for ProcessDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.killed_after, self.exit_code) {
            (Some(timeout), _) => {
                write!(f, "driver did not exit within {timeout:?} and was killed")?
            }
            (None, Some(code)) => write!(f, "driver exited with status {code}")?,
            (None, None) => f.write_str("driver terminated by signal")?,
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {stderr}")?;
        }
        Ok(())
    }
}

/// A captured reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverReply {
    /// The determinant line as written by the driver.
    pub determinant: String,
    /// Set when the driver failed or hung after replying.
    pub diagnostic: Option<ProcessDiagnostic>,
}

/// Anything that can compute a determinant for a test case.
pub trait DeterminantDriver {
    /// Sends one matrix and returns the textual determinant.
    fn exchange(&mut self, case: &TestCase) -> Result<DriverReply, DriverError>;
}

/// A driver executable launched once per exchange.
#[derive(Debug, Clone)]
pub struct ProcessDriver {
    program: PathBuf,
    config: DriverConfig,
}

impl ProcessDriver {
    /// Resolves `path` to an executable.
    ///
    /// Paths with a directory part must exist; bare names are looked up in `PATH`.
    pub fn resolve(path: impl AsRef<Path>, config: DriverConfig) -> HarnessResult<Self> {
        let path = path.as_ref();
        let not_found = || HarnessError::DriverNotFound {
            path: path.to_path_buf(),
        };
        let program = if path.components().count() > 1 || path.exists() {
            if !path.exists() {
                return Err(not_found());
            }
            path.to_path_buf()
        } else {
            which::which(path).map_err(|_| not_found())?
        };
        Ok(Self { program, config })
    }

    /// The resolved executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl DeterminantDriver for ProcessDriver {
    fn exchange(&mut self, case: &TestCase) -> Result<DriverReply, DriverError> {
        exchange(&self.program, case, &self.config)
    }
}

/// Runs one request/reply exchange against `program`.
pub fn exchange(
    program: &Path,
    case: &TestCase,
    config: &DriverConfig,
) -> Result<DriverReply, DriverError> {
    let deadline = Instant::now() + config.timeout;
    let child = Command::new(program)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| DriverError::Launch {
            program: program.to_path_buf(),
            source,
        })?;
    let mut session = DriverSession::new(child, program);
    session.run(case, deadline, config.timeout)
}

/// A live driver process. Dropping it kills and reaps the child.
pub(crate) struct DriverSession {
    child: Child,
    program: PathBuf,
}

impl DriverSession {
    fn new(child: Child, program: &Path) -> Self {
        Self {
            child,
            program: program.to_path_buf(),
        }
    }

    fn run(
        &mut self,
        case: &TestCase,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<DriverReply, DriverError> {
        let mut request = Vec::new();
        protocol::write_matrix(&mut request, case).map_err(|e| self.protocol_error(e.into(), ""))?;

        let stdin = self.child.stdin.take().ok_or_else(|| missing_stream("stdin"));
        let stdout = self.child.stdout.take().ok_or_else(|| missing_stream("stdout"));
        let stderr = self.child.stderr.take().ok_or_else(|| missing_stream("stderr"));
        let (mut stdin, stdout, stderr) = match (stdin, stdout, stderr) {
            (Ok(i), Ok(o), Ok(e)) => (i, o, e),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                return Err(self.protocol_error(e.into(), ""))
            }
        };

        // None of the helper threads is joined: a process the driver leaves
        // behind may hold the pipes open indefinitely.
        let stderr = StderrCapture::spawn(stderr);
        let (reply_tx, reply_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            let reply = protocol::read_reply(&mut reader);
            let _ = reply_tx.send(reply);
            // Drain so a chatty driver never blocks on a full pipe.
            let _ = io::copy(&mut reader, &mut io::sink());
        });
        // The whole request is written before any blocking read on the reply.
        let (write_tx, write_rx) = mpsc::channel();
        thread::spawn(move || {
            let result = stdin.write_all(&request).and_then(|()| stdin.flush());
            let _ = write_tx.send(result);
        });

        let remaining = deadline.saturating_duration_since(Instant::now());
        let reply = match reply_rx.recv_timeout(remaining) {
            Ok(reply) => reply,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.terminate();
                return Err(self.timeout_error(timeout));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ProtocolError::UnexpectedEof {
                expected: "determinant line",
            }),
        };

        let status = self.wait_until(deadline);
        if status.is_none() {
            self.terminate();
        }
        let drain_until = deadline.min(Instant::now() + DRAIN_GRACE);
        let stderr = stderr.collect(drain_until);

        let determinant = match (reply, status) {
            (Ok(line), _) => line,
            (Err(_), None) => return Err(self.timeout_error(timeout)),
            (Err(ProtocolError::UnexpectedEof { expected }), Some(_)) => {
                let wait = drain_until.saturating_duration_since(Instant::now());
                let source = match write_rx.recv_timeout(wait) {
                    Ok(Err(e)) => ProtocolError::Io(e),
                    _ => ProtocolError::UnexpectedEof { expected },
                };
                return Err(self.protocol_error(source, &stderr));
            }
            (Err(e), Some(_)) => return Err(self.protocol_error(e, &stderr)),
        };

        let diagnostic = match status {
            None => Some(ProcessDiagnostic {
                exit_code: None,
                stderr,
                killed_after: Some(timeout),
            }),
            Some(status) if !status.success() => Some(ProcessDiagnostic {
                exit_code: status.code(),
                stderr,
                killed_after: None,
            }),
            Some(_) => None,
        };
        Ok(DriverReply {
            determinant,
            diagnostic,
        })
    }

    fn wait_until(&mut self, deadline: Instant) -> Option<ExitStatus> {
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Some(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(_) => return None,
            }
        }
    }

    fn terminate(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn protocol_error(&self, source: ProtocolError, stderr: &str) -> DriverError {
        DriverError::Protocol {
            program: self.program.clone(),
            source,
            stderr: stderr.to_string(),
        }
    }

    fn timeout_error(&self, timeout: Duration) -> DriverError {
        DriverError::Timeout {
            program: self.program.clone(),
            timeout,
        }
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// Background stderr reader whose output can be collected without waiting for EOF.
struct StderrCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl StderrCapture {
    fn spawn(mut stderr: impl Read + Send + 'static) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done) = mpsc::channel();
        let sink = Arc::clone(&buffer);
        thread::spawn(move || {
            let mut chunk = [0u8; 4096];
            loop {
                match stderr.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                        Err(_) => break,
                    },
                }
            }
            let _ = done_tx.send(());
        });
        Self { buffer, done }
    }

    /// Waits for EOF until `until`, then returns what has been read so far.
    fn collect(self, until: Instant) -> String {
        let _ = self
            .done
            .recv_timeout(until.saturating_duration_since(Instant::now()));
        self.buffer
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

fn missing_stream(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, format!("driver {name} unavailable"))
}
