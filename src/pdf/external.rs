//! Delegation to an external `nano-pdf` executable.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Executable name looked up on `PATH`.
pub const NANO_PDF_BIN: &str = "nano-pdf";

/// Timeout for the `--version` probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for an edit.
pub const EDIT_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished process.
#[derive(Debug)]
struct Finished {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

/// Handle to an installed `nano-pdf` CLI.
#[derive(Debug, Clone)]
pub struct NanoPdf {
    program: PathBuf,
}

impl NanoPdf {
    /// Locate `nano-pdf` on `PATH` and check that `--version` succeeds.
    pub fn detect() -> Option<Self> {
        let program = which::which(NANO_PDF_BIN).ok()?;
        Self::with_program(program).ok()
    }

    /// Use a specific executable, verifying it answers `--version`.
    pub fn with_program(program: impl Into<PathBuf>) -> Result<Self> {
        let tool = Self {
            program: program.into(),
        };
        let finished = tool.run(&[OsStr::new("--version")], PROBE_TIMEOUT)?;
        if !finished.status.success() {
            return Err(Error::External(format!(
                "{} --version exited with {}",
                tool.program.display(),
                finished.status
            )));
        }
        log::debug!("found {}: {}", tool.program.display(), finished.stdout.trim());
        Ok(tool)
    }

    /// Path of the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `nano-pdf edit <input> <page> <instruction> --output <output>`.
    ///
    /// `page` is passed through unchanged.
    pub fn edit(&self, input: &Path, page: &str, instruction: &str, output: &Path) -> Result<()> {
        let args: [&OsStr; 6] = [
            "edit".as_ref(),
            input.as_os_str(),
            page.as_ref(),
            instruction.as_ref(),
            "--output".as_ref(),
            output.as_os_str(),
        ];
        let finished = self.run(&args, EDIT_TIMEOUT)?;
        if !finished.status.success() {
            return Err(Error::External(format!(
                "nano-pdf error: {}",
                finished.stderr.trim()
            )));
        }
        Ok(())
    }

    fn run(&self, args: &[&OsStr], timeout: Duration) -> Result<Finished> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::External(format!("{}: {}", self.program.display(), e)))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = wait_with_timeout(&mut child, timeout)?;

        Ok(Finished {
            status,
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}

/// Default output name for delegated edits: `edited_<file name>` in the current
/// directory.
pub fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    PathBuf::from(format!("edited_{}", name))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::External(format!(
                "operation timed out after {}s",
                timeout.as_secs()
            )));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
