//! Driver process supervision
//!
//! Starts the driver as a detached child and records its PID in a file;
//! stopping reads that file, sends SIGTERM and removes it. Nothing waits on
//! the child.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use rustix::process::{kill_process, Pid, Signal};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Supervision errors
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to start {program}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write PID file {path}")]
    WritePidFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("PID file not found: {path}")]
    PidFileMissing { path: PathBuf },

    #[error("failed to read PID file {path}")]
    ReadPidFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid PID file {path}: {contents:?}")]
    InvalidPid { path: PathBuf, contents: String },

    #[error("failed to signal process {pid}")]
    Signal {
        pid: i32,
        #[source]
        source: io::Error,
    },
}

/// Starts and stops one worker program
#[derive(Debug, Clone)]
pub struct Supervisor {
    program: PathBuf,
    args: Vec<OsString>,
    pid_file: PathBuf,
}

impl Supervisor {
    pub fn new(program: impl Into<PathBuf>, pid_file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            pid_file: pid_file.into(),
        }
    }

    /// Arguments passed to the program
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    /// Spawn the program and record its PID
    pub fn start(&self) -> Result<u32, SupervisorError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let pid = child.id();

        fs::write(&self.pid_file, format!("{pid}\n")).map_err(|source| {
            SupervisorError::WritePidFile {
                path: self.pid_file.clone(),
                source,
            }
        })?;

        info!(pid, program = %self.program.display(), "worker started");
        Ok(pid)
    }

    /// PID recorded in the PID file
    pub fn recorded_pid(&self) -> Result<Pid, SupervisorError> {
        let contents = match fs::read_to_string(&self.pid_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SupervisorError::PidFileMissing {
                    path: self.pid_file.clone(),
                })
            }
            Err(source) => {
                return Err(SupervisorError::ReadPidFile {
                    path: self.pid_file.clone(),
                    source,
                })
            }
        };

        contents
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|&raw| raw > 0)
            .and_then(Pid::from_raw)
            .ok_or_else(|| SupervisorError::InvalidPid {
                path: self.pid_file.clone(),
                contents: contents.trim().to_owned(),
            })
    }

    /// Send SIGTERM to the recorded PID and remove the PID file
    ///
    /// The PID file is left in place when the signal cannot be delivered.
    pub fn stop(&self) -> Result<i32, SupervisorError> {
        let pid = self.recorded_pid()?;
        let raw = pid.as_raw_nonzero().get();

        kill_process(pid, Signal::TERM).map_err(|e| SupervisorError::Signal {
            pid: raw,
            source: e.into(),
        })?;

        if let Err(e) = fs::remove_file(&self.pid_file) {
            debug!(path = %self.pid_file.display(), error = %e, "PID file not removed");
        }
        info!(pid = raw, "worker signalled");
        Ok(raw)
    }

    /// Stop the worker, writing the outcome instead of failing
    ///
    /// Returns the signalled PID, or `None` once the failure is written to
    /// `err`. Only write errors are returned.
    pub fn stop_and_report(
        &self,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<Option<i32>> {
        let error = match self.stop() {
            Ok(pid) => {
                writeln!(out, "Killed {} (PID {pid})", self.program.display())?;
                return Ok(Some(pid));
            }
            Err(error) => error,
        };

        warn!(error = %error, "worker not stopped");
        write!(err, "{error}")?;
        if let Some(source) = std::error::Error::source(&error) {
            write!(err, ": {source}")?;
        }
        match error {
            SupervisorError::PidFileMissing { .. } => writeln!(err, ". Is it running?")?,
            _ => writeln!(err)?,
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor(dir: &tempfile::TempDir) -> Supervisor {
        Supervisor::new("/bin/sh", dir.path().join("worker.pid")).with_args(["-c", "sleep 30"])
    }

    #[test]
    fn test_start_then_stop() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor(&dir);

        let pid = supervisor.start().unwrap();
        let written = fs::read_to_string(supervisor.pid_file()).unwrap();
        assert_eq!(written, format!("{pid}\n"));
        assert_eq!(
            supervisor.recorded_pid().unwrap().as_raw_nonzero().get(),
            pid as i32
        );

        assert_eq!(supervisor.stop().unwrap(), pid as i32);
        assert!(!supervisor.pid_file().exists());
    }

    #[test]
    fn test_stop_without_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = supervisor(&dir).stop().unwrap_err();
        assert!(matches!(err, SupervisorError::PidFileMissing { .. }));
    }

    #[test]
    fn test_invalid_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor(&dir);

        for contents in ["", "abc\n", "0\n", "-4\n"] {
            fs::write(supervisor.pid_file(), contents).unwrap();
            let err = supervisor.stop().unwrap_err();
            assert!(
                matches!(err, SupervisorError::InvalidPid { .. }),
                "{contents:?}"
            );
            assert!(supervisor.pid_file().exists());
        }
    }

    #[test]
    fn test_stale_pid_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor(&dir);
        fs::write(supervisor.pid_file(), format!("{}\n", i32::MAX)).unwrap();

        let err = supervisor.stop().unwrap_err();
        assert!(matches!(err, SupervisorError::Signal { .. }));
        assert!(supervisor.pid_file().exists());
    }

    #[test]
    fn test_stop_and_report_stale_pid_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor(&dir);
        fs::write(supervisor.pid_file(), format!("{}\n", i32::MAX)).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let stopped = supervisor.stop_and_report(&mut out, &mut err).unwrap();
        assert_eq!(stopped, None);
        assert!(out.is_empty());

        let message = String::from_utf8(err).unwrap();
        assert!(
            message.starts_with(&format!("failed to signal process {}: ", i32::MAX)),
            "{message}"
        );
        assert!(message.ends_with('\n'));
        assert!(supervisor.pid_file().exists());
    }

    #[test]
    fn test_stop_and_report_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor(&dir);

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(supervisor.stop_and_report(&mut out, &mut err).unwrap(), None);
        let message = String::from_utf8(err).unwrap();
        assert!(message.starts_with("PID file not found: "));
        assert!(message.ends_with(". Is it running?\n"));
        assert!(out.is_empty());

        let pid = supervisor.start().unwrap();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(
            supervisor.stop_and_report(&mut out, &mut err).unwrap(),
            Some(pid as i32)
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Killed /bin/sh (PID {pid})\n")
        );
        assert!(err.is_empty());
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = Supervisor::new(dir.path().join("absent"), dir.path().join("w.pid"));

        let err = supervisor.start().unwrap_err();
        assert!(matches!(err, SupervisorError::Spawn { .. }));
        assert!(!supervisor.pid_file().exists());
    }
}
