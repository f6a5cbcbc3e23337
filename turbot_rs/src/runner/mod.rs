//! Runs a bot's scraper locally and feeds its output to a record handler.
//!
//! A scraper prints one JSON object per line. Each line is checked against
//! the manifest (valid JSON, an object, carries every identifying field)
//! and routed to the matching [`RecordHandler`] callback.

mod handlers;

pub use handlers::{BATCH_SIZE, DumpHandler, PreviewHandler, RecordHandler, ValidationHandler};

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;
use tracing::{debug, warn};

use crate::console::Console;
use crate::error::{Result, TurbotError};
use crate::manifest::Manifest;

/// How the scraper process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ok,
    Failed,
}

/// Interpreter for a manifest `language`.
pub fn interpreter_for(language: &str) -> Option<&'static str> {
    match language {
        "ruby" => Some("ruby"),
        "python" => Some("python"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ScraperRunner {
    dir: PathBuf,
    manifest: Manifest,
    interpreter: Option<String>,
    script: Option<String>,
}

impl ScraperRunner {
    /// Runner for the bot in `dir`, using its `manifest.json`.
    pub fn new(dir: &Path) -> Result<Self> {
        Ok(Self::with_manifest(dir, Manifest::load(dir)?))
    }

    pub fn with_manifest(dir: &Path, manifest: Manifest) -> Self {
        Self {
            dir: dir.to_path_buf(),
            manifest,
            interpreter: None,
            script: None,
        }
    }

    /// Run the scraper with `program` instead of the language default
    /// (e.g. `python3`).
    pub fn interpreter(mut self, program: impl Into<String>) -> Self {
        self.interpreter = Some(program.into());
        self
    }

    /// Run `path` (relative to the bot directory) instead of the first
    /// manifest file.
    pub fn script(mut self, path: impl Into<String>) -> Self {
        self.script = Some(path.into());
        self
    }

    fn command(&self) -> Result<Command> {
        let language = self.manifest.language().unwrap_or("ruby");
        let program = match &self.interpreter {
            Some(program) => program.clone(),
            None => interpreter_for(language)
                .ok_or_else(|| TurbotError::failed(format!("unsupported language {}", language)))?
                .to_string(),
        };
        let script = match &self.script {
            Some(script) => script.clone(),
            None => self
                .manifest
                .files()
                .into_iter()
                .next()
                .ok_or_else(|| TurbotError::failed("Manifest lists no files to run"))?,
        };

        let mut command = Command::new(program);
        command
            .arg(script)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        Ok(command)
    }

    /// Run the scraper to completion, handing every output line to `handler`.
    pub fn run(&self, handler: &mut dyn RecordHandler, console: &mut Console) -> Result<RunOutcome> {
        let mut command = self.command()?;
        debug!(?command, "starting scraper");
        let mut child = command.spawn().map_err(|e| {
            TurbotError::failed(format!("Unable to start {:?}: {}", command.get_program(), e))
        })?;

        if let Some(stdout) = child.stdout.take() {
            if let Err(e) = self.stream(stdout, handler, console) {
                // Stop the scraper before surfacing the error.
                if let Err(kill_err) = child.kill() {
                    warn!(error = %kill_err, "failed to stop scraper");
                }
                let _ = child.wait();
                return Err(e);
            }
        }

        let status = child.wait()?;
        debug!(%status, "scraper exited");
        Ok(if status.success() {
            RunOutcome::Ok
        } else {
            RunOutcome::Failed
        })
    }

    /// Feed every line of `output` to [`Self::process_line`]. Bytes that are
    /// not UTF-8 are replaced, so such a line is reported as invalid JSON.
    fn stream(
        &self,
        output: impl Read,
        handler: &mut dyn RecordHandler,
        console: &mut Console,
    ) -> Result<()> {
        let mut reader = BufReader::new(output);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            self.process_line(&line, handler, console)?;
        }
    }

    /// Check one output line and dispatch it to `handler`.
    pub fn process_line(
        &self,
        line: &str,
        handler: &mut dyn RecordHandler,
        console: &mut Console,
    ) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let data_type = self.manifest.data_type().unwrap_or_default();

        let record: Value = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => {
                handler.handle_invalid_json(console, line);
                return Ok(());
            }
        };
        match self.check_record(&record) {
            Some(message) => {
                handler.handle_invalid_record(console, &record, data_type, &message);
                Ok(())
            }
            None => handler.handle_valid_record(console, &record, data_type),
        }
    }

    /// Why `record` is unacceptable, if it is.
    fn check_record(&self, record: &Value) -> Option<String> {
        let Some(object) = record.as_object() else {
            return Some("Record must be a JSON object".to_string());
        };
        let missing: Vec<String> = self
            .manifest
            .identifying_fields()
            .into_iter()
            .filter(|field| object.get(field).is_none_or(Value::is_null))
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(format!("Missing identifying fields: {}", missing.join(", ")))
        }
    }
}
