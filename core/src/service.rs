//! External modeling service — a classifier living in another process.
//!
//! Protocol: one JSON object per line over the child's stdin/stdout.
//!
//!   → {"type":"train","columns":[..],"rows":[[..]],"targets":[..]}
//!   ← {"status":"ok"}
//!   → {"type":"predict","columns":[..],"rows":[[..]]}
//!   ← {"probabilities":[..]}
//!   → {"type":"quit"}
//!
//! Any request may be answered with {"error":"..."}; that error is
//! surfaced as-is and never retried.

use crate::{
    classifier::{check_schema, validate_probabilities, Classifier, ClassifierTrainer},
    dataset::{Dataset, FeatureFrame},
    error::{UpliftError, UpliftResult},
};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServiceRequest<'a> {
    Train {
        columns: &'a [String],
        rows:    &'a [Vec<f64>],
        targets: &'a [u8],
    },
    Predict {
        columns: &'a [String],
        rows:    &'a [Vec<f64>],
    },
    Quit,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ServiceResponse {
    Error { error: String },
    Probabilities { probabilities: Vec<f64> },
    Status { status: String },
}

/// One line-delimited JSON conversation with the service.
pub struct ServiceSession<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ServiceSession<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn send(&mut self, request: &ServiceRequest<'_>) -> UpliftResult<()> {
        let line = serde_json::to_string(request)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn roundtrip(&mut self, request: &ServiceRequest<'_>) -> UpliftResult<ServiceResponse> {
        self.send(request)?;

        let mut buffer = String::new();
        if self.reader.read_line(&mut buffer)? == 0 {
            return Err(UpliftError::classifier("service closed its output"));
        }
        log::debug!("service: <- {} bytes", buffer.len());

        match serde_json::from_str(&buffer) {
            Ok(ServiceResponse::Error { error }) => Err(UpliftError::classifier(error)),
            Ok(response) => Ok(response),
            Err(e) => Err(UpliftError::classifier(format!("unreadable reply: {e}"))),
        }
    }

    pub fn train(&mut self, frame: &FeatureFrame, targets: &[u8]) -> UpliftResult<()> {
        log::debug!("service: -> train {} rows", frame.len());
        let request = ServiceRequest::Train {
            columns: &frame.columns,
            rows:    &frame.rows,
            targets,
        };
        match self.roundtrip(&request)? {
            ServiceResponse::Status { status } if status == "ok" => Ok(()),
            other => Err(UpliftError::classifier(format!("unexpected reply to train: {other:?}"))),
        }
    }

    pub fn predict(&mut self, frame: &FeatureFrame) -> UpliftResult<Vec<f64>> {
        log::debug!("service: -> predict {} rows", frame.len());
        let request = ServiceRequest::Predict { columns: &frame.columns, rows: &frame.rows };
        match self.roundtrip(&request)? {
            ServiceResponse::Probabilities { probabilities } => {
                validate_probabilities(probabilities, frame.len())
            }
            other => Err(UpliftError::classifier(format!("unexpected reply to predict: {other:?}"))),
        }
    }

    pub fn quit(&mut self) -> UpliftResult<()> {
        self.send(&ServiceRequest::Quit)
    }
}

/// A model trained inside the service. Predictions go back through the
/// same session.
pub struct ExternalClassifier<R, W> {
    schema:  Vec<String>,
    session: Mutex<ServiceSession<R, W>>,
}

impl<R: BufRead, W: Write> ExternalClassifier<R, W> {
    /// Send the training subset over `session` and keep the session for
    /// later predictions.
    pub fn train_over(mut session: ServiceSession<R, W>, training: &Dataset) -> UpliftResult<Self> {
        if training.is_empty() {
            return Err(UpliftError::EmptyDataset);
        }
        let frame = training.features();
        let targets: Vec<u8> = training.records().iter().map(|r| training.response(r)).collect();
        session.train(&frame, &targets)?;

        Ok(Self {
            schema:  frame.columns,
            session: Mutex::new(session),
        })
    }

    pub fn into_session(self) -> UpliftResult<ServiceSession<R, W>> {
        self.session
            .into_inner()
            .map_err(|_| UpliftError::classifier("service session poisoned"))
    }

    fn shutdown(&self) -> UpliftResult<()> {
        self.session
            .lock()
            .map_err(|_| UpliftError::classifier("service session poisoned"))?
            .quit()
    }
}

impl<R: BufRead, W: Write> Classifier for ExternalClassifier<R, W> {
    fn schema(&self) -> &[String] {
        &self.schema
    }

    fn predict(&self, frame: &FeatureFrame) -> UpliftResult<Vec<f64>> {
        check_schema(&self.schema, frame)?;
        let mut session = self
            .session
            .lock()
            .map_err(|_| UpliftError::classifier("service session poisoned"))?;
        session.predict(frame)
    }
}

/// How long a service gets to exit after its input is closed before it
/// is killed.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// An ExternalClassifier that owns the service process.
///
/// On drop the service is sent `quit`, its stdin is closed, and it is
/// reaped. A service still running after the grace period is killed.
pub struct ProcessClassifier {
    /// `None` only while dropping.
    model:          Option<ExternalClassifier<BufReader<ChildStdout>, ChildStdin>>,
    child:          Child,
    shutdown_grace: Duration,
}

impl Classifier for ProcessClassifier {
    fn schema(&self) -> &[String] {
        match &self.model {
            Some(model) => model.schema(),
            None => &[],
        }
    }

    fn predict(&self, frame: &FeatureFrame) -> UpliftResult<Vec<f64>> {
        self.model
            .as_ref()
            .ok_or_else(|| UpliftError::classifier("service already shut down"))?
            .predict(frame)
    }
}

impl Drop for ProcessClassifier {
    fn drop(&mut self) {
        if let Some(model) = self.model.take() {
            if let Err(e) = model.shutdown() {
                log::warn!("service: quit request failed: {e}");
            }
            // Dropping the session closes the pipe, so the service sees EOF.
            drop(model);
        }
        reap(&mut self.child, self.shutdown_grace);
    }
}

/// Wait up to `grace` for `child` to exit on its own, then kill it.
fn reap(child: &mut Child, grace: Duration) {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("service: exited with {status}");
                return;
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(REAP_POLL),
            Ok(None) => {
                log::warn!("service: still running after {grace:?}, killing it");
                break;
            }
            Err(e) => {
                log::warn!("service: could not poll child: {e}");
                break;
            }
        }
    }
    let _ = child.kill();
    match child.wait() {
        Ok(status) => log::debug!("service: exited with {status}"),
        Err(e) => log::warn!("service: could not reap child: {e}"),
    }
}

const REAP_POLL: Duration = Duration::from_millis(20);

/// Spawns `program args..` and trains a model in it.
#[derive(Debug, Clone)]
pub struct ExternalTrainer {
    pub program:        String,
    pub args:           Vec<String>,
    pub shutdown_grace: Duration,
}

impl ExternalTrainer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args, shutdown_grace: DEFAULT_SHUTDOWN_GRACE }
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

impl ClassifierTrainer for ExternalTrainer {
    type Model = ProcessClassifier;

    fn train(&self, training: &Dataset) -> UpliftResult<Self::Model> {
        log::info!("train: starting service {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| UpliftError::classifier(format!("cannot start {}: {e}", self.program)))?;

        let pipes = child.stdin.take().zip(child.stdout.take());
        let Some((stdin, stdout)) = pipes else {
            reap(&mut child, Duration::ZERO);
            return Err(UpliftError::classifier("service pipes unavailable"));
        };

        let session = ServiceSession::new(BufReader::new(stdout), stdin);
        match ExternalClassifier::train_over(session, training) {
            Ok(model) => {
                log::info!("train: model ready ({} features)", model.schema.len());
                Ok(ProcessClassifier {
                    model: Some(model),
                    child,
                    shutdown_grace: self.shutdown_grace,
                })
            }
            Err(e) => {
                reap(&mut child, Duration::ZERO);
                Err(e)
            }
        }
    }
}
