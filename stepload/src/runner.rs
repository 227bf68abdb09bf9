//! The external load-generation runner and the seam the driver uses to call it.
use std::ffi::OsString;
use std::io;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use stepload_core::TrialConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace};

/// Arguments for a single runner invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub label: String,
    pub conf: PathBuf,
    pub url: String,
    pub threads: u32,
    pub connections: NonZeroU32,
    pub duration: Duration,
    pub warmup: Duration,
    pub kill_existing: bool,
}

impl Invocation {
    pub fn for_trial(config: &TrialConfig, connections: NonZeroU32) -> Self {
        Self {
            label: config.trial_label(connections),
            conf: config.conf.clone(),
            url: config.url.clone(),
            threads: config.threads,
            connections,
            duration: config.duration,
            warmup: config.warmup,
            kill_existing: true,
        }
    }

    /// Command-line flags understood by the runner.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--label".into(),
            self.label.clone().into(),
            "--conf".into(),
            self.conf.clone().into(),
            "--url".into(),
            self.url.clone().into(),
            "--threads".into(),
            self.threads.to_string().into(),
            "--connections".into(),
            self.connections.to_string().into(),
            "--duration".into(),
            self.duration.as_secs().to_string().into(),
            "--warmup".into(),
            self.warmup.as_secs().to_string().into(),
        ];
        if self.kill_existing {
            args.push("--kill-existing".into());
        }
        args
    }
}

/// What a finished runner left behind: its exit code and combined stdout/stderr text.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutput {
    pub exit_code: i32,
    pub output: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes one trial and waits for it to finish.
///
/// A non-zero exit is reported through [`RunOutput::exit_code`], never as an `Err`; errors are
/// reserved for failing to run the trial at all.
#[trait_variant::make(Runner: Send)]
pub trait LocalRunner {
    async fn run(&mut self, invocation: &Invocation) -> io::Result<RunOutput>;
}

/// Runs the runner script as a child process.
///
/// With an interpreter set the command is `interpreter script <args>`, otherwise the script is
/// executed directly. No timeout is applied.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    interpreter: Option<String>,
    script: PathBuf,
}

impl ProcessRunner {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: None,
            script: script.into(),
        }
    }

    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        let interpreter = interpreter.into();
        self.interpreter = (!interpreter.is_empty()).then_some(interpreter);
        self
    }

    pub fn script(&self) -> &PathBuf {
        &self.script
    }

    fn command(&self) -> Command {
        match &self.interpreter {
            Some(interpreter) => {
                let mut command = Command::new(interpreter);
                command.arg(&self.script);
                command
            }
            None => Command::new(&self.script),
        }
    }
}

impl Runner for ProcessRunner {
    #[instrument(skip_all, fields(label = %invocation.label))]
    async fn run(&mut self, invocation: &Invocation) -> io::Result<RunOutput> {
        let mut command = self.command();
        command
            .args(invocation.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        debug!("Spawning {command:?}");

        let mut child = command.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("runner stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("runner stderr was not captured"))?;

        let output = interleave(stdout, stderr).await?;
        let status = child.wait().await?;
        let exit_code = exit_code(status);
        debug!(exit_code, bytes = output.len(), "Runner finished");

        Ok(RunOutput { exit_code, output })
    }
}

/// Read two streams to completion, appending whole lines in the order they arrive.
async fn interleave<A, B>(a: A, b: B) -> io::Result<String>
where
    A: tokio::io::AsyncRead + Unpin,
    B: tokio::io::AsyncRead + Unpin,
{
    let mut a = BufReader::new(a);
    let mut b = BufReader::new(b);
    // `read_until` keeps partial bytes in the buffer when a select branch loses, so each stream
    // owns its buffer for the whole loop.
    let mut a_buf = Vec::new();
    let mut b_buf = Vec::new();
    let (mut a_open, mut b_open) = (true, true);
    let mut output = String::new();

    while a_open || b_open {
        tokio::select! {
            read = a.read_until(b'\n', &mut a_buf), if a_open => {
                if read? == 0 {
                    a_open = false;
                }
                flush_line(&mut a_buf, &mut output);
            }
            read = b.read_until(b'\n', &mut b_buf), if b_open => {
                if read? == 0 {
                    b_open = false;
                }
                flush_line(&mut b_buf, &mut output);
            }
        }
    }

    Ok(output)
}

fn flush_line(buf: &mut Vec<u8>, output: &mut String) {
    if !buf.is_empty() {
        output.push_str(&String::from_utf8_lossy(buf));
        buf.clear();
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
