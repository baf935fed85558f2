//! External renderer invocation.
//!
//! [`PlantUml`] runs the renderer as
//! `<executable> -charset utf-8 -t<format> -o <output_dir> <source>`, waits for
//! it with a timeout, and moves the produced image to a collision-free name.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::consts::{CHARSET, DEFAULT_TIMEOUT, IMAGE_PREFIX, POLL_INTERVAL};
use crate::error::RenderError;

/// One diagram to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Diagram source file.
    pub source_path: PathBuf,
    /// Directory receiving the image.
    pub output_dir: PathBuf,
    /// Image format passed as `-t<format>` (e.g. `png`, `eps`).
    pub output_format: String,
}

impl RenderRequest {
    #[must_use]
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            output_dir: output_dir.into(),
            output_format: output_format.into(),
        }
    }

    /// Path the renderer writes to: `<output_dir>/<stem>.<format>`, where
    /// `<stem>` is the source file name up to its first dot.
    #[must_use]
    pub fn expected_output(&self) -> PathBuf {
        let file_name = self
            .source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.split('.').next().unwrap_or_default();
        self.output_dir
            .join(format!("{stem}.{}", self.output_format))
    }
}

/// Renders diagram sources to image files.
///
/// Implemented by [`PlantUml`]; tests substitute stubs.
pub trait DiagramRenderer {
    /// Render one diagram and return the path of the produced image.
    fn render(&self, request: RenderRequest) -> Result<PathBuf, RenderError>;
}

/// `PlantUML` command-line renderer.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use puml_render::{DiagramRenderer, PlantUml, RenderRequest};
///
/// let renderer = PlantUml::new("java -jar plantuml.jar").timeout(Duration::from_secs(30));
/// let image = renderer.render(RenderRequest::new("flow.puml", "_build/_images", "png"))?;
/// ```
#[derive(Debug, Clone)]
pub struct PlantUml {
    /// Executable followed by its leading arguments.
    command: Vec<String>,
    timeout: Duration,
}

impl PlantUml {
    /// Create a renderer from a command string.
    ///
    /// The string is split on whitespace, so it may carry leading arguments.
    #[must_use]
    pub fn new(executable: &str) -> Self {
        Self {
            command: executable.split_whitespace().map(str::to_owned).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set how long to wait for the renderer before killing it.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn executable(&self) -> String {
        self.command.join(" ")
    }

    /// Full argument list for a request, program first.
    #[must_use]
    pub fn command_line(&self, request: &RenderRequest) -> Vec<OsString> {
        self.command
            .iter()
            .map(OsString::from)
            .chain(tool_args(request))
            .collect()
    }

    /// Spawn the renderer and wait for it, killing it after the timeout.
    fn run(&self, request: &RenderRequest) -> Result<(), RenderError> {
        let executable = self.executable();
        let Some((program, leading)) = self.command.split_first() else {
            return Err(RenderError::ToolMissing {
                executable,
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    "no renderer executable configured",
                ),
            });
        };

        tracing::debug!(command = ?self.command_line(request), "Running renderer");

        let mut child = Command::new(program)
            .args(leading)
            .args(tool_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::ToolMissing {
                executable: executable.clone(),
                source,
            })?;

        let stderr_reader = spawn_stderr_reader(&mut child);
        let started = Instant::now();

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                // The child may exit between the check and the kill.
                let _ = child.kill();
                let _ = child.wait();
                // A grandchild can hold stderr open; leave the reader detached.
                drop(stderr_reader);
                return Err(RenderError::Timeout {
                    executable,
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stderr = join_stderr(stderr_reader);
        if !status.success() {
            return Err(RenderError::ToolFailure {
                executable,
                status,
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "Renderer diagnostics");
        }
        Ok(())
    }
}

impl Default for PlantUml {
    fn default() -> Self {
        Self::new("plantuml")
    }
}

impl DiagramRenderer for PlantUml {
    fn render(&self, request: RenderRequest) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(&request.output_dir)?;
        // PlantUML resolves a relative -o against the source file's directory.
        let request = RenderRequest {
            output_dir: std::path::absolute(&request.output_dir)?,
            ..request
        };

        let expected = request.expected_output();
        if let Err(err) = self.run(&request) {
            // PlantUML writes an error image before exiting nonzero.
            if expected.is_file() {
                let _ = std::fs::remove_file(&expected);
            }
            return Err(err);
        }

        if !expected.is_file() {
            return Err(RenderError::MissingRenderedFile {
                source_path: request.source_path,
                expected,
            });
        }

        let target = unique_image_path(&request.output_dir, &request.output_format);
        std::fs::rename(&expected, &target)?;
        tracing::debug!(
            from = %expected.display(),
            to = %target.display(),
            "Renamed rendered image"
        );
        Ok(target)
    }
}

/// Arguments following the executable: charset, format, output directory, source.
fn tool_args(request: &RenderRequest) -> [OsString; 6] {
    [
        "-charset".into(),
        CHARSET.into(),
        format!("-t{}", request.output_format).into(),
        "-o".into(),
        request.output_dir.clone().into_os_string(),
        request.source_path.clone().into_os_string(),
    ]
}

/// Fresh `puml-<uuid>.<format>` path inside `dir`.
#[must_use]
pub fn unique_image_path(dir: &Path, format: &str) -> PathBuf {
    dir.join(format!("{IMAGE_PREFIX}{}.{format}", Uuid::new_v4()))
}

/// Drain stderr on a separate thread so a chatty renderer cannot fill the
/// pipe and stall until the timeout.
fn spawn_stderr_reader(child: &mut Child) -> Option<JoinHandle<String>> {
    child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        })
    })
}

fn join_stderr(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
