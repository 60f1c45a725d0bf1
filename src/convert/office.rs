//! Conversion through an external headless office suite.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

use super::{clean_source, ConvertOptions, DocumentConverter, OFFICE_EXTENSIONS};

/// How often the blocking converter checks whether the child exited.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for stderr once the converter has exited.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Converts office documents and images by running
/// `<program> --headless --convert-to pdf --outdir <dir> <file>`.
#[derive(Debug, Clone, Default)]
pub struct OfficeConverter {
    _private: (),
}

impl OfficeConverter {
    /// Create a new office converter.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Full argument list passed to the converter program.
    pub fn command_args(source: &Path, staging: &Path, options: &ConvertOptions) -> Vec<OsString> {
        let mut args = options.launcher_args.clone();
        args.extend(
            ["--headless", "--convert-to", "pdf", "--outdir"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(staging.as_os_str().to_owned());
        args.push(source.as_os_str().to_owned());
        args
    }

    fn run(&self, source: &Path, staging: &Path, options: &ConvertOptions) -> Result<()> {
        let mut child = Command::new(&options.program)
            .args(Self::command_args(source, staging, options))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&options.program, e))?;

        // Drain stderr on its own thread so a chatty converter cannot block
        // on a full pipe. A descendant may inherit the pipe and keep it open
        // after the converter exits, so the text is handed over a channel
        // instead of joining the thread.
        let (tx, rx) = crossbeam_channel::bounded(1);
        match child.stderr.take() {
            Some(mut pipe) => {
                thread::spawn(move || {
                    let mut text = String::new();
                    let _ = pipe.read_to_string(&mut text);
                    let _ = tx.send(text);
                });
            }
            None => drop(tx),
        }

        let deadline = Instant::now() + options.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e.into());
                }
            }
            if Instant::now() >= deadline {
                log::warn!(
                    "{} exceeded {:?}, killing it",
                    options.program.display(),
                    options.timeout
                );
                let _ = child.kill();
                child.wait()?;
                return Err(Error::Timeout(options.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stderr = rx.recv_timeout(STDERR_GRACE).unwrap_or_else(|_| {
            log::debug!(
                "stderr of {} still open after exit, not waiting for it",
                options.program.display()
            );
            String::new()
        });
        check_status(&options.program, status, &stderr)
    }

    /// Async flavour of [`DocumentConverter::convert`], driven by tokio.
    #[cfg(feature = "async")]
    pub async fn convert_async(
        &self,
        source: &Path,
        out_dir: &Path,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        let source = absolute(source)?;
        let staging = absolute(&staging_path(out_dir))?;
        tokio::fs::create_dir_all(&staging).await?;

        let result = match self.run_async(&source, &staging, options).await {
            Ok(()) => read_output_async(&staging).await,
            Err(e) => Err(e),
        };
        report_cleanup(tokio::fs::remove_dir_all(&staging).await, &staging);

        let bytes = result?;
        clean_source(&source, options)?;
        log::info!("converted {} ({} bytes)", source.display(), bytes.len());
        Ok(bytes)
    }

    #[cfg(feature = "async")]
    async fn run_async(&self, source: &Path, staging: &Path, options: &ConvertOptions) -> Result<()> {
        use tokio::io::AsyncReadExt;

        let mut child = tokio::process::Command::new(&options.program)
            .args(Self::command_args(source, staging, options))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&options.program, e))?;

        let mut stderr_task = tokio::spawn({
            let pipe = child.stderr.take();
            async move {
                let mut text = String::new();
                if let Some(mut pipe) = pipe {
                    let _ = pipe.read_to_string(&mut text).await;
                }
                text
            }
        });

        let status = match tokio::time::timeout(options.timeout, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                log::warn!(
                    "{} exceeded {:?}, killing it",
                    options.program.display(),
                    options.timeout
                );
                stderr_task.abort();
                child.kill().await?;
                return Err(Error::Timeout(options.timeout));
            }
        };
        let status = match status {
            Ok(status) => status,
            Err(e) => {
                stderr_task.abort();
                let _ = child.kill().await;
                return Err(e.into());
            }
        };

        let stderr = match tokio::time::timeout(STDERR_GRACE, &mut stderr_task).await {
            Ok(text) => text.unwrap_or_default(),
            Err(_) => {
                log::debug!(
                    "stderr of {} still open after exit, not waiting for it",
                    options.program.display()
                );
                stderr_task.abort();
                String::new()
            }
        };
        check_status(&options.program, status, &stderr)
    }
}

impl DocumentConverter for OfficeConverter {
    fn supported_extensions(&self) -> &[&str] {
        OFFICE_EXTENSIONS
    }

    fn name(&self) -> &str {
        "office"
    }

    fn convert(&self, source: &Path, out_dir: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
        let source = absolute(source)?;
        let staging = absolute(&staging_path(out_dir))?;
        std::fs::create_dir_all(&staging)?;

        let result = self
            .run(&source, &staging, options)
            .and_then(|()| read_output(&staging));
        report_cleanup(std::fs::remove_dir_all(&staging), &staging);

        let bytes = result?;
        clean_source(&source, options)?;
        log::info!("converted {} ({} bytes)", source.display(), bytes.len());
        Ok(bytes)
    }
}

/// A fresh, uniquely named directory under `out_dir`.
fn staging_path(out_dir: &Path) -> PathBuf {
    out_dir.join(uuid::Uuid::new_v4().simple().to_string())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn spawn_error(program: &Path, err: io::Error) -> Error {
    Error::Conversion(format!("cannot start {}: {}", program.display(), err))
}

fn check_status(program: &Path, status: ExitStatus, stderr: &str) -> Result<()> {
    let stderr = stderr.trim();
    if !status.success() {
        return Err(Error::Conversion(format!(
            "{} exited with {}: {}",
            program.display(),
            status,
            stderr
        )));
    }
    if !stderr.is_empty() {
        log::warn!("{} reported: {}", program.display(), stderr);
    }
    Ok(())
}

fn report_cleanup(outcome: io::Result<()>, staging: &Path) {
    if let Err(e) = outcome {
        log::warn!("cannot remove staging dir {}: {}", staging.display(), e);
    }
}

/// The converter writes exactly one file into the staging directory.
fn pick_output(mut files: Vec<PathBuf>, staging: &Path) -> Result<PathBuf> {
    files.sort();
    files.into_iter().next().ok_or_else(|| {
        Error::Conversion(format!(
            "converter produced no output in {}",
            staging.display()
        ))
    })
}

fn read_output(staging: &Path) -> Result<Vec<u8>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(staging)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    let output = pick_output(files, staging)?;
    Ok(std::fs::read(output)?)
}

#[cfg(feature = "async")]
async fn read_output_async(staging: &Path) -> Result<Vec<u8>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(staging).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    let output = pick_output(files, staging)?;
    Ok(tokio::fs::read(output).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let options = ConvertOptions::new()
            .with_program("flatpak")
            .with_launcher_arg("run")
            .with_launcher_arg("org.libreoffice.LibreOffice");
        let args = OfficeConverter::command_args(
            Path::new("/in/report.docx"),
            Path::new("/out/abc"),
            &options,
        );
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "run",
                "org.libreoffice.LibreOffice",
                "--headless",
                "--convert-to",
                "pdf",
                "--outdir",
                "/out/abc",
                "/in/report.docx",
            ]
        );
    }

    #[test]
    fn test_staging_paths_are_unique() {
        let out = Path::new("/tmp/out");
        let a = staging_path(out);
        let b = staging_path(out);
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(out));
    }

    #[test]
    fn test_pick_output() {
        let staging = Path::new("/s");
        assert!(matches!(
            pick_output(vec![], staging),
            Err(Error::Conversion(_))
        ));
        let picked = pick_output(
            vec![PathBuf::from("/s/b.pdf"), PathBuf::from("/s/a.pdf")],
            staging,
        )
        .unwrap();
        assert_eq!(picked, PathBuf::from("/s/a.pdf"));
    }

    #[test]
    fn test_missing_program_is_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("letter.docx");
        std::fs::write(&source, b"not really a docx").unwrap();
        let out_dir = dir.path().join("out");

        let options = ConvertOptions::new().with_program("/nonexistent/soffice-for-tests");
        let err = OfficeConverter::new()
            .convert(&source, &out_dir, &options)
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
        assert!(source.exists());
    }
}
