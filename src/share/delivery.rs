use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::capture::sink::Blob;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::input::ReelInput;
use crate::render::surface::ensure_parent_dir;

pub const FILE_PREFIX: &str = "prompt2wrapped";
pub const DEFAULT_SHARE_TEXT: &str = "Check out my year in prompts!";

/// `prompt2wrapped_<unix-millis>.<ext>`
pub fn export_file_name(blob: &Blob, unix_millis: i64) -> String {
    format!("{FILE_PREFIX}_{unix_millis}.{}", blob.extension())
}

/// What gets handed to a native share target.
#[derive(Clone, Debug, PartialEq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub blob: Blob,
}

impl SharePayload {
    pub fn for_reel(data: &ReelInput, blob: Blob, unix_millis: i64) -> Self {
        let title = match data.user_name.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => format!("{user}'s Prompt2Wrapped"),
            _ => "My Prompt2Wrapped".to_string(),
        };
        let text = data
            .tagline
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SHARE_TEXT);
        Self {
            title,
            text: text.to_string(),
            file_name: export_file_name(&blob, unix_millis),
            blob,
        }
    }
}

/// Outcome of a native share attempt that did not succeed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// The user dismissed the share prompt. Not a failure.
    #[error("share cancelled by user")]
    Cancelled,
    #[error("share failed: {0}")]
    Failed(String),
}

/// Platform share affordance.
pub trait NativeShare: Send {
    /// Whether this target accepts `payload` at all.
    fn can_share(&self, payload: &SharePayload) -> bool;
    fn share(&self, payload: &SharePayload) -> Result<(), ShareError>;
}

/// Exit status a share program uses to report that the user cancelled.
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Shares by running an external program with the exported file as its last argument.
///
/// Title and text are passed through `WRAPREEL_SHARE_TITLE` and `WRAPREEL_SHARE_TEXT`. Exit code
/// [`CANCELLED_EXIT_CODE`] means the user cancelled; any other non-zero status is a failure.
#[derive(Clone, Debug)]
pub struct CommandShare {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandShare {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl NativeShare for CommandShare {
    fn can_share(&self, payload: &SharePayload) -> bool {
        !payload.blob.is_empty()
    }

    fn share(&self, payload: &SharePayload) -> Result<(), ShareError> {
        let dir = tempfile::tempdir()
            .map_err(|e| ShareError::Failed(format!("failed to create share dir: {e}")))?;
        let path = dir.path().join(&payload.file_name);
        std::fs::write(&path, payload.blob.bytes())
            .map_err(|e| ShareError::Failed(format!("failed to stage shared file: {e}")))?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .env("WRAPREEL_SHARE_TITLE", &payload.title)
            .env("WRAPREEL_SHARE_TEXT", &payload.text)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| {
                ShareError::Failed(format!(
                    "failed to run share command '{}': {e}",
                    self.program.display()
                ))
            })?;
        match status.code() {
            Some(0) => Ok(()),
            Some(CANCELLED_EXIT_CODE) => Err(ShareError::Cancelled),
            _ => Err(ShareError::Failed(format!(
                "share command exited with status {status}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Shared,
    /// The user cancelled native sharing; nothing was written.
    Cancelled,
    Downloaded(PathBuf),
}

/// Hands finished exports to the user: native share when available, otherwise a file in the
/// output directory.
pub struct Delivery {
    out_dir: PathBuf,
    share: Option<Box<dyn NativeShare>>,
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("out_dir", &self.out_dir)
            .field("share", &self.share.is_some())
            .finish()
    }
}

impl Delivery {
    pub fn to_dir(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            share: None,
        }
    }

    pub fn with_share(mut self, share: impl NativeShare + 'static) -> Self {
        self.share = Some(Box::new(share));
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write the blob under its file name.
    pub fn download(&self, payload: &SharePayload) -> ReelResult<PathBuf> {
        use anyhow::Context as _;

        let path = self.out_dir.join(&payload.file_name);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, payload.blob.bytes())
            .with_context(|| format!("write export '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = payload.blob.len(), "export saved");
        Ok(path)
    }

    pub fn deliver(&self, payload: &SharePayload) -> ReelResult<DeliveryOutcome> {
        if payload.blob.is_empty() {
            return Err(ReelError::encoder("refusing to deliver an empty export"));
        }
        if let Some(share) = self.share.as_deref()
            && share.can_share(payload)
        {
            match share.share(payload) {
                Ok(()) => {
                    tracing::info!(file = %payload.file_name, "export shared");
                    return Ok(DeliveryOutcome::Shared);
                }
                Err(ShareError::Cancelled) => {
                    tracing::debug!("native share cancelled");
                    return Ok(DeliveryOutcome::Cancelled);
                }
                Err(ShareError::Failed(reason)) => {
                    tracing::warn!(%reason, "native share failed; falling back to download");
                }
            }
        }
        self.download(payload).map(DeliveryOutcome::Downloaded)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/share/delivery.rs"]
mod tests;
