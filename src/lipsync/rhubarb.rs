//! Mouth-cue extraction through the `rhubarb` command-line tool.

use super::tool::run_tool;
use super::{PhonemeExtractor, transcript_path_for};
use crate::config::Recognizer;
use crate::error::Result;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Produces mouth cues by spawning Rhubarb Lip Sync in JSON mode.
#[derive(Debug, Clone)]
pub struct RhubarbExtractor {
    program: PathBuf,
    recognizer: Recognizer,
    use_dialog: bool,
    timeout: Option<Duration>,
}

impl RhubarbExtractor {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            recognizer: Recognizer::Phonetic,
            use_dialog: false,
            timeout,
        }
    }

    #[must_use]
    pub fn with_recognizer(mut self, recognizer: Recognizer) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Pass the spoken text to rhubarb through `-d <dialog file>`.
    #[must_use]
    pub fn with_dialog(mut self, use_dialog: bool) -> Self {
        self.use_dialog = use_dialog;
        self
    }

    fn args(&self, wav: &Path, output: &Path, dialog_file: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            "json".into(),
            "-o".into(),
            output.as_os_str().to_owned(),
            "-r".into(),
            self.recognizer.as_arg().into(),
        ];
        if let Some(dialog) = dialog_file {
            args.push("-d".into());
            args.push(dialog.as_os_str().to_owned());
        }
        args.push(wav.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl PhonemeExtractor for RhubarbExtractor {
    async fn extract(&self, wav: &Path, dialog: &str) -> Result<PathBuf> {
        let output = transcript_path_for(wav);

        let dialog_file = if self.use_dialog && !dialog.trim().is_empty() {
            let path = wav.with_extension("txt");
            tokio::fs::write(&path, dialog).await?;
            Some(path)
        } else {
            None
        };

        run_tool(
            "rhubarb",
            &self.program,
            &self.args(wav, &output, dialog_file.as_deref()),
            self.timeout,
        )
        .await?;
        Ok(output)
    }
}
