//! Audio conversion through the `ffmpeg` command-line tool.

use super::tool::run_tool;
use super::{FormatConverter, wav_path_for};
use crate::error::{CompanionError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Converts audio by spawning `ffmpeg -y -i <in> <out.wav>`.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl FfmpegConverter {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl FormatConverter for FfmpegConverter {
    async fn convert(&self, input: &Path) -> Result<PathBuf> {
        let output = wav_path_for(input);
        if output == input {
            return Err(CompanionError::Convert(format!(
                "input is already a WAV file: {}",
                input.display()
            )));
        }
        run_tool(
            "ffmpeg",
            &self.program,
            &Self::args(input, &output),
            self.timeout,
        )
        .await?;
        Ok(output)
    }
}
