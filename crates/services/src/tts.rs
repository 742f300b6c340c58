//! Spoken replies through a local speech program (`say`, `espeak`, ...).

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use veloce_core::error::ProviderError;
use veloce_core::speech::TextToSpeech;

/// Runs `<program> -- <text>` and waits for it to finish.
pub struct CommandSpeaker {
    program: String,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `--` ends option parsing so replies starting with `-` are spoken.
    fn command(&self, text: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("--").arg(text);
        command
    }
}

#[async_trait]
impl TextToSpeech for CommandSpeaker {
    fn name(&self) -> &str {
        &self.program
    }

    async fn speak(&self, text: &str) -> Result<(), ProviderError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        debug!(program = %self.program, chars = text.len(), "Speaking reply");

        let status = self
            .command(text)
            .status()
            .await
            .map_err(|e| ProviderError::Dependency(format!("{}: {e}", self.program)))?;

        if status.success() {
            Ok(())
        } else {
            Err(ProviderError::Dependency(format!(
                "{} exited with {status}",
                self.program
            )))
        }
    }
}

/// Discards everything. Used when spoken replies are off.
pub struct NoopSpeaker;

#[async_trait]
impl TextToSpeech for NoopSpeaker {
    fn name(&self) -> &str {
        "noop"
    }

    async fn speak(&self, _text: &str) -> Result<(), ProviderError> {
        Ok(())
    }
}
