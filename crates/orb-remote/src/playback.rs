//! Audio playback and background music through external player commands
//!
//! Both adapters run the configured command under `bash -c` with
//! `kill_on_drop(true)`, so dropping an in-flight playback future stops the
//! player process.

use crate::provider::{AudioSink, MusicPlayer, RemoteError, RemoteResult};
use bytes::Bytes;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Pipes encoded audio into a player's stdin, e.g. `ffplay -nodisp -autoexit -`.
pub struct CommandAudioSink {
    command: String,
}

impl CommandAudioSink {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait::async_trait]
impl AudioSink for CommandAudioSink {
    async fn play(&self, audio: Bytes) -> RemoteResult<()> {
        debug!("playing {} bytes via: {}", audio.len(), self.command);

        let mut child = Command::new("bash")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&audio).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(RemoteError::Playback(format!(
                "player exited with {}",
                status
            )))
        }
    }
}

/// No player configured: audio is discarded.
#[derive(Debug, Default)]
pub struct SilentAudioSink;

#[async_trait::async_trait]
impl AudioSink for SilentAudioSink {
    async fn play(&self, audio: Bytes) -> RemoteResult<()> {
        debug!("no audio player configured, discarding {} bytes", audio.len());
        Ok(())
    }
}

/// Keeps one looping player process alive while music is unmuted.
pub struct CommandMusicPlayer {
    command: String,
    child: Mutex<Option<Child>>,
}

impl CommandMusicPlayer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            child: Mutex::new(None),
        }
    }

    pub async fn is_playing(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl MusicPlayer for CommandMusicPlayer {
    async fn resume(&self) -> RemoteResult<()> {
        let mut guard = self.child.lock().await;
        if let Some(child) = guard.as_mut() {
            if matches!(child.try_wait(), Ok(None)) {
                return Ok(());
            }
        }

        let child = Command::new("bash")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        info!("background music started");
        *guard = Some(child);
        Ok(())
    }

    async fn pause(&self) -> RemoteResult<()> {
        let mut guard = self.child.lock().await;
        if let Some(mut child) = guard.take() {
            // Already exited is fine
            let _ = child.kill().await;
            info!("background music paused");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SilentMusicPlayer;

#[async_trait::async_trait]
impl MusicPlayer for SilentMusicPlayer {
    async fn resume(&self) -> RemoteResult<()> {
        Ok(())
    }

    async fn pause(&self) -> RemoteResult<()> {
        Ok(())
    }
}
