//! Rodio-based audio engine.
//!
//! The output stream is not `Send`, so it lives on a dedicated thread for as
//! long as the engine exists; sinks are created from its handle.

use std::fmt;
use std::io::Cursor;
use std::sync::mpsc;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, info};

use super::{AudioEngine, Sound};
use crate::error::{Error, Result};

/// Audio engine playing through the default output device.
pub struct RodioEngine {
    handle: OutputStreamHandle,
    volume: f32,
    // Dropping the sender ends the thread that keeps the stream open.
    _shutdown: mpsc::Sender<()>,
}

impl fmt::Debug for RodioEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RodioEngine")
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

impl RodioEngine {
    /// Open the default output device.
    ///
    /// # Errors
    ///
    /// Returns an error if no output device is available.
    pub fn new(volume: f32) -> Result<Self> {
        let (handle_tx, handle_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("incidentlog-audio".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = handle_tx.send(Ok(handle));
                    let _ = shutdown_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(e.to_string()));
                }
            })?;

        let handle = handle_rx
            .recv()
            .map_err(|e| Error::playback(format!("audio thread exited: {e}")))?
            .map_err(|e| Error::playback(format!("no output device: {e}")))?;

        info!("Audio output opened (volume {volume})");
        Ok(Self {
            handle,
            volume,
            _shutdown: shutdown_tx,
        })
    }
}

#[async_trait]
impl AudioEngine for RodioEngine {
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn Sound>> {
        let len = bytes.len();
        let source =
            Decoder::new(Cursor::new(bytes)).map_err(|e| Error::playback(e.to_string()))?;
        let sink = Sink::try_new(&self.handle).map_err(|e| Error::playback(e.to_string()))?;
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(source);
        debug!("Decoded clip of {} bytes", len);
        Ok(Box::new(RodioSound { sink }))
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

struct RodioSound {
    sink: Sink,
}

#[async_trait]
impl Sound for RodioSound {
    async fn play(&mut self) -> Result<()> {
        self.sink.play();
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.sink.pause();
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        self.sink.stop();
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires audio hardware"]
    async fn test_open_default_device() {
        let engine = RodioEngine::new(1.0);
        assert!(engine.is_ok());
    }

    #[tokio::test]
    #[ignore = "Requires audio hardware"]
    async fn test_rejects_undecodable_clip() {
        let engine = RodioEngine::new(1.0).unwrap();
        assert!(engine.load(b"definitely not audio".to_vec()).await.is_err());
    }
}
