//! Silent audio engine for builds without an output backend.

use async_trait::async_trait;
use tracing::debug;

use super::{AudioEngine, Sound};
use crate::error::Result;

/// Engine that accepts every clip and plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEngine;

#[async_trait]
impl AudioEngine for NoopEngine {
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn Sound>> {
        debug!("Noop engine loaded {} bytes", bytes.len());
        Ok(Box::new(NoopSound))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[derive(Debug)]
struct NoopSound;

#[async_trait]
impl Sound for NoopSound {
    async fn play(&mut self) -> Result<()> {
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }
}
