//! Audio playback for record clips.
//!
//! [`PlaybackController`] owns at most one loaded [`Sound`]. Starting a new
//! clip always unloads the previous one before the engine is asked for
//! another handle, so two decoded clips never coexist.

mod noop;
#[cfg(feature = "audio")]
mod rodio_engine;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::media::decode_payload;

pub use noop::NoopEngine;
#[cfg(feature = "audio")]
pub use rodio_engine::RodioEngine;

/// One loaded, playable clip.
#[async_trait]
pub trait Sound: Send + Sync {
    /// Start or resume playback.
    async fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the clip loaded.
    async fn pause(&mut self) -> Result<()>;

    /// Stop playback and release the decoder.
    async fn unload(&mut self) -> Result<()>;

    /// Whether the clip has played to the end.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Decoder/output backend.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Decode `bytes` into a paused, ready-to-play sound.
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn Sound>>;

    /// Short backend name for logs and status output.
    fn name(&self) -> &'static str;
}

/// Which clip a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum SessionKey {
    /// Audio held by an unsaved draft.
    Draft,
    /// Audio of the stored record with this id.
    Record(i64),
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Record(id) => write!(f, "record {id}"),
        }
    }
}

/// The control a clip should offer given the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayControl {
    /// Clip is idle, paused, or another clip is loaded.
    Play,
    /// Clip is the active one and currently playing.
    Pause,
}

struct Session {
    key: SessionKey,
    sound: Box<dyn Sound>,
    playing: bool,
}

/// Owner of the single active audio session.
pub struct PlaybackController {
    engine: Arc<dyn AudioEngine>,
    session: Option<Session>,
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("engine", &self.engine.name())
            .field("active", &self.active())
            .finish()
    }
}

impl PlaybackController {
    /// Controller with nothing loaded.
    #[must_use]
    pub fn new(engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            engine,
            session: None,
        }
    }

    /// The loaded session as `(key, playing)`.
    #[must_use]
    pub fn active(&self) -> Option<(SessionKey, bool)> {
        self.session.as_ref().map(|s| (s.key, s.playing))
    }

    /// Whether `key` is loaded and playing.
    #[must_use]
    pub fn is_playing(&self, key: SessionKey) -> bool {
        self.active() == Some((key, true))
    }

    /// Whether there is nothing left to hear: no session, or the loaded clip
    /// has played to the end.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.as_ref().map_or(true, |s| s.sound.is_finished())
    }

    /// The control to render for `key`.
    #[must_use]
    pub fn control_for(&self, key: SessionKey) -> PlayControl {
        if self.is_playing(key) {
            PlayControl::Pause
        } else {
            PlayControl::Play
        }
    }

    /// Load `payload` (base64) and start playing it as `key`.
    ///
    /// Any loaded session is unloaded first, even if the new clip then fails
    /// to decode.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is empty or not base64, or if the
    /// engine fails to load or start the clip.
    pub async fn play(&mut self, key: SessionKey, payload: &str) -> Result<()> {
        self.unload().await;

        let bytes = decode_payload(payload)?;
        if bytes.is_empty() {
            return Err(Error::NoAudio(key.to_string()));
        }

        let mut sound = self.engine.load(bytes).await?;
        if let Err(e) = sound.play().await {
            if let Err(release) = sound.unload().await {
                warn!("Failed to release clip for {}: {}", key, release);
            }
            return Err(e);
        }

        info!("Playing audio for {}", key);
        self.session = Some(Session {
            key,
            sound,
            playing: true,
        });
        Ok(())
    }

    /// Pause the active session if it is playing; otherwise do nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to pause.
    pub async fn pause(&mut self) -> Result<()> {
        match &mut self.session {
            Some(session) if session.playing => {
                session.sound.pause().await?;
                session.playing = false;
                debug!("Paused audio for {}", session.key);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Release the active session, returning its key.
    ///
    /// The handle is dropped even if the engine reports an error while
    /// releasing it.
    pub async fn unload(&mut self) -> Option<SessionKey> {
        let mut session = self.session.take()?;
        if let Err(e) = session.sound.unload().await {
            warn!("Failed to unload audio for {}: {}", session.key, e);
        }
        debug!("Unloaded audio for {}", session.key);
        Some(session.key)
    }

    /// Release the active session only if it belongs to `key`.
    pub async fn unload_if(&mut self, key: SessionKey) -> bool {
        if self.active().is_some_and(|(active, _)| active == key) {
            self.unload().await;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::encode_payload;
    use crate::test_support::FakeEngine;

    fn clip(tag: &str) -> String {
        encode_payload(tag.as_bytes())
    }

    #[tokio::test]
    async fn test_play_marks_session() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());

        controller.play(SessionKey::Record(1), &clip("a")).await.unwrap();
        assert_eq!(controller.active(), Some((SessionKey::Record(1), true)));
        assert!(controller.is_playing(SessionKey::Record(1)));
        assert_eq!(engine.live(), 1);
    }

    #[tokio::test]
    async fn test_play_replaces_previous_session() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());

        controller.play(SessionKey::Record(1), &clip("a")).await.unwrap();
        controller.play(SessionKey::Record(2), &clip("b")).await.unwrap();

        assert_eq!(controller.active(), Some((SessionKey::Record(2), true)));
        assert_eq!(engine.live(), 1);
        assert_eq!(engine.max_live(), 1);
        assert_eq!(engine.loads(), 2);
        assert_eq!(engine.loaded_bytes(), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[tokio::test]
    async fn test_pause_and_resume_by_replay() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        let key = SessionKey::Record(4);

        controller.play(key, &clip("a")).await.unwrap();
        assert_eq!(controller.control_for(key), PlayControl::Pause);

        controller.pause().await.unwrap();
        assert_eq!(controller.active(), Some((key, false)));
        assert_eq!(controller.control_for(key), PlayControl::Play);

        controller.play(key, &clip("a")).await.unwrap();
        assert_eq!(controller.active(), Some((key, true)));
        assert_eq!(engine.max_live(), 1);
    }

    #[tokio::test]
    async fn test_pause_without_session_is_noop() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        controller.pause().await.unwrap();
        assert!(controller.active().is_none());

        controller.play(SessionKey::Draft, &clip("d")).await.unwrap();
        controller.pause().await.unwrap();
        controller.pause().await.unwrap();
        assert_eq!(engine.pauses(), 1);
    }

    #[tokio::test]
    async fn test_control_for_other_clip_is_play() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        controller.play(SessionKey::Record(1), &clip("a")).await.unwrap();
        assert_eq!(controller.control_for(SessionKey::Record(2)), PlayControl::Play);
        assert_eq!(controller.control_for(SessionKey::Draft), PlayControl::Play);
    }

    #[tokio::test]
    async fn test_unload_releases_handle() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        controller.play(SessionKey::Draft, &clip("d")).await.unwrap();

        assert_eq!(controller.unload().await, Some(SessionKey::Draft));
        assert!(controller.active().is_none());
        assert_eq!(engine.live(), 0);
        assert_eq!(controller.unload().await, None);
        assert!(controller.is_finished());
    }

    #[tokio::test]
    async fn test_unload_if_matches_key_only() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        controller.play(SessionKey::Record(3), &clip("c")).await.unwrap();

        assert!(!controller.unload_if(SessionKey::Record(4)).await);
        assert_eq!(engine.live(), 1);
        assert!(controller.unload_if(SessionKey::Record(3)).await);
        assert_eq!(engine.live(), 0);
    }

    #[tokio::test]
    async fn test_bad_payload_still_releases_previous() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        controller.play(SessionKey::Record(1), &clip("a")).await.unwrap();

        let err = controller
            .play(SessionKey::Record(2), "not*base64")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Base64(_)));
        assert!(controller.active().is_none());
        assert_eq!(engine.live(), 0);
    }

    #[tokio::test]
    async fn test_empty_payload_is_no_audio() {
        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        let err = controller.play(SessionKey::Draft, "").await.unwrap_err();
        assert!(matches!(err, Error::NoAudio(_)));
        assert_eq!(engine.loads(), 0);
    }

    #[tokio::test]
    async fn test_engine_load_failure() {
        let engine = FakeEngine::failing();
        let mut controller = PlaybackController::new(engine.shared());
        let err = controller
            .play(SessionKey::Record(1), &clip("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Playback(_)));
        assert!(controller.active().is_none());
    }

    #[test]
    fn test_session_key_display() {
        assert_eq!(SessionKey::Draft.to_string(), "draft");
        assert_eq!(SessionKey::Record(12).to_string(), "record 12");
    }

    #[tokio::test]
    async fn test_noop_clip_finishes_immediately() {
        let mut controller = PlaybackController::new(Arc::new(NoopEngine));
        controller.play(SessionKey::Record(1), &clip("a")).await.unwrap();
        assert!(controller.is_finished());

        let engine = FakeEngine::default();
        let mut controller = PlaybackController::new(engine.shared());
        controller.play(SessionKey::Record(1), &clip("a")).await.unwrap();
        assert!(!controller.is_finished());
    }

    #[test]
    fn test_controller_debug() {
        let controller = PlaybackController::new(Arc::new(NoopEngine));
        let debug = format!("{controller:?}");
        assert!(debug.contains("PlaybackController"));
        assert!(debug.contains("noop"));
    }
}
