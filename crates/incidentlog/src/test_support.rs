//! In-crate fakes for the capability traits.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::media::{
    Advisory, Alerts, DatePicker, DocumentFilter, DocumentPicker, ImagePicker, PermissionStatus,
};
use crate::playback::{AudioEngine, Sound};

/// Image picker with a fixed permission answer and payload.
#[derive(Debug, Clone)]
pub(crate) struct FakeImagePicker {
    permission: PermissionStatus,
    payload: Option<String>,
    picks: Arc<AtomicUsize>,
}

impl FakeImagePicker {
    pub(crate) fn granted(payload: Option<&str>) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            payload: payload.map(str::to_string),
            picks: Arc::default(),
        }
    }

    pub(crate) fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            payload: None,
            picks: Arc::default(),
        }
    }

    pub(crate) fn picks(&self) -> usize {
        self.picks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImagePicker for FakeImagePicker {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(self.permission)
    }

    async fn pick_image(&self) -> Result<Option<String>> {
        self.picks.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

/// Document picker returning a fixed path.
#[derive(Debug, Clone)]
pub(crate) struct FakeDocumentPicker {
    path: Option<PathBuf>,
}

impl FakeDocumentPicker {
    pub(crate) fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DocumentPicker for FakeDocumentPicker {
    async fn pick_document(&self, _filter: &DocumentFilter) -> Result<Option<PathBuf>> {
        Ok(self.path.clone())
    }
}

/// Date picker returning a fixed answer.
#[derive(Debug, Clone)]
pub(crate) struct FakeDatePicker {
    answer: Option<NaiveDate>,
}

impl FakeDatePicker {
    pub(crate) fn new(answer: Option<NaiveDate>) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl DatePicker for FakeDatePicker {
    async fn pick_date(&self, _initial: NaiveDate) -> Result<Option<NaiveDate>> {
        Ok(self.answer)
    }
}

/// Alerts sink that records every advisory.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeAlerts {
    shown: Arc<Mutex<Vec<Advisory>>>,
}

impl FakeAlerts {
    pub(crate) fn shown(&self) -> Vec<Advisory> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl Alerts for FakeAlerts {
    async fn alert(&self, advisory: &Advisory) {
        self.shown.lock().unwrap().push(advisory.clone());
    }
}

#[derive(Debug, Default)]
struct EngineCounters {
    live: AtomicUsize,
    max_live: AtomicUsize,
    loads: AtomicUsize,
    pauses: AtomicUsize,
    loaded: Mutex<Vec<Vec<u8>>>,
}

/// Audio engine that counts live handles instead of playing.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeEngine {
    counters: Arc<EngineCounters>,
    fail_loads: bool,
}

impl FakeEngine {
    pub(crate) fn failing() -> Self {
        Self {
            counters: Arc::default(),
            fail_loads: true,
        }
    }

    pub(crate) fn shared(&self) -> Arc<dyn AudioEngine> {
        Arc::new(self.clone())
    }

    pub(crate) fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub(crate) fn max_live(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }

    pub(crate) fn loads(&self) -> usize {
        self.counters.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn pauses(&self) -> usize {
        self.counters.pauses.load(Ordering::SeqCst)
    }

    pub(crate) fn loaded_bytes(&self) -> Vec<Vec<u8>> {
        self.counters.loaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn Sound>> {
        if self.fail_loads {
            return Err(Error::playback("fake engine refuses to load"));
        }
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        self.counters.loaded.lock().unwrap().push(bytes);
        let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(FakeSound {
            counters: Arc::clone(&self.counters),
            released: AtomicBool::new(false),
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Debug)]
struct FakeSound {
    counters: Arc<EngineCounters>,
    released: AtomicBool,
}

impl FakeSound {
    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Sound for FakeSound {
    async fn play(&mut self) -> Result<()> {
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.counters.pauses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        self.release();
        Ok(())
    }
}

impl Drop for FakeSound {
    fn drop(&mut self) {
        self.release();
    }
}
