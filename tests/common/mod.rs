#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use davhook::log::Log;
use tracing::Level;

/// Keeps every message it is given.
#[derive(Default)]
pub struct Recorder(Mutex<Vec<(Level, String)>>);

impl Recorder {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.0.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, m)| m).collect()
    }
}

impl Log for Recorder {
    fn log(&self, level: Level, message: &str) {
        self.0.lock().unwrap().push((level, message.to_owned()));
    }
}
