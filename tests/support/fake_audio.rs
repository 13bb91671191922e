use std::sync::{Arc, Mutex};

use voicedeck::audio::{AudioHandle, PlaybackError, PlaybackEvent};

/// Audio handle that remembers what it was asked to play.
#[derive(Clone, Default)]
pub struct FakeAudio {
    started: Arc<Mutex<Vec<String>>>,
    stops: Arc<Mutex<usize>>,
}

impl FakeAudio {
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

impl AudioHandle for FakeAudio {
    fn start(&mut self, source: &str) -> Result<(), PlaybackError> {
        self.started.lock().unwrap().push(source.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        *self.stops.lock().unwrap() += 1;
    }

    fn poll(&mut self) -> Option<PlaybackEvent> {
        None
    }
}
