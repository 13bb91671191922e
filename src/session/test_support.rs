use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::audio::{AudioHandle, PlaybackError, PlaybackEvent};

/// Call observed by a [`RecordingHandle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleCall {
    Start(String),
    Stop,
}

#[derive(Default)]
struct HandleLog {
    calls: Vec<HandleCall>,
    fail_next_start: bool,
    events: VecDeque<PlaybackEvent>,
}

/// Shared view into what a [`RecordingHandle`] has been asked to do.
#[derive(Clone, Default)]
pub struct HandleProbe(Rc<RefCell<HandleLog>>);

impl HandleProbe {
    pub fn calls(&self) -> Vec<HandleCall> {
        self.0.borrow().calls.clone()
    }

    pub fn fail_next_start(&self) {
        self.0.borrow_mut().fail_next_start = true;
    }

    /// Pretend the current source played to its end.
    pub fn finish_playback(&self) {
        self.0.borrow_mut().events.push_back(PlaybackEvent::Ended);
    }

    /// Pretend the current source failed to load after `start` accepted it.
    pub fn fail_playback(&self) {
        self.0.borrow_mut().events.push_back(PlaybackEvent::Failed(PlaybackError::Decode {
            location: "test".into(),
            reason: "test source is not audio".into(),
        }));
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }
}

/// Audio handle that records calls instead of producing sound.
pub struct RecordingHandle {
    probe: HandleProbe,
}

impl RecordingHandle {
    pub fn new() -> (Self, HandleProbe) {
        let probe = HandleProbe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

impl AudioHandle for RecordingHandle {
    fn start(&mut self, source: &str) -> Result<(), PlaybackError> {
        let mut log = self.probe.0.borrow_mut();
        log.calls.push(HandleCall::Start(source.to_string()));
        log.events.clear();
        if std::mem::take(&mut log.fail_next_start) {
            return Err(PlaybackError::Output("test device rejected playback".into()));
        }
        Ok(())
    }

    fn stop(&mut self) {
        let mut log = self.probe.0.borrow_mut();
        log.calls.push(HandleCall::Stop);
        log.events.clear();
    }

    fn poll(&mut self) -> Option<PlaybackEvent> {
        self.probe.0.borrow_mut().events.pop_front()
    }
}
