use tracing::{debug, warn};

use crate::audio::{AudioHandle, PlaybackError, PlaybackEvent};
use crate::voices::{Voice, VoiceId};

/// Which voice, if any, is audible right now.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing(VoiceId),
}

/// Sole owner of the shared audio handle; guarantees no two previews overlap.
pub struct PlaybackController {
    handle: Box<dyn AudioHandle>,
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new(handle: Box<dyn AudioHandle>) -> Self {
        Self {
            handle,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playing_id(&self) -> Option<&VoiceId> {
        match &self.state {
            PlaybackState::Playing(id) => Some(id),
            PlaybackState::Idle => None,
        }
    }

    pub fn is_playing(&self, id: &VoiceId) -> bool {
        self.playing_id() == Some(id)
    }

    /// Play `voice`, or stop it if it is the one already playing.
    ///
    /// Voices without audio are ignored. A start failure leaves the
    /// controller idle and hands the error back for reporting.
    pub fn toggle(&mut self, voice: &Voice) -> Result<(), PlaybackError> {
        let Some(source) = voice.audio_src.as_deref() else {
            return Ok(());
        };
        if self.is_playing(&voice.id) {
            self.stop();
            return Ok(());
        }
        self.stop();
        match self.handle.start(source) {
            Ok(()) => {
                debug!("Playing voice {}", voice.id);
                self.state = PlaybackState::Playing(voice.id.clone());
                Ok(())
            }
            Err(err) => {
                warn!("Playback failed for voice {}: {err}", voice.id);
                self.handle.stop();
                self.state = PlaybackState::Idle;
                Err(err)
            }
        }
    }

    /// Halt and rewind; a no-op when idle.
    pub fn stop(&mut self) {
        if let PlaybackState::Playing(_) = self.state {
            self.handle.stop();
            self.state = PlaybackState::Idle;
        }
    }

    /// Drain the handle's events; returns the voice that just stopped on its
    /// own, either by reaching the end or by failing to load.
    pub fn poll(&mut self) -> Option<VoiceId> {
        let event = self.handle.poll()?;
        let PlaybackState::Playing(id) = std::mem::take(&mut self.state) else {
            return None;
        };
        match event {
            PlaybackEvent::Ended => debug!("Voice {id} played to the end"),
            PlaybackEvent::Failed(err) => warn!("Playback failed for voice {id}: {err}"),
        }
        Some(id)
    }
}
