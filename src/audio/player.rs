use std::io::Cursor;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info};

use super::fetch::AudioFetcher;
use super::source::AudioLocation;
use super::{AudioHandle, PlaybackError, PlaybackEvent};

const STOP_FADE: Duration = Duration::from_millis(5);
const STOP_FADE_STEPS: u32 = 5;

/// rodio-backed preview player owning the single output sink.
///
/// Encoded bytes are read on a background worker; the sink is built when
/// they arrive. The output stream is opened on first use and released when
/// the player is dropped.
pub struct AudioPlayer {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    volume: f32,
    fetcher: AudioFetcher,
}

impl AudioPlayer {
    /// Create a player with the given master volume (0.0 - 1.0).
    pub fn new(volume: f32) -> Self {
        Self {
            stream: None,
            sink: None,
            volume: volume.clamp(0.0, 1.0),
            fetcher: AudioFetcher::spawn(),
        }
    }

    fn output(&mut self) -> Result<&OutputStream, PlaybackError> {
        if self.stream.is_none() {
            let stream = OutputStreamBuilder::open_default_stream()
                .map_err(|err| PlaybackError::Output(err.to_string()))?;
            info!("Opened default audio output");
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| PlaybackError::Output("output stream missing".into()))
    }

    /// Fade the current sink out briefly before dropping it to avoid clicks.
    fn fade_out_current_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            let initial_volume = sink.volume();
            thread::spawn(move || {
                let step_duration = STOP_FADE / STOP_FADE_STEPS;
                for step in 0..STOP_FADE_STEPS {
                    let factor = 1.0 - (step + 1) as f32 / STOP_FADE_STEPS as f32;
                    sink.set_volume((initial_volume * factor).max(0.0));
                    thread::sleep(step_duration);
                }
                sink.stop();
            });
        }
    }
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AudioPlayer {
    fn play_bytes(&mut self, location: &AudioLocation, bytes: Vec<u8>) -> Result<(), PlaybackError> {
        let decoder = Decoder::new(Cursor::new(bytes)).map_err(|err| PlaybackError::Decode {
            location: location.to_string(),
            reason: err.to_string(),
        })?;
        let volume = self.volume;
        let sink = Sink::connect_new(self.output()?.mixer());
        sink.set_volume(volume);
        sink.append(decoder);
        sink.play();
        debug!("Playing {location}");
        self.sink = Some(sink);
        Ok(())
    }
}

impl AudioHandle for AudioPlayer {
    fn start(&mut self, source: &str) -> Result<(), PlaybackError> {
        self.fetcher.cancel();
        self.fade_out_current_sink();
        let location = AudioLocation::parse(source)?;
        let request_id = self.fetcher.request(location);
        debug!("Queued audio fetch {request_id} for {source}");
        Ok(())
    }

    fn stop(&mut self) {
        self.fetcher.cancel();
        self.fade_out_current_sink();
    }

    fn poll(&mut self) -> Option<PlaybackEvent> {
        if self.fetcher.is_pending() {
            let fetched = self.fetcher.poll()?;
            let played = match fetched.result {
                Ok(bytes) => self.play_bytes(&fetched.location, bytes),
                Err(err) => Err(err),
            };
            return played.err().map(PlaybackEvent::Failed);
        }
        if self.sink.as_ref().is_some_and(Sink::empty) {
            self.sink = None;
            return Some(PlaybackEvent::Ended);
        }
        None
    }
}
