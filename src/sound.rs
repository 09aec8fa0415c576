use fundsp::prelude::*;
use rodio::{OutputStream, OutputStreamHandle, Sink};

const SAMPLE_RATE: u32 = 44_100;
const CRASH_SECS: f64 = 0.5;

/// Falling saw sweep: 400 Hz to 80 Hz over 0.4 s, fading out over 0.5 s.
pub fn crash_samples() -> Vec<f32> {
    let freq = lfo(|t: f64| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
    let gain = lfo(|t: f64| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
    let mut sweep = (freq >> saw()) * gain;

    let wave = Wave::render(SAMPLE_RATE as f64, CRASH_SECS, &mut sweep);
    (0..wave.len()).map(|i| wave.at(0, i)).collect()
}

/// Audio output, if the machine has any.
pub struct Sound {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    crash: Vec<f32>,
    playing: Option<Sink>,
}

impl Sound {
    pub fn open() -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Sound {
                _stream: stream,
                handle,
                crash: crash_samples(),
                playing: None,
            }),
            Err(e) => {
                log::warn!("no audio output, playing silently: {e}");
                None
            }
        }
    }

    pub fn play_crash(&mut self) {
        let Ok(sink) = Sink::try_new(&self.handle) else {
            log::warn!("could not open an audio sink");
            return;
        };
        sink.append(rodio::buffer::SamplesBuffer::new(
            1,
            SAMPLE_RATE,
            self.crash.clone(),
        ));
        self.playing = Some(sink);
    }

    /// Blocks until the last sound played has finished.
    pub fn wait(&self) {
        if let Some(sink) = &self.playing {
            sink.sleep_until_end();
        }
    }
}
