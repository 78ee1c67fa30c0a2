//! CPAL audio output.

use crate::callback::ReaderHandle;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

/// Wrapper to hold a `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` due to platform internals. The stream is only
/// touched through `&mut AudioOutputter`, created and dropped by its owner.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

// SAFETY: the stream is never accessed concurrently; it is only stored and
// dropped, both through exclusive access to the outputter.
unsafe impl Send for StreamHandle {}

/// Drives a [`ReaderHandle`] from the audio device's callback.
///
/// The reader renders stereo. A mono device gets the average of both
/// channels; channels past the second are left silent.
pub struct AudioOutputter {
    reader: ReaderHandle,
    sample_rate: u32,
    device_index: Option<usize>,
    stream: Option<StreamHandle>,
}

impl AudioOutputter {
    pub fn new(reader: ReaderHandle, sample_rate: u32) -> Self {
        Self {
            reader,
            sample_rate,
            device_index: None,
            stream: None,
        }
    }

    /// Select an output device by its index in [`list_devices`](Self::list_devices).
    /// Takes effect on the next `start`.
    pub fn with_device(mut self, index: Option<usize>) -> Self {
        self.device_index = index;
        self
    }

    pub fn set_device(&mut self, index: Option<usize>) {
        self.device_index = index;
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    pub fn reader(&self) -> &ReaderHandle {
        &self.reader
    }

    /// Master volume, applied to every block from the next callback on.
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.reader.set_volume(volume)
    }

    pub fn volume(&self) -> f32 {
        self.reader.volume()
    }

    pub fn device_name(&self) -> Result<String> {
        Ok(get_device(self.device_index)?.name()?)
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let device = get_device(self.device_index)?;
        let supported = device.default_output_config()?;
        let config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, self.reader.clone())?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, self.reader.clone())?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, self.reader.clone())?,
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };

        stream.play()?;
        self.stream = Some(StreamHandle(stream));
        info!(
            sample_rate = self.sample_rate,
            channels = config.channels,
            "audio output started"
        );
        Ok(())
    }

    /// Stop the stream. Returns once no render call is in progress; no
    /// further calls are made afterwards.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            self.reader.quiesce();
            info!("audio output stopped");
        }
    }

    pub fn list_devices() -> Result<Vec<String>> {
        cpal::default_host()
            .output_devices()?
            .enumerate()
            .map(|(i, d)| Ok(format!("{i}: {}", d.name()?)))
            .collect()
    }
}

impl Drop for AudioOutputter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(i) => {
            let devices: Vec<_> = host.output_devices()?.collect();
            let count = devices.len();
            devices.into_iter().nth(i).ok_or_else(|| {
                Error::InvalidDevice(format!("Device index {i} out of range ({count} available)"))
            })
        }
        None => host
            .default_output_device()
            .ok_or_else(|| Error::InvalidDevice("No output device available".into())),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    reader: ReaderHandle,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;

    // Interleaved stereo. Only grows if the device asks for more than this
    // in one callback.
    let mut stereo = vec![0.0f32; 8192 * 2];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let needed = data.len() / channels * 2;
                if stereo.len() < needed {
                    stereo.resize(needed, 0.0);
                }
                reader.render_stereo_rt(&mut stereo[..needed]);
                write_output(data, channels, &stereo[..needed]);
            }));

            if result.is_err() {
                output_silence(data);
            }
        },
        |err| warn!(error = %err, "audio stream error"),
        None,
    )?;

    Ok(stream)
}

/// Convert interleaved stereo to the device layout and format.
#[inline]
fn write_output<T: cpal::SizedSample + cpal::FromSample<f32>>(
    data: &mut [T],
    channels: usize,
    stereo: &[f32],
) {
    for (frame, pair) in data.chunks_mut(channels).zip(stereo.chunks_exact(2)) {
        if channels == 1 {
            frame[0] = T::from_sample((pair[0] + pair[1]) * 0.5);
            continue;
        }
        for (ch, sample) in frame.iter_mut().enumerate() {
            let value = if ch < 2 { pair[ch] } else { 0.0 };
            *sample = T::from_sample(value);
        }
    }
}

/// Output silence (panic recovery).
#[inline]
fn output_silence<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T]) {
    data.fill(T::from_sample(0.0));
}
