// Chope — MP3 decoder (symphonia)
//
// One `step()` decodes one packet, mixes it down to mono, applies the fixed
// output gain and pushes the samples to the output sink.  The sink blocks for
// as long as its DMA queue is full, which is what paces playback.

use std::io::{BufReader, ErrorKind};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder as CodecDecoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioOutput, ClipStream, Decoder};
use crate::config::*;
use crate::error::AudioError;

struct Playback {
    format: Box<dyn FormatReader>,
    codec: Box<dyn CodecDecoder>,
    track_id: u32,
    samples: Option<SampleBuffer<i16>>,
}

pub struct Mp3Decoder<O> {
    output: O,
    gain: f32,
    playback: Option<Playback>,
    mono: Vec<i16>,
}

impl<O: AudioOutput> Mp3Decoder<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            gain: OUTPUT_GAIN,
            playback: None,
            mono: Vec::new(),
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

impl<O: AudioOutput> Decoder for Mp3Decoder<O> {
    fn begin(&mut self, source: BufReader<ClipStream>) -> Result<(), AudioError> {
        self.stop();

        let mss = MediaSourceStream::new(Box::new(ReadOnlySource::new(source)), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("mp3");

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| AudioError::Begin(e.to_string()))?;
        let format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::Begin("no audio track".into()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        if let Some(rate) = params.sample_rate {
            if rate != OUTPUT_SAMPLE_RATE {
                log::warn!("Clip is {} Hz, output runs at {} Hz", rate, OUTPUT_SAMPLE_RATE);
            }
        }

        let codec = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| AudioError::Begin(e.to_string()))?;

        self.playback = Some(Playback {
            format,
            codec,
            track_id,
            samples: None,
        });
        Ok(())
    }

    fn step(&mut self) -> bool {
        let Some(pb) = self.playback.as_mut() else {
            return false;
        };

        let more = loop {
            let packet = match pb.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    break false;
                }
                Err(e) => {
                    log::warn!("MP3 read error: {}", e);
                    break false;
                }
            };

            if packet.track_id() != pb.track_id {
                continue;
            }

            match pb.codec.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count().max(1);
                    let needed = decoded.capacity() * channels;
                    if pb.samples.as_ref().map_or(true, |b| b.capacity() < needed) {
                        pb.samples = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                    }
                    let Some(buf) = pb.samples.as_mut() else {
                        break false;
                    };
                    buf.copy_interleaved_ref(decoded);

                    downmix(buf.samples(), channels, self.gain, &mut self.mono);
                    if let Err(e) = self.output.write(&self.mono) {
                        log::warn!("{}", e);
                        break false;
                    }
                    break true;
                }
                // Corrupt frame: skip it, the next one usually resyncs.
                Err(SymphoniaError::DecodeError(e)) => {
                    log::debug!("MP3 frame skipped: {}", e);
                    break true;
                }
                Err(e) => {
                    log::warn!("{}", AudioError::Decode(e.to_string()));
                    break false;
                }
            }
        };

        if !more {
            self.playback = None;
        }
        more
    }

    fn stop(&mut self) {
        self.playback = None;
    }

    fn is_running(&self) -> bool {
        self.playback.is_some()
    }
}

/// Average interleaved frames down to one channel and scale by `gain`.
fn downmix(interleaved: &[i16], channels: usize, gain: f32, out: &mut Vec<i16>) {
    out.clear();
    for frame in interleaved.chunks(channels) {
        let sum: f32 = frame.iter().map(|&s| s as f32).sum();
        let mixed = sum / frame.len() as f32 * gain;
        out.push(mixed.clamp(i16::MIN as f32, i16::MAX as f32) as i16);
    }
}
