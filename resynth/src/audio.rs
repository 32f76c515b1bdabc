use anyhow::{Context, Result};
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Size of the RIFF header written by [`WavWriter`] and [`write_wav_to_bytes`]
pub const WAV_HEADER_SIZE: u64 = 44;

/// Decoded source recording, down-mixed to mono
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono f32 samples in range [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source before down-mixing
    pub source_channels: usize,
    /// Container or codec name, e.g. "WAV", "FLAC"
    pub source_format: Option<String>,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Read an audio file and down-mix it to mono
pub fn read_audio_file(path: &Path) -> Result<DecodedAudio> {
    let file = std::fs::File::open(path).context("Failed to open audio file")?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    read_from_source(mss, path.extension().and_then(|e| e.to_str()))
}

/// Read audio from bytes (for cross-platform/WASM support)
pub fn read_audio_from_bytes(bytes: &[u8]) -> Result<DecodedAudio> {
    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());
    read_from_source(mss, None)
}

fn read_from_source(mss: MediaSourceStream, extension: Option<&str>) -> Result<DecodedAudio> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unsupported audio format")?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let source_format = extension
        .map(|ext| ext.to_uppercase())
        .or_else(|| Some(codec_name(track.codec_params.codec).to_string()));

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Unknown sample rate")?;
    let channels = track
        .codec_params
        .channels
        .context("Unknown channel count")?
        .count();

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e).context("Error decoding packet"),
        };

        append_mono(&decoded, &mut samples, channels);
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        source_channels: channels,
        source_format,
    })
}

fn codec_name(codec: symphonia::core::codecs::CodecType) -> &'static str {
    use symphonia::core::codecs::*;
    match codec {
        CODEC_TYPE_FLAC => "FLAC",
        CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S16BE | CODEC_TYPE_PCM_S24LE
        | CODEC_TYPE_PCM_S32LE | CODEC_TYPE_PCM_F32LE => "WAV",
        CODEC_TYPE_MP3 => "MP3",
        CODEC_TYPE_VORBIS => "OGG",
        CODEC_TYPE_AAC => "AAC",
        _ => "UNKNOWN",
    }
}

/// Average all channels of a decoded buffer into `samples`
fn append_mono(buffer: &AudioBufferRef, samples: &mut Vec<f32>, channels: usize) {
    macro_rules! downmix {
        ($buf:expr, $convert:expr) => {{
            let buf = $buf;
            let channels = channels.min(buf.spec().channels.count()).max(1);
            let gain = 1.0 / channels as f32;
            for frame in 0..buf.frames() {
                let sum: f32 = (0..channels).map(|ch| $convert(buf.chan(ch)[frame])).sum();
                samples.push(sum * gain);
            }
        }};
    }

    match buffer {
        AudioBufferRef::F32(buf) => downmix!(buf, |s: f32| s),
        AudioBufferRef::F64(buf) => downmix!(buf, |s: f64| s as f32),
        AudioBufferRef::S16(buf) => downmix!(buf, |s: i16| s as f32 / 32768.0),
        AudioBufferRef::S32(buf) => downmix!(buf, |s: i32| s as f32 / 2147483648.0),
        AudioBufferRef::U8(buf) => downmix!(buf, |s: u8| (s as f32 - 128.0) / 128.0),
        AudioBufferRef::S24(buf) => downmix!(buf, |s: symphonia::core::sample::i24| {
            s.inner() as f32 / 8388608.0
        }),
        _ => {
            // Remaining sample formats are not produced by the enabled codecs
        }
    }
}

/// Write mono samples to a WAV file
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let bytes = write_wav_to_bytes(samples, sample_rate, 1)?;
    std::fs::write(path, bytes).context("Failed to write WAV file")
}

/// Write samples to WAV format in memory (for cross-platform/WASM support)
pub fn write_wav_to_bytes(samples: &[f32], sample_rate: u32, channels: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(WAV_HEADER_SIZE as usize + samples.len() * 4);
    write_wav_header(&mut buffer, sample_rate, channels as u16, samples.len() as u64 * 4)?;
    for &sample in samples {
        buffer.write_all(&sample.to_le_bytes())?;
    }
    Ok(buffer)
}

/// RIFF header for 32-bit IEEE float PCM
fn write_wav_header<W: Write>(
    out: &mut W,
    sample_rate: u32,
    channels: u16,
    data_size: u64,
) -> std::io::Result<()> {
    let bytes_per_sample = 4u32;
    let data_size = data_size.min(u32::MAX as u64 - 36) as u32;

    // RIFF header
    out.write_all(b"RIFF")?;
    out.write_all(&(36 + data_size).to_le_bytes())?;
    out.write_all(b"WAVE")?;

    // fmt chunk
    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?; // chunk size
    out.write_all(&3u16.to_le_bytes())?; // format = IEEE float
    out.write_all(&channels.to_le_bytes())?;
    out.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * channels as u32 * bytes_per_sample;
    out.write_all(&byte_rate.to_le_bytes())?;
    let block_align = channels * bytes_per_sample as u16;
    out.write_all(&block_align.to_le_bytes())?;
    out.write_all(&32u16.to_le_bytes())?; // bits per sample

    // data chunk
    out.write_all(b"data")?;
    out.write_all(&data_size.to_le_bytes())?;
    Ok(())
}

/// Mono float WAV written window by window
///
/// Sizes in the header are placeholders until [`finish`](Self::finish).
/// Every append starts at the end of the last successful one, so a failed
/// append can be retried without duplicating samples.
pub struct WavWriter<W: Write + Seek> {
    inner: W,
    sample_rate: u32,
    committed: u64,
}

impl WavWriter<std::io::BufWriter<std::fs::File>> {
    /// Create (or truncate) a WAV file
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Self::new(std::io::BufWriter::new(file), sample_rate)
    }
}

impl<W: Write + Seek> WavWriter<W> {
    pub fn new(mut inner: W, sample_rate: u32) -> Result<Self> {
        write_wav_header(&mut inner, sample_rate, 1, 0).context("Failed to write WAV header")?;
        Ok(Self {
            inner,
            sample_rate,
            committed: 0,
        })
    }

    /// Samples written so far
    pub fn samples_written(&self) -> u64 {
        self.committed / 4
    }

    /// Append one window of samples
    pub fn append(&mut self, samples: &[f32]) -> std::io::Result<()> {
        self.inner
            .seek(SeekFrom::Start(WAV_HEADER_SIZE + self.committed))?;
        for &sample in samples {
            self.inner.write_all(&sample.to_le_bytes())?;
        }
        self.committed += samples.len() as u64 * 4;
        Ok(())
    }

    /// Patch the header sizes and hand back the writer
    pub fn finish(mut self) -> Result<W> {
        self.inner
            .seek(SeekFrom::Start(0))
            .context("Failed to seek to WAV header")?;
        write_wav_header(&mut self.inner, self.sample_rate, 1, self.committed)
            .context("Failed to patch WAV header")?;
        self.inner.flush().context("Failed to flush WAV output")?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_writer_matches_in_memory() {
        let samples: Vec<f32> = (0..300).map(|i| (i as f32 * 0.1).sin()).collect();

        let mut writer = WavWriter::new(Cursor::new(Vec::new()), 22050).unwrap();
        for chunk in samples.chunks(128) {
            writer.append(chunk).unwrap();
        }
        assert_eq!(writer.samples_written(), 300);
        let streamed = writer.finish().unwrap().into_inner();

        assert_eq!(streamed, write_wav_to_bytes(&samples, 22050, 1).unwrap());
    }

    #[test]
    fn test_wav_round_trip_through_decoder() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let bytes = write_wav_to_bytes(&samples, 16000, 1).unwrap();

        let decoded = read_audio_from_bytes(&bytes).unwrap();
        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.source_channels, 1);
        assert_eq!(decoded.samples.len(), samples.len());
        for (a, b) in samples.iter().zip(&decoded.samples) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stereo_is_down_mixed() {
        // left = 0.5, right = -0.1
        let interleaved: Vec<f32> = (0..400)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.1 })
            .collect();
        let bytes = write_wav_to_bytes(&interleaved, 8000, 2).unwrap();

        let decoded = read_audio_from_bytes(&bytes).unwrap();
        assert_eq!(decoded.source_channels, 2);
        assert_eq!(decoded.samples.len(), 200);
        assert!(decoded.samples.iter().all(|&s| (s - 0.2).abs() < 1e-6));
    }
}
