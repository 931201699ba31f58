//! Audio file helpers: segment merging and duration.
//!
//! WAV segments are merged frame by frame through `hound`; MP3 segments are
//! merged by concatenating their frame streams.

use crate::tts::AudioFormat;
use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};

/// Format parameters of a PCM WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_format: SampleFormat,
}

impl From<WavSpec> for AudioSpec {
    fn from(spec: WavSpec) -> Self {
        Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            sample_format: spec.sample_format,
        }
    }
}

impl From<AudioSpec> for WavSpec {
    fn from(spec: AudioSpec) -> Self {
        WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: spec.sample_format,
        }
    }
}

impl fmt::Display for AudioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.sample_format {
            SampleFormat::Int => "int",
            SampleFormat::Float => "float",
        };
        write!(
            f,
            "{} Hz, {} ch, {}-bit {}",
            self.sample_rate, self.channels, self.bits_per_sample, kind
        )
    }
}

/// Read the leading bytes of a file and detect its container.
pub fn detect_format(path: &Path) -> Result<AudioFormat> {
    let mut header = [0u8; 12];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(AudioFormat::sniff(&header[..filled]))
}

/// Merge segment files into `out`, in order.
///
/// All segments must share one container. A single segment is copied as is.
pub fn merge_segments(segments: &[PathBuf], out: &Path) -> Result<AudioFormat> {
    let first = segments.first().ok_or_else(|| {
        Error::configuration_with_context(
            "no segments to merge",
            crate::ErrorContext::new().with_source("merge"),
        )
    })?;
    let format = detect_format(first)?;
    if segments.len() == 1 {
        std::fs::copy(first, out)?;
        return Ok(format);
    }

    for path in &segments[1..] {
        let found = detect_format(path)?;
        if found != format || format == AudioFormat::Unknown {
            return Err(Error::FormatMismatch {
                path: path.clone(),
                expected: format.to_string(),
                found: found.to_string(),
            });
        }
    }

    match format {
        AudioFormat::Wav => {
            merge_wav(segments, out)?;
        }
        _ => merge_mp3(segments, out)?,
    }
    Ok(format)
}

/// Concatenate the frames of WAV segments, keeping the first file's spec.
///
/// Every later segment must match that spec exactly; no resampling is done
/// and no silence is inserted between segments. `out` is only replaced once
/// every frame has been written.
pub fn merge_wav(segments: &[PathBuf], out: &Path) -> Result<AudioSpec> {
    let first = segments.first().ok_or_else(|| {
        Error::configuration_with_context(
            "no segments to merge",
            crate::ErrorContext::new().with_source("merge"),
        )
    })?;
    let spec: WavSpec = WavReader::open(first)?.spec();
    let expected = AudioSpec::from(spec);

    let mut readers = Vec::with_capacity(segments.len());
    for path in segments {
        let reader = WavReader::open(path)?;
        let found = AudioSpec::from(reader.spec());
        if found != expected {
            return Err(Error::FormatMismatch {
                path: path.clone(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        readers.push(reader);
    }

    let staging = staging_file(out)?;
    let mut writer = WavWriter::new(BufWriter::new(staging.as_file()), spec)?;
    for reader in readers {
        copy_frames(reader, &mut writer, expected)?;
    }
    writer.finalize()?;
    commit(staging, out)?;
    Ok(expected)
}

/// Scratch file next to `out`; it is removed on drop unless committed.
fn staging_file(out: &Path) -> Result<NamedTempFile> {
    let dir = match out.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

fn commit(staging: NamedTempFile, out: &Path) -> Result<()> {
    staging.persist(out).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

fn copy_frames<W>(
    reader: WavReader<BufReader<File>>,
    writer: &mut WavWriter<W>,
    spec: AudioSpec,
) -> Result<()>
where
    W: Write + std::io::Seek,
{
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => copy_samples::<f32, W>(reader, writer),
        (SampleFormat::Int, 1..=8) => copy_samples::<i8, W>(reader, writer),
        (SampleFormat::Int, 9..=16) => copy_samples::<i16, W>(reader, writer),
        (SampleFormat::Int, _) => copy_samples::<i32, W>(reader, writer),
    }
}

fn copy_samples<S, W>(
    mut reader: WavReader<BufReader<File>>,
    writer: &mut WavWriter<W>,
) -> Result<()>
where
    S: hound::Sample,
    W: Write + std::io::Seek,
{
    for sample in reader.samples::<S>() {
        writer.write_sample(sample?)?;
    }
    Ok(())
}

/// Concatenate MP3 segment streams. ID3v2 tags of later segments are
/// skipped so the output carries at most one leading tag.
pub fn merge_mp3(segments: &[PathBuf], out: &Path) -> Result<()> {
    let mut staging = staging_file(out)?;
    for (i, path) in segments.iter().enumerate() {
        let bytes = std::fs::read(path)?;
        let body = if i == 0 { &bytes[..] } else { strip_id3v2(&bytes) };
        staging.write_all(body)?;
    }
    staging.flush()?;
    commit(staging, out)
}

fn strip_id3v2(bytes: &[u8]) -> &[u8] {
    if bytes.len() < 10 || !bytes.starts_with(b"ID3") {
        return bytes;
    }
    // Tag size is a 28-bit synchsafe integer, excluding the 10-byte header.
    let size = bytes[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | usize::from(b & 0x7F));
    let footer = if bytes[5] & 0x10 != 0 { 10 } else { 0 };
    let end = 10 + size + footer;
    if end > bytes.len() {
        return bytes;
    }
    &bytes[end..]
}

/// Duration of a WAV file in seconds (frames / sample rate).
pub fn wav_duration(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path)?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return Err(Error::Audio(hound::Error::FormatError("zero sample rate")));
    }
    Ok(f64::from(reader.duration()) / f64::from(sample_rate))
}
