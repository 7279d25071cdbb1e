//! Synthetic audio generators.
//!
//! Produces small, valid PCM WAV files so tests can exercise the real
//! converter without shipping audio fixtures, plus filler payloads for
//! pipe-capacity tests where the content is irrelevant.

/// Encodes mono 16-bit samples as a PCM WAV file.
pub fn pcm16_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut wav = Vec::with_capacity(44 + data_len as usize);

    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk: PCM, mono, 16-bit
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }
    wav
}

/// A sine tone at `frequency` Hz, half amplitude.
pub fn sine_wav(sample_rate: u32, frequency: f32, seconds: f32) -> Vec<u8> {
    let count = (sample_rate as f32 * seconds) as usize;
    let samples: Vec<i16> = (0..count)
        .map(|n| {
            let t = n as f32 / sample_rate as f32;
            ((t * frequency * std::f32::consts::TAU).sin() * 0.5 * i16::MAX as f32) as i16
        })
        .collect();
    pcm16_wav(sample_rate, &samples)
}

/// A linear chirp from `start_hz` to `end_hz`; shows up as a diagonal
/// line in a spectrogram.
pub fn chirp_wav(sample_rate: u32, start_hz: f32, end_hz: f32, seconds: f32) -> Vec<u8> {
    let count = (sample_rate as f32 * seconds) as usize;
    let rate = (end_hz - start_hz) / seconds;
    let samples: Vec<i16> = (0..count)
        .map(|n| {
            let t = n as f32 / sample_rate as f32;
            let phase = std::f32::consts::TAU * (start_hz * t + 0.5 * rate * t * t);
            (phase.sin() * 0.5 * i16::MAX as f32) as i16
        })
        .collect();
    pcm16_wav(sample_rate, &samples)
}

/// Digital silence.
pub fn silence_wav(sample_rate: u32, seconds: f32) -> Vec<u8> {
    let count = (sample_rate as f32 * seconds) as usize;
    pcm16_wav(sample_rate, &vec![0i16; count])
}

/// `len` bytes of a repeating, non-zero pattern.
///
/// Large enough values (tens of KB and up) exceed the OS pipe buffer,
/// which is what deadlock tests need.
pub fn filler_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 + 1).collect()
}

/// Bytes that start like a PNG; what fake renderers return.
pub fn fake_png(body_len: usize) -> Vec<u8> {
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend(filler_bytes(body_len));
    png
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_header() {
        let wav = sine_wav(8000, 440.0, 0.5);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
        let data_len = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_len, 8000); // 4000 samples * 2 bytes
        assert_eq!(wav.len(), 44 + 8000);
    }

    #[test]
    fn test_riff_size_field() {
        let wav = chirp_wav(16000, 100.0, 4000.0, 0.25);
        let riff_len = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]) as usize;
        assert_eq!(riff_len, wav.len() - 8);
    }

    #[test]
    fn test_silence_is_zero() {
        let wav = silence_wav(8000, 0.1);
        assert!(wav[44..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_filler_has_no_zero_bytes() {
        let filler = filler_bytes(100_000);
        assert_eq!(filler.len(), 100_000);
        assert!(filler.iter().all(|&b| b != 0));
    }

    #[test]
    fn test_fake_png_signature() {
        let png = fake_png(16);
        assert_eq!(png.len(), 24);
        assert_eq!(&png[1..4], b"PNG");
    }
}
