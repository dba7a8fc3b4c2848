use std::path::Path;

use crate::error::{ExporterError, Result};

/// Upper bound on the number of histogram buckets a calibration may produce
pub const MAX_BUCKETS: usize = 1024;

/// Current, idle and maximum GPU frequency in Hz
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrequencySample {
    /// Frequency the GPU currently runs at
    pub actual: f64,
    /// Frequency the GPU drops to when idle
    pub idle: f64,
    /// Highest frequency the hardware reports
    pub max: f64,
}

impl FrequencySample {
    /// Linear histogram buckets from the idle frequency, `step` Hz wide,
    /// `(max - idle) / step` of them.
    ///
    /// Fails if that leaves fewer than one bucket or more than [`MAX_BUCKETS`].
    pub fn buckets(&self, step: f64) -> Result<Vec<f64>> {
        let count = ((self.max - self.idle) / step).trunc();
        if !count.is_finite() || count < 1.0 || count > MAX_BUCKETS as f64 {
            return Err(ExporterError::InvalidBuckets {
                idle: self.idle,
                max: self.max,
                step,
            });
        }

        Ok(prometheus::linear_buckets(self.idle, step, count as usize)?)
    }
}

/// Parse a `<integer> <unit>` value given in MHz into Hz
fn parse_mhz(key: &str, value: &str) -> Result<f64> {
    let malformed = || ExporterError::MalformedFrequency {
        key: key.to_string(),
        value: value.trim().to_string(),
    };

    let mut tokens = value.split_whitespace();
    let (Some(number), Some(_unit), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed());
    };

    let mhz: i64 = number.parse().map_err(|_| malformed())?;
    Ok(mhz as f64 * 1e6)
}

/// Parse the content of `i915_frequency_info`.
///
/// Only `Actual freq`, `Max freq` and `Idle freq` are read; lines without a
/// colon and other keys are ignored. Keys that never appear stay at 0.
pub fn parse_frequency_info(content: &str) -> Result<FrequencySample> {
    let mut sample = FrequencySample::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let field = match key {
            "Actual freq" => &mut sample.actual,
            "Max freq" => &mut sample.max,
            "Idle freq" => &mut sample.idle,
            _ => continue,
        };
        *field = parse_mhz(key, value)?;
    }

    Ok(sample)
}

/// Read and parse the frequency file, blocking the current thread
pub fn read_frequency_info(path: &Path) -> Result<FrequencySample> {
    let content = std::fs::read_to_string(path)?;
    parse_frequency_info(&content)
}

/// Read and parse the frequency file on the tokio blocking pool
pub async fn read_frequency_info_async(path: &Path) -> Result<FrequencySample> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_frequency_info(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FREQUENCY_INFO: &str = "\
PM IER=0x00000070 IMR=0xffffff8f ISR=0x00000000 IIR=0x00000000, MASK=0x00003fde
Render p-state ratio: 6
Render p-state VID: 0
Current freq: 300 MHz
Actual freq: 350 MHz
Idle freq: 300 MHz
Min freq: 300 MHz
Boost freq: 1100 MHz
Max freq: 1000 MHz
efficient (RPe) frequency: 300 MHz
Garbage line without colon
";

    #[test]
    fn test_parse_frequency_info() {
        let sample = parse_frequency_info(FREQUENCY_INFO).unwrap();
        assert_eq!(
            sample,
            FrequencySample {
                actual: 350e6,
                idle: 300e6,
                max: 1000e6,
            }
        );
    }

    #[test]
    fn test_parse_single_line() {
        let sample = parse_frequency_info("Actual freq: 300 MHz").unwrap();
        assert_eq!(sample.actual, 300e6);
        assert_eq!(sample.idle, 0.0);
        assert_eq!(sample.max, 0.0);

        let sample = parse_frequency_info("Garbage line without colon").unwrap();
        assert_eq!(sample, FrequencySample::default());
    }

    #[test]
    fn test_keys_are_exact() {
        let sample = parse_frequency_info("actual freq: 300 MHz\n Actual freq: 400 MHz").unwrap();
        assert_eq!(sample.actual, 0.0);
    }

    #[test]
    fn test_malformed_known_key() {
        for content in [
            "Actual freq: fast MHz",
            "Actual freq: 300",
            "Max freq: 300 MHz extra",
            "Idle freq:",
            "Idle freq: 300.5 MHz",
        ] {
            let err = parse_frequency_info(content).unwrap_err();
            assert!(
                matches!(err, ExporterError::MalformedFrequency { .. }),
                "{:?} should be rejected, got {:?}",
                content,
                err
            );
        }

        // unknown keys are never parsed
        assert!(parse_frequency_info("Boost freq: lots").is_ok());
    }

    #[test]
    fn test_bucket_derivation() {
        let sample = FrequencySample {
            actual: 0.0,
            idle: 300e6,
            max: 1000e6,
        };
        let buckets = sample.buckets(50e6).unwrap();
        assert_eq!(buckets.len(), 14);
        assert_eq!(buckets[0], 300e6);
        assert_eq!(buckets[13], 950e6);
    }

    #[test]
    fn test_bucket_count_truncates() {
        let sample = FrequencySample {
            actual: 0.0,
            idle: 300e6,
            max: 420e6,
        };
        assert_eq!(sample.buckets(50e6).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_bucket_range() {
        for (idle, max) in [(1000e6, 300e6), (300e6, 300e6), (300e6, 320e6)] {
            let sample = FrequencySample { actual: 0.0, idle, max };
            let err = sample.buckets(50e6).unwrap_err();
            assert!(matches!(err, ExporterError::InvalidBuckets { .. }));
        }
    }

    #[test]
    fn test_oversized_bucket_range() {
        let sample = parse_frequency_info(
            "Idle freq: 300 MHz\nMax freq: 9000000000000000000 MHz\n",
        )
        .unwrap();
        let err = sample.buckets(50e6).unwrap_err();
        assert!(matches!(err, ExporterError::InvalidBuckets { .. }));

        let sample = FrequencySample {
            actual: 0.0,
            idle: 0.0,
            max: 50e6 * MAX_BUCKETS as f64,
        };
        assert_eq!(sample.buckets(50e6).unwrap().len(), MAX_BUCKETS);
    }

    #[test]
    fn test_read_frequency_info() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FREQUENCY_INFO.as_bytes()).unwrap();

        let sample = read_frequency_info(file.path()).unwrap();
        assert_eq!(sample.actual, 350e6);

        let missing = file.path().with_extension("missing");
        assert!(matches!(read_frequency_info(&missing), Err(ExporterError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_frequency_info_async() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FREQUENCY_INFO.as_bytes()).unwrap();

        let sample = read_frequency_info_async(file.path()).await.unwrap();
        assert_eq!(sample.max, 1000e6);
    }
}
