#[cfg(test)]
mod filter_tests {
    use libtreesynth::core::SynthError;
    use libtreesynth::wavelet::{FilterBank, SUPPORTED_TAPS};

    #[test]
    fn test_unsupported_tap_counts() {
        for taps in [0, 1, 2, 3, 5, 6, 7, 8, 16, 20] {
            assert_eq!(
                FilterBank::new(taps),
                Err(SynthError::UnsupportedFilterLength { taps })
            );
        }
    }

    #[test]
    fn test_quadrature_mirror_relation() {
        for taps in SUPPORTED_TAPS {
            let bank = FilterBank::new(taps).unwrap();
            let forward = bank.forward_taps();
            let reverse = bank.reverse_taps();
            assert_eq!(forward.len(), taps);
            assert_eq!(reverse.len(), taps);

            // reverse[taps+1-k] == (-1)^k * forward[k], k counted from 1
            for k in 1..=taps {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                assert_eq!(reverse[taps - k], sign * forward[k - 1], "taps={} k={}", taps, k);
            }
        }
    }

    #[test]
    fn test_taps_are_unit_norm() {
        for taps in SUPPORTED_TAPS {
            let bank = FilterBank::new(taps).unwrap();
            let norm: f32 = bank.forward_taps().iter().map(|c| c * c).sum();
            assert!((norm - 1.0).abs() < 1e-5, "taps={} norm={}", taps, norm);
        }
    }
}
