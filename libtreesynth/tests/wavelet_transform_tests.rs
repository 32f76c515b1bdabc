#[cfg(test)]
mod transform_tests {
    use libtreesynth::core::SynthError;
    use libtreesynth::wavelet::{Direction, FilterChoice, Wavelet};

    fn all_wavelets() -> Vec<Wavelet> {
        [
            FilterChoice::Daub4,
            FilterChoice::FilterBank { taps: 4 },
            FilterChoice::FilterBank { taps: 10 },
            FilterChoice::FilterBank { taps: 12 },
        ]
        .into_iter()
        .map(|choice| Wavelet::from_choice(choice).unwrap())
        .collect()
    }

    fn signal(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32;
                (t * 0.013).sin() * 0.6 + (t * 0.41).cos() * 0.3 + ((i * 7919) % 13) as f32 * 0.01
            })
            .collect()
    }

    fn assert_close(a: &[f32], b: &[f32], tol: f32) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            let scale = x.abs().max(1.0);
            assert!((x - y).abs() <= tol * scale, "index {}: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn test_round_trip_all_filters() {
        for wavelet in all_wavelets() {
            let mut n = 2;
            while n <= 4096 {
                let original = signal(n);
                let mut data = original.clone();
                wavelet.forward(&mut data).unwrap();
                wavelet.inverse(&mut data).unwrap();
                assert_close(&original, &data, 1e-4);
                n <<= 1;
            }
        }
    }

    #[test]
    fn test_short_buffers_are_no_ops() {
        for wavelet in all_wavelets() {
            let mut empty: [f32; 0] = [];
            wavelet.forward(&mut empty).unwrap();
            wavelet.inverse(&mut empty).unwrap();

            let mut one = [0.25f32];
            wavelet.forward(&mut one).unwrap();
            assert_eq!(one, [0.25]);
            wavelet.inverse(&mut one).unwrap();
            assert_eq!(one, [0.25]);
        }
    }

    #[test]
    fn test_daub4_matches_four_tap_bank() {
        let daub4 = Wavelet::from_choice(FilterChoice::Daub4).unwrap();
        let bank4 = Wavelet::from_choice(FilterChoice::FilterBank { taps: 4 }).unwrap();

        for n in [4, 16, 256] {
            let mut a = signal(n);
            let mut b = a.clone();
            daub4.forward(&mut a).unwrap();
            bank4.forward(&mut b).unwrap();
            assert_close(&a, &b, 1e-5);
        }
    }

    #[test]
    fn test_constant_signal_has_no_detail() {
        for wavelet in all_wavelets() {
            let n = 512;
            let mut data = vec![0.5f32; n];
            wavelet.forward(&mut data).unwrap();

            // everything but the scaling coefficient vanishes
            for (i, &c) in data.iter().enumerate().skip(1) {
                assert!(c.abs() < 1e-4, "taps={} index {} = {}", wavelet.taps(), i, c);
            }
            // sqrt(2) gain per level
            assert!((data[0] - 0.5 * (n as f32).sqrt()).abs() < 1e-2);
        }
    }

    #[test]
    fn test_energy_is_preserved() {
        for wavelet in all_wavelets() {
            let original = signal(1024);
            let mut data = original.clone();
            wavelet.forward(&mut data).unwrap();

            let before: f32 = original.iter().map(|x| x * x).sum();
            let after: f32 = data.iter().map(|x| x * x).sum();
            assert!((before - after).abs() / before < 1e-4);
        }
    }

    #[test]
    fn test_single_step_layout() {
        // one step leaves smooth coefficients first, details second
        let wavelet = Wavelet::from_choice(FilterChoice::FilterBank { taps: 10 }).unwrap();
        let mut data = vec![1.0f32; 16];
        wavelet.step(&mut data, Direction::Forward).unwrap();
        for &c in &data[..8] {
            assert!((c - std::f32::consts::SQRT_2).abs() < 1e-4);
        }
        for &c in &data[8..] {
            assert!(c.abs() < 1e-4);
        }
        wavelet.step(&mut data, Direction::Inverse).unwrap();
        assert_close(&data, &[1.0; 16], 1e-5);
    }

    #[test]
    fn test_non_power_of_two_is_rejected_untouched() {
        for wavelet in all_wavelets() {
            let original = signal(12);
            let mut data = original.clone();
            assert_eq!(
                wavelet.forward(&mut data),
                Err(SynthError::InvalidBufferSize { len: 12 })
            );
            assert_eq!(data, original);
        }
    }
}
