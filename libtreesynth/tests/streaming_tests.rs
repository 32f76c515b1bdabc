//! Window-by-window resynthesis through the public api

use libtreesynth::{
    create_rng, resynthesize_samples, resynthesize_with_report, similarity, LearnerConfig,
    Resynthesizer, SynthConfig, WindowPolicy, WindowReader,
};
use rand::Rng;

fn texture(len: usize) -> Vec<f32> {
    // seeded noise over a slow tone
    let mut rng = create_rng(7);
    (0..len)
        .map(|i| rng.gen_range(-1.0f32..1.0) * 0.3 + (i as f32 * 0.01).sin() * 0.5)
        .collect()
}

#[test]
fn test_default_config_resynthesizes_full_windows() {
    let samples = texture(8192 * 2);
    let output = resynthesize_samples(&samples, &SynthConfig::default()).unwrap();

    assert_eq!(output.len(), samples.len());
    assert!(output.iter().all(|s| s.is_finite()));
    assert_ne!(output, samples);
}

#[test]
fn test_resynthesis_keeps_spectral_character() {
    let samples = texture(8192 * 2);
    let config = SynthConfig {
        learner: LearnerConfig::default().with_seed(17),
        ..Default::default()
    };
    let output = resynthesize_samples(&samples, &config).unwrap();
    assert!(similarity(&samples, &output) > 0.8);
}

#[test]
fn test_report_counts_windows() {
    let samples = texture(1000);
    let config = SynthConfig {
        window_levels: 8,
        window_policy: WindowPolicy::Pad,
        learner: LearnerConfig::default().with_levels(1, 7),
        ..Default::default()
    };
    let (output, report) = resynthesize_with_report(&samples, &config).unwrap();

    assert_eq!(output.len(), 1000);
    assert_eq!(report.windows, 4);
    assert_eq!(report.samples_in, 1000);
    assert_eq!(report.samples_out, 1000);
    assert_eq!(report.dropped_samples, 0);
}

#[test]
fn test_manual_window_loop_matches_process() {
    let samples = texture(700);
    let config = SynthConfig {
        window_levels: 8,
        learner: LearnerConfig::default().with_levels(2, 7).with_seed(4),
        ..Default::default()
    };

    let whole = Resynthesizer::new(config.clone()).unwrap().process(&samples).unwrap();

    let mut resynth = Resynthesizer::new(config).unwrap();
    let mut reader = WindowReader::new(&samples, resynth.window_len());
    let mut window = vec![0.0f32; resynth.window_len()];
    let mut pieces = Vec::new();
    loop {
        let read = reader.read_window(&mut window);
        if read == 0 {
            break;
        }
        pieces.extend(resynth.process_window(&window[..read]).unwrap());
    }

    assert_eq!(whole, pieces);
}

#[test]
fn test_empty_input_produces_nothing() {
    let output = resynthesize_samples(&[], &SynthConfig::default()).unwrap();
    assert!(output.is_empty());
}

#[test]
fn test_invalid_config_fails_before_processing() {
    let config = SynthConfig {
        window_levels: 0,
        ..Default::default()
    };
    assert!(resynthesize_samples(&texture(64), &config).is_err());

    let config = SynthConfig {
        window_levels: 40,
        ..Default::default()
    };
    assert!(Resynthesizer::new(config).is_err());
}
