#[cfg(test)]
mod learner_tests {
    use libtreesynth::core::{create_rng, SynthError};
    use libtreesynth::learn::{LearnerConfig, MatchPolicy, TreeSynthesizer};
    use libtreesynth::tree::CoefficientTree;
    use libtreesynth::wavelet::{FilterChoice, Wavelet};

    fn texture(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32;
                (t * 0.05).sin() * 0.4 + (t * 0.37).sin() * 0.2 + (t * 1.3).cos() * 0.1
            })
            .collect()
    }

    fn source_tree(levels: usize, filter: FilterChoice) -> CoefficientTree {
        let mut tree = CoefficientTree::from_samples(&texture(1 << levels)).unwrap();
        tree.forward(&Wavelet::from_choice(filter).unwrap()).unwrap();
        tree
    }

    #[test]
    fn test_empty_sweep_preserves_source() {
        let source = source_tree(8, FilterChoice::default());
        let config = LearnerConfig {
            randomize_root_order: false,
            ..LearnerConfig::default().with_levels(8, 7)
        };
        let output = TreeSynthesizer::new(config).unwrap().synthesize(&source).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_empty_sweep_may_only_flip_root() {
        let source = source_tree(6, FilterChoice::Daub4);
        let synth = TreeSynthesizer::new(LearnerConfig::default().with_levels(6, 5)).unwrap();

        let mut flipped = 0;
        for seed in 0..64 {
            let mut rng = create_rng(seed);
            let output = synth.synthesize_with_rng(&source, &mut rng).unwrap();
            assert_eq!(&output.values()[2..], &source.values()[2..]);

            let root = &output.values()[..2];
            if root == &source.values()[..2] {
                continue;
            }
            assert_eq!(root, &[source.values()[1], source.values()[0]]);
            flipped += 1;
        }
        assert!(flipped > 0 && flipped < 64);
    }

    #[test]
    fn test_exact_policy_reproduces_audio() {
        let filter = FilterChoice::FilterBank { taps: 12 };
        let wavelet = Wavelet::from_choice(filter).unwrap();
        let original = texture(1024);

        let mut source = CoefficientTree::from_samples(&original).unwrap();
        source.forward(&wavelet).unwrap();

        let config = LearnerConfig::exact().with_levels(1, 9);
        let mut output = TreeSynthesizer::new(config).unwrap().synthesize(&source).unwrap();
        assert_eq!(output, source);

        output.inverse(&wavelet).unwrap();
        for (a, b) in original.iter().zip(output.values()) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_invalid_level_ranges() {
        let source = source_tree(8, FilterChoice::Daub4);
        let before = source.clone();

        for (start, stop) in [(5, 3), (-1, 4), (2, 8), (9, 7), (0, -2)] {
            let config = LearnerConfig::default().with_levels(start, stop);
            let result = TreeSynthesizer::new(config).unwrap().synthesize(&source);
            assert_eq!(
                result,
                Err(SynthError::InvalidLevelRange {
                    start,
                    stop,
                    levels: 8
                })
            );
        }
        assert_eq!(source, before);
    }

    #[test]
    fn test_single_coefficient_tree_is_empty() {
        let source = CoefficientTree::build(vec![0.5]).unwrap();
        let result = TreeSynthesizer::new(LearnerConfig::default())
            .unwrap()
            .synthesize(&source);
        assert_eq!(result, Err(SynthError::EmptySourceTree));
    }

    #[test]
    fn test_learned_values_come_from_same_level() {
        let source = source_tree(9, FilterChoice::default());
        for (factor, sampling, ancestors_first) in [
            (1.0, 1.0, true),
            (0.0, 0.0, true),
            (0.1, 0.5, false),
            (0.0, 0.25, false),
        ] {
            let config = LearnerConfig {
                candidate_factor: factor,
                sampling_percentage: sampling,
                ancestors_first,
                randomize_ties: true,
                ..LearnerConfig::default().with_levels(1, 8).with_seed(9)
            };
            let output = TreeSynthesizer::new(config).unwrap().synthesize(&source).unwrap();

            for level in 1..9 {
                let src = source.level(level).unwrap();
                for value in output.level(level).unwrap() {
                    assert!(src.contains(value), "level {} value {}", level, value);
                }
            }
        }
    }

    #[test]
    fn test_levels_outside_sweep_are_copied() {
        let source = source_tree(9, FilterChoice::default());
        let config = LearnerConfig::default().with_levels(3, 5).with_seed(1);
        let output = TreeSynthesizer::new(config).unwrap().synthesize(&source).unwrap();

        for level in [1, 2, 6, 7, 8] {
            assert_eq!(output.level(level), source.level(level));
        }
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let source = source_tree(8, FilterChoice::Daub4);
        let config = LearnerConfig {
            sampling_percentage: 0.5,
            randomize_ties: true,
            ..LearnerConfig::default().with_levels(1, 7)
        };

        let run = |seed| {
            TreeSynthesizer::new(config.clone().with_seed(seed))
                .unwrap()
                .synthesize(&source)
                .unwrap()
        };
        assert_eq!(run(5), run(5));
        assert!((0..8).any(|seed| run(seed) != run(5)));
    }

    #[test]
    fn test_exact_policy_with_partial_sampling_still_fills_level() {
        let source = source_tree(7, FilterChoice::default());
        let config = LearnerConfig {
            sampling_percentage: 0.5,
            match_policy: MatchPolicy::ExactPosition,
            randomize_root_order: false,
            ..LearnerConfig::default().with_levels(1, 6)
        };
        let output = TreeSynthesizer::new(config).unwrap().synthesize(&source).unwrap();
        assert_eq!(output.len(), source.len());
        assert_eq!(output.level(0), source.level(0));
    }

    #[test]
    fn test_rejects_out_of_domain_config() {
        let config = LearnerConfig {
            sampling_percentage: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            TreeSynthesizer::new(config),
            Err(SynthError::InvalidParameter { name: "sampling_percentage", .. })
        ));
    }
}
