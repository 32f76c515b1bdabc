use super::config::{LearnerConfig, MatchPolicy};
use crate::core::rng::create_rng;
use crate::core::{SynthError, SynthResult};
use crate::tree::{CoefficientTree, NodeRef};
use rand::Rng;
use tracing::debug;

/// Committed left neighbours compared as predecessor context
pub const PREDECESSOR_WINDOW: usize = 4;

/// Learns correspondences across a source tree and writes a new tree
#[derive(Debug, Clone)]
pub struct TreeSynthesizer {
    config: LearnerConfig,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    offset: usize,
    primary: f32,
    total: f32,
}

/// Context of one target node, read from the output tree
struct Context {
    ancestors: Vec<f32>,
    predecessors: Vec<f32>,
}

impl TreeSynthesizer {
    pub fn new(config: LearnerConfig) -> SynthResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Synthesize with the RNG seeded from the config
    pub fn synthesize(&self, source: &CoefficientTree) -> SynthResult<CoefficientTree> {
        let mut rng = create_rng(self.config.seed);
        self.synthesize_with_rng(source, &mut rng)
    }

    /// Build a new tree of the same shape as `source`.
    ///
    /// The returned tree is a fresh buffer. On error nothing is produced and
    /// `source` is never touched.
    pub fn synthesize_with_rng<R: Rng + ?Sized>(
        &self,
        source: &CoefficientTree,
        rng: &mut R,
    ) -> SynthResult<CoefficientTree> {
        let levels = source.levels();
        if levels == 0 {
            return Err(SynthError::EmptySourceTree);
        }
        let sweep = self.config.sweep(levels)?;

        // Levels outside the sweep are carried through from the source.
        let mut output = source.clone();
        self.seed_root(&mut output, rng);

        if !sweep.is_empty() {
            let mut scratch = Vec::new();
            for level in sweep.first..=sweep.last {
                self.learn_level(source, &mut output, level, &mut scratch, rng);
            }
        }

        Ok(output)
    }

    /// Level 0 anchors the synthesis and is never learned
    fn seed_root<R: Rng + ?Sized>(&self, output: &mut CoefficientTree, rng: &mut R) {
        if self.config.randomize_root_order && rng.gen_bool(0.5) {
            output.values_mut().swap(0, 1);
            debug!("root coefficients flipped");
        }
    }

    fn learn_level<R: Rng + ?Sized>(
        &self,
        source: &CoefficientTree,
        output: &mut CoefficientTree,
        level: usize,
        scratch: &mut Vec<Candidate>,
        rng: &mut R,
    ) {
        let n = 1usize << level;
        let pool = self.candidate_pool(n, rng);
        let keep = self.shortlist_len(n, pool.len());

        for offset in 0..n {
            let target = NodeRef::new(level, offset);
            let chosen = match self.config.match_policy {
                MatchPolicy::ExactPosition if pool.binary_search(&offset).is_ok() => offset,
                _ => {
                    let context = Self::context(output, target);
                    self.best_match(source, level, &context, &pool, keep, scratch, rng)
                }
            };
            output.set(target, source.get(NodeRef::new(level, chosen)));
        }

        debug!(level, nodes = n, pool = pool.len(), keep, "level learned");
    }

    /// Source offsets eligible at one level, ascending
    fn candidate_pool<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<usize> {
        let p = self.config.sampling_percentage;
        if p >= 1.0 {
            return (0..n).collect();
        }
        let size = ((p * n as f32).ceil() as usize).clamp(1, n);
        let mut pool = rand::seq::index::sample(rng, n, size).into_vec();
        pool.sort_unstable();
        pool
    }

    /// Candidates kept after ranking by the primary distance
    fn shortlist_len(&self, n: usize, pool_len: usize) -> usize {
        if self.config.candidate_factor == 0.0 {
            return pool_len;
        }
        ((self.config.candidate_factor * n as f32).floor() as usize).clamp(1, pool_len)
    }

    fn context(output: &CoefficientTree, target: NodeRef) -> Context {
        let ancestors = target.ancestors().map(|node| output.get(node)).collect();
        let committed = target.offset.min(PREDECESSOR_WINDOW);
        let predecessors = (1..=committed)
            .map(|back| output.get(NodeRef::new(target.level, target.offset - back)))
            .collect();
        Context {
            ancestors,
            predecessors,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn best_match<R: Rng + ?Sized>(
        &self,
        source: &CoefficientTree,
        level: usize,
        context: &Context,
        pool: &[usize],
        keep: usize,
        scored: &mut Vec<Candidate>,
        rng: &mut R,
    ) -> usize {
        scored.clear();
        for &offset in pool {
            let ancestor = ancestor_distance(source, level, offset, &context.ancestors);
            let predecessor = predecessor_distance(source, level, offset, &context.predecessors);
            let primary = if self.config.ancestors_first {
                ancestor
            } else {
                predecessor
            };
            scored.push(Candidate {
                offset,
                primary,
                total: ancestor + predecessor,
            });
        }

        if keep < scored.len() {
            // stable, so equal primaries keep pool order
            scored.sort_by(|a, b| a.primary.total_cmp(&b.primary));
            scored.truncate(keep);
        }

        let best = scored
            .iter()
            .map(|c| c.total)
            .fold(f32::INFINITY, f32::min);
        let pick = if self.config.randomize_ties {
            // the tolerance band only widens the set drawn from
            let threshold = if self.config.match_tolerance > 0.0 {
                let mean = scored.iter().map(|c| c.total).sum::<f32>() / scored.len() as f32;
                best + self.config.match_tolerance * mean
            } else {
                best
            };
            let mut tied = scored.iter().filter(|c| c.total <= threshold);
            match tied.clone().count() {
                0 => None,
                count => tied.nth(rng.gen_range(0..count)),
            }
        } else {
            scored.iter().find(|c| c.total == best)
        };

        // NaN coefficients never compare equal; fall back to the first ranked
        pick.or(scored.first()).map(|c| c.offset).unwrap_or(0)
    }
}

fn ancestor_distance(source: &CoefficientTree, level: usize, offset: usize, context: &[f32]) -> f32 {
    NodeRef::new(level, offset)
        .ancestors()
        .zip(context)
        .map(|(node, &v)| {
            let d = source.get(node) - v;
            d * d
        })
        .sum()
}

/// Left neighbours wrap around the level, the source is fully known
fn predecessor_distance(
    source: &CoefficientTree,
    level: usize,
    offset: usize,
    context: &[f32],
) -> f32 {
    let n = 1usize << level;
    context
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let back = (i + 1) % n;
            let d = source.get(NodeRef::new(level, (offset + n - back) % n)) - v;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_tree(levels: usize) -> CoefficientTree {
        let n = 1usize << levels;
        CoefficientTree::build((0..n).map(|i| i as f32 * 0.25 - 3.0).collect()).unwrap()
    }

    /// 16-coefficient tree with chosen level-2 and level-3 values
    fn crafted_tree(level2: [f32; 4], level3: [f32; 8]) -> CoefficientTree {
        let mut values = vec![0.0f32; 16];
        values[4..8].copy_from_slice(&level2);
        values[8..16].copy_from_slice(&level3);
        CoefficientTree::build(values).unwrap()
    }

    fn pick(config: LearnerConfig, source: &CoefficientTree, context: &Context) -> usize {
        let synth = TreeSynthesizer::new(config).unwrap();
        let pool: Vec<usize> = (0..8).collect();
        let keep = synth.shortlist_len(8, pool.len());
        let mut scratch = Vec::new();
        let mut rng = create_rng(0);
        synth.best_match(source, 3, context, &pool, keep, &mut scratch, &mut rng)
    }

    #[test]
    fn test_fixed_order_picks_strict_minimum() {
        // predecessor distances: [100, 0.09, 100, 100, 100, 100, 0, 100]
        let source = crafted_tree(
            [0.0; 4],
            [0.3, 10.0, 10.0, 10.0, 10.0, 0.0, 10.0, 10.0],
        );
        let context = Context {
            ancestors: vec![0.0; 3],
            predecessors: vec![0.0],
        };
        let config = LearnerConfig {
            randomize_ties: false,
            ..LearnerConfig::default()
        };
        assert!(config.match_tolerance > 0.0);
        assert_eq!(pick(config, &source, &context), 6);
    }

    #[test]
    fn test_primary_ordering_decides_shortlist() {
        // offsets 6 and 7 match the ancestors, offset 2 matches the predecessor
        let source = crafted_tree(
            [5.0, 5.0, 5.0, 1.0],
            [3.0, 0.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0],
        );
        let context = Context {
            ancestors: vec![1.0, 0.0, 0.0],
            predecessors: vec![0.0],
        };
        let base = LearnerConfig {
            randomize_ties: false,
            match_tolerance: 0.0,
            candidate_factor: 0.125,
            ..LearnerConfig::default()
        };

        let ancestors_first = LearnerConfig {
            ancestors_first: true,
            ..base.clone()
        };
        assert_eq!(pick(ancestors_first, &source, &context), 6);

        let predecessors_first = LearnerConfig {
            ancestors_first: false,
            ..base.clone()
        };
        assert_eq!(pick(predecessors_first, &source, &context), 2);

        // without a shortlist the combined distance wins either way
        let whole_pool = LearnerConfig {
            ancestors_first: false,
            candidate_factor: 0.0,
            ..base
        };
        assert_eq!(pick(whole_pool, &source, &context), 6);
    }

    #[test]
    fn test_deterministic_choice_copies_distinct_source() {
        let source = ramp_tree(6);
        let config = LearnerConfig {
            randomize_root_order: false,
            randomize_ties: false,
            match_tolerance: 0.0,
            ..LearnerConfig::default().with_levels(1, 5)
        };
        let output = TreeSynthesizer::new(config).unwrap().synthesize(&source).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_shortlist_len_fallback() {
        let mut config = LearnerConfig::default();
        config.candidate_factor = 0.0;
        let synth = TreeSynthesizer::new(config).unwrap();
        assert_eq!(synth.shortlist_len(64, 64), 64);

        let mut config = LearnerConfig::default();
        config.candidate_factor = 0.001;
        let synth = TreeSynthesizer::new(config).unwrap();
        assert_eq!(synth.shortlist_len(64, 64), 1);
    }

    #[test]
    fn test_candidate_pool_size() {
        let mut config = LearnerConfig::default();
        config.sampling_percentage = 0.25;
        let synth = TreeSynthesizer::new(config).unwrap();
        let mut rng = create_rng(5);
        let pool = synth.candidate_pool(64, &mut rng);
        assert_eq!(pool.len(), 16);
        assert!(pool.windows(2).all(|w| w[0] < w[1]));
        assert!(pool.iter().all(|&i| i < 64));
    }

    #[test]
    fn test_context_reads_committed_nodes_only() {
        let tree = ramp_tree(4);
        let context = TreeSynthesizer::context(&tree, NodeRef::new(3, 2));
        assert_eq!(context.ancestors.len(), 3);
        assert_eq!(context.predecessors.len(), 2);
        assert_eq!(context.predecessors[0], tree.get(NodeRef::new(3, 1)));
    }

    #[test]
    fn test_source_position_has_zero_distance() {
        let tree = ramp_tree(5);
        let target = NodeRef::new(4, 9);
        let context = TreeSynthesizer::context(&tree, target);
        assert_eq!(ancestor_distance(&tree, 4, 9, &context.ancestors), 0.0);
        assert_eq!(predecessor_distance(&tree, 4, 9, &context.predecessors), 0.0);
    }
}
