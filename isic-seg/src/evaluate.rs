//! Dataset-level evaluation of predicted masks against ground truth.

use burn::tensor::backend::Backend;
use rayon::prelude::*;

use crate::{
    config::{DecodePolicy, EvaluationConfig},
    discovery::{discover_mask_pairs, MaskPair},
    error::{ErrorKind, IsicError, IsicResult},
    mask::BinaryMask,
    metrics::{ConfusionCounts, MetricSet, MetricsAggregator},
    report::{EvaluationReport, PairEvaluation},
};

/// Running state of one worker: the aggregate plus what the report lists.
#[derive(Debug, Default)]
struct Partial {
    aggregator: MetricsAggregator,
    skipped: Vec<String>,
    pairs: Vec<PairEvaluation>,
}

impl Partial {
    fn merge(mut self, other: Self) -> Self {
        self.aggregator = self.aggregator.merge(other.aggregator);
        self.skipped.extend(other.skipped);
        self.pairs.extend(other.pairs);
        self
    }
}

/// Compares prediction masks with ground-truth masks on a Burn backend.
#[derive(Debug, Clone)]
pub struct Evaluator<B: Backend> {
    config: EvaluationConfig,
    device: B::Device,
}

impl<B: Backend> Evaluator<B> {
    /// Creates an evaluator after validating `config`.
    pub fn new(config: EvaluationConfig, device: B::Device) -> IsicResult<Self> {
        config.validate()?;
        Ok(Self { config, device })
    }

    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Finds the mask pairs in the configured input directory.
    pub fn discover(&self) -> IsicResult<Vec<MaskPair>> {
        discover_mask_pairs(
            &self.config.input_dir,
            &self.config.prediction_suffix,
            &self.config.ground_truth_suffix,
        )
    }

    /// Discovers and evaluates every pair in the configured input directory.
    pub fn run(&self) -> IsicResult<EvaluationReport> {
        let pairs = self.discover()?;
        self.evaluate(&pairs)
    }

    /// Loads one pair and scores it. Errors name the pair's stem.
    pub fn evaluate_pair(&self, pair: &MaskPair) -> IsicResult<PairEvaluation> {
        self.score(pair).map_err(|err| err.in_pair(&pair.stem))
    }

    fn score(&self, pair: &MaskPair) -> IsicResult<PairEvaluation> {
        let threshold = self.config.threshold;
        let prediction = BinaryMask::<B>::open(&pair.prediction, threshold, &self.device)?;
        let ground_truth = BinaryMask::<B>::open(&pair.ground_truth, threshold, &self.device)?;
        let counts = ConfusionCounts::from_masks(&prediction, &ground_truth)?;
        let metrics = MetricSet::from_counts(&counts, &self.config.dice_mode);

        tracing::debug!(
            stem = %pair.stem,
            jaccard = metrics.jaccard,
            dice = metrics.dice,
            accuracy = metrics.pixel_accuracy,
            "evaluated pair"
        );

        Ok(PairEvaluation {
            stem: pair.stem.clone(),
            counts,
            metrics,
        })
    }

    /// Folds one pair outcome into `partial`, applying the decode policy.
    fn absorb(
        &self,
        mut partial: Partial,
        pair: &MaskPair,
        outcome: IsicResult<PairEvaluation>,
    ) -> IsicResult<Partial> {
        match outcome {
            Ok(evaluation) => {
                partial
                    .aggregator
                    .update(&evaluation.metrics, &evaluation.counts);
                if self.config.keep_pair_results {
                    partial.pairs.push(evaluation);
                }
            }
            Err(err)
                if err.kind() == ErrorKind::Decode
                    && self.config.decode_policy == DecodePolicy::SkipAndWarn =>
            {
                let cause = match &err {
                    IsicError::Pair { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                tracing::warn!(stem = %pair.stem, "skipping mask pair: {cause}");
                partial.skipped.push(pair.stem.clone());
            }
            Err(err) => return Err(err),
        }
        Ok(partial)
    }

    /// Evaluates `pairs` and averages their metrics.
    ///
    /// With `num_workers > 1` the pairs are spread over a dedicated thread
    /// pool and the partial sums are merged at the end.
    pub fn evaluate(&self, pairs: &[MaskPair]) -> IsicResult<EvaluationReport> {
        let partial = if self.config.num_workers > 1 {
            self.evaluate_parallel(pairs)?
        } else {
            pairs.iter().try_fold(Partial::default(), |partial, pair| {
                self.absorb(partial, pair, self.evaluate_pair(pair))
            })?
        };

        let Partial {
            aggregator,
            mut skipped,
            mut pairs,
        } = partial;

        let Some(mean) = aggregator.mean() else {
            return Err(IsicError::NoPairsEvaluated {
                skipped: skipped.len(),
            });
        };
        skipped.sort();
        pairs.sort_by(|a, b| a.stem.cmp(&b.stem));

        tracing::info!(
            evaluated = aggregator.count(),
            skipped = skipped.len(),
            "evaluation finished"
        );

        Ok(EvaluationReport {
            mean,
            dice_mode: self.config.dice_mode.clone(),
            evaluated: aggregator.count(),
            totals: aggregator.total_counts(),
            skipped,
            pairs,
        })
    }

    fn evaluate_parallel(&self, pairs: &[MaskPair]) -> IsicResult<Partial> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_workers)
            .build()
            .map_err(|err| IsicError::InvalidConfiguration {
                reason: format!("Failed to start {} workers: {err}", self.config.num_workers),
            })?;

        pool.install(|| {
            pairs
                .par_iter()
                .map(|pair| (pair, self.evaluate_pair(pair)))
                .try_fold(Partial::default, |partial, (pair, outcome)| {
                    self.absorb(partial, pair, outcome)
                })
                .try_reduce(Partial::default, |a, b| Ok(a.merge(b)))
        })
    }
}
