//! Precision weighting: the engine's attention mechanism.
//!
//! At round completion, competing prediction errors for the same subject
//! split a unit of relative confidence in proportion to how *small* their
//! errors were; each source's precision weight then moves halfway toward
//! its average confidence this round. The effect is a confirmation bias:
//! the source whose error is smallest gains weight, and a source weighted
//! `0.0` is fully ignored — it influences neither round completion nor
//! belief formation.

use std::collections::{BTreeMap, HashMap};
use umwelt_types::{Perception, PredictionError, Subject};

/// Precision weight for a source, defaulting to full trust.
#[must_use]
pub fn weight_of(weights: &HashMap<String, f64>, source: &str) -> f64 {
    weights.get(source).copied().unwrap_or(1.0)
}

/// Relative confidences of a competing set of prediction errors.
///
/// A single error gets `1.0`. Otherwise each error's raw confidence is
/// `1 - size`, normalized so the set sums to `1.0`; when every error is
/// maximal the set degenerates to equal shares.
pub fn relative_confidences(errors: &[&PredictionError]) -> Vec<f64> {
    if errors.len() == 1 {
        return vec![1.0];
    }
    let raws: Vec<f64> = errors.iter().map(|e| 1.0 - e.size).collect();
    let total: f64 = raws.iter().sum();
    if total > 0.0 {
        raws.iter().map(|raw| raw / total).collect()
    } else {
        let share = 1.0 / errors.len() as f64;
        vec![share; errors.len()]
    }
}

/// Completion step: updated precision weights for every source that
/// contributed a prediction error this round.
///
/// Per source, relative confidences are averaged across all subjects it
/// contributed to; the new weight is the mean of the old weight and that
/// average. Sources absent from the round are not in the result.
pub fn updated_precision_weights(
    perceptions: &[Perception],
    weights: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    let mut by_subject: BTreeMap<&Subject, Vec<&PredictionError>> = BTreeMap::new();
    for perception in perceptions {
        if let Perception::Error(error) = perception {
            by_subject.entry(error.subject()).or_default().push(error);
        }
    }

    let mut confidences: HashMap<&str, Vec<f64>> = HashMap::new();
    for competing in by_subject.values() {
        let shares = relative_confidences(competing);
        for (error, share) in competing.iter().zip(shares) {
            confidences.entry(error.source()).or_default().push(share);
        }
    }

    confidences
        .into_iter()
        .map(|(source, shares)| {
            let average = shares.iter().sum::<f64>() / shares.len() as f64;
            let updated = (weight_of(weights, source) + average) / 2.0;
            (source.to_string(), updated.clamp(0.0, 1.0))
        })
        .collect()
}

/// Completion step: keep the highest-gain perception per subject.
///
/// A prediction has gain `1.0`; a prediction error's gain is its source's
/// precision weight. Ties keep the first occurrence; surviving
/// perceptions retain their original order.
pub fn resolve_competition(
    perceptions: Vec<Perception>,
    weights: &HashMap<String, f64>,
) -> Vec<Perception> {
    let mut best: HashMap<Subject, (usize, f64)> = HashMap::new();
    for (index, perception) in perceptions.iter().enumerate() {
        let gain = match perception {
            Perception::Prediction(_) => 1.0,
            Perception::Error(error) => weight_of(weights, error.source()),
        };
        match best.get(perception.subject()) {
            Some((_, incumbent)) if *incumbent >= gain => {}
            _ => {
                best.insert(perception.subject().clone(), (index, gain));
            }
        }
    }

    perceptions
        .into_iter()
        .enumerate()
        .filter(|(index, perception)| best.get(perception.subject()).is_some_and(|(i, _)| i == index))
        .map(|(_, perception)| perception)
        .collect()
}
