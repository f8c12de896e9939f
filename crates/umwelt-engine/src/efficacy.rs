//! Efficacy learning and course-of-action construction.
//!
//! Efficacies score how well a CoA shape has correlated with its
//! conjecture being satisfied afterwards, separately for CoAs executed
//! while the conjecture was already satisfied ("keep it true") and while
//! it was not ("make it true"). Selection turns the scores of the tried
//! shapes — plus one untried candidate enumerated positionally from the
//! intention domain — into a probability distribution and draws from it.

use umwelt_types::{Belief, Efficacy, Round};

/// Recomputes an efficacy's degree against the current round history.
///
/// `sat_now` is the satisfaction of the subject's fresh belief. Rounds
/// count when they executed the efficacy's CoA shape while the subject's
/// satisfaction matched the efficacy's partition; each counted round
/// contributes its recency, credited when the conjecture is satisfied
/// now and debited when it is not. The new degree is the mean of the
/// normalized contribution and the old degree, clamped to `[0, 1]`.
pub fn recompute_degree(efficacy: &mut Efficacy, sat_now: bool, rounds: &[Round]) {
    let n = rounds.len();
    if n == 0 {
        return;
    }

    let matching: Vec<usize> = rounds
        .iter()
        .enumerate()
        .filter(|(_, round)| {
            round
                .courses_of_action
                .iter()
                .any(|coa| coa.has_shape(&efficacy.subject, &efficacy.intention_names))
                && round
                    .belief(&efficacy.subject)
                    .map_or(false, Belief::satisfies_conjecture)
                    == efficacy.when_already_satisfied
        })
        .map(|(index, _)| index)
        .collect();

    let normalized = if matching.is_empty() {
        0.0
    } else {
        let count = matching.len() as f64;
        let closeness_sum: f64 = matching.iter().map(|&i| (n - i) as f64 / count).sum();
        let signed = if sat_now { closeness_sum } else { -closeness_sum };
        let max = (n * (n + 1)) as f64 / 2.0 / n as f64;
        signed / max
    };

    efficacy.degree = ((normalized + efficacy.degree) / 2.0).clamp(0.0, 1.0);
}

/// Expands a CoA index into an intention-name sequence.
///
/// The index is read as a number in base `|domain|`; its digit sequence
/// picks intention names in order. Consecutive repeats of a
/// non-repeatable intention collapse. A single-intention domain
/// degenerates to that one intention for every index.
pub fn expand_course(
    index: u64,
    domain: &[String],
    is_repeatable: impl Fn(&str) -> bool,
) -> Vec<String> {
    if domain.is_empty() {
        return Vec::new();
    }
    if domain.len() == 1 {
        return vec![domain[0].clone()];
    }

    let base = domain.len() as u64;
    let mut digits = Vec::new();
    let mut remaining = index;
    loop {
        digits.push((remaining % base) as usize);
        remaining /= base;
        if remaining == 0 {
            break;
        }
    }
    digits.reverse();

    let mut names: Vec<String> = Vec::with_capacity(digits.len());
    for digit in digits {
        let name = &domain[digit];
        if names.last().is_some_and(|prev| prev == name) && !is_repeatable(name) {
            continue;
        }
        names.push(name.clone());
    }
    names
}

/// Draws one candidate from a degree-weighted distribution.
///
/// Degrees are normalized into a probability distribution (uniform when
/// they sum to zero); the winner is the first candidate whose cumulative
/// probability exceeds the draw.
#[must_use]
pub fn pick_candidate(degrees: &[f64], draw: f64) -> usize {
    debug_assert!(!degrees.is_empty());
    let total: f64 = degrees.iter().sum();
    let mut cumulative = 0.0;
    for (index, degree) in degrees.iter().enumerate() {
        cumulative += if total > 0.0 {
            degree / total
        } else {
            1.0 / degrees.len() as f64
        };
        if cumulative > draw {
            return index;
        }
    }
    degrees.len() - 1
}

/// The hypothetical degree of an untried candidate: the average of the
/// tried degrees, or full confidence when nothing was tried.
#[must_use]
pub fn hypothetical_degree(tried: &[Efficacy]) -> f64 {
    if tried.is_empty() {
        1.0
    } else {
        tried.iter().map(|e| e.degree).sum::<f64>() / tried.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use umwelt_types::{ConjectureActivation, CourseOfAction, Subject};

    fn domain(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn subject() -> Subject {
        Subject::new("reach_food", "bowl")
    }

    /// A completed round that executed the given CoA shape with the given
    /// recorded satisfaction for the subject.
    fn round_with(names: &[&str], satisfied: bool) -> Round {
        let mut round = Round::new(0);
        round.courses_of_action.push(CourseOfAction {
            activation: ConjectureActivation::opinion(subject()),
            intention_names: domain(names),
        });
        round.beliefs.push(Belief {
            source: "feeder".into(),
            subject: subject(),
            goal: None,
            values: satisfied.then(BTreeMap::new),
        });
        round
    }

    // ── expand_course ────────────────────────────────────────────

    #[test]
    fn expansion_enumerates_digit_sequences() {
        let d = domain(&["turn", "forward"]);
        let all = |_: &str| true;
        assert_eq!(expand_course(0, &d, all), ["turn"]);
        assert_eq!(expand_course(1, &d, all), ["forward"]);
        assert_eq!(expand_course(2, &d, all), ["forward", "turn"]);
        assert_eq!(expand_course(3, &d, all), ["forward", "forward"]);
        assert_eq!(expand_course(4, &d, all), ["forward", "turn", "turn"]);
    }

    #[test]
    fn expansion_collapses_consecutive_non_repeatable() {
        let d = domain(&["say", "move"]);
        let none = |_: &str| false;
        // index 3 → digits [1, 1] → consecutive "move" collapses.
        assert_eq!(expand_course(3, &d, none), ["move"]);
        // Non-consecutive repeats survive.
        let all = |_: &str| true;
        assert_eq!(expand_course(3, &d, all), ["move", "move"]);
    }

    #[test]
    fn single_intention_domain_degenerates() {
        let d = domain(&["greet"]);
        for index in [0, 1, 17] {
            assert_eq!(expand_course(index, &d, |_| true), ["greet"]);
        }
    }

    #[test]
    fn empty_domain_expands_to_nothing() {
        assert!(expand_course(5, &[], |_| true).is_empty());
    }

    // ── pick_candidate ───────────────────────────────────────────

    #[test]
    fn pick_follows_cumulative_thresholds() {
        let degrees = [0.5, 0.3, 0.2];
        assert_eq!(pick_candidate(&degrees, 0.0), 0);
        assert_eq!(pick_candidate(&degrees, 0.49), 0);
        assert_eq!(pick_candidate(&degrees, 0.5), 1);
        assert_eq!(pick_candidate(&degrees, 0.79), 1);
        assert_eq!(pick_candidate(&degrees, 0.8), 2);
        assert_eq!(pick_candidate(&degrees, 0.999), 2);
    }

    #[test]
    fn zero_degrees_fall_back_to_uniform() {
        let degrees = [0.0, 0.0];
        assert_eq!(pick_candidate(&degrees, 0.2), 0);
        assert_eq!(pick_candidate(&degrees, 0.7), 1);
    }

    #[test]
    fn zero_degree_candidate_is_skipped() {
        // First candidate has no mass; cumulative 0.0 never exceeds a
        // non-negative draw.
        let degrees = [0.0, 1.0];
        assert_eq!(pick_candidate(&degrees, 0.0), 1);
    }

    // ── hypothetical_degree ──────────────────────────────────────

    #[test]
    fn untried_candidate_defaults_to_full_confidence() {
        assert_eq!(hypothetical_degree(&[]), 1.0);
    }

    #[test]
    fn hypothetical_is_average_of_tried() {
        let tried = [
            Efficacy {
                degree: 0.8,
                ..Efficacy::seed(subject(), domain(&["forward"]), false)
            },
            Efficacy {
                degree: 0.4,
                ..Efficacy::seed(subject(), domain(&["turn"]), false)
            },
        ];
        assert!((hypothetical_degree(&tried) - 0.6).abs() < 1e-9);
    }

    // ── recompute_degree ─────────────────────────────────────────

    #[test]
    fn satisfaction_after_execution_raises_degree() {
        // History (newest first): current round, then the round that ran
        // [forward] while unsatisfied.
        let rounds = vec![Round::new(2), round_with(&["forward"], false)];
        let mut efficacy = Efficacy::seed(subject(), domain(&["forward"]), false);

        recompute_degree(&mut efficacy, true, &rounds);
        // closeness (2-1)/1 = 1, max (1+2)/2 = 1.5 → normalized 2/3 → degree 1/3.
        assert!((efficacy.degree - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn dissatisfaction_after_execution_lowers_degree() {
        let rounds = vec![Round::new(2), round_with(&["forward"], false)];
        let mut efficacy = Efficacy {
            degree: 0.5,
            ..Efficacy::seed(subject(), domain(&["forward"]), false)
        };

        recompute_degree(&mut efficacy, false, &rounds);
        // normalized -2/3 → (-2/3 + 0.5) / 2 < 0.5.
        assert!(efficacy.degree < 0.5);
        assert!(efficacy.degree >= 0.0);
    }

    #[test]
    fn recent_execution_outweighs_old() {
        let old_history = vec![Round::new(3), Round::new(2), round_with(&["forward"], false)];
        let recent_history = vec![Round::new(3), round_with(&["forward"], false), Round::new(1)];

        let mut old = Efficacy::seed(subject(), domain(&["forward"]), false);
        let mut recent = Efficacy::seed(subject(), domain(&["forward"]), false);
        recompute_degree(&mut old, true, &old_history);
        recompute_degree(&mut recent, true, &recent_history);

        assert!(recent.degree > old.degree);
    }

    #[test]
    fn partition_mismatch_decays_toward_zero() {
        // The shape ran while satisfied, but the efficacy tracks the
        // unsatisfied partition; no round matches.
        let rounds = vec![Round::new(2), round_with(&["forward"], true)];
        let mut efficacy = Efficacy {
            degree: 0.8,
            ..Efficacy::seed(subject(), domain(&["forward"]), false)
        };

        recompute_degree(&mut efficacy, true, &rounds);
        assert!((efficacy.degree - 0.4).abs() < 1e-9);
    }

    #[test]
    fn other_shapes_do_not_count() {
        let rounds = vec![Round::new(2), round_with(&["turn"], false)];
        let mut efficacy = Efficacy {
            degree: 0.6,
            ..Efficacy::seed(subject(), domain(&["forward"]), false)
        };

        recompute_degree(&mut efficacy, true, &rounds);
        assert!((efficacy.degree - 0.3).abs() < 1e-9);
    }

    #[test]
    fn degree_is_clamped_to_unit_interval() {
        let mut rounds = vec![Round::new(9)];
        for _ in 0..8 {
            rounds.push(round_with(&["forward"], false));
        }
        let mut efficacy = Efficacy {
            degree: 1.0,
            ..Efficacy::seed(subject(), domain(&["forward"]), false)
        };
        recompute_degree(&mut efficacy, true, &rounds);
        assert!(efficacy.degree <= 1.0);

        efficacy.degree = 0.0;
        recompute_degree(&mut efficacy, false, &rounds);
        assert_eq!(efficacy.degree, 0.0);
    }
}
