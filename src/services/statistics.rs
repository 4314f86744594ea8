//! Aggregates computed over the votes of one round.

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{dao::models::VoteEntity, state::room::MemberId};

/// Summary of the numeric votes of a round.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VoteStatistics {
    /// Mean of the numeric votes, rounded to two decimals.
    pub average: f64,
    /// Element at index `n / 2` of the ascending numeric votes.
    pub median: u32,
    /// Lowest numeric vote.
    pub min: u32,
    /// Highest numeric vote.
    pub max: u32,
    /// Every value sharing the highest frequency, ascending.
    pub mode: Vec<u32>,
    /// Number of votes cast this round, including "?".
    pub total_votes: usize,
    /// Occurrences per numeric value, ascending by value.
    #[schema(value_type = Object)]
    pub distribution: IndexMap<u32, usize>,
}

/// One side of a head-to-head comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Contender {
    /// Member who cast the vote.
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// Numeric vote of that member.
    pub vote: u32,
}

/// Lowest and highest voter of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HeadToHead {
    /// Member with the lowest numeric vote.
    pub low: Contender,
    /// Member with the highest numeric vote.
    pub high: Contender,
}

/// Statistics over the numeric votes, or `None` when nobody picked a number.
pub fn compute_statistics(votes: &[VoteEntity]) -> Option<VoteStatistics> {
    let mut numeric: Vec<u32> = votes.iter().filter_map(|vote| vote.value.points()).collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.sort_unstable();

    let sum: u64 = numeric.iter().map(|&value| u64::from(value)).sum();
    let average = round_to_cents(sum as f64 / numeric.len() as f64);
    let median = numeric.get(numeric.len() / 2).copied()?;
    let min = numeric.first().copied()?;
    let max = numeric.last().copied()?;

    let mut distribution: IndexMap<u32, usize> = IndexMap::new();
    for value in &numeric {
        *distribution.entry(*value).or_insert(0) += 1;
    }

    let top = distribution.values().copied().max()?;
    let mode = distribution
        .iter()
        .filter(|&(_, &count)| count == top)
        .map(|(&value, _)| value)
        .collect();

    Some(VoteStatistics {
        average,
        median,
        min,
        max,
        mode,
        total_votes: votes.len(),
        distribution,
    })
}

/// Pick the lowest and highest numeric voters.
///
/// Returns `None` with fewer than two numeric votes or when every numeric vote
/// is equal. Ties on an extreme go to the vote that comes first in `votes`.
pub fn compute_head_to_head(votes: &[VoteEntity]) -> Option<HeadToHead> {
    let mut numeric = votes
        .iter()
        .filter_map(|vote| vote.value.points().map(|points| (&vote.member_id, points)));

    let first = numeric.next()?;
    let (low, high, count) = numeric.fold((first, first, 1usize), |(low, high, count), next| {
        let low = if next.1 < low.1 { next } else { low };
        let high = if next.1 > high.1 { next } else { high };
        (low, high, count + 1)
    });

    if count < 2 || low.1 == high.1 {
        return None;
    }

    Some(HeadToHead {
        low: Contender {
            member_id: low.0.clone(),
            vote: low.1,
        },
        high: Contender {
            member_id: high.0.clone(),
            vote: high.1,
        },
    })
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::{RoomCode, VoteValue};

    fn votes(values: &[(&str, &str)]) -> Vec<VoteEntity> {
        let room = RoomCode::parse("AAAAAA").unwrap();
        values
            .iter()
            .map(|(member, value)| {
                VoteEntity::new(
                    room.clone(),
                    MemberId::new(*member),
                    1,
                    VoteValue::parse(value).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn statistics_over_a_simple_round() {
        let stats =
            compute_statistics(&votes(&[("a", "3"), ("b", "5"), ("c", "5"), ("d", "8")])).unwrap();

        assert_eq!(stats.average, 5.25);
        assert_eq!(stats.median, 5);
        assert_eq!(stats.min, 3);
        assert_eq!(stats.max, 8);
        assert_eq!(stats.mode, vec![5]);
        assert_eq!(stats.total_votes, 4);
        assert_eq!(
            stats.distribution.into_iter().collect::<Vec<_>>(),
            vec![(3, 1), (5, 2), (8, 1)]
        );
    }

    #[test]
    fn unknown_votes_are_excluded_from_aggregates() {
        let stats = compute_statistics(&votes(&[("a", "?"), ("b", "2"), ("c", "13")])).unwrap();
        assert_eq!(stats.average, 7.5);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 13);
        assert_eq!(stats.median, 13);
        assert_eq!(stats.total_votes, 3);
    }

    #[test]
    fn mode_lists_every_value_at_max_frequency() {
        let stats =
            compute_statistics(&votes(&[("a", "8"), ("b", "3"), ("c", "8"), ("d", "3"), ("e", "1")]))
                .unwrap();
        assert_eq!(stats.mode, vec![3, 8]);
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        let stats = compute_statistics(&votes(&[("a", "1"), ("b", "1"), ("c", "2")])).unwrap();
        assert_eq!(stats.average, 1.33);
        let stats = compute_statistics(&votes(&[("a", "1"), ("b", "2"), ("c", "2")])).unwrap();
        assert_eq!(stats.average, 1.67);
    }

    #[test]
    fn no_statistics_without_numeric_votes() {
        assert!(compute_statistics(&[]).is_none());
        assert!(compute_statistics(&votes(&[("a", "?"), ("b", "?")])).is_none());
    }

    #[test]
    fn head_to_head_needs_a_spread() {
        assert!(compute_head_to_head(&votes(&[("a", "3"), ("b", "3")])).is_none());
        assert!(compute_head_to_head(&votes(&[("a", "3")])).is_none());
        assert!(compute_head_to_head(&votes(&[("a", "3"), ("b", "?")])).is_none());
        assert!(compute_head_to_head(&[]).is_none());
    }

    #[test]
    fn head_to_head_ties_go_to_first_seen() {
        let duel = compute_head_to_head(&votes(&[("a", "2"), ("b", "2"), ("c", "8")])).unwrap();
        assert_eq!(duel.low.member_id, MemberId::new("a"));
        assert_eq!(duel.low.vote, 2);
        assert_eq!(duel.high.member_id, MemberId::new("c"));
        assert_eq!(duel.high.vote, 8);

        let duel = compute_head_to_head(&votes(&[("a", "8"), ("b", "1"), ("c", "8")])).unwrap();
        assert_eq!(duel.high.member_id, MemberId::new("a"));
        assert_eq!(duel.low.member_id, MemberId::new("b"));
    }

    #[test]
    fn statistics_serialize_distribution_keys_as_strings() {
        let stats = compute_statistics(&votes(&[("a", "3"), ("b", "5")])).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["distribution"]["3"], 1);
        assert_eq!(json["total_votes"], 2);
    }
}
