//! Headline totals for the summary cards

use serde::Serialize;

use crate::models::GroupAggregate;

/// Totals over the displayed (filtered, unpaginated) groups.
///
/// These are sums of group statistics, so under full attribution a member in
/// several groups contributes several times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    /// Sum of group credits
    pub total_credits: u64,
    /// Sum of group requests
    pub total_requests: u64,
    /// Sum of group LLM calls
    pub total_llm_calls: u64,
    /// Sum of group active members
    pub active_members: u64,
    /// Number of groups summed
    pub groups: usize,
}

impl Summary {
    /// Sum the given aggregates
    pub fn from_aggregates<'a, I>(aggregates: I) -> Self
    where
        I: IntoIterator<Item = &'a GroupAggregate>,
    {
        aggregates
            .into_iter()
            .fold(Self::default(), |mut acc, aggregate| {
                acc.total_credits = acc.total_credits.saturating_add(aggregate.credits);
                acc.total_requests = acc.total_requests.saturating_add(aggregate.requests);
                acc.total_llm_calls = acc.total_llm_calls.saturating_add(aggregate.llm_calls);
                acc.active_members = acc.active_members.saturating_add(aggregate.active_members);
                acc.groups += 1;
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupDefinition;

    #[test]
    fn test_sums_every_field() {
        let a = GroupAggregate {
            credits: 250,
            requests: 150,
            llm_calls: 7,
            active_members: 2,
            ..GroupAggregate::empty(&GroupDefinition::new("a", "A"))
        };
        let b = GroupAggregate {
            credits: 200,
            requests: 100,
            llm_calls: 3,
            active_members: 1,
            ..GroupAggregate::empty(&GroupDefinition::new("b", "B"))
        };

        let summary = Summary::from_aggregates([&a, &b]);
        assert_eq!(
            summary,
            Summary {
                total_credits: 450,
                total_requests: 250,
                total_llm_calls: 10,
                active_members: 3,
                groups: 2,
            }
        );
    }

    #[test]
    fn test_saturates_on_huge_totals() {
        let huge = GroupAggregate {
            credits: u64::MAX,
            requests: u64::MAX - 1,
            ..GroupAggregate::empty(&GroupDefinition::new("a", "A"))
        };
        let small = GroupAggregate {
            credits: 10,
            requests: 10,
            ..GroupAggregate::empty(&GroupDefinition::new("b", "B"))
        };

        let summary = Summary::from_aggregates([&huge, &small]);
        assert_eq!(summary.total_credits, u64::MAX);
        assert_eq!(summary.total_requests, u64::MAX);
        assert_eq!(summary.groups, 2);
    }

    #[test]
    fn test_empty() {
        let none: Vec<GroupAggregate> = Vec::new();
        assert_eq!(Summary::from_aggregates(&none), Summary::default());
    }
}
