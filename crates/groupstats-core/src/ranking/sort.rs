//! User-facing sort of the group table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::GroupAggregate;

/// Numeric column the table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Current membership
    TotalMembers,
    /// Members active in the window
    ActiveMembers,
    /// Attributed requests
    Requests,
    /// Attributed credits
    #[default]
    Credits,
    /// Attributed LLM calls
    LlmCalls,
    /// Credits per member
    AvgPerMember,
}

impl SortField {
    /// All fields, in table column order
    pub const ALL: [Self; 6] = [
        Self::TotalMembers,
        Self::ActiveMembers,
        Self::Requests,
        Self::Credits,
        Self::LlmCalls,
        Self::AvgPerMember,
    ];

    /// Settings/CLI name of the field
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalMembers => "total_members",
            Self::ActiveMembers => "active_members",
            Self::Requests => "requests",
            Self::Credits => "credits",
            Self::LlmCalls => "llm_calls",
            Self::AvgPerMember => "avg_per_member",
        }
    }

    /// Read this field from an aggregate
    pub fn value(self, aggregate: &GroupAggregate) -> u64 {
        match self {
            Self::TotalMembers => aggregate.total_members,
            Self::ActiveMembers => aggregate.active_members,
            Self::Requests => aggregate.requests,
            Self::Credits => aggregate.credits,
            Self::LlmCalls => aggregate.llm_calls,
            Self::AvgPerMember => aggregate.avg_per_member,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| Error::validation(format!("unknown sort field '{s}'")))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Largest first
    #[default]
    Descending,
    /// Smallest first
    Ascending,
}

impl SortDirection {
    /// The opposite direction
    pub fn flip(self) -> Self {
        match self {
            Self::Descending => Self::Ascending,
            Self::Ascending => Self::Descending,
        }
    }

    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Descending => "descending",
            Self::Ascending => "ascending",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current table sort: a field and a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortState {
    /// Column being sorted
    pub field: SortField,
    /// Direction of the sort
    pub direction: SortDirection,
}

impl SortState {
    /// Sort descending by `field`
    pub fn new(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Apply a click on a column header.
    ///
    /// The same field flips the direction; a new field starts descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flip();
        } else {
            *self = Self::new(field);
        }
    }

    /// Sort a copy of `aggregates` by this state
    pub fn apply(&self, aggregates: &[GroupAggregate]) -> Vec<GroupAggregate> {
        sort_by(aggregates, self.field, self.direction)
    }
}

/// Reorder a copy of the aggregates for display.
///
/// The catch-all is pinned last whatever the field or direction. Ties are
/// broken by ascending group id in both directions. `rank` is left untouched.
pub fn sort_by(
    aggregates: &[GroupAggregate],
    field: SortField,
    direction: SortDirection,
) -> Vec<GroupAggregate> {
    let mut sorted = aggregates.to_vec();
    sorted.sort_by(|a, b| {
        a.is_catch_all
            .cmp(&b.is_catch_all)
            .then_with(|| {
                let ord = field.value(a).cmp(&field.value(b));
                match direction {
                    SortDirection::Descending => ord.reverse(),
                    SortDirection::Ascending => ord,
                }
            })
            .then_with(|| a.group_id.cmp(&b.group_id))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupDefinition, Rank};
    use proptest::prelude::*;
    use rstest::rstest;

    fn aggregate(id: &str, requests: u64, credits: u64) -> GroupAggregate {
        GroupAggregate {
            requests,
            credits,
            ..GroupAggregate::empty(&GroupDefinition::new(id, id))
        }
    }

    fn sample() -> Vec<GroupAggregate> {
        let others = GroupAggregate {
            requests: 1_000,
            credits: 1_000,
            ..GroupAggregate::empty(&GroupDefinition::catch_all("others", "Others"))
        };
        crate::ranking::rank(vec![
            aggregate("a", 10, 300),
            aggregate("b", 30, 100),
            others,
            aggregate("c", 20, 200),
        ])
    }

    fn ids(aggregates: &[GroupAggregate]) -> Vec<&str> {
        aggregates.iter().map(|a| a.group_id.as_str()).collect()
    }

    #[rstest]
    #[case(SortField::Requests, SortDirection::Descending, ["b", "c", "a", "others"])]
    #[case(SortField::Requests, SortDirection::Ascending, ["a", "c", "b", "others"])]
    #[case(SortField::Credits, SortDirection::Descending, ["a", "c", "b", "others"])]
    #[case(SortField::Credits, SortDirection::Ascending, ["b", "c", "a", "others"])]
    fn test_catch_all_pinned_last(
        #[case] field: SortField,
        #[case] direction: SortDirection,
        #[case] expected: [&str; 4],
    ) {
        assert_eq!(ids(&sort_by(&sample(), field, direction)), expected);
    }

    #[test]
    fn test_sort_keeps_ranks() {
        let sorted = sort_by(&sample(), SortField::Requests, SortDirection::Descending);
        let b = sorted.iter().find(|a| a.group_id == "b").unwrap();
        assert_eq!(b.rank, Rank::Ranked(3));
    }

    #[test]
    fn test_ties_ascending_id_both_directions() {
        let input = vec![aggregate("y", 5, 0), aggregate("x", 5, 0), aggregate("z", 9, 0)];
        assert_eq!(
            ids(&sort_by(&input, SortField::Requests, SortDirection::Descending)),
            ["z", "x", "y"]
        );
        assert_eq!(
            ids(&sort_by(&input, SortField::Requests, SortDirection::Ascending)),
            ["x", "y", "z"]
        );
    }

    #[test]
    fn test_toggle_sequence() {
        let mut state = SortState::default();

        state.toggle(SortField::Requests);
        assert_eq!(state, SortState::new(SortField::Requests));

        state.toggle(SortField::Requests);
        assert_eq!(state.direction, SortDirection::Ascending);

        state.toggle(SortField::Requests);
        assert_eq!(state.direction, SortDirection::Descending);

        state.toggle(SortField::Requests);
        state.toggle(SortField::Credits);
        assert_eq!(
            state,
            SortState {
                field: SortField::Credits,
                direction: SortDirection::Descending,
            }
        );
    }

    #[rstest]
    #[case("credits", SortField::Credits)]
    #[case("LLM-CALLS", SortField::LlmCalls)]
    #[case("avg_per_member", SortField::AvgPerMember)]
    fn test_field_from_str(#[case] input: &str, #[case] expected: SortField) {
        assert_eq!(input.parse::<SortField>().unwrap(), expected);
    }

    #[test]
    fn test_field_from_str_unknown() {
        assert!("name".parse::<SortField>().is_err());
    }

    proptest! {
        #[test]
        fn prop_catch_all_always_last(
            values in proptest::collection::vec((0u64..20, 0u64..20), 1..15),
            field_idx in 0usize..6,
            ascending in any::<bool>(),
        ) {
            let mut input: Vec<_> = values
                .iter()
                .enumerate()
                .map(|(i, (r, c))| aggregate(&format!("g{i}"), *r, *c))
                .collect();
            input.insert(values.len() / 2, GroupAggregate {
                requests: 1_000_000,
                ..GroupAggregate::empty(&GroupDefinition::catch_all("others", "Others"))
            });
            let direction = if ascending { SortDirection::Ascending } else { SortDirection::Descending };

            let sorted = sort_by(&input, SortField::ALL[field_idx], direction);
            prop_assert!(sorted.last().unwrap().is_catch_all);
            prop_assert_eq!(sorted.len(), input.len());
        }
    }
}
