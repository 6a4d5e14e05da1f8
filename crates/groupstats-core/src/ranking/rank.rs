//! Competitive ranking by credits

use std::cmp::Ordering;

use crate::models::{GroupAggregate, Rank};

/// Assign credit ranks and return the canonical order.
///
/// Regular groups are ordered by credits descending, ties broken by ascending
/// group id, and numbered `1..=N`. The catch-all gets [`Rank::Unranked`] and
/// is placed after every numbered group.
pub fn rank(aggregates: Vec<GroupAggregate>) -> Vec<GroupAggregate> {
    let (mut ranked, mut rest): (Vec<_>, Vec<_>) =
        aggregates.into_iter().partition(|a| !a.is_catch_all);

    ranked.sort_by(by_credits_desc);
    for (i, aggregate) in ranked.iter_mut().enumerate() {
        aggregate.rank = Rank::Ranked(i as u32 + 1);
    }

    for aggregate in &mut rest {
        aggregate.rank = Rank::Unranked;
    }
    ranked.append(&mut rest);
    ranked
}

/// Aggregates in canonical order (rank ascending, catch-all last),
/// whatever order they arrive in
pub fn canonical_order(aggregates: &[GroupAggregate]) -> Vec<&GroupAggregate> {
    let mut ordered: Vec<&GroupAggregate> = aggregates.iter().collect();
    ordered.sort_by(|a, b| {
        a.is_catch_all
            .cmp(&b.is_catch_all)
            .then(a.rank.cmp(&b.rank))
            .then_with(|| a.group_id.cmp(&b.group_id))
    });
    ordered
}

fn by_credits_desc(a: &GroupAggregate, b: &GroupAggregate) -> Ordering {
    b.credits
        .cmp(&a.credits)
        .then_with(|| a.group_id.cmp(&b.group_id))
}
