//! Per-group aggregation over a date window

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::policy::AttributionPolicy;
use crate::error::Result;
use crate::models::{catch_all_of, DateWindow, GroupAggregate, GroupDefinition, Member};

/// A member referencing a group id the catalog does not define
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownGroupRef {
    /// Member holding the reference
    pub member_id: String,
    /// The undefined group id
    pub group_id: String,
}

/// Compute one aggregate per catalog group, in catalog order.
///
/// Membership counts (`total_members`) ignore the window; activity and usage
/// only count members whose `last_active` falls inside it. Members without
/// groups land in the catch-all bucket. References to groups missing from the
/// catalog are skipped (logged at `warn`), never an error.
///
/// Fails only when the catalog does not have exactly one catch-all group.
pub fn compute_aggregates(
    members: &[Member],
    groups: &[GroupDefinition],
    window: &DateWindow,
    policy: AttributionPolicy,
) -> Result<Vec<GroupAggregate>> {
    let catch_all = catch_all_of(groups)?;

    let mut aggregates: Vec<GroupAggregate> = groups.iter().map(GroupAggregate::empty).collect();
    let index: HashMap<&str, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, group)| (group.id.as_str(), i))
        .collect();

    let mut active_count = 0usize;
    let mut skipped_refs = 0usize;

    for member in members {
        let targets: Vec<&str> = if member.is_unassigned() {
            vec![catch_all.id.as_str()]
        } else {
            member.group_ids.iter().map(String::as_str).collect()
        };

        let is_active = member.is_active_in(window);
        if is_active {
            active_count += 1;
        }
        let share = policy.share(member, targets.len());

        for group_id in targets {
            let Some(&i) = index.get(group_id) else {
                warn!(
                    member_id = %member.id,
                    group_id,
                    "Member references unknown group, skipping"
                );
                skipped_refs += 1;
                continue;
            };

            let aggregate = &mut aggregates[i];
            aggregate.total_members += 1;

            // saturate: full attribution copies each member's usage into every group
            if is_active {
                aggregate.active_members += 1;
                aggregate.requests = aggregate.requests.saturating_add(share.requests);
                aggregate.credits = aggregate.credits.saturating_add(share.credits);
                aggregate.llm_calls = aggregate.llm_calls.saturating_add(share.llm_calls);
            }
        }
    }

    for aggregate in &mut aggregates {
        aggregate.avg_per_member = rounded_div(aggregate.credits, aggregate.total_members);
    }

    debug!(
        members = members.len(),
        active = active_count,
        groups = groups.len(),
        skipped_refs,
        %policy,
        %window,
        "Computed group aggregates"
    );

    Ok(aggregates)
}

/// Every `(member, group)` reference to a group absent from the catalog
pub fn unknown_group_refs(members: &[Member], groups: &[GroupDefinition]) -> Vec<UnknownGroupRef> {
    members
        .iter()
        .flat_map(|member| {
            member
                .group_ids
                .iter()
                .filter(|id| !groups.iter().any(|g| &g.id == *id))
                .map(|id| UnknownGroupRef {
                    member_id: member.id.clone(),
                    group_id: id.clone(),
                })
        })
        .collect()
}

/// `num / den` rounded half-up, 0 when `den` is 0
fn rounded_div(num: u64, den: u64) -> u64 {
    if den == 0 {
        return 0;
    }
    let (num, den) = (u128::from(num), u128::from(den));
    ((2 * num + den) / (2 * den)) as u64
}
