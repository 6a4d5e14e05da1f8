//! Member leaderboard

use serde::Serialize;

use crate::models::{GroupCatalog, Member, MemberStore};

/// One row of the member ranking table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRankingEntry {
    /// 1-based position by credits
    pub rank: u32,
    /// Member id
    pub member_id: String,
    /// Display name, falling back to the id
    pub name: String,
    /// Contact email, if known
    pub email: Option<String>,
    /// Short description of the member's groups
    pub group_label: String,
    /// Total requests
    pub request_count: u64,
    /// Total credits
    pub credits: u64,
}

/// Rank members by total credits, optionally restricted to one group.
///
/// Selecting the catch-all id restricts to members without groups. Ties are
/// broken by ascending member id. An unknown group id yields no rows.
pub fn rank_members(
    store: &MemberStore,
    catalog: &GroupCatalog,
    selected_group: Option<&str>,
) -> Vec<MemberRankingEntry> {
    let catch_all_id = catalog.catch_all().id.as_str();

    let mut selected: Vec<&Member> = store
        .members()
        .iter()
        .filter(|member| match selected_group {
            None => true,
            Some(id) if id == catch_all_id => member.is_unassigned(),
            Some(id) => member.group_ids.contains(id),
        })
        .collect();

    selected.sort_by(|a, b| b.credits.cmp(&a.credits).then_with(|| a.id.cmp(&b.id)));

    selected
        .into_iter()
        .enumerate()
        .map(|(i, member)| MemberRankingEntry {
            rank: i as u32 + 1,
            member_id: member.id.clone(),
            name: member.name.clone().unwrap_or_else(|| member.id.clone()),
            email: member.email.clone(),
            group_label: group_label(member, catalog),
            request_count: member.request_count,
            credits: member.credits,
        })
        .collect()
}

/// `Unassigned`, the single group's name, or `"{n} Groups"`
pub fn group_label(member: &Member, catalog: &GroupCatalog) -> String {
    let mut ids = member.group_ids.iter();
    match (ids.next(), ids.next()) {
        (None, _) => "Unassigned".to_string(),
        (Some(id), None) => catalog
            .get(id)
            .map_or_else(|| id.to_uppercase(), |group| group.name.clone()),
        (Some(_), Some(_)) => format!("{} Groups", member.group_ids.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupDefinition;
    use chrono::NaiveDate;

    fn fixture() -> (MemberStore, GroupCatalog) {
        let day = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let store = MemberStore::new(vec![
            Member::new("m1", day)
                .in_groups(["g1"])
                .with_usage(10, 500)
                .with_contact("Alice Kim", "alice@company.com"),
            Member::new("m2", day).in_groups(["g1", "g2"]).with_usage(20, 900),
            Member::new("m3", day).with_usage(5, 500),
            Member::new("m4", day).in_groups(["g9"]).with_usage(1, 10),
        ])
        .unwrap();
        let catalog = GroupCatalog::new(vec![
            GroupDefinition::new("g1", "Marketing Team"),
            GroupDefinition::new("g2", "R&D Division"),
            GroupDefinition::catch_all("others", "Others"),
        ])
        .unwrap();
        (store, catalog)
    }

    #[test]
    fn test_rank_all_members() {
        let (store, catalog) = fixture();
        let ranking = rank_members(&store, &catalog, None);

        let order: Vec<_> = ranking.iter().map(|e| e.member_id.as_str()).collect();
        assert_eq!(order, ["m2", "m1", "m3", "m4"]);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[0].group_label, "2 Groups");
        assert_eq!(ranking[1].name, "Alice Kim");
        assert_eq!(ranking[1].group_label, "Marketing Team");
        assert_eq!(ranking[2].name, "m3");
        assert_eq!(ranking[2].group_label, "Unassigned");
        assert_eq!(ranking[3].group_label, "G9");
    }

    #[test]
    fn test_filter_by_group_renumbers() {
        let (store, catalog) = fixture();
        let ranking = rank_members(&store, &catalog, Some("g1"));
        let order: Vec<_> = ranking.iter().map(|e| (e.rank, e.member_id.as_str())).collect();
        assert_eq!(order, [(1, "m2"), (2, "m1")]);
    }

    #[test]
    fn test_filter_by_catch_all_and_unknown() {
        let (store, catalog) = fixture();

        let unassigned = rank_members(&store, &catalog, Some("others"));
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].member_id, "m3");

        assert!(rank_members(&store, &catalog, Some("nope")).is_empty());
    }
}
