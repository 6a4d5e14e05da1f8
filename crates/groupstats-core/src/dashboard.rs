//! Dashboard facade tying the store, catalog and policy together
//!
//! Nothing is cached: every report recomputes from the snapshot, so a report
//! always reflects the inputs it was asked about.

use serde::Serialize;
use tracing::{info, instrument};

use crate::attribution::{compute_aggregates, unknown_group_refs, AttributionPolicy, UnknownGroupRef};
use crate::error::Result;
use crate::export::{self, ExportOptions};
use crate::models::{Dataset, DateWindow, GroupAggregate, GroupCatalog, MemberStore};
use crate::ranking::{rank, rank_members, MemberRankingEntry};
use crate::view::{Summary, ViewPage, ViewState};

/// A member snapshot, its group catalog and the attribution policy
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: MemberStore,
    catalog: GroupCatalog,
    policy: AttributionPolicy,
}

impl Dashboard {
    /// Create a dashboard from validated parts
    pub fn new(store: MemberStore, catalog: GroupCatalog, policy: AttributionPolicy) -> Self {
        Self {
            store,
            catalog,
            policy,
        }
    }

    /// Validate a dataset and wrap it
    pub fn from_dataset(dataset: Dataset, policy: AttributionPolicy) -> Result<Self> {
        let (catalog, store) = dataset.into_parts()?;
        info!(
            groups = catalog.len(),
            members = store.len(),
            policy = %policy,
            "Dataset loaded"
        );
        Ok(Self::new(store, catalog, policy))
    }

    /// Member snapshot
    pub fn store(&self) -> &MemberStore {
        &self.store
    }

    /// Group catalog
    pub fn catalog(&self) -> &GroupCatalog {
        &self.catalog
    }

    /// Active attribution policy
    pub fn policy(&self) -> AttributionPolicy {
        self.policy
    }

    /// Same data under another policy
    #[must_use]
    pub fn with_policy(mut self, policy: AttributionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Aggregate and rank every group for `window`
    #[instrument(skip(self), fields(policy = %self.policy))]
    pub fn report(&self, window: DateWindow) -> Result<GroupReport> {
        let aggregates = compute_aggregates(
            self.store.members(),
            self.catalog.definitions(),
            &window,
            self.policy,
        )?;

        Ok(GroupReport {
            window,
            policy: self.policy,
            unique_members: self.store.len(),
            unique_active_members: self.store.unique_active(&window),
            aggregates: rank(aggregates),
        })
    }

    /// Member leaderboard, optionally for one group
    pub fn member_ranking(&self, selected_group: Option<&str>) -> Vec<MemberRankingEntry> {
        rank_members(&self.store, &self.catalog, selected_group)
    }

    /// Member references to groups the catalog does not define
    pub fn unknown_group_refs(&self) -> Vec<UnknownGroupRef> {
        unknown_group_refs(self.store.members(), self.catalog.definitions())
    }
}

/// Ranked group statistics for one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    /// Window the report covers
    pub window: DateWindow,
    /// Policy used for attribution
    pub policy: AttributionPolicy,
    /// All members, each counted once however many groups they are in
    pub unique_members: usize,
    /// Members active in the window, each counted once
    pub unique_active_members: usize,
    /// Ranked aggregates, catalog order
    pub aggregates: Vec<GroupAggregate>,
}

impl GroupReport {
    /// Totals over all groups, or just the selected one
    pub fn summary(&self, selected_group: Option<&str>) -> Summary {
        match selected_group {
            Some(id) => Summary::from_aggregates(self.aggregates.iter().filter(|a| a.group_id == id)),
            None => Summary::from_aggregates(&self.aggregates),
        }
    }

    /// Render the table for a view state
    pub fn page(&self, state: &ViewState) -> ViewPage {
        state.render(&self.aggregates)
    }

    /// CSV bytes of the full ranked set
    pub fn to_csv(&self, options: &ExportOptions) -> Result<Vec<u8>> {
        export::serialize(&self.aggregates, options)
    }

    /// Default export file name for this window
    pub fn export_filename(&self, prefix: &str) -> String {
        export::export_filename(prefix, &self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupDefinition, Member, Rank};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, d).unwrap()
    }

    fn dashboard(policy: AttributionPolicy) -> Dashboard {
        let dataset = Dataset {
            groups: vec![
                GroupDefinition::new("a", "A"),
                GroupDefinition::new("b", "B"),
                GroupDefinition::catch_all("others", "Others"),
            ],
            members: vec![
                Member::new("m1", day(15)).in_groups(["a", "b"]).with_usage(100, 200),
                Member::new("m2", day(20)).in_groups(["a"]).with_usage(50, 50),
                Member::new("m3", day(10)).with_usage(10, 10),
            ],
        };
        Dashboard::from_dataset(dataset, policy).unwrap()
    }

    fn december() -> DateWindow {
        DateWindow::new(day(1), day(31))
    }

    #[test]
    fn test_report_ranks_full_attribution() {
        let report = dashboard(AttributionPolicy::FullAttribution)
            .report(december())
            .unwrap();

        let ranks: Vec<_> = report
            .aggregates
            .iter()
            .map(|a| (a.group_id.as_str(), a.credits, a.rank))
            .collect();
        assert_eq!(
            ranks,
            [
                ("a", 250, Rank::Ranked(1)),
                ("b", 200, Rank::Ranked(2)),
                ("others", 10, Rank::Unranked),
            ]
        );
        assert_eq!(report.unique_active_members, 3);
        assert_eq!(report.unique_members, 3);
        let memberships: u64 = report.aggregates.iter().map(|a| a.total_members).sum();
        assert_eq!(memberships, 4);
        // m1 counted in both groups
        assert_eq!(report.summary(None).total_credits, 460);
        assert_eq!(report.summary(Some("b")).total_credits, 200);
    }

    #[test]
    fn test_policy_switch_recomputes() {
        let dashboard = dashboard(AttributionPolicy::FullAttribution)
            .with_policy(AttributionPolicy::EvenSplit);
        let report = dashboard.report(december()).unwrap();

        assert_eq!(report.policy, AttributionPolicy::EvenSplit);
        assert_eq!(report.summary(None).total_credits, 260);
        assert_eq!(report.aggregates[0].credits, 150);
    }

    #[test]
    fn test_window_outside_activity() {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let report = dashboard(AttributionPolicy::FullAttribution)
            .report(window)
            .unwrap();

        assert_eq!(report.summary(None), Summary { groups: 3, ..Summary::default() });
        assert_eq!(report.aggregates[0].total_members, 2);
        assert_eq!(report.unique_active_members, 0);
    }

    #[test]
    fn test_export_through_report() {
        let report = dashboard(AttributionPolicy::FullAttribution)
            .report(december())
            .unwrap();
        assert_eq!(
            report.export_filename("GroupStatistics"),
            "GroupStatistics_2023-12-01_2023-12-31.csv"
        );

        let csv = report.to_csv(&ExportOptions { include_bom: false }).unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(text.lines().nth(1), Some("1,\"A\",2,2/2,150,0,250"));
    }

    #[test]
    fn test_member_ranking_and_unknown_refs() {
        let dashboard = dashboard(AttributionPolicy::FullAttribution);
        let top = dashboard.member_ranking(None);
        assert_eq!(top[0].member_id, "m1");
        assert!(dashboard.unknown_group_refs().is_empty());
    }

    proptest! {
        #[test]
        fn prop_unique_members_never_exceed_memberships(
            groups in proptest::collection::vec(
                proptest::sample::subsequence(vec!["a", "b"], 0..=2),
                0..30,
            ),
            policy in proptest::sample::select(AttributionPolicy::ALL.to_vec()),
        ) {
            let members = groups
                .into_iter()
                .enumerate()
                .map(|(i, ids)| {
                    Member::new(format!("m{i}"), day(15))
                        .in_groups(ids)
                        .with_usage(1, 1)
                })
                .collect();
            let dataset = Dataset {
                groups: vec![
                    GroupDefinition::new("a", "A"),
                    GroupDefinition::new("b", "B"),
                    GroupDefinition::catch_all("others", "Others"),
                ],
                members,
            };
            let dashboard = Dashboard::from_dataset(dataset, policy).unwrap();
            let report = dashboard.report(december()).unwrap();

            let memberships: u64 = report.aggregates.iter().map(|a| a.total_members).sum();
            prop_assert_eq!(report.unique_members, dashboard.store().len());
            prop_assert!(memberships >= report.unique_members as u64);
        }
    }
}
