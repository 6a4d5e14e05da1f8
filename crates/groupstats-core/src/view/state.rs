//! Serializable table state (selection, sort, page)

use serde::{Deserialize, Serialize};

use super::{view, Summary, ViewPage};
use crate::models::GroupAggregate;
use crate::ranking::{SortField, SortState};

/// Everything the group table needs besides the aggregates themselves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Show only this group
    pub selected_group: Option<String>,
    /// Current sort
    pub sort: SortState,
    /// Requested page, 1-based
    pub page: usize,
    /// Rows per page
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ViewState {
    /// All groups, credits descending, first page
    pub fn new(page_size: usize) -> Self {
        Self {
            selected_group: None,
            sort: SortState::default(),
            page: 1,
            page_size,
        }
    }

    /// Change the group filter; returns to the first page
    pub fn select_group(&mut self, group_id: Option<String>) {
        self.selected_group = group_id;
        self.page = 1;
    }

    /// Click a sort column; returns to the first page
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
        self.page = 1;
    }

    /// Request a page (clamped when rendered)
    pub fn go_to(&mut self, page: usize) {
        self.page = page;
    }

    /// Sort, filter and paginate ranked aggregates
    pub fn render(&self, ranked: &[GroupAggregate]) -> ViewPage {
        let sorted = self.sort.apply(ranked);
        view(
            &sorted,
            self.selected_group.as_deref(),
            self.page,
            self.page_size,
        )
    }

    /// Totals over the filtered groups, ignoring pagination
    pub fn summary(&self, ranked: &[GroupAggregate]) -> Summary {
        match self.selected_group.as_deref() {
            Some(id) => Summary::from_aggregates(ranked.iter().filter(|a| a.group_id == id)),
            None => Summary::from_aggregates(ranked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupDefinition;
    use crate::ranking::{rank, SortDirection};

    fn ranked() -> Vec<GroupAggregate> {
        let make = |id: &str, requests: u64, credits: u64| GroupAggregate {
            requests,
            credits,
            active_members: 1,
            ..GroupAggregate::empty(&GroupDefinition::new(id, id))
        };
        rank(vec![
            make("a", 5, 50),
            make("b", 40, 10),
            make("c", 20, 30),
            GroupAggregate::empty(&GroupDefinition::catch_all("others", "Others")),
        ])
    }

    fn ids(page: &ViewPage) -> Vec<&str> {
        page.rows.iter().map(|r| r.aggregate.group_id.as_str()).collect()
    }

    #[test]
    fn test_default_render_is_canonical_order() {
        let state = ViewState::new(10);
        assert_eq!(ids(&state.render(&ranked())), ["a", "c", "b", "others"]);
    }

    #[test]
    fn test_toggle_resets_page() {
        let mut state = ViewState::new(2);
        state.go_to(2);
        assert_eq!(ids(&state.render(&ranked())), ["b", "others"]);

        state.toggle_sort(SortField::Requests);
        assert_eq!(state.page, 1);
        assert_eq!(ids(&state.render(&ranked())), ["b", "c"]);

        state.toggle_sort(SortField::Requests);
        assert_eq!(state.sort.direction, SortDirection::Ascending);
        assert_eq!(ids(&state.render(&ranked())), ["a", "c"]);
    }

    #[test]
    fn test_selection_filters_rows_and_summary() {
        let mut state = ViewState::new(10);
        state.go_to(4);
        state.select_group(Some("c".to_string()));

        let page = state.render(&ranked());
        assert_eq!(ids(&page), ["c"]);
        assert_eq!(page.page, 1);

        let summary = state.summary(&ranked());
        assert_eq!(summary.total_credits, 30);
        assert_eq!(summary.groups, 1);

        state.select_group(None);
        assert_eq!(state.summary(&ranked()).total_credits, 90);
    }

    #[test]
    fn test_round_trips_through_json() {
        let mut state = ViewState::new(5);
        state.toggle_sort(SortField::LlmCalls);
        state.select_group(Some("g1".to_string()));

        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
