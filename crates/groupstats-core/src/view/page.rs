//! Page windows over the displayed table

use serde::Serialize;

use crate::models::GroupAggregate;

/// A displayed row: its 1-based position in the current order and the data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    /// Position in the sorted (unpaginated) sequence, independent of `rank`
    pub position: usize,
    /// The group's statistics
    #[serde(flatten)]
    pub aggregate: GroupAggregate,
}

/// One page of the group table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPage {
    /// Rows on this page
    pub rows: Vec<ViewRow>,
    /// The page actually shown, after clamping
    pub page: usize,
    /// Number of pages available (0 when there is nothing to show)
    pub total_pages: usize,
    /// Rows across all pages
    pub total_rows: usize,
}

impl ViewPage {
    /// Whether the "no data" state should be displayed
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Slice the sorted aggregates into the rows to display.
///
/// With a selected group the view holds that single aggregate (or nothing)
/// and pagination does not apply. Otherwise pages of `page_size` rows are
/// cut from the sorted sequence; an out-of-range `page` is clamped into
/// `1..=total_pages`. With no rows the result is an empty page 1 of 0.
/// A `page_size` of 0 is treated as 1.
pub fn view(
    sorted: &[GroupAggregate],
    selected_group_id: Option<&str>,
    page: usize,
    page_size: usize,
) -> ViewPage {
    if let Some(id) = selected_group_id {
        let rows: Vec<ViewRow> = sorted
            .iter()
            .filter(|a| a.group_id == id)
            .take(1)
            .map(|a| ViewRow {
                position: 1,
                aggregate: a.clone(),
            })
            .collect();
        let total_rows = rows.len();
        return ViewPage {
            rows,
            page: 1,
            total_pages: total_rows,
            total_rows,
        };
    }

    let page_size = page_size.max(1);
    let total_rows = sorted.len();
    let total_pages = total_rows.div_ceil(page_size);
    if total_pages == 0 {
        return ViewPage {
            rows: Vec::new(),
            page: 1,
            total_pages: 0,
            total_rows: 0,
        };
    }

    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let rows = sorted
        .iter()
        .enumerate()
        .skip(start)
        .take(page_size)
        .map(|(i, a)| ViewRow {
            position: i + 1,
            aggregate: a.clone(),
        })
        .collect();

    ViewPage {
        rows,
        page,
        total_pages,
        total_rows,
    }
}
