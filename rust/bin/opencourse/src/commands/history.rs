//! History listing. Each entry carries its action description.

use anyhow::Result;
use serde::Serialize;

use opencourse_core::{ListParams, ListResult};
use review::{HistoryEntry, HistoryTarget, ReviewModule};

use super::print_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryView {
    #[serde(flatten)]
    entry: HistoryEntry,
    description: &'static str,
    /// Present with `--resolve`; `null` once the target has been deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<Option<HistoryTarget>>,
}

pub fn list(
    module: &ReviewModule,
    user_id: i64,
    resolve: bool,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<()> {
    let log = module.history();
    let defaults = ListParams::default();
    let params = ListParams {
        limit: limit.unwrap_or(defaults.limit),
        offset: offset.unwrap_or(0),
    };
    let page = log.list_by_user_paged(user_id, &params)?;

    let mut items = Vec::with_capacity(page.items.len());
    for entry in page.items {
        let target = if resolve { Some(log.resolve(&entry)?) } else { None };
        items.push(EntryView {
            description: entry.action.description(),
            entry,
            target,
        });
    }
    print_json(&ListResult {
        items,
        total: page.total,
    })
}
