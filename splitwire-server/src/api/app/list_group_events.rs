use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use serde::Deserialize;
use splitwire_core::entities::event_records::ListGroupEventsAfter;
use splitwire_core::framework::DatabaseProcessor;

use super::AppApiError;
use crate::api::event_to_response;
use crate::state::AppState;

const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub(crate) struct ListEventsQuery {
    /// Cursor event id; missing or `"0"` means from the beginning.
    pub after: Option<String>,
    pub limit: Option<i64>,
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT)
}

/// `GET /groups/{group_id}/events` — incremental replay for a group.
///
/// Events come back in ascending `created_at` order; clients advance the
/// cursor with the last returned event id. An unknown cursor yields an empty
/// list, which clients must read as "no new events yet".
pub(super) async fn list_group_events(
    state: State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let after_event_id = query
        .after
        .filter(|after| !after.is_empty() && after.as_str() != "0");

    let records = processor
        .process(ListGroupEventsAfter {
            group_id,
            after_event_id,
            limit: clamp_limit(query.limit),
        })
        .await
        .map_err(AppApiError::Database)?;

    let response: Vec<_> = records.iter().map(event_to_response).collect();
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 1000);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(100_000)), 1000);
    }
}
