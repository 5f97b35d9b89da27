//! Calendar v3 REST client.

use calbulk_core::error::ServiceError;
use calbulk_core::patch::EventPatch;
use calbulk_core::service::CalendarService;
use calbulk_core::{Calendar, Event};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::convert::{FromGoogle, ToGoogle};
use crate::wire::{CalendarListPage, ErrorBody, EventsPage, GoogleEvent};

pub const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

const PAGE_SIZE: &str = "250";

/// Calendar service backed by the Google Calendar REST API, authorized with
/// one bearer token for its whole lifetime.
#[derive(Clone)]
pub struct GoogleCalendarService {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarService {
    pub fn new(access_token: impl Into<String>) -> Self {
        GoogleCalendarService {
            http: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `base_url` followed by `segments`, each percent-encoded on its own so
    /// ids containing `#` or `/` stay a single segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ServiceError::Transport(format!("Invalid base URL {}: {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|_| ServiceError::Transport(format!("Invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// Turn a non-success response into `ServiceError::Status`, preferring
/// Google's own error message over the raw body.
async fn status_error(response: Response) -> ServiceError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    let body = serde_json::from_str::<ErrorBody>(&text)
        .map(|e| e.error.message)
        .unwrap_or(text);

    ServiceError::Status { status, body }
}

impl CalendarService for GoogleCalendarService {
    async fn list_calendars(&self) -> Result<Vec<Calendar>, ServiceError> {
        let url = self.url(&["users", "me", "calendarList"])?;
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: CalendarListPage = self.send_json(request).await?;

            for entry in page.items {
                calendars.push(
                    Calendar::from_google(entry).map_err(|e| ServiceError::Decode(e.to_string()))?,
                );
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = calendars.len(), "listed calendars");
        Ok(calendars)
    }

    async fn list_upcoming_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
    ) -> Result<Vec<Event>, ServiceError> {
        let url = self.url(&["calendars", calendar_id, "events"])?;
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone()).query(&[
                ("timeMin", time_min.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", PAGE_SIZE),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: EventsPage = self.send_json(request).await?;

            for item in page.items {
                if item.is_cancelled() {
                    continue;
                }
                let id = item.id.clone();
                match Event::from_google(item) {
                    Ok(event) => events.push(event),
                    Err(e) => debug!(event = %id, error = %e, "skipping event"),
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(calendar = calendar_id, count = events.len(), "listed events");
        Ok(events)
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<Event, ServiceError> {
        let url = self.url(&["calendars", calendar_id, "events", event_id])?;
        let request = self.http.patch(url).json(&patch.to_google());

        let updated: GoogleEvent = self.send_json(request).await?;

        Event::from_google(updated).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ServiceError> {
        let url = self.url(&["calendars", calendar_id, "events", event_id])?;
        let response = self.send(self.http.delete(url)).await?;

        // Any other 2xx is not a confirmed delete
        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, patch};
    use axum::{Json, Router};
    use calbulk_core::EventTime;
    use calbulk_core::dispatch::{BatchStatus, Dispatcher};
    use calbulk_core::draft::EditDraft;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const TEAM_CALENDAR: &str = "team#holidays@group.v.calendar.google.com";

    #[derive(Default)]
    struct Recorded {
        calendar_ids: Vec<String>,
        patches: Vec<(String, Value)>,
        deletes: Vec<String>,
        time_mins: Vec<String>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer test-token")
    }

    async fn calendar_list(
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, AxumStatus> {
        if !authorized(&headers) {
            return Err(AxumStatus::UNAUTHORIZED);
        }
        Ok(Json(match query.get("pageToken").map(String::as_str) {
            None => json!({
                "items": [{"id": "me@example.com", "summary": "Me", "primary": true}],
                "nextPageToken": "p2"
            }),
            Some(_) => json!({
                "items": [{"id": TEAM_CALENDAR, "summary": "Team holidays"}]
            }),
        }))
    }

    async fn list_events(
        State(state): State<Shared>,
        Path(calendar_id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        {
            let mut recorded = state.lock().unwrap();
            recorded.calendar_ids.push(calendar_id);
            recorded
                .time_mins
                .push(query.get("timeMin").cloned().unwrap_or_default());
        }
        assert_eq!(query.get("singleEvents").map(String::as_str), Some("true"));
        assert_eq!(query.get("orderBy").map(String::as_str), Some("startTime"));

        Json(match query.get("pageToken").map(String::as_str) {
            None => json!({
                "items": [
                    {"id": "a", "summary": "Standup", "status": "confirmed",
                     "start": {"dateTime": "2030-06-03T09:00:00Z"},
                     "end": {"dateTime": "2030-06-03T09:30:00Z"}},
                    {"id": "x", "status": "cancelled"},
                ],
                "nextPageToken": "next"
            }),
            Some(_) => json!({
                "items": [
                    {"id": "b", "summary": "Demo", "start": {"date": "2030-06-05"}},
                    {"id": "broken", "summary": "No start"},
                ]
            }),
        })
    }

    async fn patch_event(
        State(state): State<Shared>,
        Path((calendar_id, event_id)): Path<(String, String)>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, (AxumStatus, Json<Value>)> {
        state
            .lock()
            .unwrap()
            .patches
            .push((event_id.clone(), body.clone()));
        state.lock().unwrap().calendar_ids.push(calendar_id);

        if event_id == "fails" {
            return Err((
                AxumStatus::FORBIDDEN,
                Json(json!({"error": {"code": 403, "message": "Rate Limit Exceeded"}})),
            ));
        }

        let summary = body.get("summary").cloned().unwrap_or(json!("Standup"));
        let start = body
            .get("start")
            .cloned()
            .unwrap_or(json!({"dateTime": "2030-06-03T09:00:00Z"}));
        Ok(Json(json!({
            "id": event_id,
            "summary": summary,
            "start": start,
            "end": {"dateTime": "2030-06-03T18:00:00Z"}
        })))
    }

    async fn delete_event(
        State(state): State<Shared>,
        Path((_calendar_id, event_id)): Path<(String, String)>,
    ) -> AxumStatus {
        state.lock().unwrap().deletes.push(event_id.clone());
        match event_id.as_str() {
            "gone" => AxumStatus::GONE,
            "odd" => AxumStatus::OK,
            _ => AxumStatus::NO_CONTENT,
        }
    }

    async fn serve() -> (GoogleCalendarService, Shared) {
        let state = Shared::default();
        let router = Router::new()
            .route("/calendar/v3/users/me/calendarList", get(calendar_list))
            .route("/calendar/v3/calendars/{calendar_id}/events", get(list_events))
            .route(
                "/calendar/v3/calendars/{calendar_id}/events/{event_id}",
                patch(patch_event).delete(delete_event),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        let service = GoogleCalendarService::new("test-token")
            .with_base_url(format!("http://{addr}/calendar/v3"));
        (service, state)
    }

    #[tokio::test]
    async fn lists_calendars_across_pages() {
        let (service, _) = serve().await;

        let calendars = service.list_calendars().await.unwrap();

        assert_eq!(calendars.len(), 2);
        assert!(calendars[0].primary);
        assert_eq!(calendars[1].id, TEAM_CALENDAR);
        assert_eq!(calendars[1].name, "Team holidays");
    }

    #[tokio::test]
    async fn wrong_token_is_a_status_error() {
        let (service, _) = serve().await;
        let service = GoogleCalendarService {
            access_token: "expired".to_string(),
            ..service
        };

        let err = service.list_calendars().await.unwrap_err();

        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn lists_events_skipping_cancelled_and_startless_items() {
        let (service, state) = serve().await;
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();

        let events = service.list_upcoming_events(TEAM_CALENDAR, now).await.unwrap();

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(
            events[1].start,
            EventTime::Date(NaiveDate::from_ymd_opt(2030, 6, 5).unwrap())
        );

        let recorded = state.lock().unwrap();
        assert_eq!(recorded.calendar_ids, vec![TEAM_CALENDAR, TEAM_CALENDAR]);
        assert_eq!(recorded.time_mins[0], "2030-01-01T12:00:00Z");
    }

    #[tokio::test]
    async fn patch_sends_partial_body_and_returns_server_event() {
        let (service, state) = serve().await;
        let patch = EventPatch {
            summary: Some("Sync".to_string()),
            start: Some(EventTime::Date(NaiveDate::from_ymd_opt(2030, 6, 10).unwrap())),
            ..Default::default()
        };

        let updated = service.patch_event("primary", "a", &patch).await.unwrap();

        assert_eq!(updated.summary, "Sync");
        assert_eq!(
            updated.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2030, 6, 10).unwrap())
        );
        let recorded = state.lock().unwrap();
        assert_eq!(
            recorded.patches[0].1,
            json!({"summary": "Sync", "start": {"date": "2030-06-10", "dateTime": null}})
        );
    }

    #[tokio::test]
    async fn patch_error_carries_google_message() {
        let (service, _) = serve().await;

        let err = service
            .patch_event("primary", "fails", &EventPatch::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Status {
                status: 403,
                body: "Rate Limit Exceeded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn only_no_content_counts_as_deleted() {
        let (service, _) = serve().await;

        assert_eq!(service.delete_event("primary", "a").await, Ok(()));
        assert_eq!(
            service.delete_event("primary", "gone").await.unwrap_err().status(),
            Some(410)
        );
        assert_eq!(
            service.delete_event("primary", "odd").await.unwrap_err().status(),
            Some(200)
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let service = GoogleCalendarService::new("test-token")
            .with_base_url("http://127.0.0.1:9/calendar/v3");

        let err = service.list_calendars().await.unwrap_err();

        assert!(matches!(err, ServiceError::Transport(_)));
    }

    #[tokio::test]
    async fn batch_edit_through_the_rest_api() {
        let (service, state) = serve().await;
        let event = |id: &str| Event {
            id: id.to_string(),
            summary: "Standup".to_string(),
            description: None,
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2030, 6, 3, 9, 0, 0).unwrap()),
            end: None,
        };
        let draft = EditDraft {
            title: Some("Daily sync".to_string()),
            ..Default::default()
        };

        let report = Dispatcher::new(&service, TEAM_CALENDAR)
            .apply_edit(&[event("a"), event("fails")], &draft, &chrono_tz::UTC)
            .await;

        assert_eq!(report.status(), BatchStatus::PartialFailure);
        assert_eq!(report.failed_ids(), vec!["fails"]);
        assert_eq!(report.events[0].summary, "Daily sync");
        assert_eq!(report.events[1].summary, "Standup");
        assert_eq!(state.lock().unwrap().patches.len(), 2);
    }

    #[tokio::test]
    async fn batch_delete_refetches_after_deleting() {
        let (service, state) = serve().await;
        let selected = vec![Event {
            id: "gone".to_string(),
            summary: "Old".to_string(),
            description: None,
            start: EventTime::Date(NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()),
            end: None,
        }];
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let report = Dispatcher::new(&service, "primary")
            .delete_selected(&selected, now)
            .await;

        assert_eq!(report.status(), BatchStatus::TotalFailure);
        assert_eq!(report.events.len(), 2);
        assert_eq!(state.lock().unwrap().deletes, vec!["gone"]);
    }
}
