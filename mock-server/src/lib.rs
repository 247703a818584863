use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub title: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Event {
    pub event_id: i64,
    pub title: String,
    pub catch: String,
    pub description: String,
    pub event_url: String,
    pub hash_tag: String,
    pub started_at: String,
    pub ended_at: String,
    pub limit: Option<i64>,
    pub event_type: String,
    pub series: Series,
    pub address: String,
    pub place: String,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub owner_id: i64,
    pub owner_nickname: String,
    pub owner_display_name: String,
    pub accepted: i64,
    pub waiting: i64,
    pub updated_at: String,
    /// Participant nicknames, matched by `nickname`. Not part of the wire
    /// format.
    #[serde(skip)]
    pub participants: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results_returned: usize,
    pub results_available: usize,
    pub results_start: usize,
    pub events: Vec<Event>,
}

/// Shared server state. Clones observe the same recorded user agents.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub events: Arc<Vec<Event>>,
    /// `User-Agent` of every accepted `/event` request, in arrival order.
    pub user_agents: Arc<RwLock<Vec<String>>>,
}

impl AppState {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: Arc::new(events),
            user_agents: Arc::default(),
        }
    }
}

/// Router over the built-in fixture events.
pub fn app() -> Router {
    router(AppState::new(fixture_events()))
}

pub fn app_with_events(events: Vec<Event>) -> Router {
    router(AppState::new(events))
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/event", get(search_events)).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, AppState::new(fixture_events())).await
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

/// Filters parsed from the query string. Repeated keys are kept.
#[derive(Debug, Default)]
struct Filters {
    event_ids: Vec<i64>,
    keywords: Vec<String>,
    keywords_or: Vec<String>,
    yms: Vec<String>,
    ymds: Vec<String>,
    nicknames: Vec<String>,
    owner_nicknames: Vec<String>,
    series_ids: Vec<i64>,
    start: usize,
    order: i64,
    count: usize,
}

impl Filters {
    fn parse(pairs: Vec<(String, String)>) -> Result<Self, StatusCode> {
        let mut filters = Filters {
            order: 1,
            count: 10,
            ..Filters::default()
        };
        for (key, value) in pairs {
            match key.as_str() {
                "event_id" => filters.event_ids.push(number(&value)?),
                "keyword" => filters.keywords.push(value),
                "keyword_or" => filters.keywords_or.push(value),
                "ym" if value.len() == 6 => filters.yms.push(value),
                "ymd" if value.len() == 8 => filters.ymds.push(value),
                "nickname" => filters.nicknames.push(value),
                "owner_nickname" => filters.owner_nicknames.push(value),
                "series_id" => filters.series_ids.push(number(&value)?),
                "start" => filters.start = number(&value)?,
                "order" => match number(&value)? {
                    order @ 1..=3 => filters.order = order,
                    _ => return Err(StatusCode::BAD_REQUEST),
                },
                "count" => match number(&value)? {
                    count @ 1..=100 => filters.count = count,
                    _ => return Err(StatusCode::BAD_REQUEST),
                },
                "ym" | "ymd" => return Err(StatusCode::BAD_REQUEST),
                _ => {}
            }
        }
        Ok(filters)
    }

    fn matches(&self, event: &Event) -> bool {
        let text = [
            event.title.as_str(),
            event.catch.as_str(),
            event.description.as_str(),
            event.address.as_str(),
            event.place.as_str(),
        ]
        .join("\n")
        .to_lowercase();
        let day = event.started_at.get(..10).unwrap_or_default().replace('-', "");

        (self.event_ids.is_empty() || self.event_ids.contains(&event.event_id))
            && self.keywords.iter().all(|k| text.contains(&k.to_lowercase()))
            && (self.keywords_or.is_empty()
                || self.keywords_or.iter().any(|k| text.contains(&k.to_lowercase())))
            && (self.yms.is_empty() || self.yms.iter().any(|ym| day.starts_with(ym.as_str())))
            && (self.ymds.is_empty() || self.ymds.contains(&day))
            && (self.nicknames.is_empty()
                || self.nicknames.iter().any(|n| event.participants.contains(n)))
            && (self.owner_nicknames.is_empty()
                || self.owner_nicknames.contains(&event.owner_nickname))
            && (self.series_ids.is_empty() || self.series_ids.contains(&event.series.id))
    }

    fn sort(&self, events: &mut [Event]) {
        match self.order {
            2 => events.sort_by(|a, b| a.started_at.cmp(&b.started_at)),
            3 => events.sort_by(|a, b| b.event_id.cmp(&a.event_id)),
            _ => events.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        }
    }
}

fn number<T: std::str::FromStr>(value: &str) -> Result<T, StatusCode> {
    value.parse().map_err(|_| StatusCode::BAD_REQUEST)
}

/// Requests without a `User-Agent` are rejected with 400.
async fn search_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, StatusCode> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(StatusCode::BAD_REQUEST)?;
    state.user_agents.write().await.push(user_agent.to_string());

    let filters = Filters::parse(pairs)?;
    debug!(?filters, user_agent, "search");

    let mut matched: Vec<Event> = state
        .events
        .iter()
        .filter(|e| filters.matches(e))
        .cloned()
        .collect();
    filters.sort(&mut matched);

    let available = matched.len();
    let events: Vec<Event> = matched
        .into_iter()
        .skip(filters.start)
        .take(filters.count)
        .collect();

    Ok(Json(SearchResponse {
        results_returned: events.len(),
        results_available: available,
        results_start: filters.start,
        events,
    }))
}

/// Three events across two series, enough to exercise every filter.
pub fn fixture_events() -> Vec<Event> {
    vec![
        Event {
            event_id: 101,
            title: "Rust Tokyo 2024".to_string(),
            catch: "Annual Rust conference".to_string(),
            description: "Talks about async Rust and embedded".to_string(),
            event_url: "https://rust.connpass.com/event/101/".to_string(),
            hash_tag: "rusttokyo".to_string(),
            started_at: "2024-03-09T10:00:00+09:00".to_string(),
            ended_at: "2024-03-09T18:00:00+09:00".to_string(),
            limit: Some(200),
            event_type: "participation".to_string(),
            series: Series {
                id: 1,
                title: "Rust.Tokyo".to_string(),
                url: "https://rust.connpass.com/".to_string(),
            },
            address: "東京都渋谷区".to_string(),
            place: "Shibuya Hall".to_string(),
            lat: Some("35.658034".to_string()),
            lon: Some("139.701636".to_string()),
            owner_id: 10,
            owner_nickname: "ferris".to_string(),
            owner_display_name: "Ferris".to_string(),
            accepted: 180,
            waiting: 12,
            updated_at: "2024-02-01T12:00:00+09:00".to_string(),
            participants: vec!["alice".to_string(), "bob".to_string()],
        },
        Event {
            event_id: 102,
            title: "Go Conf".to_string(),
            catch: "Gophers meetup".to_string(),
            description: "Generics in practice".to_string(),
            event_url: "https://gocon.connpass.com/event/102/".to_string(),
            hash_tag: "goconjp".to_string(),
            started_at: "2024-02-29T19:00:00+09:00".to_string(),
            ended_at: "2024-02-29T21:00:00+09:00".to_string(),
            limit: None,
            event_type: "advertisement".to_string(),
            series: Series {
                id: 2,
                title: "Go Conference".to_string(),
                url: "https://gocon.connpass.com/".to_string(),
            },
            address: "Online".to_string(),
            place: "YouTube Live".to_string(),
            lat: None,
            lon: None,
            owner_id: 20,
            owner_nickname: "gopher".to_string(),
            owner_display_name: "Gopher".to_string(),
            accepted: 0,
            waiting: 0,
            updated_at: "2024-02-20T09:00:00+09:00".to_string(),
            participants: vec!["alice".to_string()],
        },
        Event {
            event_id: 103,
            title: "Rust Tokyo Meetup #5".to_string(),
            catch: "Lightning talks".to_string(),
            description: "Bring your crate".to_string(),
            event_url: "https://rust.connpass.com/event/103/".to_string(),
            hash_tag: "rusttokyo".to_string(),
            started_at: "2024-03-20T19:00:00+09:00".to_string(),
            ended_at: "2024-03-20T21:30:00+09:00".to_string(),
            limit: Some(50),
            event_type: "participation".to_string(),
            series: Series {
                id: 1,
                title: "Rust.Tokyo".to_string(),
                url: "https://rust.connpass.com/".to_string(),
            },
            address: "東京都千代田区".to_string(),
            place: "Akihabara Lab".to_string(),
            lat: Some("35.698353".to_string()),
            lon: Some("139.773114".to_string()),
            owner_id: 10,
            owner_nickname: "ferris".to_string(),
            owner_display_name: "Ferris".to_string(),
            accepted: 50,
            waiting: 3,
            updated_at: "2024-03-01T08:00:00+09:00".to_string(),
            participants: vec!["carol".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn search(list: &[(&str, &str)]) -> Vec<i64> {
        let filters = Filters::parse(pairs(list)).unwrap();
        let mut events: Vec<Event> = fixture_events()
            .into_iter()
            .filter(|e| filters.matches(e))
            .collect();
        filters.sort(&mut events);
        events.iter().map(|e| e.event_id).collect()
    }

    #[test]
    fn event_serializes_wire_fields_only() {
        let json = serde_json::to_value(&fixture_events()[0]).unwrap();
        assert_eq!(json["event_id"], 101);
        assert_eq!(json["series"]["title"], "Rust.Tokyo");
        assert!(json.get("participants").is_none());
    }

    #[test]
    fn missing_coordinates_serialize_as_null() {
        let json = serde_json::to_value(&fixture_events()[1]).unwrap();
        assert!(json["lat"].is_null());
        assert!(json["limit"].is_null());
    }

    #[test]
    fn defaults_order_by_update() {
        assert_eq!(search(&[]), vec![103, 102, 101]);
    }

    #[test]
    fn keywords_are_and_keyword_or_is_or() {
        assert_eq!(search(&[("keyword", "rust"), ("keyword", "lightning")]), vec![103]);
        assert_eq!(search(&[("keyword_or", "gophers"), ("keyword_or", "embedded")]), vec![102, 101]);
    }

    #[test]
    fn date_filters() {
        assert_eq!(search(&[("ym", "202403"), ("order", "2")]), vec![101, 103]);
        assert_eq!(search(&[("ymd", "20240229")]), vec![102]);
    }

    #[test]
    fn people_and_series_filters() {
        assert_eq!(search(&[("nickname", "alice"), ("order", "3")]), vec![102, 101]);
        assert_eq!(search(&[("owner_nickname", "gopher")]), vec![102]);
        assert_eq!(search(&[("series_id", "1"), ("order", "3")]), vec![103, 101]);
        assert_eq!(search(&[("event_id", "101"), ("event_id", "102"), ("order", "3")]), vec![102, 101]);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for bad in [("count", "0"), ("count", "101"), ("order", "4"), ("start", "-1"), ("ym", "2024")] {
            assert_eq!(Filters::parse(pairs(&[bad])).unwrap_err(), StatusCode::BAD_REQUEST);
        }
    }
}
