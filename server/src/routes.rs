//! HTTP routing and JSON replies.

use std::io::Read;

use emoji_battler_core::{GameError, PeerToken, RoomCode, RoomRegistry, UnitKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tiny_http::{Header, Method, Request, Response};

#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    CreateRoom,
    Join(RoomCode),
    Buy(RoomCode),
    Reroll(RoomCode),
    LevelUp(RoomCode),
    View(RoomCode),
    Leave(RoomCode),
}

/// Match a method and path (without query) to a route
pub fn route(method: &Method, path: &str) -> Option<Route> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        (Method::Post, ["rooms"]) => Some(Route::CreateRoom),
        (Method::Get, ["rooms", code]) => Some(Route::View(RoomCode::parse(code))),
        (Method::Post, ["rooms", code, action]) => {
            let code = RoomCode::parse(code);
            match *action {
                "join" => Some(Route::Join(code)),
                "buy" => Some(Route::Buy(code)),
                "reroll" => Some(Route::Reroll(code)),
                "level" => Some(Route::LevelUp(code)),
                "leave" => Some(Route::Leave(code)),
                _ => None,
            }
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeerBody {
    peer: PeerToken,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuyBody {
    peer: PeerToken,
    unit_id: String,
}

/// Error reply with its HTTP status
#[derive(Debug, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: 404,
            message: message.into(),
        }
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let status = if err.is_missing_resource() { 404 } else { 409 };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

type ApiResult = Result<Value, ApiError>;

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::bad_request(format!("malformed body: {e}")))
}

fn query_peer(query: &str) -> Result<PeerToken, ApiError> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "peer")
        .and_then(|(_, value)| value.parse::<u64>().ok())
        .map(PeerToken)
        .ok_or_else(|| ApiError::bad_request("missing or invalid peer query parameter"))
}

fn to_json<T: Serialize>(value: &T) -> ApiResult {
    serde_json::to_value(value).map_err(|e| ApiError {
        status: 500,
        message: e.to_string(),
    })
}

/// Run a route against the registry
pub fn dispatch(
    registry: &mut RoomRegistry,
    route: Route,
    query: &str,
    body: &str,
    now: u64,
) -> ApiResult {
    match route {
        Route::CreateRoom => to_json(&registry.create_room(now)),
        Route::Join(code) => to_json(&registry.join_room(&code, now)?),
        Route::Buy(code) => {
            let body: BuyBody = parse_body(body)?;
            registry.heartbeat(&code, body.peer, now)?;
            let kind = UnitKind::from_id(&body.unit_id)
                .ok_or_else(|| ApiError::bad_request(format!("unknown unit {}", body.unit_id)))?;
            let purchase = registry.buy(&code, body.peer, kind)?;
            let view = registry.room_view(&code, body.peer)?;
            Ok(json!({ "purchase": to_json(&purchase)?, "view": to_json(&view)? }))
        }
        Route::Reroll(code) => {
            let body: PeerBody = parse_body(body)?;
            registry.heartbeat(&code, body.peer, now)?;
            registry.reroll(&code, body.peer)?;
            to_json(&registry.room_view(&code, body.peer)?)
        }
        Route::LevelUp(code) => {
            let body: PeerBody = parse_body(body)?;
            registry.heartbeat(&code, body.peer, now)?;
            registry.level_up_shop(&code, body.peer)?;
            to_json(&registry.room_view(&code, body.peer)?)
        }
        Route::View(code) => {
            let peer = query_peer(query)?;
            registry.heartbeat(&code, peer, now)?;
            to_json(&registry.room_view(&code, peer)?)
        }
        Route::Leave(code) => {
            let body: PeerBody = parse_body(body)?;
            registry.heartbeat(&code, body.peer, now)?;
            Ok(json!({ "closed": registry.leave(body.peer, now) }))
        }
    }
}

fn json_header() -> Option<Header> {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).ok()
}

fn reply(request: Request, status: u16, body: &Value) {
    let mut response = Response::from_string(body.to_string()).with_status_code(status);
    if let Some(header) = json_header() {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        log::warn!("failed to send response: {e}");
    }
}

/// Handle one HTTP request end to end
pub fn handle(registry: &mut RoomRegistry, mut request: Request, now: u64) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));

    let mut body = String::new();
    let result = match request.as_reader().read_to_string(&mut body) {
        Err(e) => Err(ApiError::bad_request(format!("unreadable body: {e}"))),
        Ok(_) => match route(&method, path) {
            Some(route) => dispatch(registry, route, query, &body, now),
            None => Err(ApiError::not_found(format!("no route for {method} {path}"))),
        },
    };

    match result {
        Ok(value) => {
            log::debug!("{method} {path} -> 200");
            reply(request, 200, &value);
        }
        Err(err) => {
            log::debug!("{method} {path} -> {}: {}", err.status, err.message);
            reply(request, err.status, &json!({ "error": err.message }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        assert_eq!(route(&Method::Post, "/rooms"), Some(Route::CreateRoom));
        assert_eq!(
            route(&Method::Post, "/rooms/ab12/join"),
            Some(Route::Join(RoomCode::parse("AB12")))
        );
        assert_eq!(
            route(&Method::Get, "/rooms/AB12"),
            Some(Route::View(RoomCode::parse("AB12")))
        );
        assert_eq!(route(&Method::Get, "/rooms/AB12/buy"), None);
        assert_eq!(route(&Method::Delete, "/rooms"), None);
    }

    #[test]
    fn test_query_peer() {
        assert_eq!(query_peer("x=1&peer=42"), Ok(PeerToken(42)));
        assert_eq!(query_peer("peer=abc").map_err(|e| e.status), Err(400));
        assert_eq!(query_peer("").map_err(|e| e.status), Err(400));
    }

    #[test]
    fn test_room_flow_over_dispatch() {
        let mut registry = RoomRegistry::new(1);
        let host = dispatch(&mut registry, Route::CreateRoom, "", "", 0).unwrap();
        let code = RoomCode::parse(host["room"].as_str().unwrap());
        let host_peer = host["peer"].as_u64().unwrap();

        let guest = dispatch(&mut registry, Route::Join(code.clone()), "", "", 0).unwrap();
        assert_eq!(guest["side"], "B");

        let full = dispatch(&mut registry, Route::Join(code.clone()), "", "", 0).unwrap_err();
        assert_eq!(full.status, 409);

        let reroll = dispatch(
            &mut registry,
            Route::Reroll(code.clone()),
            "",
            &format!("{{\"peer\":{host_peer}}}"),
            0,
        )
        .unwrap();
        assert_eq!(reroll["game"]["me"]["gold"], 2);

        let malformed = dispatch(&mut registry, Route::Buy(code.clone()), "", "{", 0).unwrap_err();
        assert_eq!(malformed.status, 400);

        let view = dispatch(
            &mut registry,
            Route::View(code.clone()),
            &format!("peer={host_peer}"),
            "",
            0,
        )
        .unwrap();
        assert!(view["game"]["opponent"]["gold"].is_null());

        let left = dispatch(
            &mut registry,
            Route::Leave(code.clone()),
            "",
            &format!("{{\"peer\":{host_peer}}}"),
            0,
        )
        .unwrap();
        assert_eq!(left["closed"], code.as_str());

        let guest_peer = guest["peer"].as_u64().unwrap();
        let gone = dispatch(
            &mut registry,
            Route::View(code),
            &format!("peer={guest_peer}"),
            "",
            0,
        )
        .unwrap_err();
        assert_eq!(gone.status, 404);
        assert_eq!(gone.message, "opponent left");
    }
}
