//! Route table and request dispatch.
//!
//! The router owns everything protocol-shaped: matching method + path,
//! decoding parameters from the JSON body and query string, and mapping
//! handler outcomes to a status code and envelope. Domain failures
//! (TabNotFound, LoadTimeout, script errors) are well-formed answers and
//! travel as `200` + `{success: false}`; only protocol-level problems get
//! non-200 statuses.

use std::collections::HashMap;

use nimbus_common::ControlError;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::ServerContext;
use crate::envelope::Envelope;
use crate::handlers;
use crate::handlers::navigation::HistoryAction;
use crate::http::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Navigate,
    History,
    Reload,
    GetUrl,
    GetHtml,
    ExecuteJs,
    Screenshot,
    TabInfo,
    TabCreate,
    TabSwitch,
    TabClose,
    Health,
}

/// Match a request to an endpoint. Read-style endpoints accept GET with
/// query parameters or POST with a JSON body; mutating endpoints are
/// POST-only. A wrong method on a known path is still an unknown route.
pub fn route(method: &str, path: &str) -> Option<Endpoint> {
    match (method, path) {
        ("POST", "/internal/navigate") => Some(Endpoint::Navigate),
        ("POST", "/internal/history") => Some(Endpoint::History),
        ("POST", "/internal/reload") => Some(Endpoint::Reload),
        ("GET" | "POST", "/internal/get_url") => Some(Endpoint::GetUrl),
        ("GET" | "POST", "/internal/get_html") => Some(Endpoint::GetHtml),
        ("POST", "/internal/execute_js") => Some(Endpoint::ExecuteJs),
        ("GET" | "POST", "/internal/screenshot") => Some(Endpoint::Screenshot),
        ("GET", "/internal/tab_info") => Some(Endpoint::TabInfo),
        ("POST", "/internal/tab_create") => Some(Endpoint::TabCreate),
        ("POST", "/internal/tab_switch") => Some(Endpoint::TabSwitch),
        ("POST", "/internal/tab_close") => Some(Endpoint::TabClose),
        ("GET", "/health") => Some(Endpoint::Health),
        _ => None,
    }
}

/// Decoded request parameters: the JSON body (an empty body reads as an
/// empty object) plus the query string. Body values win over query values
/// for the same key.
pub struct Params {
    body: Map<String, Value>,
    query: HashMap<String, String>,
}

impl Params {
    pub fn parse(request: &Request) -> Result<Self, String> {
        let text = request
            .body_str()
            .map_err(|_| "request body is not valid UTF-8".to_string())?;
        let body = if text.trim().is_empty() {
            Map::new()
        } else {
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                Ok(_) => return Err("request body must be a JSON object".into()),
                Err(e) => return Err(format!("invalid JSON body: {e}")),
            }
        };
        Ok(Self {
            body,
            query: request.query.clone(),
        })
    }

    fn required_str(&self, key: &str) -> Result<String, String> {
        match self.body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(format!("{key} must not be empty")),
            Some(_) => Err(format!("{key} must be a string")),
            None => Err(format!("missing required parameter: {key}")),
        }
    }

    fn optional_bool(&self, key: &str) -> Result<bool, String> {
        if let Some(value) = self.body.get(key) {
            return value
                .as_bool()
                .ok_or_else(|| format!("{key} must be a boolean"));
        }
        match self.query.get(key).map(String::as_str) {
            Some("true" | "1") => Ok(true),
            Some("false" | "0") | None => Ok(false),
            Some(_) => Err(format!("{key} must be true or false")),
        }
    }

    fn optional_tab_index(&self) -> Result<Option<usize>, String> {
        if let Some(value) = self.body.get("tabIndex") {
            let index = value
                .as_u64()
                .ok_or_else(|| "tabIndex must be a non-negative integer".to_string())?;
            return Ok(Some(index as usize));
        }
        match self.query.get("tabIndex") {
            Some(raw) => raw
                .parse::<usize>()
                .map(Some)
                .map_err(|_| "tabIndex must be a non-negative integer".to_string()),
            None => Ok(None),
        }
    }

    fn required_tab_index(&self) -> Result<usize, String> {
        self.optional_tab_index()?
            .ok_or_else(|| "missing required parameter: tabIndex".to_string())
    }
}

enum RouteError {
    BadRequest(String),
    Domain(ControlError),
}

impl From<ControlError> for RouteError {
    fn from(e: ControlError) -> Self {
        RouteError::Domain(e)
    }
}

trait BadRequestExt<T> {
    fn bad_request(self) -> Result<T, RouteError>;
}

impl<T> BadRequestExt<T> for Result<T, String> {
    fn bad_request(self) -> Result<T, RouteError> {
        self.map_err(RouteError::BadRequest)
    }
}

/// Dispatch a framed request: route, decode, run, wrap. Always returns a
/// status and a JSON body; never panics on client input.
pub async fn dispatch(ctx: &ServerContext, request: &Request) -> (u16, Value) {
    let Some(endpoint) = route(&request.method, &request.path) else {
        debug!(method = %request.method, path = %request.path, "unknown route");
        return (404, Envelope::error("endpoint not found").into_value());
    };

    let params = match Params::parse(request) {
        Ok(params) => params,
        Err(message) => return (400, Envelope::error(message).into_value()),
    };

    match run_endpoint(ctx, endpoint, params).await {
        Ok(value) => (200, value),
        Err(RouteError::BadRequest(message)) => (400, Envelope::error(message).into_value()),
        Err(RouteError::Domain(e)) => (200, Envelope::error(e).into_value()),
    }
}

async fn run_endpoint(
    ctx: &ServerContext,
    endpoint: Endpoint,
    params: Params,
) -> Result<Value, RouteError> {
    match endpoint {
        Endpoint::Navigate => {
            let url = params.required_str("url").bad_request()?;
            let tab = params.optional_tab_index().bad_request()?;
            Ok(handlers::navigation::navigate(ctx, url, tab).await?)
        }
        Endpoint::History => {
            let raw = params.required_str("action").bad_request()?;
            let action = HistoryAction::parse(&raw)
                .ok_or_else(|| RouteError::BadRequest("action must be back or forward".into()))?;
            let tab = params.optional_tab_index().bad_request()?;
            Ok(handlers::navigation::history(ctx, action, tab).await?)
        }
        Endpoint::Reload => {
            let tab = params.optional_tab_index().bad_request()?;
            let ignore_cache = params.optional_bool("ignoreCache").bad_request()?;
            Ok(handlers::navigation::reload(ctx, tab, ignore_cache).await?)
        }
        Endpoint::GetUrl => {
            let tab = params.optional_tab_index().bad_request()?;
            Ok(handlers::navigation::get_url(ctx, tab).await?)
        }
        Endpoint::GetHtml => {
            let tab = params.optional_tab_index().bad_request()?;
            Ok(handlers::content::get_html(ctx, tab).await?)
        }
        Endpoint::ExecuteJs => {
            let code = params.required_str("code").bad_request()?;
            let tab = params.optional_tab_index().bad_request()?;
            Ok(handlers::content::execute_js(ctx, code, tab).await?)
        }
        Endpoint::Screenshot => {
            let tab = params.optional_tab_index().bad_request()?;
            let full_page = params.optional_bool("fullPage").bad_request()?;
            Ok(handlers::content::screenshot(ctx, tab, full_page).await?)
        }
        Endpoint::TabInfo => Ok(handlers::tabs::tab_info(ctx).await?),
        Endpoint::TabCreate => {
            let url = params.required_str("url").bad_request()?;
            Ok(handlers::tabs::tab_create(ctx, url).await?)
        }
        Endpoint::TabSwitch => {
            let index = params.required_tab_index().bad_request()?;
            Ok(handlers::tabs::tab_switch(ctx, index).await?)
        }
        Endpoint::TabClose => {
            let index = params.required_tab_index().bad_request()?;
            Ok(handlers::tabs::tab_close(ctx, index).await?)
        }
        Endpoint::Health => Ok(handlers::health(ctx).await),
    }
}
