#![forbid(unsafe_code)]

use crate::dto::{ActivityCreate, BuildingCreate, OrganizationCreate};
use crate::service::DirectoryService;
use crate::session_log::SessionLog;
use od_storage::StoreError;
use serde_json::{Value, json};

/// One JSON object per line: `{"op": ..., "api_key": ..., ...params}`.
/// Responses are `{"success": true, "result": ...}` or
/// `{"success": false, "error": {"code", "message"}}`.
pub struct LineServer {
    service: DirectoryService,
    api_key: String,
    log: SessionLog,
}

impl LineServer {
    pub fn new(service: DirectoryService, api_key: String, log: SessionLog) -> Self {
        Self {
            service,
            api_key,
            log,
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Value {
        match serde_json::from_str::<Value>(line) {
            Ok(request) => self.handle(request),
            Err(_) => {
                self.log.note_error("request is not valid json");
                error_response("INVALID_REQUEST", "request must be a json object")
            }
        }
    }

    pub fn handle(&mut self, request: Value) -> Value {
        if !request.is_object() {
            self.log.note_error("request is not an object");
            return error_response("INVALID_REQUEST", "request must be a json object");
        }
        let Some(op) = request.get("op").and_then(Value::as_str).map(str::to_string) else {
            self.log.note_error("op is missing");
            return error_response("INVALID_REQUEST", "op must be a string");
        };
        self.log.note_op(&op);

        // Liveness probe; the only op that skips the key check.
        if op == "ping" {
            return ok_response(json!({ "status": "ok" }));
        }

        let provided = request.get("api_key").and_then(Value::as_str);
        if provided != Some(self.api_key.as_str()) {
            self.log.note_error("invalid api key");
            return error_response("INVALID_API_KEY", "Invalid API key");
        }

        let response = self.dispatch(&op, &request);
        if let Some(message) = response
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
        {
            self.log.note_error(message);
        }
        response
    }

    pub fn note_exit(&mut self, reason: &str) {
        self.log.note_exit(reason);
    }

    fn dispatch(&mut self, op: &str, request: &Value) -> Value {
        match op {
            "list_buildings" => match self.service.list_buildings() {
                Ok(buildings) => ok_payload(&buildings),
                Err(err) => store_error_response(err),
            },
            "create_building" => {
                let payload = match parse_payload::<BuildingCreate>(request) {
                    Ok(payload) => payload,
                    Err(response) => return response,
                };
                match self.service.create_building(payload) {
                    Ok(building) => ok_payload(&building),
                    Err(err) => store_error_response(err),
                }
            }
            "list_activities" => match self.service.list_activities() {
                Ok(activities) => ok_payload(&activities),
                Err(err) => store_error_response(err),
            },
            "create_activity" => {
                let payload = match parse_payload::<ActivityCreate>(request) {
                    Ok(payload) => payload,
                    Err(response) => return response,
                };
                match self.service.create_activity(payload) {
                    Ok(activity) => ok_payload(&activity),
                    Err(err) => store_error_response(err),
                }
            }
            "get_organization" => {
                let id = match require_i64(request, "id") {
                    Ok(id) => id,
                    Err(response) => return response,
                };
                match self.service.get_organization(id) {
                    Ok(Some(organization)) => ok_payload(&organization),
                    Ok(None) => error_response("NOT_FOUND", "Organization not found"),
                    Err(err) => store_error_response(err),
                }
            }
            "search_organizations" => {
                let name = match require_name(request, "name") {
                    Ok(name) => name,
                    Err(response) => return response,
                };
                match self.service.search_organizations(&name) {
                    Ok(organizations) => ok_payload(&organizations),
                    Err(err) => store_error_response(err),
                }
            }
            "create_organization" => {
                let payload = match parse_payload::<OrganizationCreate>(request) {
                    Ok(payload) => payload,
                    Err(response) => return response,
                };
                match self.service.create_organization(payload) {
                    Ok(organization) => ok_payload(&organization),
                    Err(err) => store_error_response(err),
                }
            }
            "organizations_in_building" => {
                let building_id = match require_i64(request, "building_id") {
                    Ok(id) => id,
                    Err(response) => return response,
                };
                match self.service.organizations_in_building(building_id) {
                    Ok(organizations) => ok_payload(&organizations),
                    Err(err) => store_error_response(err),
                }
            }
            "organizations_by_activity" => {
                let activity_id = match require_i64(request, "activity_id") {
                    Ok(id) => id,
                    Err(response) => return response,
                };
                match self.service.organizations_by_activity(activity_id) {
                    Ok(organizations) => ok_payload(&organizations),
                    Err(err) => store_error_response(err),
                }
            }
            "organizations_by_activity_name" => {
                let name = match require_name(request, "name") {
                    Ok(name) => name,
                    Err(response) => return response,
                };
                match self.service.organizations_by_activity_name(&name) {
                    Ok(organizations) => ok_payload(&organizations),
                    Err(err) => store_error_response(err),
                }
            }
            "organizations_in_area" => {
                let lat = match require_f64(request, "lat") {
                    Ok(value) => value,
                    Err(response) => return response,
                };
                let lon = match require_f64(request, "lon") {
                    Ok(value) => value,
                    Err(response) => return response,
                };
                let width_m = match require_positive_f64(request, "width_m") {
                    Ok(value) => value,
                    Err(response) => return response,
                };
                let height_m = match require_positive_f64(request, "height_m") {
                    Ok(value) => value,
                    Err(response) => return response,
                };
                match self.service.organizations_in_area(lat, lon, width_m, height_m) {
                    Ok(organizations) => ok_payload(&organizations),
                    Err(err) => store_error_response(err),
                }
            }
            _ => error_response("UNKNOWN_OP", &format!("Unknown op: {op}")),
        }
    }
}

fn ok_response(result: Value) -> Value {
    json!({ "success": true, "result": result })
}

fn ok_payload<T: serde::Serialize>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(payload) => ok_response(payload),
        Err(err) => error_response("INTERNAL", &format!("response serialization failed: {err}")),
    }
}

fn error_response(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "error": { "code": code, "message": message }
    })
}

fn store_error_response(err: StoreError) -> Value {
    match err {
        StoreError::UnknownParentActivity => {
            error_response("PARENT_ACTIVITY_NOT_FOUND", "Parent activity not found")
        }
        StoreError::ActivityDepthExceeded => {
            error_response("ACTIVITY_DEPTH_EXCEEDED", "Maximum activity depth is 3 levels")
        }
        StoreError::UnknownBuilding => error_response("UNKNOWN_BUILDING", "Building not found"),
        StoreError::InvalidInput(message) => error_response("INVALID_REQUEST", message),
        StoreError::Io(err) => error_response("STORAGE", &format!("io: {err}")),
        StoreError::Sql(err) => error_response("STORAGE", &format!("sqlite: {err}")),
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(request: &Value) -> Result<T, Value> {
    serde_json::from_value(request.clone())
        .map_err(|err| error_response("INVALID_REQUEST", &format!("invalid payload: {err}")))
}

fn require_i64(request: &Value, key: &str) -> Result<i64, Value> {
    request
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| error_response("INVALID_REQUEST", &format!("{key} must be an integer")))
}

fn require_f64(request: &Value, key: &str) -> Result<f64, Value> {
    request
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| error_response("INVALID_REQUEST", &format!("{key} must be a number")))
}

fn require_positive_f64(request: &Value, key: &str) -> Result<f64, Value> {
    let value = require_f64(request, key)?;
    if value <= 0.0 {
        return Err(error_response(
            "INVALID_REQUEST",
            &format!("{key} must be positive"),
        ));
    }
    Ok(value)
}

fn require_name(request: &Value, key: &str) -> Result<String, Value> {
    let value = request.get(key).and_then(Value::as_str).unwrap_or("");
    if value.is_empty() {
        return Err(error_response(
            "INVALID_REQUEST",
            &format!("{key} must be a non-empty string"),
        ));
    }
    Ok(value.to_string())
}
