//! Trip cost estimation endpoint
//!
//! Handles `POST /calculate`: decodes the flat JSON body describing trip
//! parameters and returns the itemized cost breakdown.

use crate::http;
use crate::logger;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

/// Trip parameters extracted from the request body.
///
/// Every numeric field defaults when absent: `days`, `travelers` and `rooms`
/// to 1, the per-unit costs to 0, `destinations` to an empty list.
#[derive(Debug, PartialEq, Eq)]
pub struct TripRequest {
    pub days: i64,
    pub travelers: i64,
    pub rooms: i64,
    pub cuisine_cost: i64,
    pub hotel_cost: i64,
    pub travel_cost: i64,
    /// Comma-separated per-destination costs, e.g. `"100,200"`
    pub destinations: String,
}

/// Itemized costs returned to the client.
///
/// `total` is the grand total including tax; the key name is part of the
/// client contract and must not change.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CostBreakdown {
    pub destinations: i64,
    pub food: i64,
    pub hotel: i64,
    pub travel: i64,
    pub tax: i64,
    pub total: i64,
}

/// Handle a `POST /calculate` request
pub async fn handle<B>(req: Request<B>) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return http::bad_request("failed to read request body");
        }
    };

    match estimate(&body) {
        Ok(breakdown) => http::json_response(StatusCode::OK, &breakdown),
        Err(e) => {
            logger::log_warning(&format!("Rejected /calculate request: {e}"));
            http::bad_request(&e)
        }
    }
}

/// Decode the body and compute the breakdown
fn estimate(body: &[u8]) -> Result<CostBreakdown, String> {
    parse_body(body)?.breakdown()
}

/// Decode the request body into a `TripRequest`.
///
/// An empty body is treated like `{}`: every field at its default.
fn parse_body(body: &[u8]) -> Result<TripRequest, String> {
    let fields = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {e}"))?
    };
    TripRequest::from_fields(&fields)
}

impl TripRequest {
    /// Extract trip parameters from a flat JSON object
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, String> {
        Ok(Self {
            days: int_field(fields, "days", 1)?,
            travelers: int_field(fields, "travelers", 1)?,
            rooms: int_field(fields, "rooms", 1)?,
            cuisine_cost: int_field(fields, "cuisineCost", 0)?,
            hotel_cost: int_field(fields, "hotelCost", 0)?,
            travel_cost: int_field(fields, "travelCost", 0)?,
            destinations: string_field(fields, "destinations")?,
        })
    }

    /// Compute the itemized cost breakdown
    pub fn breakdown(&self) -> Result<CostBreakdown, String> {
        let destinations = self.destination_total()?;
        let food = self.cuisine_cost * 3 * self.days * self.travelers;
        let hotel = self.hotel_cost * self.days * self.rooms;
        let travel = self.travel_cost * self.travelers;
        let subtotal = destinations + food + hotel + travel;
        // 5% tax, truncated toward zero like the integer cast it replaces
        let tax = subtotal / 20;

        Ok(CostBreakdown {
            destinations,
            food,
            hotel,
            travel,
            tax,
            total: subtotal + tax,
        })
    }

    /// Sum the comma-separated per-destination costs, each multiplied by the
    /// number of days. An empty list contributes nothing.
    fn destination_total(&self) -> Result<i64, String> {
        if self.destinations.trim().is_empty() {
            return Ok(0);
        }

        let mut total = 0;
        for token in self.destinations.split(',') {
            let cost: i64 = token.trim().parse().map_err(|_| {
                format!("destination cost '{}' is not an integer", token.trim())
            })?;
            total += cost * self.days;
        }
        Ok(total)
    }
}

/// Read an integer field, accepting JSON numbers and numeric strings.
/// Absent fields take the documented default; anything unparseable is an error.
fn int_field(fields: &Map<String, Value>, key: &str, default: i64) -> Result<i64, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| format!("field '{key}' is not an integer")),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| format!("field '{key}' is not an integer")),
        Some(_) => Err(format!("field '{key}' is not an integer")),
    }
}

/// Read the destinations field. A bare number reads as a single-entry list.
fn string_field(fields: &Map<String, Value>, key: &str) -> Result<String, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.as_i64().is_some() => Ok(n.to_string()),
        Some(_) => Err(format!("field '{key}' must be a comma-separated string")),
    }
}
