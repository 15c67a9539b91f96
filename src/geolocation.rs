// THEORY:
// The geolocation module is the boundary to the outside service that turns IP
// addresses into coordinates. The engine never sees this module's types; it only
// receives `(lat, lon, label, payload)` tuples derived from them.
//
// Key pieces:
// 1.  **Wire Record**: `GeoRecord` mirrors the provider's JSON answer. Every field
//     except `status` may be missing.
// 2.  **Provider Seam**: `GeoProvider` is a blocking, one-address-at-a-time
//     lookup. `IpApiProvider` is the HTTP implementation; tests plug in maps.
// 3.  **Per-Item Failure**: A lookup failure is a value, not a panic or an abort.
//     The batch runner reports it and moves on to the next address.
// 4.  **Presentation Helpers**: Parsing the typed address list and rendering the
//     detail text live here too, since both only make sense for this record shape.

use crate::config::LookupConfig;
use crate::core_modules::geo_point::GeoPoint;
use crate::core_modules::marker::Payload;
use crate::error::{InputError, LookupError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;

/// The prompt shown in an empty address box. Never treated as an address.
pub const INPUT_PLACEHOLDER: &str = "Enter multiple IP addresses (one per line)";

const SUCCESS_STATUS: &str = "success";
const UNKNOWN: &str = "Unknown";

/// One answer from the geolocation provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoRecord {
    /// `success` or `fail`.
    pub status: String,
    /// Only present on failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "regionName", skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Autonomous system, e.g. `AS15169 Google LLC`.
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub autonomous_system: Option<String>,
    /// The address the provider actually resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl GeoRecord {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// The record's coordinate, when the provider supplied both halves.
    pub fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.lat?, self.lon?))
    }

    /// Pin text: `"{city}, {country}"`, with blanks for missing parts.
    pub fn marker_label(&self) -> String {
        format!(
            "{}, {}",
            self.city.as_deref().unwrap_or(""),
            self.country.as_deref().unwrap_or("")
        )
    }

    /// Converts the record into the opaque payload carried by a marker, adding
    /// the address that was originally asked for under `ip`.
    pub fn into_payload(self, ip: &str) -> Payload {
        let mut payload = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Payload::new(),
        };
        payload.insert("ip".to_string(), Value::String(ip.to_string()));
        payload
    }
}

/// Turns a provider answer into a result: anything but `success` is a rejection.
pub fn check_status(record: GeoRecord) -> Result<GeoRecord, LookupError> {
    if record.is_success() {
        Ok(record)
    } else {
        Err(LookupError::rejected(
            record.message.unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

/// A blocking lookup of one address.
pub trait GeoProvider: Send + Sync {
    fn locate(&self, ip: &str) -> Result<GeoRecord, LookupError>;
}

/// Looks addresses up against an `ip-api.com`-compatible JSON endpoint.
pub struct IpApiProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl IpApiProvider {
    /// Builds the HTTP client. Must not be called from inside an async task.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, ip: &str) -> String {
        format!("{}/{}", self.base_url, ip)
    }
}

impl GeoProvider for IpApiProvider {
    fn locate(&self, ip: &str) -> Result<GeoRecord, LookupError> {
        let response = self
            .client
            .get(self.url_for(ip))
            .send()
            .map_err(classify)?;
        let record: GeoRecord = response.json().map_err(classify)?;
        check_status(record)
    }
}

fn classify(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout
    } else if err.is_decode() {
        LookupError::Malformed(err.to_string())
    } else {
        LookupError::Transport(err.to_string())
    }
}

/// Splits typed input into addresses: one per line, trimmed, blanks and the
/// placeholder prompt dropped.
pub fn parse_ip_list(text: &str) -> Result<Vec<String>, InputError> {
    let ips: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != INPUT_PLACEHOLDER)
        .map(str::to_string)
        .collect();

    if ips.is_empty() {
        Err(InputError::NoAddresses)
    } else {
        Ok(ips)
    }
}

fn field(payload: &Payload, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => UNKNOWN.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Renders the detail text for one located address. Missing keys show as
/// `Unknown`. The address comes from `ip` ahead of `query`, since `ip` always
/// holds what was asked for while `query` is whatever the provider echoed.
/// Entries carry no trailing rule: `MapSession::location_details` puts a
/// 40-character `=` rule between entries only, so the last one ends bare.
pub fn format_location_details(index: usize, payload: &Payload) -> String {
    let ip = if payload.contains_key("ip") {
        field(payload, "ip")
    } else {
        field(payload, "query")
    };

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Location {index}:");
    let _ = writeln!(out, "IP: {ip}");
    let _ = writeln!(out, "Country: {}", field(payload, "country"));
    let _ = writeln!(out, "City: {}", field(payload, "city"));
    let _ = writeln!(out, "Region: {}", field(payload, "regionName"));
    let _ = writeln!(out, "ZIP Code: {}", field(payload, "zip"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Network Details:");
    let _ = writeln!(out, "ISP: {}", field(payload, "isp"));
    let _ = writeln!(out, "Organization: {}", field(payload, "org"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Coordinates:");
    let _ = writeln!(out, "Latitude: {}", field(payload, "lat"));
    let _ = writeln!(out, "Longitude: {}", field(payload, "lon"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Additional Info:");
    let _ = writeln!(out, "Timezone: {}", field(payload, "timezone"));
    let _ = writeln!(out, "AS: {}", field(payload, "as"));
    out
}
