//! Wire types for the courier's rate/booking/tracking endpoints.
//!
//! These mirror the provider's camelCase JSON exactly; normalization into
//! the domain shapes happens in `courier.rs` and either converts the whole
//! payload or fails — partially normalized results never escape.

use serde::Deserialize;

/// `GET /rates` response.
#[derive(Debug, Deserialize)]
pub struct RateResponse {
    #[serde(default)]
    pub products: Vec<RatedProduct>,
}

/// One rated product option.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedProduct {
    pub product_code: String,
    pub product_name: String,
    pub total_price: f64,
    pub currency: String,
    pub delivery_time: String,
    #[serde(default)]
    pub cutoff_time: Option<String>,
}

/// `POST /shipments` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub shipment_tracking_number: String,
    #[serde(default)]
    pub documents: Vec<WireDocument>,
    #[serde(default)]
    pub shipment_charges: Vec<WireCharge>,
}

/// A base64-encoded document returned with a booking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    pub type_code: String,
    /// Base64 payload; only its decoded size is kept on the artifact.
    pub content: String,
}

/// One charge component of a booking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCharge {
    pub price: f64,
    pub currency: String,
}

/// `GET /shipments/{ref}/tracking` response.
#[derive(Debug, Deserialize)]
pub struct TrackingResponse {
    #[serde(default)]
    pub shipments: Vec<WireShipmentTracking>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireShipmentTracking {
    #[serde(default)]
    pub events: Vec<WireTrackingEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTrackingEvent {
    /// Provider status code, e.g. "PU", "TR", "OK".
    pub status_code: String,
    #[serde(default)]
    pub location: Option<String>,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    #[serde(default)]
    pub description: String,
}
