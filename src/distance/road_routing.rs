use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use super::geo::haversine_km;
use crate::domain::route::{duration_minutes, Route};
use crate::domain::types::ProblemInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometrySource {
    Road,
    StraightLine,
}

/// Display geometry for one route. Never fed back into route costs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadGeometry {
    /// (latitude, longitude) pairs.
    pub coordinates: Vec<(f64, f64)>,
    pub distance_km: f64,
    pub duration_min: u64,
    pub source: GeometrySource,
}

/// Stop coordinates of `route` in visiting order.
pub fn route_coordinates(route: &Route, pi: &ProblemInstance) -> Vec<(f64, f64)> {
    route
        .stops()
        .iter()
        .map(|s| {
            let loc = &pi.locations[s.location];
            (loc.latitude, loc.longitude)
        })
        .collect()
}

/// Polyline through the stops themselves, with great-circle length.
pub fn straight_line(coords: &[(f64, f64)]) -> RoadGeometry {
    let distance_km: f64 = coords
        .windows(2)
        .map(|w| haversine_km(w[0].0, w[0].1, w[1].0, w[1].1))
        .sum();

    RoadGeometry {
        coordinates: coords.to_vec(),
        distance_km,
        duration_min: duration_minutes(distance_km),
        source: GeometrySource::StraightLine,
    }
}

/// Road-following geometry from OSRM, or the straight-line fallback when the
/// lookup fails or times out.
pub async fn route_geometry(client: &Client, base_url: &str, coords: &[(f64, f64)]) -> RoadGeometry {
    match fetch_osrm_route(client, base_url, coords).await {
        Some(geometry) => geometry,
        None => {
            warn!("Falling back to straight-line geometry ({} stops)", coords.len());
            straight_line(coords)
        }
    }
}

async fn fetch_osrm_route(client: &Client, base_url: &str, coords: &[(f64, f64)]) -> Option<RoadGeometry> {
    if coords.len() < 2 {
        error!("fetch_osrm_route: need at least two coordinates");
        return None;
    }

    let coord_str = coords
        .iter()
        .map(|(lat, lon)| format!("{},{}", lon, lat))
        .collect::<Vec<String>>()
        .join(";");
    let url = format!("{}/{}?overview=full&geometries=geojson", base_url, coord_str);
    debug!("Built OSRM URL: {} ({} chars)", url, url.len());

    let response = match client
        .get(&url)
        .timeout(Duration::from_secs(30))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => resp,
        Ok(resp) => {
            error!("OSRM returned HTTP {}", resp.status());
            return None;
        }
        Err(e) => {
            error!("OSRM request failed: {} (coords: {})", e, coords.len());
            return None;
        }
    };

    let json: Value = match response.json().await {
        Ok(js) => js,
        Err(e) => {
            error!("Failed to parse OSRM JSON: {}", e);
            return None;
        }
    };

    let geometry = parse_osrm_route(&json);
    if geometry.is_some() {
        info!("Retrieved road geometry from OSRM ({} stops)", coords.len());
    }
    geometry
}

/// Reads the first route of an OSRM `route` response.
pub fn parse_osrm_route(json: &Value) -> Option<RoadGeometry> {
    let route = json["routes"].as_array()?.first()?;

    let coordinates = route["geometry"]["coordinates"]
        .as_array()?
        .iter()
        .filter_map(|pair| {
            let pair = pair.as_array()?;
            let lon = pair.first()?.as_f64()?;
            let lat = pair.get(1)?.as_f64()?;
            Some((lat, lon))
        })
        .collect::<Vec<(f64, f64)>>();
    trace!("OSRM geometry has {} points", coordinates.len());

    let distance_km = route["distance"].as_f64().unwrap_or(0.0) / 1000.0;
    let duration_min = (route["duration"].as_f64().unwrap_or(0.0) / 60.0).round() as u64;

    Some(RoadGeometry {
        coordinates,
        distance_km,
        duration_min,
        source: GeometrySource::Road,
    })
}
