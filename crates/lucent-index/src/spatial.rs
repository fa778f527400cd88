//! Location queries.
//!
//! Conditions on `location` fields never go through standard compilation. They are handed
//! to a [`SpatialQueries`] implementation, which may turn them into a query or skip them.

use lucent_query::{Condition, Operand, Operator, Value};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{CompileError, escape::exists_query, schema::FieldDescriptor};

/// Builds queries for conditions on location fields.
pub trait SpatialQueries {
    /// Compiles one condition on a location field.
    ///
    /// `field_name` is the backend name of the field. Returns `Ok(None)` to contribute no
    /// filter for the condition.
    fn condition(
        &self,
        field: &FieldDescriptor,
        field_name: &str,
        condition: &Condition,
    ) -> Result<Option<String>, CompileError>;
}

/// Skips every location condition.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkipSpatial;

impl SpatialQueries for SkipSpatial {
    fn condition(
        &self,
        field: &FieldDescriptor,
        _field_name: &str,
        condition: &Condition,
    ) -> Result<Option<String>, CompileError> {
        warn!(
            field = %field.id,
            operator = %condition.operator,
            "location condition skipped; enable a spatial builder to filter on it"
        );
        Ok(None)
    }
}

/// Compiles distance conditions into `geofilt` queries.
///
/// Supported forms:
/// - `field < "lat,lon,km"` and `field <= "lat,lon,km"`: within `km` of the point
/// - `field = NULL` and `field <> NULL`: absence and presence
#[derive(Debug, Default, Clone, Copy)]
pub struct GeofiltSpatial;

impl SpatialQueries for GeofiltSpatial {
    fn condition(
        &self,
        field: &FieldDescriptor,
        field_name: &str,
        condition: &Condition,
    ) -> Result<Option<String>, CompileError> {
        let query = match (condition.operator, &condition.value) {
            (Operator::Eq, Operand::Null) => format!("-{}", exists_query(field_name)),
            (Operator::Neq, Operand::Null) => exists_query(field_name),
            (Operator::Lt | Operator::Lte, Operand::Scalar(Value::String(spec))) => {
                let filter = LocationFilter::parse(&field.id, spec).ok_or_else(|| {
                    CompileError::invalid_operand(
                        &field.id,
                        condition.operator,
                        format!("expected \"lat,lon,km\", got \"{spec}\""),
                    )
                })?;
                // Local params only parse at the start of a query, so nest the filter.
                format!(
                    "_query_:\"{}\"",
                    geofilt(field_name, filter.lat, filter.lon, filter.radius_km)
                )
            }
            _ => {
                return Err(CompileError::unsupported(
                    &field.id,
                    field.data_type,
                    condition.operator,
                ));
            }
        };
        Ok(Some(query))
    }
}

/// Formats a `geofilt` filter.
pub fn geofilt(field_name: &str, lat: f64, lon: f64, radius_km: f64) -> String {
    format!("{{!geofilt sfield={field_name} pt={lat},{lon} d={radius_km}}}")
}

/// A radius filter around a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFilter {
    /// Location field id.
    pub field: String,
    /// Latitude of the center.
    pub lat: f64,
    /// Longitude of the center.
    pub lon: f64,
    /// Radius in kilometers.
    pub radius_km: f64,
}

impl LocationFilter {
    /// Parses `"lat,lon,km"`.
    fn parse(field: &str, spec: &str) -> Option<Self> {
        let mut parts = spec.split(',').map(|p| p.trim().parse::<f64>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(lat)), Some(Ok(lon)), Some(Ok(radius_km)), None) => Some(Self {
                field: field.to_string(),
                lat,
                lon,
                radius_km,
            }),
            _ => None,
        }
    }
}
