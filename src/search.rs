use crate::error::{Result, StacError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;

/// How a search geometry is compared with the geometry of each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialOperation {
    /// Items that intersect the search geometry.
    #[default]
    Intersect,
    /// Items contained inside the search geometry.
    Contains,
    /// Items whose bounding box intersects the bounding box of the search geometry.
    IntersectBbox,
}

impl SpatialOperation {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Intersect => "intersect",
            Self::Contains => "contains",
            Self::IntersectBbox => "bbox",
        }
    }
}

impl fmt::Display for SpatialOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub catalog_id: Option<String>,
    pub bbox: Option<Vec<f64>>,
    pub geometry: Option<Value>,
    pub spatial_operation: SpatialOperation,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub item_ids: Vec<String>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = Some(catalog_id.into());
        self
    }

    pub fn bbox(mut self, bbox: Vec<f64>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn geometry(mut self, geometry: Value) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn spatial_operation(mut self, op: SpatialOperation) -> Self {
        self.spatial_operation = op;
        self
    }

    pub fn time_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_datetime = Some(start);
        self.end_datetime = Some(end);
        self
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Build the JSON body sent to the search endpoint.
    pub fn to_body(self: &Self) -> Result<Value> {
        let mut body = Map::new();

        if let Some(bbox) = &self.bbox {
            if bbox.len() != 4 && bbox.len() != 6 {
                return Err(StacError::InvalidArgument(format!(
                    "bbox must have 4 or 6 coordinates, got {}",
                    bbox.len()
                )));
            }
            body.insert("bbox".to_string(), Value::from(bbox.clone()));
        }

        if let Some(geometry) = &self.geometry {
            if !geometry.is_object() {
                return Err(StacError::InvalidArgument(
                    "geometry must be a GeoJSON object".to_string(),
                ));
            }
            body.insert("geometry".to_string(), geometry.clone());
        }

        body.insert(
            "spatial_operation".to_string(),
            Value::from(self.spatial_operation.as_str()),
        );

        match (&self.start_datetime, &self.end_datetime) {
            (Some(start), Some(end)) => {
                let time = format!(
                    "{}/{}",
                    format_datetime_iso8601(start),
                    format_datetime_iso8601(end)
                );
                body.insert("time".to_string(), Value::from(time));
            }
            (None, None) => {}
            _ => {
                return Err(StacError::InvalidArgument(
                    "A time range needs both a start and an end datetime"
                        .to_string(),
                ))
            }
        }

        if !self.item_ids.is_empty() {
            body.insert("id".to_string(), Value::from(self.item_ids.join(",")));
        }

        Ok(Value::Object(body))
    }
}

/// Format a timestamp the way the catalog stores them, e.g. `2017-01-01T00:00:00.000000Z`.
pub fn format_datetime_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_spatial_operation_names() {
        assert_eq!(SpatialOperation::Intersect.to_string(), "intersect");
        assert_eq!(SpatialOperation::Contains.to_string(), "contains");
        assert_eq!(SpatialOperation::IntersectBbox.to_string(), "bbox");
        assert_eq!(SpatialOperation::default(), SpatialOperation::Intersect);
    }

    #[test]
    fn test_format_datetime() {
        let dt = Utc.with_ymd_and_hms(2017, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_datetime_iso8601(&dt), "2017-01-02T03:04:05.000000Z");
    }

    #[test]
    fn test_default_body() {
        let body = SearchRequest::new().to_body().unwrap();
        assert_eq!(body, json!({"spatial_operation": "intersect"}));
    }

    #[test]
    fn test_full_body() {
        let geometry = json!({"type": "Point", "coordinates": [-105.0, 40.0]});
        let body = SearchRequest::new()
            .bbox(vec![-106.0, 39.0, -104.0, 41.0])
            .geometry(geometry.clone())
            .spatial_operation(SpatialOperation::Contains)
            .time_range(
                Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2017, 1, 2, 0, 0, 0).unwrap(),
            )
            .ids(["a", "b"])
            .to_body()
            .unwrap();
        assert_eq!(
            body,
            json!({
                "bbox": [-106.0, 39.0, -104.0, 41.0],
                "geometry": geometry,
                "spatial_operation": "contains",
                "time": "2017-01-01T00:00:00.000000Z/2017-01-02T00:00:00.000000Z",
                "id": "a,b"
            })
        );
    }

    #[test]
    fn test_half_time_range_rejected() {
        let mut request = SearchRequest::new();
        request.start_datetime = Some(Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap());
        assert!(matches!(request.to_body(), Err(StacError::InvalidArgument(_))));
    }

    #[test]
    fn test_bad_bbox_rejected() {
        let request = SearchRequest::new().bbox(vec![1.0, 2.0, 3.0]);
        assert!(request.to_body().is_err());
    }

    #[test]
    fn test_bad_geometry_rejected() {
        let request = SearchRequest::new().geometry(json!("bad geometry"));
        assert!(request.to_body().is_err());
    }
}
