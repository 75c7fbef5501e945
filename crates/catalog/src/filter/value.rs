//! Typed filter values.
//!
//! A [`FilterValue`] is what a single-field filter extracts from raw query
//! parameters and what the query layer receives as a keyword argument.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::FilterError;

/// A longitude/latitude position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned extent of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// A polygon in EPSG:4326, described by its exterior ring.
///
/// Interior rings are not supported; bounding-box filters never produce them.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Vec<Coord>,
}

impl Polygon {
    /// Build a polygon from a raw exterior ring. No validation is performed.
    pub fn new(exterior: Vec<Coord>) -> Self {
        Self { exterior }
    }

    /// Build the rectangle spanning the given bounds.
    ///
    /// The ring starts at `(max_lon, min_lat)` and runs counter-clockwise,
    /// which is the ring order GIS `box()` constructors emit.
    pub fn from_bounds(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self::new(vec![
            Coord::new(max_lon, min_lat),
            Coord::new(max_lon, max_lat),
            Coord::new(min_lon, max_lat),
            Coord::new(min_lon, min_lat),
            Coord::new(max_lon, min_lat),
        ])
    }

    /// Parse a single-ring `POLYGON ((x y, ...))` WKT string.
    pub fn from_wkt(wkt: &str) -> Result<Self, FilterError> {
        let trimmed = wkt.trim();
        let body = trimmed
            .get(..7)
            .filter(|prefix| prefix.eq_ignore_ascii_case("POLYGON"))
            .map(|_| trimmed[7..].trim())
            .ok_or_else(|| FilterError::InvalidGeometry(format!("not a POLYGON: {trimmed}")))?;

        let rings = body
            .strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .map(str::trim)
            .ok_or_else(|| FilterError::InvalidGeometry(format!("malformed POLYGON: {trimmed}")))?;

        let ring = rings
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| FilterError::InvalidGeometry(format!("malformed ring: {rings}")))?;

        if ring.contains('(') || ring.contains(')') {
            return Err(FilterError::InvalidGeometry(
                "only single-ring polygons are supported".to_string(),
            ));
        }

        let exterior = ring
            .split(',')
            .map(|position| {
                let mut parts = position.split_whitespace().map(str::parse::<f64>);
                match (parts.next(), parts.next()) {
                    (Some(Ok(x)), Some(Ok(y))) => Ok(Coord::new(x, y)),
                    _ => Err(FilterError::InvalidGeometry(format!(
                        "malformed position: {:?}",
                        position.trim()
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(exterior))
    }

    /// Render as WKT, with integral coordinates printed without a fraction.
    pub fn to_wkt(&self) -> String {
        let positions: Vec<String> = self
            .exterior
            .iter()
            .map(|c| format!("{} {}", c.x, c.y))
            .collect();
        format!("POLYGON (({}))", positions.join(", "))
    }

    pub fn exterior(&self) -> &[Coord] {
        &self.exterior
    }

    /// Normalised extent of the exterior ring.
    pub fn bounds(&self) -> Bounds {
        self.exterior.iter().fold(
            Bounds {
                min_lon: f64::INFINITY,
                min_lat: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
                max_lat: f64::NEG_INFINITY,
            },
            |acc, c| Bounds {
                min_lon: acc.min_lon.min(c.x),
                min_lat: acc.min_lat.min(c.y),
                max_lon: acc.max_lon.max(c.x),
                max_lat: acc.max_lat.max(c.y),
            },
        )
    }

    /// Unsigned shoelace area of the exterior ring.
    pub fn area(&self) -> f64 {
        let twice: f64 = self
            .exterior
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum();
        (twice / 2.0).abs()
    }

    /// Whether the ring describes a simple polygon with a non-zero area.
    ///
    /// Degenerate boxes (a point or a line, e.g. all four bounds equal) are
    /// invalid, as are bow-ties and rings with non-finite coordinates.
    pub fn is_valid(&self) -> bool {
        if self.exterior.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return false;
        }
        if self.exterior.first() != self.exterior.last() {
            return false;
        }

        let mut ring: Vec<Coord> = Vec::with_capacity(self.exterior.len());
        for c in &self.exterior {
            if ring.last() != Some(c) {
                ring.push(*c);
            }
        }
        if ring.len() < 4 || Self::new(ring.clone()).area() == 0.0 {
            return false;
        }

        let segments: Vec<(Coord, Coord)> = ring.windows(2).map(|w| (w[0], w[1])).collect();
        let n = segments.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = segments[i];
                let (c, d) = segments[j];
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    // Adjacent segments share one endpoint; they must not fold back.
                    let (shared, before, after) = if j == i + 1 { (b, a, d) } else { (a, b, c) };
                    if orientation(before, shared, after) == 0.0
                        && (before.x - shared.x) * (after.x - shared.x)
                            + (before.y - shared.y) * (after.y - shared.y)
                            > 0.0
                    {
                        return false;
                    }
                } else if segments_intersect(a, b, c, d) {
                    return false;
                }
            }
        }
        true
    }
}

fn orientation(p: Coord, q: Coord, r: Coord) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

/// `r` is collinear with `p`-`q`; check it lies within the segment's box.
fn on_segment(p: Coord, q: Coord, r: Coord) -> bool {
    r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
}

fn segments_intersect(p1: Coord, p2: Coord, p3: Coord, p4: Coord) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

/// A begin/end date range. At least one side is set when built from params.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TemporalExtentFilterValue {
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// The value carried by a single-field filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Spatial intersect polygon.
    BoundingBox(Polygon),
    /// Temporal overlap range.
    TemporalExtent(TemporalExtentFilterValue),
    /// Name fragment, vocabulary slug/id or scoping id.
    Text(String),
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            FilterValue::BoundingBox(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_temporal_extent(&self) -> Option<&TemporalExtentFilterValue> {
        match self {
            FilterValue::TemporalExtent(t) => Some(t),
            _ => None,
        }
    }
}
