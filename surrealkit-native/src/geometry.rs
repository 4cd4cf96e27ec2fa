//! Geospatial values, carried across the boundary by value.

use std::fmt;

/// A planar coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Longitude or x.
    pub x: f64,
    /// Latitude or y.
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A polygon: one exterior ring and any number of holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Outer boundary.
    pub exterior: Vec<Point>,
    /// Holes cut out of the exterior.
    pub interiors: Vec<Vec<Point>>,
}

/// A geometry value, shaped after the GeoJSON geometry types.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Single position.
    Point(Point),
    /// Connected sequence of positions.
    Line(Vec<Point>),
    /// Area with optional holes.
    Polygon(Polygon),
    /// Unconnected positions.
    MultiPoint(Vec<Point>),
    /// Several lines.
    MultiLine(Vec<Vec<Point>>),
    /// Several polygons.
    MultiPolygon(Vec<Polygon>),
    /// Heterogeneous collection.
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// GeoJSON `type` member for this geometry.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::Line(_) => "LineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPoint(_) => "MultiPoint",
            Self::MultiLine(_) => "MultiLineString",
            Self::MultiPolygon(_) => "MultiPolygon",
            Self::Collection(_) => "GeometryCollection",
        }
    }
}

fn write_point(f: &mut fmt::Formatter<'_>, p: Point) -> fmt::Result {
    write!(f, "[{}, {}]", p.x, p.y)
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut each: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        each(f, item)?;
    }
    f.write_str("]")
}

fn write_ring(f: &mut fmt::Formatter<'_>, ring: &[Point]) -> fmt::Result {
    write_list(f, ring, |f, p| write_point(f, *p))
}

fn write_polygon(f: &mut fmt::Formatter<'_>, polygon: &Polygon) -> fmt::Result {
    f.write_str("[")?;
    write_ring(f, &polygon.exterior)?;
    for hole in &polygon.interiors {
        f.write_str(", ")?;
        write_ring(f, hole)?;
    }
    f.write_str("]")
}

fn write_coordinates(f: &mut fmt::Formatter<'_>, geometry: &Geometry) -> fmt::Result {
    match geometry {
        Geometry::Point(p) => write_point(f, *p),
        Geometry::Line(points) | Geometry::MultiPoint(points) => write_ring(f, points),
        Geometry::Polygon(polygon) => write_polygon(f, polygon),
        Geometry::MultiLine(lines) => write_list(f, lines, |f, line| write_ring(f, line)),
        Geometry::MultiPolygon(polygons) => write_list(f, polygons, write_polygon),
        Geometry::Collection(geometries) => write_list(f, geometries, write_coordinates),
    }
}

/// SurrealQL text: points as `(x, y)`, everything else as a GeoJSON-shaped
/// object.
impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(p) => write!(f, "({}, {})", p.x, p.y),
            Self::Collection(geometries) => {
                write!(f, "{{ type: '{}', geometries: ", self.type_name())?;
                write_list(f, geometries, |f, g| fmt::Display::fmt(g, f))?;
                f.write_str(" }")
            }
            other => {
                write!(f, "{{ type: '{}', coordinates: ", other.type_name())?;
                write_coordinates(f, other)?;
                f.write_str(" }")
            }
        }
    }
}
