//! Coordinate extraction from place-page markup.
//!
//! Tiers are tried in order; a tier that finds nothing or fails to parse
//! falls through to the next one.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::types::Coordinates;

static META_LATITUDE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[property='place:location:latitude']").expect("valid selector")
});

static META_LONGITUDE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[property='place:location:longitude']").expect("valid selector")
});

static META_GEO_POSITION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name='geo.position']").expect("valid selector"));

/// Data attributes in lookup order, with the axis each one feeds.
const DATA_ATTRIBUTES: &[(&str, Axis)] = &[
    ("data-lat", Axis::Lat),
    ("data-lng", Axis::Lng),
    ("data-latitude", Axis::Lat),
    ("data-longitude", Axis::Lng),
];

static DATA_ATTRIBUTE_SELECTORS: LazyLock<Vec<(Selector, &'static str, Axis)>> =
    LazyLock::new(|| {
        DATA_ATTRIBUTES
            .iter()
            .map(|&(attr, axis)| {
                let selector = Selector::parse(&format!("[{attr}]")).expect("valid selector");
                (selector, attr, axis)
            })
            .collect()
    });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Lat,
    Lng,
}

type Tier = fn(ElementRef<'_>) -> Option<Coordinates>;

const TIERS: &[Tier] = &[from_place_meta, from_geo_position, from_data_attributes];

/// Latitude/longitude of the place described by `root`, if the page carries
/// them.
///
/// Both axes come from the same tier; a single axis is never returned.
#[must_use]
pub fn extract_coordinates(root: ElementRef<'_>) -> Option<Coordinates> {
    TIERS.iter().find_map(|tier| tier(root))
}

fn from_place_meta(root: ElementRef<'_>) -> Option<Coordinates> {
    let lat = meta_content(root, &META_LATITUDE)?;
    let lng = meta_content(root, &META_LONGITUDE)?;
    Coordinates::new(parse_degree(lat)?, parse_degree(lng)?)
}

fn from_geo_position(root: ElementRef<'_>) -> Option<Coordinates> {
    let content = meta_content(root, &META_GEO_POSITION)?;
    let parts: Vec<&str> = content.split(';').collect();
    let [lat, lng] = parts.as_slice() else {
        return None;
    };
    Coordinates::new(parse_degree(lat)?, parse_degree(lng)?)
}

fn from_data_attributes(root: ElementRef<'_>) -> Option<Coordinates> {
    let mut lat = None;
    let mut lng = None;

    for (selector, attr, axis) in DATA_ATTRIBUTE_SELECTORS.iter() {
        let slot = match axis {
            Axis::Lat => &mut lat,
            Axis::Lng => &mut lng,
        };
        if slot.is_some() {
            continue;
        }
        *slot = root
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(attr));
    }

    Coordinates::new(parse_degree(lat?)?, parse_degree(lng?)?)
}

fn meta_content<'a>(root: ElementRef<'a>, selector: &Selector) -> Option<&'a str> {
    root.select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
}

fn parse_degree(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
