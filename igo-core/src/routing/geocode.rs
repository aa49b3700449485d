//! Place name resolution

use hashbrown::HashMap;

/// Turns a free-form place name into `(lat, lon)`.
///
/// Implementations backed by remote services are expected to block; the
/// engine never calls them while holding the graph lock.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, place: &str) -> Option<(f64, f64)>;
}

impl<G: Geocoder + ?Sized> Geocoder for std::sync::Arc<G> {
    fn geocode(&self, place: &str) -> Option<(f64, f64)> {
        (**self).geocode(place)
    }
}

/// Static table of known places.
///
/// Names are matched case-insensitively. A literal `"lat,lon"` pair is
/// accepted as well, so clients that already know their position can skip
/// the lookup.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: HashMap<String, (f64, f64)>,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, lat: f64, lon: f64) {
        self.places.insert(normalize(name), (lat, lon));
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, (f64, f64))> for Gazetteer {
    fn from_iter<I: IntoIterator<Item = (S, (f64, f64))>>(iter: I) -> Self {
        let mut gazetteer = Self::new();
        for (name, (lat, lon)) in iter {
            gazetteer.insert(name.as_ref(), lat, lon);
        }
        gazetteer
    }
}

impl Geocoder for Gazetteer {
    fn geocode(&self, place: &str) -> Option<(f64, f64)> {
        self.places
            .get(&normalize(place))
            .copied()
            .or_else(|| parse_lat_lon(place))
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_lat_lon(text: &str) -> Option<(f64, f64)> {
    let (lat, lon) = text.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}
