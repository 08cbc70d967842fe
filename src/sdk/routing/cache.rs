use super::error::ProviderError;
use super::service::GeocodingProvider;
use super::types::GeoPoint;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    io::Result as IoResult,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

/// Place name → coordinate memo, persisted as pretty JSON.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct GeoCache {
    geocodes: HashMap<String, GeoPoint>,
}

impl GeoCache {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        if path.as_ref().exists() {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
    }

    /// Lookups ignore case and surrounding whitespace.
    pub fn normalize(place: &str) -> String {
        place.trim().to_lowercase()
    }

    pub fn get_geocode(&self, place: &str) -> Option<GeoPoint> {
        self.geocodes.get(&Self::normalize(place)).copied()
    }

    pub fn insert_geocode(&mut self, place: &str, point: GeoPoint) {
        self.geocodes.insert(Self::normalize(place), point);
    }

    pub fn len(&self) -> usize {
        self.geocodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geocodes.is_empty()
    }
}

/// Geocoder decorator that answers repeat lookups from a [`GeoCache`].
///
/// Failed lookups are never cached. When a file path is set, the cache is
/// saved after each new entry; a failed save is logged and otherwise ignored.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Mutex<GeoCache>,
    path: Option<PathBuf>,
}

impl<G: GeocodingProvider> CachedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(GeoCache::default()),
            path: None,
        }
    }

    /// Starts empty (and overwrites the file on the next save) if `path` is unreadable.
    pub fn with_file<P: Into<PathBuf>>(inner: G, path: P) -> Self {
        let path = path.into();
        let cache = match GeoCache::load_from_file(&path) {
            Ok(cache) => {
                log::info!("Loaded {} cached geocodes from {}", cache.len(), path.display());
                cache
            }
            Err(e) => {
                log::warn!("Ignoring unreadable geocode cache {}: {}", path.display(), e);
                GeoCache::default()
            }
        };
        Self {
            inner,
            cache: Mutex::new(cache),
            path: Some(path),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GeoCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<G: GeocodingProvider> GeocodingProvider for CachedGeocoder<G> {
    fn geocode(&self, place: &str) -> Result<GeoPoint, ProviderError> {
        if let Some(point) = self.lock().get_geocode(place) {
            log::debug!("[CACHE HIT] {}", place);
            return Ok(point);
        }

        let point = self.inner.geocode(place)?;

        let mut cache = self.lock();
        cache.insert_geocode(place, point);
        if let Some(path) = &self.path {
            if let Err(e) = cache.save_to_file(path) {
                log::warn!("Failed to save geocode cache to {}: {}", path.display(), e);
            }
        }
        Ok(point)
    }
}
