//! Nearby webcam lookup.
//!
//! Only meaningful for "now" turns: a webcam shows live imagery, and
//! attaching one to a forecast date would mislead. The orchestrator
//! enforces that; this module only finds and picks a camera.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use crate::api::{WebcamApi, WebcamEntry};
use crate::context::Location;

/// Search radius around the geocoded location.
pub const RADIUS_KM: u32 = 30;

/// A representative nearby webcam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webcam {
    pub title: String,
    pub thumbnail_url: String,
    pub image_url: String,
    pub page_url: Option<String>,
    /// Epoch seconds of the last image update.
    pub capture_epoch: i64,
    /// IANA time zone name of the camera's location.
    pub timezone: String,
}

#[derive(Debug, Clone)]
pub struct WebcamEnricher {
    api: Arc<dyn WebcamApi>,
}

impl WebcamEnricher {
    pub fn new(api: Arc<dyn WebcamApi>) -> Self {
        Self { api }
    }

    /// Pick one webcam near the location, uniformly at random so repeated
    /// queries show some variety. Never fails the turn: any error or an
    /// empty result set yields `None`.
    pub async fn fetch<R: Rng + ?Sized>(
        &self,
        location: Location,
        rng: &mut R,
    ) -> Option<Webcam> {
        let webcams = match self.api.nearby(location.lat, location.lng, RADIUS_KM).await {
            Ok(webcams) => webcams,
            Err(err) => {
                warn!("unable to load webcams for {location:?}: {err}");
                return None;
            }
        };

        if webcams.is_empty() {
            debug!("no webcams within {RADIUS_KM} km of {location:?}");
            return None;
        }

        let index = rng.random_range(0..webcams.len());
        webcams.into_iter().nth(index).map(into_webcam)
    }
}

fn into_webcam(entry: WebcamEntry) -> Webcam {
    Webcam {
        title: entry.title,
        thumbnail_url: entry.image.current.thumbnail,
        image_url: entry.image.current.preview,
        page_url: entry.url.map(|url| url.current.mobile),
        capture_epoch: entry.update,
        timezone: entry.location.timezone,
    }
}
