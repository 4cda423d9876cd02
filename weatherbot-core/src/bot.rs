//! The per-turn state machine.
//!
//! Gathering turns validate slots and geocode the city; fulfilling turns
//! resolve the requested instant, fetch weather and (for "now" requests)
//! a nearby webcam concurrently, and compose the final answer.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, warn};

use crate::api::{GeocodeApi, TimezoneApi, WeatherApi, WebcamApi};
use crate::context::{Intent, Location, Phase, SlotName, Slots, TurnContext, TurnEvent};
use crate::error::{BotError, ValidationError};
use crate::forecast::{WeatherFetcher, WeatherSnapshot};
use crate::instant::{self, DATE_NOW, ResolvedInstant};
use crate::phrases::{self, PromptCategory};
use crate::response::{
    Attachment, CONTENT_TYPE_GENERIC_CARD, Message, ResponseCard, TurnResponse,
};
use crate::webcam::{Webcam, WebcamEnricher};

const WEATHER_UNAVAILABLE: &str =
    "Sorry, I could not load the weather right now. Please try again later.";

pub struct WeatherBot<R: Rng = StdRng> {
    geocoder: Arc<dyn GeocodeApi>,
    weather: WeatherFetcher,
    webcams: WebcamEnricher,
    rng: R,
}

impl WeatherBot<StdRng> {
    pub fn new(
        geocoder: Arc<dyn GeocodeApi>,
        weather: Arc<dyn WeatherApi>,
        timezone: Arc<dyn TimezoneApi>,
        webcams: Arc<dyn WebcamApi>,
    ) -> Self {
        Self::with_rng(geocoder, weather, timezone, webcams, StdRng::from_os_rng())
    }
}

impl<R: Rng> WeatherBot<R> {
    /// Like [`WeatherBot::new`] but with an explicit randomness source, so
    /// prompt rotation and webcam picks can be made deterministic.
    pub fn with_rng(
        geocoder: Arc<dyn GeocodeApi>,
        weather: Arc<dyn WeatherApi>,
        timezone: Arc<dyn TimezoneApi>,
        webcams: Arc<dyn WebcamApi>,
        rng: R,
    ) -> Self {
        Self {
            geocoder,
            weather: WeatherFetcher::new(weather, timezone),
            webcams: WebcamEnricher::new(webcams),
            rng,
        }
    }

    /// Process one turn. Only an unknown intent is fatal; everything the
    /// user can fix comes back as an `ElicitSlot` reply.
    pub async fn dispatch(&mut self, event: TurnEvent) -> Result<TurnResponse, BotError> {
        let context = TurnContext::from_event(event)?;

        let response = match context.intent {
            Intent::About => self.about(&context),
            Intent::Weather => match context.phase {
                Phase::Gathering => self.gather(context).await,
                Phase::Fulfilling => self.fulfill(context).await,
            },
        };

        debug!("RESPONSE={}", serde_json::to_string(&response).unwrap_or_default());
        Ok(response)
    }

    fn about(&mut self, context: &TurnContext) -> TurnResponse {
        let help = phrases::choose(PromptCategory::HowTo, &mut self.rng);
        TurnResponse::close(context, Message::plain_text(help), None)
    }

    async fn gather(&mut self, mut context: TurnContext) -> TurnResponse {
        let today = Local::now().date_naive();
        context.slots = match validate(&context.slots, today, &mut self.rng) {
            Ok(slots) => slots,
            Err(err) => return TurnResponse::elicit_slot(&context, &err),
        };

        match self.resolve_location(&context.slots).await {
            Ok(location) => {
                context.session.location = Some(location);
                debug!("GEOCODE: location={location:?}");
                TurnResponse::delegate(&context)
            }
            Err(err) => TurnResponse::elicit_slot(&context, &err),
        }
    }

    async fn fulfill(&mut self, context: TurnContext) -> TurnResponse {
        let instant = match instant::resolve(
            context.slots.date.as_deref(),
            context.slots.time.as_deref(),
            Local::now(),
        ) {
            Ok(instant) => instant,
            Err(err) => return TurnResponse::elicit_slot(&context, &err),
        };

        let Some(location) = context.session.location else {
            // The platform should have delivered the location gathered
            // earlier; re-elicit instead of failing the turn.
            warn!("fulfillment turn without a session location");
            let err = self.city_error();
            return TurnResponse::elicit_slot(&context, &err);
        };

        let Self { weather, webcams, rng, .. } = self;
        let weather_lookup = weather.fetch(location, &instant);
        let webcam_lookup = async {
            if instant.implicit_now {
                webcams.fetch(location, rng).await
            } else {
                None
            }
        };
        let (snapshot, webcam) = tokio::join!(weather_lookup, webcam_lookup);

        let content = match &snapshot {
            Some(snapshot) => weather_summary(&instant, snapshot),
            None => WEATHER_UNAVAILABLE.to_string(),
        };
        let card = webcam.as_ref().map(|webcam| webcam_card(webcam, &content));

        TurnResponse::close(&context, Message::plain_text(content), card)
    }

    /// Map the City (+ optional Area) slots to a single location.
    ///
    /// A transport or parse failure is folded into the "provide a city"
    /// prompt: the user cannot distinguish a wrong city from a service
    /// outage, and neither should the dialogue.
    async fn resolve_location(&mut self, slots: &Slots) -> Result<Location, ValidationError> {
        let address = address(slots);

        let response = match self.geocoder.geocode(&address).await {
            Ok(response) => response,
            Err(err) => {
                error!("unable to geocode {address:?}: {err}");
                return Err(self.city_error());
            }
        };

        match response.results.as_slice() {
            [] => Err(self.city_error()),
            [only] => Ok(only.geometry.location),
            _ => Err(ValidationError::new(
                SlotName::Area,
                phrases::choose(PromptCategory::ProvideArea, &mut self.rng),
            )),
        }
    }

    fn city_error(&mut self) -> ValidationError {
        ValidationError::new(
            SlotName::City,
            phrases::choose(PromptCategory::ProvideCity, &mut self.rng),
        )
    }
}

/// Check the slots for the gathering phase and return the patched slot
/// map. Pure except for the prompt rotation: the only mutation is on the
/// returned copy (Date defaulted to `"now"`), keeping the transition
/// testable.
fn validate<R: Rng + ?Sized>(
    slots: &Slots,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Slots, ValidationError> {
    if slots.city.as_deref().is_none_or(str::is_empty) {
        return Err(ValidationError::new(
            SlotName::City,
            phrases::choose(PromptCategory::ProvideCity, rng),
        ));
    }

    let mut patched = slots.clone();
    match slots.date.as_deref() {
        None | Some("") | Some(DATE_NOW) => patched.date = Some(DATE_NOW.to_string()),
        Some(date) if !instant::is_valid_date(date, today) => {
            return Err(ValidationError::new(SlotName::Date, instant::INVALID_DATE_MESSAGE));
        }
        Some(_) => {}
    }

    // Area and Time are optional enrichers and never validated.
    Ok(patched)
}

fn address(slots: &Slots) -> String {
    let city = slots.city.as_deref().unwrap_or_default();
    match slots.area.as_deref() {
        Some(area) if !area.is_empty() => format!("{city}, {area}"),
        _ => city.to_string(),
    }
}

/// The exact wording contract for the spoken/written answer.
fn weather_summary(instant: &ResolvedInstant, snapshot: &WeatherSnapshot) -> String {
    if instant.implicit_now {
        format!(
            "{}°C. {}. Today: {}",
            round(snapshot.point.temperature),
            snapshot.point.summary,
            snapshot.day.summary
        )
    } else if instant.explicit_time_of_day {
        format!("{}°C. {}.", round(snapshot.point.temperature), snapshot.point.summary)
    } else {
        format!(
            "{} to {}°C. {}",
            round(snapshot.day.min_temp),
            round(snapshot.day.max_temp),
            snapshot.day.summary
        )
    }
}

fn round(degrees: f64) -> i64 {
    degrees.round() as i64
}

fn webcam_card(webcam: &Webcam, sub_title: &str) -> ResponseCard {
    ResponseCard {
        content_type: CONTENT_TYPE_GENERIC_CARD,
        generic_attachments: vec![Attachment {
            title: webcam.title.clone(),
            sub_title: sub_title.to_string(),
            image_url: webcam.image_url.clone(),
            attachment_link_url: webcam
                .page_url
                .clone()
                .unwrap_or_else(|| webcam.image_url.clone()),
        }],
    }
}
