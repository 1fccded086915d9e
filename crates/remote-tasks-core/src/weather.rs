//! Weather home, location search, and favorites.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::favorites::{FavoriteSet, SettingsStore};
use crate::filter::{FieldSelector, Search};
use crate::sample::SampleStore;
use crate::selection::Selection;
use crate::{CoreError, Record};

pub const HOURLY_SLOTS: usize = 8;
pub const DAILY_SLOTS: usize = 5;

record_id!(LocationId);
record_id!(ForecastId);

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub current_temp: i32,
    pub high_temp: i32,
    pub low_temp: i32,
    pub description: String,
    pub icon: String,
}

fn name_of(location: &Location) -> &str {
    &location.name
}

impl Location {
    pub const NAME: FieldSelector<Location> = FieldSelector::new("name", name_of);

    /// Headline line, e.g. `65°C, Partly Cloudy`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{}°C, {}", self.current_temp, self.description)
    }

    /// High/low line, e.g. `H: 70°C L: 58°C`.
    #[must_use]
    pub fn range(&self) -> String {
        format!("H: {}°C L: {}°C", self.high_temp, self.low_temp)
    }
}

impl Record for Location {
    type Id = LocationId;

    fn id(&self) -> LocationId {
        self.id
    }
}

fn location(
    name: &str,
    current: i32,
    high: i32,
    low: i32,
    description: &str,
    icon: &str,
) -> Location {
    Location {
        id: LocationId::new(),
        name: name.to_string(),
        current_temp: current,
        high_temp: high,
        low_temp: low,
        description: description.to_string(),
        icon: icon.to_string(),
    }
}

#[must_use]
pub fn sample_locations() -> SampleStore<Location> {
    static LOCATIONS: OnceLock<SampleStore<Location>> = OnceLock::new();
    LOCATIONS
        .get_or_init(|| {
            SampleStore::new(vec![
                location("San Francisco", 65, 70, 58, "Partly Cloudy", "cloud.sun"),
                location("New York", 72, 78, 65, "Sunny", "sun.max.fill"),
                location("London", 58, 62, 53, "Rainy", "cloud.rain"),
                location("San Mateo", 58, 62, 53, "Rainy", "cloud.rain"),
                location("Palo Alto", 58, 62, 53, "Rainy", "cloud.rain"),
                location("Vallejo", 58, 62, 53, "Rainy", "cloud.rain"),
            ])
        })
        .clone()
}

/// Search screen for adding a location.
#[must_use]
pub fn location_search(store: SampleStore<Location>) -> Search<Location> {
    Search::new(store, Location::NAME)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyForecast {
    pub id: ForecastId,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub temperature: f64,
    pub weather_icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub id: ForecastId,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub high_temp: f64,
    pub low_temp: f64,
    pub weather_icon: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMode {
    #[default]
    Hourly,
    Daily,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "mode", content = "entries", rename_all = "snake_case")]
pub enum Forecast {
    Hourly(Vec<HourlyForecast>),
    Daily(Vec<DailyForecast>),
}

/// Placeholder hourly strip starting at the hour containing `from`.
#[must_use]
pub fn hourly_forecast(from: OffsetDateTime) -> Vec<HourlyForecast> {
    let start = from
        .replace_minute(0)
        .and_then(|t| t.replace_second(0))
        .and_then(|t| t.replace_nanosecond(0))
        .unwrap_or(from);
    (0_i64..)
        .take(HOURLY_SLOTS)
        .map(|hour| HourlyForecast {
            id: ForecastId::new(),
            time: start + Duration::hours(hour),
            temperature: 23.0,
            weather_icon: "cloud.sun".to_string(),
        })
        .collect()
}

/// Placeholder daily strip starting on the day of `from`.
#[must_use]
pub fn daily_forecast(from: OffsetDateTime) -> Vec<DailyForecast> {
    let start = from.replace_time(time::Time::MIDNIGHT);
    (0_i64..)
        .take(DAILY_SLOTS)
        .map(|day| DailyForecast {
            id: ForecastId::new(),
            date: start + Duration::days(day),
            high_temp: 25.0,
            low_temp: 18.0,
            weather_icon: "sun.max".to_string(),
        })
        .collect()
}

/// Weather home screen.
///
/// `is_favorite` mirrors the favorite set for the selected location; it is
/// refreshed on selection and set from each toggle's result.
#[derive(Debug)]
pub struct WeatherHome<S> {
    selected: Selection<Location>,
    is_favorite: bool,
    mode: ForecastMode,
    favorites: FavoriteSet<S>,
}

impl<S: SettingsStore> WeatherHome<S> {
    #[must_use]
    pub fn new(favorites: FavoriteSet<S>) -> Self {
        Self {
            selected: Selection::new(),
            is_favorite: false,
            mode: ForecastMode::default(),
            favorites,
        }
    }

    /// Show `location` and refresh the favorite mirror.
    ///
    /// # Errors
    /// Returns [`CoreError::Settings`] when favorites cannot be read.
    pub fn select_location(&mut self, location: Location) -> Result<(), CoreError> {
        self.selected.select(location);
        self.refresh_favorite()
    }

    /// Re-read favorite status for the selected location.
    ///
    /// The mirror reads `false` until the lookup succeeds.
    ///
    /// # Errors
    /// Returns [`CoreError::Settings`] when favorites cannot be read.
    pub fn refresh_favorite(&mut self) -> Result<(), CoreError> {
        self.is_favorite = false;
        if let Some(location) = self.selected.current() {
            self.is_favorite = self.favorites.is_member(&location.name)?;
        }
        Ok(())
    }

    /// Toggle the selected location's favorite status.
    ///
    /// Returns `Ok(None)` without touching settings when nothing is selected.
    ///
    /// # Errors
    /// Returns [`CoreError::Settings`] when favorites cannot be written.
    pub fn toggle_favorite(&mut self) -> Result<Option<bool>, CoreError> {
        let Some(name) = self.selected.current().map(|location| location.name.clone()) else {
            tracing::warn!("ignored favorite toggle without a selected location");
            return Ok(None);
        };
        let member = self.favorites.toggle(&name)?;
        self.is_favorite = member;
        Ok(Some(member))
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Location> {
        self.selected.current()
    }

    /// Header title, `City` when nothing is selected.
    #[must_use]
    pub fn title(&self) -> &str {
        self.selected.current().map_or("City", |location| location.name.as_str())
    }

    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    #[must_use]
    pub fn mode(&self) -> ForecastMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ForecastMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn forecast(&self, from: OffsetDateTime) -> Forecast {
        match self.mode {
            ForecastMode::Hourly => Forecast::Hourly(hourly_forecast(from)),
            ForecastMode::Daily => Forecast::Daily(daily_forecast(from)),
        }
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoriteSet<S> {
        &self.favorites
    }
}

/// Resolve saved favorite names to sample locations, in saved order.
///
/// Names with no matching sample location are skipped.
///
/// # Errors
/// Returns [`CoreError::Settings`] when favorites cannot be read.
pub fn favorite_locations<S: SettingsStore>(
    favorites: &FavoriteSet<S>,
    store: &SampleStore<Location>,
) -> Result<Vec<Location>, CoreError> {
    let mut resolved = Vec::new();
    for name in favorites.ordered()? {
        resolved.extend(store.records().iter().filter(|location| location.name == name).cloned());
    }
    Ok(resolved)
}
