//! Educational video library with a five-star rating widget.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::filter::{FieldSelector, Search};
use crate::sample::SampleStore;
use crate::selection::Selection;
use crate::Record;

pub const MAX_STARS: u8 = 5;

record_id!(VideoId);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub rating: Option<f64>,
}

fn title_of(video: &Video) -> &str {
    &video.title
}

fn description_of(video: &Video) -> &str {
    &video.description
}

impl Video {
    pub const TITLE: FieldSelector<Video> = FieldSelector::new("title", title_of);
    pub const DESCRIPTION: FieldSelector<Video> = FieldSelector::new("description", description_of);

    /// Look up a searchable field by name.
    #[must_use]
    pub fn field(name: &str) -> Option<FieldSelector<Video>> {
        [Self::TITLE, Self::DESCRIPTION].into_iter().find(|field| field.name() == name)
    }
}

impl Record for Video {
    type Id = VideoId;

    fn id(&self) -> VideoId {
        self.id
    }
}

fn video(title: &str, description: &str, thumbnail_url: &str, video_url: &str) -> Video {
    Video {
        id: VideoId::new(),
        title: title.to_string(),
        description: description.to_string(),
        thumbnail_url: thumbnail_url.to_string(),
        video_url: video_url.to_string(),
        rating: Some(4.5),
    }
}

/// Seeded video catalogue, built once per process.
#[must_use]
pub fn sample_videos() -> SampleStore<Video> {
    static VIDEOS: OnceLock<SampleStore<Video>> = OnceLock::new();
    VIDEOS
        .get_or_init(|| {
            SampleStore::new(vec![
                video(
                    "Introduction to Physics",
                    "Explore the fundamental laws of motion.",
                    "https://upload.wikimedia.org/wikipedia/commons/b/bc/Refresh_icon.png",
                    "https://example.com/physicsvideo.mp4",
                ),
                video(
                    "The Wonders of Biology",
                    "Discover the intricate workings of living organisms.",
                    "https://example.com/biology.jpg",
                    "https://example.com/biologyvideo.mp4",
                ),
                video(
                    "Mathematical Mysteries",
                    "Unravel the beauty and power of mathematics.",
                    "https://example.com/math.jpg",
                    "https://example.com/mathvideo.mp4",
                ),
                video(
                    "Historical Journeys",
                    "Travel through time and explore pivotal events.",
                    "https://example.com/history.jpg",
                    "https://example.com/historyvideo.mp4",
                ),
                video(
                    "Coding Fundamentals",
                    "Learn the basics of computer programming.",
                    "https://example.com/coding.jpg",
                    "https://example.com/codingvideo.mp4",
                ),
            ])
        })
        .clone()
}

/// Star widget state for the video being played.
///
/// `catalogue` is the video's stored rating; `tapped` is the viewer's own
/// rating for this screen. A tap takes precedence over the catalogue value.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct StarRating {
    catalogue: Option<f64>,
    tapped: Option<u8>,
}

impl StarRating {
    #[must_use]
    pub fn for_video(video: &Video) -> Self {
        Self { catalogue: video.rating, tapped: None }
    }

    /// Record a tap on star `star` (1-based). Taps outside `1..=5` are ignored.
    pub fn tap(&mut self, star: u8) -> bool {
        if !(1..=MAX_STARS).contains(&star) {
            tracing::debug!(star, "ignored tap outside the star range");
            return false;
        }
        self.tapped = Some(star);
        true
    }

    #[must_use]
    pub fn user_rating(&self) -> Option<u8> {
        self.tapped
    }

    #[must_use]
    pub fn catalogue_rating(&self) -> Option<f64> {
        self.catalogue
    }

    /// Number of filled stars: the viewer's tap, else the rounded catalogue
    /// rating, else none.
    #[must_use]
    pub fn filled_stars(&self) -> u8 {
        self.tapped.or_else(|| self.catalogue.map(round_stars)).unwrap_or(0)
    }

    #[must_use]
    pub fn stars(&self) -> [bool; MAX_STARS as usize] {
        let filled = self.filled_stars();
        let mut stars = [false; MAX_STARS as usize];
        for (index, star) in stars.iter_mut().enumerate() {
            *star = index < usize::from(filled);
        }
        stars
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_stars(rating: f64) -> u8 {
    if rating.is_nan() {
        return 0;
    }
    rating.round().clamp(0.0, f64::from(MAX_STARS)) as u8
}

/// Video list and player screen.
#[derive(Debug)]
pub struct VideoLibrary {
    search: Search<Video>,
    playing: Selection<Video>,
    rating: Option<StarRating>,
}

impl VideoLibrary {
    #[must_use]
    pub fn new(store: SampleStore<Video>) -> Self {
        Self { search: Search::new(store, Video::TITLE), playing: Selection::new(), rating: None }
    }

    #[must_use]
    pub fn search(&self) -> &Search<Video> {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut Search<Video> {
        &mut self.search
    }

    pub fn results(&self) -> impl Iterator<Item = &Video> + '_ {
        self.search.results()
    }

    /// Open the player for `id`. Unknown ids leave the screen unchanged.
    pub fn play(&mut self, id: VideoId) -> Option<&Video> {
        let video = self.search.store().get(id)?.clone();
        self.rating = Some(StarRating::for_video(&video));
        self.playing.select(video);
        self.playing.current()
    }

    pub fn stop(&mut self) -> Option<Video> {
        self.rating = None;
        self.playing.clear()
    }

    #[must_use]
    pub fn now_playing(&self) -> Option<&Video> {
        self.playing.current()
    }

    #[must_use]
    pub fn rating(&self) -> Option<&StarRating> {
        self.rating.as_ref()
    }

    /// Tap a star on the player. Returns `false` when nothing is playing or
    /// the star is out of range.
    pub fn tap_star(&mut self, star: u8) -> bool {
        self.rating.as_mut().is_some_and(|rating| rating.tap(star))
    }
}

impl Default for VideoLibrary {
    fn default() -> Self {
        Self::new(sample_videos())
    }
}
