//! Tutorial course cards.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::filter::{FieldSelector, Search};
use crate::sample::SampleStore;
use crate::Record;

record_id!(TutorialId);

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TutorialCard {
    pub id: TutorialId,
    pub title: String,
    pub instructor: String,
    pub headline: String,
    pub icon: String,
}

fn title_of(card: &TutorialCard) -> &str {
    &card.title
}

fn instructor_of(card: &TutorialCard) -> &str {
    &card.instructor
}

impl TutorialCard {
    pub const TITLE: FieldSelector<TutorialCard> = FieldSelector::new("title", title_of);
    pub const INSTRUCTOR: FieldSelector<TutorialCard> =
        FieldSelector::new("instructor", instructor_of);
}

impl Record for TutorialCard {
    type Id = TutorialId;

    fn id(&self) -> TutorialId {
        self.id
    }
}

fn card(title: &str, instructor: &str, headline: &str, icon: &str) -> TutorialCard {
    TutorialCard {
        id: TutorialId::new(),
        title: title.to_string(),
        instructor: instructor.to_string(),
        headline: headline.to_string(),
        icon: icon.to_string(),
    }
}

#[must_use]
pub fn sample_tutorials() -> SampleStore<TutorialCard> {
    static TUTORIALS: OnceLock<SampleStore<TutorialCard>> = OnceLock::new();
    TUTORIALS
        .get_or_init(|| {
            SampleStore::new(vec![
                card(
                    "SwiftUI Masterclass",
                    "Course Team A",
                    "Build layouts, animations, and data flow from scratch.",
                    "swift",
                ),
                card(
                    "iOS App Development Bootcamp",
                    "Course Team B",
                    "Ship complete apps from your first line of code.",
                    "iphone",
                ),
                card(
                    "Python for Data Science",
                    "Course Team C",
                    "Analyse and visualise data with pandas and matplotlib.",
                    "chart.bar",
                ),
                card(
                    "Complete Web Developer",
                    "Course Team D",
                    "HTML, CSS, JavaScript, and the tooling around them.",
                    "globe",
                ),
            ])
        })
        .clone()
}

/// Card list search, matching on the course title.
#[must_use]
pub fn tutorial_search(store: SampleStore<TutorialCard>) -> Search<TutorialCard> {
    Search::new(store, TutorialCard::TITLE)
}
