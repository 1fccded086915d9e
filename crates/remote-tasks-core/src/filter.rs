//! Case-insensitive substring search over one named string field.

use std::fmt::{Debug, Formatter};

use unicode_normalization::UnicodeNormalization;

use crate::sample::SampleStore;
use crate::state::{Observable, SubscriptionId};

/// A named accessor for one string attribute of `R`.
pub struct FieldSelector<R> {
    name: &'static str,
    get: fn(&R) -> &str,
}

impl<R> FieldSelector<R> {
    #[must_use]
    pub const fn new(name: &'static str, get: fn(&R) -> &str) -> Self {
        Self { name, get }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn value<'a>(&self, record: &'a R) -> &'a str {
        (self.get)(record)
    }
}

impl<R> Clone for FieldSelector<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldSelector<R> {}

impl<R> Debug for FieldSelector<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FieldSelector").field(&self.name).finish()
    }
}

const COMBINING_DOT_ABOVE: char = '\u{307}';

/// Full Unicode case fold over the canonical decomposition.
///
/// `ß` folds to `ss`. A dot above a soft-dotted `i` or `j` is redundant and
/// dropped, so the fold of `İ` equals the fold of `I`.
fn fold(text: &str) -> String {
    let decomposed = text.nfd().collect::<String>();
    let folded = caseless::default_case_fold_str(&decomposed);
    let mut out = String::with_capacity(folded.len());
    let mut previous = None;
    for c in folded.nfd() {
        if c == COMBINING_DOT_ABOVE && matches!(previous, Some('i' | 'j')) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

/// Unicode-aware, case-insensitive containment. An empty needle matches.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || fold(haystack).contains(&fold(needle))
}

fn matching_indices<R>(records: &[R], query: &str, field: FieldSelector<R>) -> Vec<usize> {
    if query.is_empty() {
        return (0..records.len()).collect();
    }

    let needle = fold(query);
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| fold(field.value(record)).contains(&needle))
        .map(|(index, _)| index)
        .collect()
}

/// Filter `records` to those whose `field` contains `query`, keeping order.
///
/// An empty query passes every record through. No matches yields an empty
/// vector, which is a normal outcome rather than an error.
#[must_use]
pub fn filter<'a, R>(records: &'a [R], query: &str, field: FieldSelector<R>) -> Vec<&'a R> {
    let matched = matching_indices(records, query, field);
    tracing::debug!(
        field = field.name(),
        query,
        matched = matched.len(),
        total = records.len(),
        "filtered records"
    );
    matched.into_iter().map(|index| &records[index]).collect()
}

/// Search box state: a query holder over a [`SampleStore`] whose results are
/// recomputed whenever the query or field changes.
pub struct Search<R> {
    store: SampleStore<R>,
    field: FieldSelector<R>,
    query: Observable<String>,
    matches: Vec<usize>,
}

impl<R> Search<R> {
    #[must_use]
    pub fn new(store: SampleStore<R>, field: FieldSelector<R>) -> Self {
        let matches = matching_indices(store.records(), "", field);
        Self { store, field, query: Observable::default(), matches }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        self.query.get()
    }

    #[must_use]
    pub fn field(&self) -> FieldSelector<R> {
        self.field
    }

    #[must_use]
    pub fn store(&self) -> &SampleStore<R> {
        &self.store
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query.set(query.into());
        self.refresh();
    }

    pub fn set_field(&mut self, field: FieldSelector<R>) {
        self.field = field;
        self.refresh();
    }

    pub fn subscribe_query(&mut self, callback: impl FnMut(&String) + 'static) -> SubscriptionId {
        self.query.subscribe(callback)
    }

    pub fn unsubscribe_query(&mut self, id: SubscriptionId) -> bool {
        self.query.unsubscribe(id)
    }

    /// Current results, in sample order.
    pub fn results(&self) -> impl Iterator<Item = &R> + '_ {
        let records = self.store.records();
        self.matches.iter().map(move |index| &records[*index])
    }

    #[must_use]
    pub fn result_count(&self) -> usize {
        self.matches.len()
    }

    fn refresh(&mut self) {
        self.matches = matching_indices(self.store.records(), self.query.get(), self.field);
        tracing::debug!(
            field = self.field.name(),
            query = self.query.get().as_str(),
            matched = self.matches.len(),
            "search results refreshed"
        );
    }
}

impl<R> Debug for Search<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("field", &self.field)
            .field("query", self.query.get())
            .field("matches", &self.matches.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct City {
        name: String,
        region: String,
    }

    fn name_of(city: &City) -> &str {
        &city.name
    }

    fn region_of(city: &City) -> &str {
        &city.region
    }

    const NAME: FieldSelector<City> = FieldSelector::new("name", name_of);
    const REGION: FieldSelector<City> = FieldSelector::new("region", region_of);

    fn city(name: &str, region: &str) -> City {
        City { name: name.to_string(), region: region.to_string() }
    }

    fn fixture() -> Vec<City> {
        vec![
            city("San Francisco", "Bay Area"),
            city("New York", "East Coast"),
            city("London", "Europe"),
        ]
    }

    #[test]
    fn mixed_case_query_matches_only_containing_names() {
        let cities = fixture();
        let found = filter(&cities, "sAN", NAME);
        assert_eq!(found, vec![&cities[0]]);
    }

    #[test]
    fn empty_query_passes_every_record_through_in_order() {
        let cities = fixture();
        let found = filter(&cities, "", NAME);
        assert_eq!(found, cities.iter().collect::<Vec<_>>());
    }

    #[test]
    fn no_match_yields_empty_result() {
        let cities = fixture();
        assert!(filter(&cities, "tokyo", NAME).is_empty());
    }

    #[test]
    fn selector_decides_which_field_is_searched() {
        let cities = fixture();
        assert!(filter(&cities, "coast", NAME).is_empty());
        assert_eq!(filter(&cities, "coast", REGION), vec![&cities[1]]);
        assert_eq!(REGION.name(), "region");
    }

    #[test]
    fn case_folding_is_unicode_aware() {
        let cities = vec![city("ÉCOLE DE PARIS", "Île-de-France"), city("Zürich", "Schweiz")];
        assert_eq!(filter(&cities, "école", NAME), vec![&cities[0]]);
        assert_eq!(filter(&cities, "ZÜR", NAME), vec![&cities[1]]);
        assert_eq!(filter(&cities, "île", REGION), vec![&cities[0]]);
    }

    #[test]
    fn case_folding_expands_and_drops_redundant_dots() {
        let cities = vec![city("Straße", "Bayern"), city("İstanbul", "Marmara")];
        assert_eq!(filter(&cities, "STRASSE", NAME), vec![&cities[0]]);
        assert_eq!(filter(&cities, "istanbul", NAME), vec![&cities[1]]);
        assert_eq!(filter(&cities, "İSTANBUL", NAME), vec![&cities[1]]);
        assert!(contains_ignore_case("STRASSE", "straße"));
        assert!(contains_ignore_case("Zu\u{308}rich", "zürich"));
    }

    #[test]
    fn contains_ignore_case_treats_empty_needle_as_match() {
        assert!(contains_ignore_case("London", ""));
        assert!(contains_ignore_case("London", "DON"));
        assert!(!contains_ignore_case("London", "paris"));
    }

    #[test]
    fn search_recomputes_results_on_query_and_field_change() {
        let store = SampleStore::new(fixture());
        let mut search = Search::new(store, NAME);
        assert_eq!(search.result_count(), 3);

        search.set_query("on");
        let names = search.results().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["London"]);

        search.set_field(REGION);
        assert_eq!(search.result_count(), 0);

        search.set_query("coast");
        let names = search.results().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["New York"]);

        search.set_query("");
        assert_eq!(search.result_count(), 3);
    }

    #[test]
    fn search_query_subscribers_see_each_keystroke() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let typed = Rc::new(RefCell::new(Vec::new()));
        let mut search = Search::new(SampleStore::new(fixture()), NAME);
        let sink = Rc::clone(&typed);
        let id =
            search.subscribe_query(move |query: &String| sink.borrow_mut().push(query.clone()));

        search.set_query("L");
        search.set_query("Lo");
        assert!(search.unsubscribe_query(id));
        search.set_query("Lon");

        assert_eq!(*typed.borrow(), vec!["L".to_string(), "Lo".to_string()]);
        assert!(!search.unsubscribe_query(id));
    }

    fn arb_cities() -> impl Strategy<Value = Vec<City>> {
        prop::collection::vec(("[a-zA-Z ]{0,12}", "[a-zA-Z]{0,6}"), 0..24).prop_map(|pairs| {
            pairs.into_iter().map(|(name, region)| City { name, region }).collect()
        })
    }

    proptest! {
        #[test]
        fn filter_is_identity_on_empty_query(cities in arb_cities()) {
            let found = filter(&cities, "", NAME);
            prop_assert_eq!(found, cities.iter().collect::<Vec<_>>());
        }

        #[test]
        fn filter_returns_exactly_the_containing_subsequence(
            cities in arb_cities(),
            query in "[a-zA-Z]{1,3}",
        ) {
            let found = filter(&cities, &query, NAME);
            let expected = cities
                .iter()
                .filter(|c| c.name.to_ascii_lowercase().contains(&query.to_ascii_lowercase()))
                .collect::<Vec<_>>();
            prop_assert_eq!(&found, &expected);

            let mut cursor = 0_usize;
            for record in &found {
                let position = cities[cursor..]
                    .iter()
                    .position(|candidate| std::ptr::eq(candidate, *record));
                prop_assert!(position.is_some());
                cursor += position.unwrap_or(0) + 1;
            }
        }

        #[test]
        fn filter_is_idempotent(cities in arb_cities(), query in "[a-z]{0,2}") {
            let once = filter(&cities, &query, NAME).into_iter().cloned().collect::<Vec<_>>();
            let twice = filter(&once, &query, NAME).into_iter().cloned().collect::<Vec<_>>();
            prop_assert_eq!(once, twice);
        }
    }
}
