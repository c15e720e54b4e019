use std::fmt;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use leecher_logging::leecher_debug;
use serde::{Deserialize, Serialize};

use crate::ids::{parse_video_ids, parse_video_urls, VideoId};
use crate::validation::{Field, Validatable, ValidationErrors};

/// Earliest date a channel search may start from.
pub const MIN_SEARCH_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2010, 1, 1) {
    Some(date) => date,
    None => panic!("invalid minimum search date"),
};

/// Inclusive bounds for "load the last N videos".
pub const LAST_VODS_RANGE: std::ops::RangeInclusive<u32> = 1..=999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    #[default]
    Channel,
    Urls,
    Ids,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoType {
    #[default]
    Broadcast,
    Highlight,
    Upload,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadLimit {
    Timespan,
    #[default]
    LastVods,
}

/// Source of "today" for date rules.
#[derive(Clone)]
pub struct Today(Arc<dyn Fn() -> NaiveDate + Send + Sync>);

impl Today {
    pub fn local() -> Self {
        Self(Arc::new(|| Local::now().date_naive()))
    }

    pub fn fixed(date: NaiveDate) -> Self {
        Self(Arc::new(move || date))
    }

    pub fn get(&self) -> NaiveDate {
        (self.0)()
    }
}

impl Default for Today {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Debug for Today {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Today").field(&self.get()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Mode,
    Channel,
    Urls,
    Ids,
    LoadLimit,
    LoadFrom,
    LoadTo,
    LastVods,
}

impl Field for SearchField {
    fn name(self) -> &'static str {
        match self {
            SearchField::Mode => "mode",
            SearchField::Channel => "channel",
            SearchField::Urls => "urls",
            SearchField::Ids => "ids",
            SearchField::LoadLimit => "load_limit",
            SearchField::LoadFrom => "load_from",
            SearchField::LoadTo => "load_to",
            SearchField::LastVods => "last_vods",
        }
    }
}

/// How many videos of a channel to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadWindow {
    Timespan { from: NaiveDate, to: NaiveDate },
    LastVods(u32),
}

/// Typed result of a valid [`SearchRequest`], handed to search execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchQuery {
    Channel {
        name: String,
        video_type: VideoType,
        window: LoadWindow,
    },
    Videos(Vec<VideoId>),
}

/// User-entered search parameters. Only the fields of the active mode are
/// validated.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    mode: SearchMode,
    video_type: VideoType,
    channel: String,
    urls: String,
    ids: String,
    load_limit: LoadLimit,
    load_from: Option<NaiveDate>,
    load_from_default: Option<NaiveDate>,
    load_to: Option<NaiveDate>,
    load_to_default: Option<NaiveDate>,
    last_vods: u32,
    today: Today,
    errors: ValidationErrors,
}

impl SearchRequest {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            video_type: VideoType::default(),
            channel: String::new(),
            urls: String::new(),
            ids: String::new(),
            load_limit: LoadLimit::default(),
            load_from: None,
            load_from_default: None,
            load_to: None,
            load_to_default: None,
            last_vods: 10,
            today: Today::default(),
            errors: ValidationErrors::new(),
        }
    }

    /// Replaces the clock used by the date rules.
    pub fn with_today(mut self, today: Today) -> Self {
        self.today = today;
        self
    }

    /// Copies every input into a fresh request with no recorded errors.
    pub fn template(&self) -> Self {
        Self {
            errors: ValidationErrors::new(),
            ..self.clone()
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
        self.field_changed(SearchField::Mode);
    }

    pub fn video_type(&self) -> VideoType {
        self.video_type
    }

    pub fn set_video_type(&mut self, video_type: VideoType) {
        self.video_type = video_type;
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn set_channel(&mut self, channel: impl Into<String>) {
        self.channel = channel.into();
        self.field_changed(SearchField::Channel);
    }

    pub fn urls(&self) -> &str {
        &self.urls
    }

    pub fn set_urls(&mut self, urls: impl Into<String>) {
        self.urls = urls.into();
        self.field_changed(SearchField::Urls);
    }

    pub fn ids(&self) -> &str {
        &self.ids
    }

    pub fn set_ids(&mut self, ids: impl Into<String>) {
        self.ids = ids.into();
        self.field_changed(SearchField::Ids);
    }

    pub fn load_limit(&self) -> LoadLimit {
        self.load_limit
    }

    pub fn set_load_limit(&mut self, load_limit: LoadLimit) {
        self.load_limit = load_limit;
        self.field_changed(SearchField::LoadLimit);
    }

    pub fn load_from(&self) -> Option<NaiveDate> {
        self.load_from
    }

    pub fn set_load_from(&mut self, date: Option<NaiveDate>) {
        self.load_from = date;
        self.field_changed(SearchField::LoadFrom);
    }

    pub fn load_to(&self) -> Option<NaiveDate> {
        self.load_to
    }

    pub fn set_load_to(&mut self, date: Option<NaiveDate>) {
        self.load_to = date;
        self.field_changed(SearchField::LoadTo);
    }

    pub fn load_from_default(&self) -> Option<NaiveDate> {
        self.load_from_default
    }

    pub fn load_to_default(&self) -> Option<NaiveDate> {
        self.load_to_default
    }

    /// Sets the dates the UI resets the timespan to. Not validated.
    pub fn set_timespan_defaults(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.load_from_default = from;
        self.load_to_default = to;
    }

    pub fn last_vods(&self) -> u32 {
        self.last_vods
    }

    pub fn set_last_vods(&mut self, count: u32) {
        self.last_vods = count;
        self.field_changed(SearchField::LastVods);
    }

    /// Validates every field and returns the typed query when nothing failed.
    pub fn query(&mut self) -> Option<SearchQuery> {
        self.validate(None);
        self.current_query()
    }

    /// Builds the query from the current state without re-validating, so
    /// errors added by collaborators since the last validation still block it.
    pub fn current_query(&self) -> Option<SearchQuery> {
        if self.has_errors() {
            return None;
        }
        match self.mode {
            SearchMode::Channel => {
                let window = match self.load_limit {
                    LoadLimit::Timespan => LoadWindow::Timespan {
                        from: self.load_from?,
                        to: self.load_to?,
                    },
                    LoadLimit::LastVods => LoadWindow::LastVods(self.last_vods),
                };
                Some(SearchQuery::Channel {
                    name: self.channel.trim().to_string(),
                    video_type: self.video_type,
                    window,
                })
            }
            SearchMode::Urls => parse_video_urls(&self.urls).ok().map(SearchQuery::Videos),
            SearchMode::Ids => parse_video_ids(&self.ids).ok().map(SearchQuery::Videos),
        }
    }

    fn uses_timespan(&self) -> bool {
        self.mode == SearchMode::Channel && self.load_limit == LoadLimit::Timespan
    }

    fn check_load_from(&self, errors: &mut ValidationErrors) {
        let name = SearchField::LoadFrom.name();
        let Some(from) = self.load_from else {
            errors.add(name, "Please enter a date!");
            return;
        };
        if from < MIN_SEARCH_DATE {
            errors.add(name, format!("Date has to be on or after '{MIN_SEARCH_DATE}'!"));
        }
        if from > self.today.get() {
            errors.add(name, "Date cannot be in the future!");
        }
    }

    fn check_load_to(&self, errors: &mut ValidationErrors) {
        let name = SearchField::LoadTo.name();
        let Some(to) = self.load_to else {
            errors.add(name, "Please enter a date!");
            return;
        };
        if to > self.today.get() {
            errors.add(name, "Date cannot be in the future!");
        }
        if let Some(from) = self.load_from {
            if from > to {
                errors.add(name, format!("Date has to be on or after '{from}'!"));
            }
        }
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(SearchMode::default())
    }
}

impl Validatable for SearchRequest {
    type Field = SearchField;

    const FIELDS: &'static [SearchField] = &[
        SearchField::Channel,
        SearchField::LoadFrom,
        SearchField::LoadTo,
        SearchField::LastVods,
        SearchField::Urls,
        SearchField::Ids,
    ];

    const DEPENDENCIES: &'static [(SearchField, &'static [SearchField])] = &[
        (
            SearchField::Mode,
            &[
                SearchField::Channel,
                SearchField::LoadFrom,
                SearchField::LoadTo,
                SearchField::LastVods,
                SearchField::Urls,
                SearchField::Ids,
            ],
        ),
        (
            SearchField::LoadLimit,
            &[SearchField::LoadFrom, SearchField::LoadTo, SearchField::LastVods],
        ),
        (SearchField::LoadFrom, &[SearchField::LoadTo]),
    ];

    fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }

    fn check(&self, field: SearchField, errors: &mut ValidationErrors) {
        match field {
            SearchField::Channel => {
                if self.mode == SearchMode::Channel && self.channel.trim().is_empty() {
                    errors.add(field.name(), "Please enter a channel name!");
                }
            }
            SearchField::LoadFrom => {
                if self.uses_timespan() {
                    self.check_load_from(errors);
                }
            }
            SearchField::LoadTo => {
                if self.uses_timespan() {
                    self.check_load_to(errors);
                }
            }
            SearchField::LastVods => {
                if self.mode == SearchMode::Channel
                    && self.load_limit == LoadLimit::LastVods
                    && !LAST_VODS_RANGE.contains(&self.last_vods)
                {
                    errors.add(
                        field.name(),
                        format!(
                            "Value has to be between {} and {}!",
                            LAST_VODS_RANGE.start(),
                            LAST_VODS_RANGE.end()
                        ),
                    );
                }
            }
            SearchField::Urls => {
                if self.mode != SearchMode::Urls {
                    return;
                }
                if self.urls.trim().is_empty() {
                    errors.add(field.name(), "Please enter one or more Twitch video URLs!");
                } else if let Err(err) = parse_video_urls(&self.urls) {
                    leecher_debug!("rejected url list: {err}");
                    errors.add(field.name(), "One or more URLs are invalid!");
                }
            }
            SearchField::Ids => {
                if self.mode != SearchMode::Ids {
                    return;
                }
                if self.ids.trim().is_empty() {
                    errors.add(field.name(), "Please enter one or more Twitch video IDs!");
                } else if let Err(err) = parse_video_ids(&self.ids) {
                    leecher_debug!("rejected id list: {err}");
                    errors.add(field.name(), "One or more IDs are invalid!");
                }
            }
            SearchField::Mode | SearchField::LoadLimit => {}
        }
    }
}
