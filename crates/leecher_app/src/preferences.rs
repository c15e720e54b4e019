use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Days;
use leecher_core::{
    contains_invalid_filename_chars, Field, LoadLimit, SearchMode, SearchRequest, Today,
    Validatable, ValidationErrors, VideoType, LAST_VODS_RANGE,
};
use leecher_logging::{leecher_info, leecher_warn};
use serde::{Deserialize, Serialize};

use crate::services::FileLocator;

/// Extension an external player executable must carry.
pub const PLAYER_EXTENSION: &str = ".exe";

/// Inclusive bounds for "load the videos of the last N days".
pub const LAST_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferencesField {
    SearchChannelName,
    SearchOnStartup,
    SearchLoadLimit,
    SearchLoadLastDays,
    SearchLoadLastVods,
    DownloadTempFolder,
    DownloadFolder,
    DownloadFileName,
    MiscUseExternalPlayer,
    MiscExternalPlayer,
}

impl Field for PreferencesField {
    fn name(self) -> &'static str {
        match self {
            PreferencesField::SearchChannelName => "search_channel_name",
            PreferencesField::SearchOnStartup => "search_on_startup",
            PreferencesField::SearchLoadLimit => "search_load_limit",
            PreferencesField::SearchLoadLastDays => "search_load_last_days",
            PreferencesField::SearchLoadLastVods => "search_load_last_vods",
            PreferencesField::DownloadTempFolder => "download_temp_folder",
            PreferencesField::DownloadFolder => "download_folder",
            PreferencesField::DownloadFileName => "download_file_name",
            PreferencesField::MiscUseExternalPlayer => "misc_use_external_player",
            PreferencesField::MiscExternalPlayer => "misc_external_player",
        }
    }
}

/// Application preferences edited on the preferences page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    app_check_for_updates: bool,
    app_show_donation_button: bool,
    search_favourite_channels: Vec<String>,
    search_channel_name: String,
    search_video_type: VideoType,
    search_load_limit: LoadLimit,
    search_load_last_days: u32,
    search_load_last_vods: u32,
    search_on_startup: bool,
    download_temp_folder: String,
    download_folder: String,
    download_file_name: String,
    download_subfolders_for_fav: bool,
    download_remove_completed: bool,
    download_disable_conversion: bool,
    misc_use_external_player: bool,
    misc_external_player: String,
    #[serde(skip)]
    errors: ValidationErrors,
}

impl Preferences {
    pub fn new(download_folder: impl Into<String>, download_temp_folder: impl Into<String>) -> Self {
        Self {
            app_check_for_updates: true,
            app_show_donation_button: true,
            search_favourite_channels: Vec::new(),
            search_channel_name: String::new(),
            search_video_type: VideoType::Broadcast,
            search_load_limit: LoadLimit::LastVods,
            search_load_last_days: 10,
            search_load_last_vods: 10,
            search_on_startup: false,
            download_temp_folder: download_temp_folder.into(),
            download_folder: download_folder.into(),
            download_file_name: "{date}_{id}_{game}".to_string(),
            download_subfolders_for_fav: false,
            download_remove_completed: false,
            download_disable_conversion: false,
            misc_use_external_player: false,
            misc_external_player: String::new(),
            errors: ValidationErrors::new(),
        }
    }

    /// Copy for editing; the store's snapshot is never mutated in place.
    pub fn working_copy(&self) -> Self {
        Self {
            errors: ValidationErrors::new(),
            ..self.clone()
        }
    }

    pub fn app_check_for_updates(&self) -> bool {
        self.app_check_for_updates
    }

    pub fn set_app_check_for_updates(&mut self, enabled: bool) {
        self.app_check_for_updates = enabled;
    }

    pub fn app_show_donation_button(&self) -> bool {
        self.app_show_donation_button
    }

    pub fn set_app_show_donation_button(&mut self, enabled: bool) {
        self.app_show_donation_button = enabled;
    }

    pub fn favourite_channels(&self) -> &[String] {
        &self.search_favourite_channels
    }

    /// Adds `channel` unless it is blank or already present (any case).
    pub fn add_favourite_channel(&mut self, channel: &str) -> bool {
        let channel = channel.trim();
        if channel.is_empty()
            || self
                .search_favourite_channels
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(channel))
        {
            return false;
        }
        self.search_favourite_channels.push(channel.to_string());
        true
    }

    pub fn remove_favourite_channel(&mut self, channel: &str) -> bool {
        let before = self.search_favourite_channels.len();
        self.search_favourite_channels
            .retain(|existing| !existing.eq_ignore_ascii_case(channel.trim()));
        before != self.search_favourite_channels.len()
    }

    pub fn is_favourite_channel(&self, channel: &str) -> bool {
        self.search_favourite_channels
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(channel.trim()))
    }

    pub fn search_channel_name(&self) -> &str {
        &self.search_channel_name
    }

    pub fn set_search_channel_name(&mut self, channel: impl Into<String>) {
        self.search_channel_name = channel.into();
        self.field_changed(PreferencesField::SearchChannelName);
    }

    pub fn search_video_type(&self) -> VideoType {
        self.search_video_type
    }

    pub fn set_search_video_type(&mut self, video_type: VideoType) {
        self.search_video_type = video_type;
    }

    pub fn search_load_limit(&self) -> LoadLimit {
        self.search_load_limit
    }

    pub fn set_search_load_limit(&mut self, load_limit: LoadLimit) {
        self.search_load_limit = load_limit;
        self.field_changed(PreferencesField::SearchLoadLimit);
    }

    pub fn search_load_last_days(&self) -> u32 {
        self.search_load_last_days
    }

    pub fn set_search_load_last_days(&mut self, days: u32) {
        self.search_load_last_days = days;
        self.field_changed(PreferencesField::SearchLoadLastDays);
    }

    pub fn search_load_last_vods(&self) -> u32 {
        self.search_load_last_vods
    }

    pub fn set_search_load_last_vods(&mut self, count: u32) {
        self.search_load_last_vods = count;
        self.field_changed(PreferencesField::SearchLoadLastVods);
    }

    pub fn search_on_startup(&self) -> bool {
        self.search_on_startup
    }

    pub fn set_search_on_startup(&mut self, enabled: bool) {
        self.search_on_startup = enabled;
        self.field_changed(PreferencesField::SearchOnStartup);
    }

    pub fn download_temp_folder(&self) -> &str {
        &self.download_temp_folder
    }

    pub fn set_download_temp_folder(&mut self, folder: impl Into<String>) {
        self.download_temp_folder = folder.into();
        self.field_changed(PreferencesField::DownloadTempFolder);
    }

    pub fn download_folder(&self) -> &str {
        &self.download_folder
    }

    pub fn set_download_folder(&mut self, folder: impl Into<String>) {
        self.download_folder = folder.into();
        self.field_changed(PreferencesField::DownloadFolder);
    }

    /// File name template, without extension.
    pub fn download_file_name(&self) -> &str {
        &self.download_file_name
    }

    pub fn set_download_file_name(&mut self, template: impl Into<String>) {
        self.download_file_name = template.into();
        self.field_changed(PreferencesField::DownloadFileName);
    }

    pub fn download_subfolders_for_fav(&self) -> bool {
        self.download_subfolders_for_fav
    }

    pub fn set_download_subfolders_for_fav(&mut self, enabled: bool) {
        self.download_subfolders_for_fav = enabled;
    }

    pub fn download_remove_completed(&self) -> bool {
        self.download_remove_completed
    }

    pub fn set_download_remove_completed(&mut self, enabled: bool) {
        self.download_remove_completed = enabled;
    }

    pub fn download_disable_conversion(&self) -> bool {
        self.download_disable_conversion
    }

    pub fn set_download_disable_conversion(&mut self, enabled: bool) {
        self.download_disable_conversion = enabled;
    }

    pub fn misc_use_external_player(&self) -> bool {
        self.misc_use_external_player
    }

    pub fn set_misc_use_external_player(&mut self, enabled: bool) {
        self.misc_use_external_player = enabled;
        self.field_changed(PreferencesField::MiscUseExternalPlayer);
    }

    /// Path of the player executable; only checked while enabled.
    pub fn misc_external_player(&self) -> &str {
        &self.misc_external_player
    }

    pub fn set_misc_external_player(&mut self, path: impl Into<String>) {
        self.misc_external_player = path.into();
        self.field_changed(PreferencesField::MiscExternalPlayer);
    }

    /// Initial channel search built from the search defaults.
    ///
    /// The timespan ends today and starts `search_load_last_days` earlier;
    /// both ends double as the reset values of the request.
    pub fn search_template(&self, today: Today) -> SearchRequest {
        let to = today.get();
        let from = to.checked_sub_days(Days::new(u64::from(self.search_load_last_days)));

        let mut request = SearchRequest::new(SearchMode::Channel).with_today(today);
        request.set_video_type(self.search_video_type);
        request.set_channel(self.search_channel_name.clone());
        request.set_load_limit(self.search_load_limit);
        request.set_timespan_defaults(from, Some(to));
        request.set_load_from(from);
        request.set_load_to(Some(to));
        request.set_last_vods(self.search_load_last_vods);
        request.template()
    }
}

impl Validatable for Preferences {
    type Field = PreferencesField;

    const FIELDS: &'static [PreferencesField] = &[
        PreferencesField::MiscExternalPlayer,
        PreferencesField::SearchChannelName,
        PreferencesField::SearchLoadLastDays,
        PreferencesField::SearchLoadLastVods,
        PreferencesField::DownloadTempFolder,
        PreferencesField::DownloadFolder,
        PreferencesField::DownloadFileName,
    ];

    const DEPENDENCIES: &'static [(PreferencesField, &'static [PreferencesField])] = &[
        (
            PreferencesField::SearchOnStartup,
            &[PreferencesField::SearchChannelName],
        ),
        (
            PreferencesField::SearchLoadLimit,
            &[
                PreferencesField::SearchLoadLastDays,
                PreferencesField::SearchLoadLastVods,
            ],
        ),
        (
            PreferencesField::MiscUseExternalPlayer,
            &[PreferencesField::MiscExternalPlayer],
        ),
    ];

    fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }

    fn check(&self, field: PreferencesField, errors: &mut ValidationErrors) {
        let range_message = |range: &std::ops::RangeInclusive<u32>| {
            format!("Value has to be between {} and {}!", range.start(), range.end())
        };
        match field {
            PreferencesField::SearchChannelName => {
                if self.search_on_startup && self.search_channel_name.trim().is_empty() {
                    errors.add(
                        field.name(),
                        "A default channel is required when 'Search on startup' is enabled!",
                    );
                }
            }
            PreferencesField::SearchLoadLastDays => {
                if self.search_load_limit == LoadLimit::Timespan
                    && !LAST_DAYS_RANGE.contains(&self.search_load_last_days)
                {
                    errors.add(field.name(), range_message(&LAST_DAYS_RANGE));
                }
            }
            PreferencesField::SearchLoadLastVods => {
                if self.search_load_limit == LoadLimit::LastVods
                    && !LAST_VODS_RANGE.contains(&self.search_load_last_vods)
                {
                    errors.add(field.name(), range_message(&LAST_VODS_RANGE));
                }
            }
            PreferencesField::DownloadTempFolder => {
                if self.download_temp_folder.trim().is_empty() {
                    errors.add(field.name(), "Please specify a temporary download folder!");
                }
            }
            PreferencesField::DownloadFolder => {
                if self.download_folder.trim().is_empty() {
                    errors.add(field.name(), "Please specify a default download folder!");
                }
            }
            PreferencesField::DownloadFileName => {
                if self.download_file_name.trim().is_empty() {
                    errors.add(field.name(), "Please specify a default download filename!");
                } else if self.download_file_name.contains('.')
                    || contains_invalid_filename_chars(&self.download_file_name)
                {
                    errors.add(
                        field.name(),
                        "Filename contains invalid characters or a '.'!",
                    );
                }
            }
            PreferencesField::MiscExternalPlayer => {
                if !self.misc_use_external_player {
                    return;
                }
                if self.misc_external_player.trim().is_empty() {
                    errors.add(field.name(), "Please specify an external player!");
                } else if !has_player_extension(&self.misc_external_player) {
                    errors.add(
                        field.name(),
                        format!("Filename must end with '{PLAYER_EXTENSION}'!"),
                    );
                }
            }
            PreferencesField::SearchOnStartup
            | PreferencesField::SearchLoadLimit
            | PreferencesField::MiscUseExternalPlayer => {}
        }
    }
}

fn has_player_extension(path: &str) -> bool {
    let path = path.trim_end();
    let split = path.len().saturating_sub(PLAYER_EXTENSION.len());
    path.get(split..)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PLAYER_EXTENSION))
}

/// Current preferences, shared as an immutable snapshot.
///
/// Readers hold an `Arc` to the snapshot they started with; edits go through
/// a working copy and replace the snapshot only when valid.
#[derive(Debug)]
pub struct PreferencesStore {
    current: RwLock<Arc<Preferences>>,
}

impl PreferencesStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            current: RwLock::new(Arc::new(preferences.working_copy())),
        }
    }

    pub fn snapshot(&self) -> Arc<Preferences> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn working_copy(&self) -> Preferences {
        self.snapshot().working_copy()
    }

    /// Validates `preferences` in full and makes it current when valid.
    ///
    /// An enabled external player that passed the field rules must also
    /// exist according to `files`.
    pub fn apply(
        &self,
        mut preferences: Preferences,
        files: &dyn FileLocator,
    ) -> Result<Arc<Preferences>, ValidationErrors> {
        preferences.validate(None);
        let player_field = PreferencesField::MiscExternalPlayer;
        if preferences.misc_use_external_player
            && !preferences.errors().contains(player_field.name())
            && !files.file_exists(Path::new(preferences.misc_external_player.trim()))
        {
            preferences.add_error(player_field, "The specified file does not exist!");
        }
        if preferences.has_errors() {
            leecher_warn!(
                "preferences refused, invalid fields: {:?}",
                preferences.errors().fields().collect::<Vec<_>>()
            );
            return Err(preferences.errors().clone());
        }
        let snapshot = Arc::new(preferences);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        leecher_info!(
            "preferences updated ({} favourite channels)",
            snapshot.favourite_channels().len()
        );
        Ok(snapshot)
    }
}
