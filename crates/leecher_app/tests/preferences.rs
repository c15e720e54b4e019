use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use chrono::NaiveDate;
use leecher_app::{FileLocator, Preferences, PreferencesStore};
use leecher_core::{LoadLimit, LoadWindow, SearchMode, SearchQuery, Today, Validatable, VideoType};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(leecher_logging::initialize_for_tests);
}

#[derive(Default)]
struct KnownFiles(HashSet<PathBuf>);

impl KnownFiles {
    fn with(paths: &[&str]) -> Self {
        Self(paths.iter().map(PathBuf::from).collect())
    }
}

impl FileLocator for KnownFiles {
    fn file_exists(&self, path: &Path) -> bool {
        self.0.contains(path)
    }
}

fn preferences() -> Preferences {
    Preferences::new("/downloads", "/tmp/leecher")
}

fn messages(preferences: &Preferences, field: &str) -> Vec<String> {
    preferences
        .errors()
        .get(field)
        .map(|m| m.to_vec())
        .unwrap_or_default()
}

#[test]
fn defaults_are_valid() {
    init_logging();
    let mut preferences = preferences();
    preferences.validate(None);
    assert!(!preferences.has_errors());
    assert_eq!(preferences.search_load_limit(), LoadLimit::LastVods);
    assert_eq!(preferences.search_load_last_vods(), 10);
}

#[test]
fn search_on_startup_needs_a_channel() {
    init_logging();
    let mut preferences = preferences();
    preferences.set_search_on_startup(true);
    assert_eq!(
        messages(&preferences, "search_channel_name"),
        vec!["A default channel is required when 'Search on startup' is enabled!".to_string()]
    );

    preferences.set_search_channel_name("someone");
    assert!(!preferences.has_errors());

    preferences.set_search_channel_name("");
    assert!(preferences.has_errors());
    preferences.set_search_on_startup(false);
    assert!(!preferences.has_errors());
}

#[test]
fn load_ranges_follow_the_active_limit() {
    init_logging();
    let mut preferences = preferences();
    preferences.set_search_load_last_days(0);
    assert!(!preferences.has_errors());

    preferences.set_search_load_limit(LoadLimit::Timespan);
    assert_eq!(
        messages(&preferences, "search_load_last_days"),
        vec!["Value has to be between 1 and 999!".to_string()]
    );

    preferences.set_search_load_limit(LoadLimit::LastVods);
    assert!(!preferences.has_errors());

    preferences.set_search_load_last_vods(1000);
    assert!(preferences.errors().contains("search_load_last_vods"));
}

#[test]
fn folders_and_file_name_template_are_checked() {
    init_logging();
    let mut preferences = preferences();
    preferences.set_download_folder(" ");
    preferences.set_download_temp_folder("");
    assert_eq!(
        preferences.errors().fields().collect::<Vec<_>>(),
        vec!["download_folder", "download_temp_folder"]
    );

    for bad in ["vod.mp4", "a|b"] {
        preferences.set_download_file_name(bad);
        assert_eq!(
            messages(&preferences, "download_file_name"),
            vec!["Filename contains invalid characters or a '.'!".to_string()],
            "{bad}"
        );
    }
    preferences.set_download_file_name("");
    assert_eq!(
        messages(&preferences, "download_file_name"),
        vec!["Please specify a default download filename!".to_string()]
    );
}

#[test]
fn favourite_channels_are_unique_ignoring_case() {
    let mut preferences = preferences();
    assert!(preferences.add_favourite_channel("Someone"));
    assert!(!preferences.add_favourite_channel(" someone "));
    assert!(!preferences.add_favourite_channel("  "));
    assert!(preferences.add_favourite_channel("other"));
    assert_eq!(
        preferences.favourite_channels(),
        &["Someone".to_string(), "other".to_string()]
    );

    assert!(preferences.is_favourite_channel("SOMEONE"));
    assert!(preferences.remove_favourite_channel("someone"));
    assert!(!preferences.remove_favourite_channel("someone"));
    assert_eq!(preferences.favourite_channels(), &["other".to_string()]);
}

#[test]
fn store_hands_out_immutable_snapshots() {
    init_logging();
    let store = PreferencesStore::new(preferences());
    let before = store.snapshot();

    let mut edited = store.working_copy();
    edited.add_favourite_channel("someone");
    store.apply(edited, &KnownFiles::default()).unwrap();

    assert!(before.favourite_channels().is_empty());
    assert_eq!(store.snapshot().favourite_channels(), &["someone".to_string()]);
    assert!(!Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn store_rejects_invalid_preferences() {
    init_logging();
    let store = PreferencesStore::new(preferences());
    let before = store.snapshot();

    let mut edited = store.working_copy();
    edited.set_download_folder("");
    let errors = store.apply(edited, &KnownFiles::default()).unwrap_err();

    assert!(errors.contains("download_folder"));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn search_template_uses_search_defaults() {
    init_logging();
    let mut preferences = preferences();
    preferences.set_search_channel_name("someone");
    preferences.set_search_video_type(VideoType::Upload);
    preferences.set_search_load_limit(LoadLimit::Timespan);
    preferences.set_search_load_last_days(7);

    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let mut request = preferences.search_template(Today::fixed(today));

    assert_eq!(request.mode(), SearchMode::Channel);
    assert!(!request.has_errors());
    assert_eq!(request.load_from_default(), NaiveDate::from_ymd_opt(2024, 6, 8));
    assert_eq!(request.load_to_default(), Some(today));
    assert_eq!(
        request.query(),
        Some(SearchQuery::Channel {
            name: "someone".to_string(),
            video_type: VideoType::Upload,
            window: LoadWindow::Timespan {
                from: NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
                to: today,
            },
        })
    );
}

#[test]
fn app_settings_default_on_and_survive_working_copy() {
    let mut preferences = preferences();
    assert!(preferences.app_check_for_updates());
    assert!(preferences.app_show_donation_button());

    preferences.set_app_check_for_updates(false);
    preferences.set_app_show_donation_button(false);
    let copy = preferences.working_copy();
    assert!(!copy.app_check_for_updates());
    assert!(!copy.app_show_donation_button());
}

#[test]
fn external_player_is_checked_only_while_enabled() {
    init_logging();
    let mut preferences = preferences();
    preferences.set_misc_external_player("");
    assert!(!preferences.has_errors());

    preferences.set_misc_use_external_player(true);
    assert_eq!(
        messages(&preferences, "misc_external_player"),
        vec!["Please specify an external player!".to_string()]
    );

    preferences.set_misc_external_player("/opt/player/vlc");
    assert_eq!(
        messages(&preferences, "misc_external_player"),
        vec!["Filename must end with '.exe'!".to_string()]
    );

    preferences.set_misc_external_player("C:/Players/VLC.EXE");
    assert!(!preferences.has_errors());

    preferences.set_misc_external_player("");
    preferences.set_misc_use_external_player(false);
    assert!(!preferences.has_errors());
}

#[test]
fn store_requires_an_existing_external_player() {
    init_logging();
    let store = PreferencesStore::new(preferences());
    let mut edited = store.working_copy();
    edited.set_misc_use_external_player(true);
    edited.set_misc_external_player("C:/Players/vlc.exe");

    let errors = store
        .apply(edited.clone(), &KnownFiles::default())
        .unwrap_err();
    assert_eq!(
        errors.get("misc_external_player"),
        Some(&["The specified file does not exist!".to_string()][..])
    );

    let applied = store
        .apply(edited, &KnownFiles::with(&["C:/Players/vlc.exe"]))
        .unwrap();
    assert!(applied.misc_use_external_player());
    assert_eq!(store.snapshot().misc_external_player(), "C:/Players/vlc.exe");
}

#[test]
fn store_skips_file_lookup_for_malformed_player() {
    init_logging();
    let store = PreferencesStore::new(preferences());
    let mut edited = store.working_copy();
    edited.set_misc_use_external_player(true);
    edited.set_misc_external_player("vlc");

    let errors = store
        .apply(edited, &KnownFiles::with(&["vlc"]))
        .unwrap_err();
    assert_eq!(
        errors.get("misc_external_player"),
        Some(&["Filename must end with '.exe'!".to_string()][..])
    );
}
