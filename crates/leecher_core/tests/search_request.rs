use std::sync::Once;

use chrono::NaiveDate;
use leecher_core::{
    LoadLimit, LoadWindow, SearchMode, SearchQuery, SearchRequest, Today, Validatable, VideoId,
    VideoType,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(leecher_logging::initialize_for_tests);
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn request(mode: SearchMode) -> SearchRequest {
    SearchRequest::new(mode).with_today(Today::fixed(date(2024, 6, 15)))
}

fn channel_request() -> SearchRequest {
    let mut request = request(SearchMode::Channel);
    request.set_channel("somechannel");
    request
}

fn timespan_request(from: Option<NaiveDate>, to: Option<NaiveDate>) -> SearchRequest {
    let mut request = channel_request();
    request.set_load_limit(LoadLimit::Timespan);
    request.set_load_from(from);
    request.set_load_to(to);
    request
}

fn messages(request: &SearchRequest, field: &str) -> Vec<String> {
    request
        .errors()
        .get(field)
        .map(|m| m.to_vec())
        .unwrap_or_default()
}

fn ids(values: &[u32]) -> Vec<VideoId> {
    values.iter().map(|v| VideoId::new(*v).unwrap()).collect()
}

#[test]
fn channel_search_with_last_vods_builds_query() {
    init_logging();
    let mut request = channel_request();
    request.set_video_type(VideoType::Highlight);

    assert_eq!(
        request.query(),
        Some(SearchQuery::Channel {
            name: "somechannel".to_string(),
            video_type: VideoType::Highlight,
            window: LoadWindow::LastVods(10),
        })
    );
}

#[test]
fn blank_channel_is_rejected() {
    init_logging();
    let mut request = request(SearchMode::Channel);
    request.set_channel("   ");

    assert_eq!(
        messages(&request, "channel"),
        vec!["Please enter a channel name!".to_string()]
    );
    assert_eq!(request.query(), None);
}

#[test]
fn last_vods_must_be_between_one_and_999() {
    init_logging();
    let mut request = channel_request();
    for valid in [1, 999] {
        request.set_last_vods(valid);
        assert!(!request.has_errors(), "{valid} should be accepted");
    }
    for invalid in [0, 1000] {
        request.set_last_vods(invalid);
        assert_eq!(
            messages(&request, "last_vods"),
            vec!["Value has to be between 1 and 999!".to_string()]
        );
    }
}

#[test]
fn timespan_requires_both_dates() {
    init_logging();
    let mut request = timespan_request(None, None);
    request.validate(None);

    assert_eq!(
        messages(&request, "load_from"),
        vec!["Please enter a date!".to_string()]
    );
    assert_eq!(
        messages(&request, "load_to"),
        vec!["Please enter a date!".to_string()]
    );
}

#[test]
fn timespan_before_minimum_date_is_rejected() {
    init_logging();
    let mut request = timespan_request(Some(date(2009, 12, 31)), Some(date(2024, 6, 1)));
    assert_eq!(
        messages(&request, "load_from"),
        vec!["Date has to be on or after '2010-01-01'!".to_string()]
    );

    request.set_load_from(Some(date(2010, 1, 1)));
    assert_eq!(
        request.query(),
        Some(SearchQuery::Channel {
            name: "somechannel".to_string(),
            video_type: VideoType::Broadcast,
            window: LoadWindow::Timespan {
                from: date(2010, 1, 1),
                to: date(2024, 6, 1),
            },
        })
    );
}

#[test]
fn future_dates_are_rejected() {
    init_logging();
    let request = timespan_request(Some(date(2024, 6, 16)), Some(date(2024, 6, 17)));

    assert_eq!(
        messages(&request, "load_from"),
        vec!["Date cannot be in the future!".to_string()]
    );
    assert_eq!(
        messages(&request, "load_to"),
        vec!["Date cannot be in the future!".to_string()]
    );
}

#[test]
fn today_is_not_in_the_future() {
    init_logging();
    let mut request = timespan_request(Some(date(2024, 6, 15)), Some(date(2024, 6, 15)));
    request.validate(None);
    assert!(!request.has_errors());
}

#[test]
fn moving_load_from_past_load_to_rechecks_load_to() {
    init_logging();
    let mut request = timespan_request(Some(date(2024, 6, 10)), Some(date(2024, 6, 12)));
    assert!(!request.has_errors());

    request.set_load_from(Some(date(2024, 6, 13)));
    assert_eq!(
        messages(&request, "load_to"),
        vec!["Date has to be on or after '2024-06-13'!".to_string()]
    );

    request.set_load_from(Some(date(2024, 6, 11)));
    assert!(!request.has_errors());
}

#[test]
fn switching_to_last_vods_drops_date_errors() {
    init_logging();
    let mut request = timespan_request(None, None);
    assert!(request.has_errors());

    request.set_load_limit(LoadLimit::LastVods);
    assert!(!request.has_errors());
}

#[test]
fn url_list_yields_ids_in_order() {
    init_logging();
    let mut request = request(SearchMode::Urls);
    request.set_urls(
        "https://www.twitch.tv/videos/123456\r\n\r\nHTTPS://example.tv/VIDEO/42/\n  \nhttps://example.tv/a/videos/7?t=1h",
    );

    assert_eq!(
        request.query(),
        Some(SearchQuery::Videos(ids(&[123_456, 42, 7])))
    );
}

#[test]
fn single_malformed_url_invalidates_the_list() {
    init_logging();
    for bad in [
        "https://example.tv/videos/",
        "https://example.tv/videos/abc",
        "https://example.tv/videos/0",
        "https://example.tv/clips/123",
        "example.tv/videos/123",
    ] {
        let mut request = request(SearchMode::Urls);
        request.set_urls(format!("https://example.tv/videos/1\n{bad}"));
        assert_eq!(
            messages(&request, "urls"),
            vec!["One or more URLs are invalid!".to_string()],
            "{bad}"
        );
        assert_eq!(request.query(), None, "{bad}");
    }
}

#[test]
fn empty_url_list_is_required() {
    init_logging();
    let mut request = request(SearchMode::Urls);
    request.set_urls("\n \n");
    assert_eq!(
        messages(&request, "urls"),
        vec!["Please enter one or more Twitch video URLs!".to_string()]
    );
}

#[test]
fn id_list_accepts_positive_integers() {
    init_logging();
    let mut request = request(SearchMode::Ids);
    request.set_ids("123\n 456 \n\n2147483647");

    assert_eq!(
        request.query(),
        Some(SearchQuery::Videos(ids(&[123, 456, 2_147_483_647])))
    );
}

#[test]
fn id_list_rejects_any_bad_token() {
    init_logging();
    for bad in ["0", "-1", "abc", "12a", "2147483648"] {
        let mut request = request(SearchMode::Ids);
        request.set_ids(format!("1\n{bad}\n3"));
        assert_eq!(
            messages(&request, "ids"),
            vec!["One or more IDs are invalid!".to_string()],
            "{bad}"
        );
        assert_eq!(request.query(), None, "{bad}");
    }
}

#[test]
fn inactive_mode_fields_are_ignored() {
    init_logging();
    let mut request = request(SearchMode::Ids);
    request.set_channel("");
    request.set_urls("not a url");
    request.set_load_limit(LoadLimit::Timespan);
    request.set_ids("5");

    assert_eq!(request.query(), Some(SearchQuery::Videos(ids(&[5]))));
}

#[test]
fn changing_mode_revalidates_every_field() {
    init_logging();
    let mut request = channel_request();
    assert!(!request.has_errors());

    request.set_mode(SearchMode::Urls);
    assert_eq!(request.errors().fields().collect::<Vec<_>>(), vec!["urls"]);

    request.set_mode(SearchMode::Channel);
    assert!(!request.has_errors());
}

#[test]
fn template_keeps_inputs_but_not_errors() {
    init_logging();
    let mut request = request(SearchMode::Ids);
    request.set_ids("x");
    assert!(request.has_errors());

    let copy = request.template();
    assert_eq!(copy.ids(), "x");
    assert_eq!(copy.mode(), SearchMode::Ids);
    assert!(!copy.has_errors());
}
