//! Leecher core: field-scoped validation of download and search parameters,
//! strict video url/id parsing, and OAuth redirect classification.
mod download;
mod ids;
mod oauth;
mod search;
mod validation;

pub use download::{
    contains_invalid_filename_chars, format_dayless, DownloadField, DownloadJobParameters,
    ParamsError, VideoQuality, VodInfo, MEDIA_EXTENSION, MIN_CROPPED_LENGTH,
};
pub use ids::{
    non_blank_lines, parse_video_ids, parse_video_urls, video_id_from_url, ParseIdError,
    UrlIdError, VideoId, MAX_VIDEO_ID,
};
pub use oauth::{
    classify_redirect, CallbackEndpoint, OAuthOutcome, EMPTY_TOKEN_CODE, UNSPECIFIED_DESCRIPTION,
};
pub use search::{
    LoadLimit, LoadWindow, SearchField, SearchMode, SearchQuery, SearchRequest, Today, VideoType,
    LAST_VODS_RANGE, MIN_SEARCH_DATE,
};
pub use validation::{Field, Validatable, ValidationErrors};
