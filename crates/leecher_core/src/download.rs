use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{Field, Validatable, ValidationErrors};

/// Container extension every download must carry.
pub const MEDIA_EXTENSION: &str = ".mp4";

/// Shortest clip the downloader accepts after cropping.
pub const MIN_CROPPED_LENGTH: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("video id must not be blank")]
    MissingVideoId,
    #[error("download folder must not be blank")]
    MissingFolder,
    #[error("download filename must not be blank")]
    MissingFilename,
}

/// Identity and total length of the VOD being downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VodInfo {
    id: String,
    length: Duration,
}

impl VodInfo {
    pub fn new(id: impl Into<String>, length: Duration) -> Result<Self, ParamsError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ParamsError::MissingVideoId);
        }
        Ok(Self { id, length })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn length(&self) -> Duration {
        self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoQuality {
    Source,
    High,
    Medium,
    Low,
    Mobile,
    AudioOnly,
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VideoQuality::Source => "Source",
            VideoQuality::High => "High",
            VideoQuality::Medium => "Medium",
            VideoQuality::Low => "Low",
            VideoQuality::Mobile => "Mobile",
            VideoQuality::AudioOnly => "Audio Only",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadField {
    Quality,
    Folder,
    Filename,
    CropStart,
    CropStartTime,
    CropEnd,
    CropEndTime,
}

impl Field for DownloadField {
    fn name(self) -> &'static str {
        match self {
            DownloadField::Quality => "quality",
            DownloadField::Folder => "folder",
            DownloadField::Filename => "filename",
            DownloadField::CropStart => "crop_start",
            DownloadField::CropStartTime => "crop_start_time",
            DownloadField::CropEnd => "crop_end",
            DownloadField::CropEndTime => "crop_end_time",
        }
    }
}

const CROP_TIMES: &[DownloadField] = &[DownloadField::CropStartTime, DownloadField::CropEndTime];

/// Parameters of a single VOD download, validated per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJobParameters {
    video: VodInfo,
    quality: Option<VideoQuality>,
    folder: String,
    filename: String,
    crop_start: bool,
    crop_start_time: Duration,
    crop_end: bool,
    crop_end_time: Duration,
    errors: ValidationErrors,
}

impl DownloadJobParameters {
    /// Creates parameters with cropping disabled and the end marker at the
    /// end of the video.
    pub fn new(
        video: VodInfo,
        quality: VideoQuality,
        folder: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, ParamsError> {
        let folder = folder.into();
        let filename = filename.into();
        if folder.trim().is_empty() {
            return Err(ParamsError::MissingFolder);
        }
        if filename.trim().is_empty() {
            return Err(ParamsError::MissingFilename);
        }
        let crop_end_time = video.length();
        Ok(Self {
            video,
            quality: Some(quality),
            folder,
            filename,
            crop_start: false,
            crop_start_time: Duration::ZERO,
            crop_end: false,
            crop_end_time,
            errors: ValidationErrors::new(),
        })
    }

    pub fn video(&self) -> &VodInfo {
        &self.video
    }

    pub fn quality(&self) -> Option<VideoQuality> {
        self.quality
    }

    pub fn set_quality(&mut self, quality: Option<VideoQuality>) {
        self.quality = quality;
        self.field_changed(DownloadField::Quality);
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn set_folder(&mut self, folder: impl Into<String>) {
        self.folder = folder.into();
        self.field_changed(DownloadField::Folder);
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
        self.field_changed(DownloadField::Filename);
    }

    pub fn full_path(&self) -> PathBuf {
        PathBuf::from(&self.folder).join(&self.filename)
    }

    pub fn crop_start(&self) -> bool {
        self.crop_start
    }

    pub fn set_crop_start(&mut self, enabled: bool) {
        self.crop_start = enabled;
        self.field_changed(DownloadField::CropStart);
    }

    pub fn crop_start_time(&self) -> Duration {
        self.crop_start_time
    }

    pub fn set_crop_start_time(&mut self, time: Duration) {
        self.crop_start_time = time;
        self.field_changed(DownloadField::CropStartTime);
    }

    pub fn crop_end(&self) -> bool {
        self.crop_end
    }

    pub fn set_crop_end(&mut self, enabled: bool) {
        self.crop_end = enabled;
        self.field_changed(DownloadField::CropEnd);
    }

    pub fn crop_end_time(&self) -> Duration {
        self.crop_end_time
    }

    pub fn set_crop_end_time(&mut self, time: Duration) {
        self.crop_end_time = time;
        self.field_changed(DownloadField::CropEndTime);
    }

    /// Length of the clip after applying the enabled crop markers.
    ///
    /// Saturates at zero when the end marker precedes the start marker; such
    /// a state always carries an error on `crop_end_time`.
    pub fn cropped_length(&self) -> Duration {
        let length = self.video.length();
        match (self.crop_start, self.crop_end) {
            (false, false) => length,
            (false, true) => self.crop_end_time,
            (true, false) => length.saturating_sub(self.crop_start_time),
            (true, true) => self.crop_end_time.saturating_sub(self.crop_start_time),
        }
    }

    pub fn cropped_length_display(&self) -> String {
        format_dayless(self.cropped_length())
    }

    fn check_crop_time(&self, time: Duration, errors: &mut ValidationErrors, field: DownloadField) {
        let length = self.video.length();
        if time > length {
            errors.add(
                field.name(),
                format!(
                    "Please enter a value between '{}' and '{}'!",
                    format_dayless(Duration::ZERO),
                    format_dayless(length)
                ),
            );
        } else if field == DownloadField::CropEndTime
            && self.crop_start
            && self.crop_end_time <= self.crop_start_time
        {
            errors.add(field.name(), "The end time has to be after the start time!");
        } else if self.cropped_length() < MIN_CROPPED_LENGTH {
            errors.add(
                field.name(),
                format!(
                    "The cropped video has to be at least {} seconds long!",
                    MIN_CROPPED_LENGTH.as_secs()
                ),
            );
        }
    }
}

impl Validatable for DownloadJobParameters {
    type Field = DownloadField;

    const FIELDS: &'static [DownloadField] = &[
        DownloadField::Quality,
        DownloadField::Folder,
        DownloadField::Filename,
        DownloadField::CropStartTime,
        DownloadField::CropEndTime,
    ];

    const DEPENDENCIES: &'static [(DownloadField, &'static [DownloadField])] = &[
        (DownloadField::CropStart, CROP_TIMES),
        (DownloadField::CropStartTime, CROP_TIMES),
        (DownloadField::CropEnd, CROP_TIMES),
        (DownloadField::CropEndTime, CROP_TIMES),
    ];

    fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }

    fn check(&self, field: DownloadField, errors: &mut ValidationErrors) {
        match field {
            DownloadField::Quality => {
                if self.quality.is_none() {
                    errors.add(field.name(), "Please select a quality!");
                }
            }
            DownloadField::Folder => {
                if self.folder.trim().is_empty() {
                    errors.add(field.name(), "Please specify a folder!");
                }
            }
            DownloadField::Filename => {
                if self.filename.trim().is_empty() {
                    errors.add(field.name(), "Please specify a filename!");
                } else if !has_media_extension(&self.filename) {
                    errors.add(
                        field.name(),
                        format!("Filename must end with '{MEDIA_EXTENSION}'!"),
                    );
                } else if contains_invalid_filename_chars(&self.filename) {
                    errors.add(field.name(), "Filename contains invalid characters!");
                }
            }
            DownloadField::CropStartTime => {
                if self.crop_start {
                    self.check_crop_time(self.crop_start_time, errors, field);
                }
            }
            DownloadField::CropEndTime => {
                if self.crop_end {
                    self.check_crop_time(self.crop_end_time, errors, field);
                }
            }
            DownloadField::CropStart | DownloadField::CropEnd => {}
        }
    }
}

fn has_media_extension(filename: &str) -> bool {
    let ext_len = MEDIA_EXTENSION.len();
    filename.len() >= ext_len
        && filename.is_char_boundary(filename.len() - ext_len)
        && filename[filename.len() - ext_len..].eq_ignore_ascii_case(MEDIA_EXTENSION)
}

/// Characters rejected in file names on any supported platform.
pub fn contains_invalid_filename_chars(name: &str) -> bool {
    name.chars().any(|c| {
        matches!(c,
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
        )
    })
}

/// Formats as `HH:MM:SS`, with hours growing past 24 instead of a day part.
pub fn format_dayless(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
