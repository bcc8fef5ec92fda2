//! Records and the videos they contain.
//!
//! A record is the unit the index browses by. Its content shape depends on
//! its type: a movie wraps one video, a series groups episodes into seasons
//! and keeps specials apart, a collection is a flat list.

use std::collections::HashSet;

use crate::error::{ModelError, Result};
use crate::ids::{RecordId, SeasonId, ThumbnailId, TrackId, VideoId};

/// Discriminant of [`RecordContent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RecordType {
    Movie,
    Series,
    Collection,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::Movie => write!(f, "movie"),
            RecordType::Series => write!(f, "series"),
            RecordType::Collection => write!(f, "collection"),
        }
    }
}

/// Subset of the probe metadata the index exposes for a track.
///
/// Values are passed through as the prober reported them (strings).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackMetadata {
    pub duration: Option<String>,
    pub format_name: Option<String>,
    pub format_long_name: Option<String>,
    pub bit_rate: Option<String>,
}

impl TrackMetadata {
    /// Duration in seconds, if the prober reported a parseable one
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
    }
}

/// Descriptor of a single playable video
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VideoInfo {
    pub id: VideoId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub thumbnail_id: Option<ThumbnailId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub track_id: Option<TrackId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub metadata: Option<TrackMetadata>,
}

impl VideoInfo {
    pub fn new(id: impl Into<VideoId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Season {
    pub id: SeasonId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    pub episodes: Vec<VideoInfo>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesContent {
    pub seasons: Vec<Season>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub specials: Vec<VideoInfo>,
}

/// Typed content of a record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordContent {
    Movie(VideoInfo),
    Series(SeriesContent),
    Collection(Vec<VideoInfo>),
}

impl RecordContent {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordContent::Movie(_) => RecordType::Movie,
            RecordContent::Series(_) => RecordType::Series,
            RecordContent::Collection(_) => RecordType::Collection,
        }
    }

    /// All videos in canonical play order: seasons in array order with their
    /// episodes in array order, then specials; collections in array order.
    pub fn videos(&self) -> Box<dyn Iterator<Item = &VideoInfo> + '_> {
        match self {
            RecordContent::Movie(video) => Box::new(std::iter::once(video)),
            RecordContent::Series(series) => Box::new(
                series
                    .seasons
                    .iter()
                    .flat_map(|season| season.episodes.iter())
                    .chain(series.specials.iter()),
            ),
            RecordContent::Collection(items) => Box::new(items.iter()),
        }
    }
}

/// A browsable record together with its content
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "raw::RawRecord", into = "raw::RawRecord")
)]
pub struct Record {
    pub id: RecordId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail_id: Option<ThumbnailId>,
    pub content: RecordContent,
}

impl Record {
    /// Build a record, rejecting content that repeats a video id.
    pub fn new(id: impl Into<RecordId>, content: RecordContent) -> Result<Self> {
        let record = Self {
            id: id.into(),
            name: None,
            description: None,
            thumbnail_id: None,
            content,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn record_type(&self) -> RecordType {
        self.content.record_type()
    }

    pub fn videos(&self) -> impl Iterator<Item = &VideoInfo> {
        self.content.videos()
    }

    pub fn find_video(&self, id: &VideoId) -> Option<&VideoInfo> {
        self.videos().find(|video| &video.id == id)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for video in self.videos() {
            if !seen.insert(&video.id) {
                return Err(ModelError::DuplicateVideo(video.id.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod raw {
    //! Wire shape of a record: the content shape is only implied by `type`.

    use serde::{Deserialize, Serialize};

    use super::{Record, RecordContent, RecordType, SeriesContent, VideoInfo};
    use crate::error::ModelError;
    use crate::ids::{RecordId, ThumbnailId};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct RawRecord {
        id: RecordId,
        #[serde(rename = "type")]
        record_type: RecordType,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        thumbnail_id: Option<ThumbnailId>,
        content: RawContent,
    }

    // Series first: a series object never parses as a video (no `id`), and
    // a video object never parses as a series (no `seasons`).
    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum RawContent {
        Series(SeriesContent),
        Collection(Vec<VideoInfo>),
        Movie(VideoInfo),
    }

    impl TryFrom<RawRecord> for Record {
        type Error = ModelError;

        fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
            let content = match raw.content {
                RawContent::Series(series) => RecordContent::Series(series),
                RawContent::Collection(items) => {
                    RecordContent::Collection(items)
                }
                RawContent::Movie(video) => RecordContent::Movie(video),
            };
            if content.record_type() != raw.record_type {
                return Err(ModelError::ContentMismatch {
                    declared: raw.record_type,
                    found: content.record_type(),
                });
            }
            let record = Record {
                id: raw.id,
                name: raw.name,
                description: raw.description,
                thumbnail_id: raw.thumbnail_id,
                content,
            };
            record.validate()?;
            Ok(record)
        }
    }

    impl From<Record> for RawRecord {
        fn from(record: Record) -> Self {
            let record_type = record.record_type();
            let content = match record.content {
                RecordContent::Movie(video) => RawContent::Movie(video),
                RecordContent::Series(series) => RawContent::Series(series),
                RecordContent::Collection(items) => {
                    RawContent::Collection(items)
                }
            };
            RawRecord {
                id: record.id,
                record_type,
                name: record.name,
                description: record.description,
                thumbnail_id: record.thumbnail_id,
                content,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Record {
        Record::new(
            "r1",
            RecordContent::Series(SeriesContent {
                seasons: vec![
                    Season {
                        id: "s01".into(),
                        name: Some("Season 1".into()),
                        episodes: vec![VideoInfo::new("e1"), VideoInfo::new("e2")],
                    },
                    Season {
                        id: "s02".into(),
                        name: None,
                        episodes: vec![VideoInfo::new("e3")],
                    },
                ],
                specials: vec![VideoInfo::new("sp1")],
            }),
        )
        .unwrap()
    }

    #[test]
    fn series_videos_follow_seasons_then_specials() {
        let record = series();
        let ids: Vec<&str> = record.videos().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e3", "sp1"]);
    }

    #[test]
    fn duplicate_video_ids_are_rejected() {
        let result = Record::new(
            "r2",
            RecordContent::Collection(vec![
                VideoInfo::new("v1"),
                VideoInfo::new("v1"),
            ]),
        );
        assert_eq!(result, Err(ModelError::DuplicateVideo("v1".into())));
    }

    #[test]
    fn duration_parses_prober_strings() {
        let metadata = TrackMetadata {
            duration: Some("1432.250000".into()),
            ..TrackMetadata::default()
        };
        assert_eq!(metadata.duration_secs(), Some(1432.25));
        assert_eq!(TrackMetadata::default().duration_secs(), None);
    }

    #[cfg(feature = "serde")]
    mod wire {
        use super::super::*;

        #[test]
        fn decodes_series_record() {
            let json = r#"{
                "id": "r1", "type": "series", "name": "Show",
                "description": null, "thumbnailId": "t1",
                "content": {
                    "seasons": [
                        {"id": "s1", "name": "One", "episodes": [
                            {"id": "e1", "name": "Pilot", "trackId": "k1",
                             "metadata": {"duration": "60.0"}}
                        ]}
                    ],
                    "specials": [{"id": "x1"}]
                }
            }"#;
            let record: Record = serde_json::from_str(json).unwrap();
            assert_eq!(record.record_type(), RecordType::Series);
            let ids: Vec<&str> =
                record.videos().map(|v| v.id.as_str()).collect();
            assert_eq!(ids, vec!["e1", "x1"]);
            let pilot = record.find_video(&"e1".into()).unwrap();
            assert_eq!(pilot.track_id.as_ref().unwrap().as_str(), "k1");
        }

        #[test]
        fn decodes_movie_and_collection_records() {
            let movie: Record = serde_json::from_str(
                r#"{"id": "m", "type": "movie", "content": {"id": "v"}}"#,
            )
            .unwrap();
            assert_eq!(movie.record_type(), RecordType::Movie);

            let collection: Record = serde_json::from_str(
                r#"{"id": "c", "type": "collection",
                    "content": [{"id": "a"}, {"id": "b"}]}"#,
            )
            .unwrap();
            assert_eq!(collection.videos().count(), 2);
        }

        #[test]
        fn rejects_type_content_mismatch() {
            let result: std::result::Result<Record, _> = serde_json::from_str(
                r#"{"id": "m", "type": "series", "content": {"id": "v"}}"#,
            );
            assert!(result.is_err());
        }
    }
}
