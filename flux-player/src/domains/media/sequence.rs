//! Linear play order of a record
//!
//! A movie plays one video; a series plays every season's episodes in order
//! and then its specials; a collection plays its items in order. Previous and
//! next saturate at the ends: asking past either end, or for an id the record
//! does not contain, returns the id that was asked about.

use flux_model::{Record, RecordContent, VideoId, VideoInfo};

pub fn flatten(record: &Record) -> Vec<VideoId> {
    record.videos().map(|video| video.id.clone()).collect()
}

/// Index of `id` in the play order
pub fn position(record: &Record, id: &VideoId) -> Option<usize> {
    record.videos().position(|video| &video.id == id)
}

pub fn previous(record: &Record, id: &VideoId) -> VideoId {
    let order = flatten(record);
    match order.iter().position(|candidate| candidate == id) {
        Some(index) if index > 0 => order[index - 1].clone(),
        _ => id.clone(),
    }
}

pub fn next(record: &Record, id: &VideoId) -> VideoId {
    let order = flatten(record);
    match order.iter().position(|candidate| candidate == id) {
        Some(index) if index + 1 < order.len() => order[index + 1].clone(),
        _ => id.clone(),
    }
}

pub fn has_previous(record: &Record, id: &VideoId) -> bool {
    &previous(record, id) != id
}

pub fn has_next(record: &Record, id: &VideoId) -> bool {
    &next(record, id) != id
}

/// Where a record starts when there is no stored progress: the first episode
/// of the first season, else the first special, else the first item.
pub fn first_video(record: &Record) -> Option<&VideoInfo> {
    match &record.content {
        RecordContent::Movie(video) => Some(video),
        RecordContent::Series(series) => series
            .seasons
            .first()
            .and_then(|season| season.episodes.first())
            .or_else(|| series.specials.first()),
        RecordContent::Collection(items) => items.first(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_model::{Season, SeriesContent};

    fn id(raw: &str) -> VideoId {
        VideoId::from(raw)
    }

    fn ids(raw: &[&str]) -> Vec<VideoId> {
        raw.iter().copied().map(id).collect()
    }

    fn series() -> Record {
        Record::new(
            "show",
            RecordContent::Series(SeriesContent {
                seasons: vec![
                    Season {
                        id: "s1".into(),
                        name: None,
                        episodes: vec![VideoInfo::new("e1"), VideoInfo::new("e2")],
                    },
                    Season {
                        id: "s2".into(),
                        name: None,
                        episodes: vec![VideoInfo::new("e3")],
                    },
                ],
                specials: vec![VideoInfo::new("s1")],
            }),
        )
        .unwrap()
    }

    fn collection() -> Record {
        Record::new(
            "mix",
            RecordContent::Collection(vec![
                VideoInfo::new("v1"),
                VideoInfo::new("v2"),
                VideoInfo::new("v3"),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn series_flattens_seasons_then_specials() {
        let record = series();
        assert_eq!(flatten(&record), ids(&["e1", "e2", "e3", "s1"]));
        assert_eq!(next(&record, &id("e2")), id("e3"));
        assert_eq!(next(&record, &id("e3")), id("s1"));
        assert_eq!(next(&record, &id("s1")), id("s1"));
    }

    #[test]
    fn collection_neighbours() {
        let record = collection();
        assert_eq!(previous(&record, &id("v1")), id("v1"));
        assert_eq!(next(&record, &id("v2")), id("v3"));
        assert_eq!(previous(&record, &id("v3")), id("v2"));
    }

    #[test]
    fn movie_is_a_single_step() {
        let record =
            Record::new("m", RecordContent::Movie(VideoInfo::new("feature")))
                .unwrap();
        assert_eq!(flatten(&record), ids(&["feature"]));
        assert!(!has_next(&record, &id("feature")));
        assert!(!has_previous(&record, &id("feature")));
    }

    #[test]
    fn absent_id_is_returned_unchanged() {
        let record = collection();
        assert_eq!(next(&record, &id("nope")), id("nope"));
        assert_eq!(previous(&record, &id("nope")), id("nope"));
        assert_eq!(position(&record, &id("nope")), None);
    }

    #[test]
    fn previous_undoes_next_except_at_the_end() {
        let record = series();
        let order = flatten(&record);
        for video in &order[..order.len() - 1] {
            assert_eq!(&previous(&record, &next(&record, video)), video);
        }
    }

    #[test]
    fn flatten_is_stable() {
        let record = series();
        assert_eq!(flatten(&record), flatten(&record));
    }

    #[test]
    fn empty_series_start_falls_back_to_specials() {
        let record = Record::new(
            "extras",
            RecordContent::Series(SeriesContent {
                seasons: vec![Season {
                    id: "s0".into(),
                    name: None,
                    episodes: vec![],
                }],
                specials: vec![VideoInfo::new("bonus")],
            }),
        )
        .unwrap();
        assert_eq!(first_video(&record).map(|v| v.id.as_str()), Some("bonus"));
        assert_eq!(
            first_video(&series()).map(|v| v.id.as_str()),
            Some("e1")
        );
    }
}
