// Domain rules - Segment planning and file naming policies

use crate::domain::model::*;

/// Known video container extensions and the media type delivered for each
const VIDEO_MEDIA_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("ts", "video/mp2t"),
    ("mts", "video/mp2t"),
    ("m2ts", "video/mp2t"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("3gp", "video/3gpp"),
    ("ogv", "video/ogg"),
];

/// Split a file name on its last `.` into `(base, extension)`
///
/// A name without a dot has an empty extension. Earlier dots stay in the base.
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((base, extension)) => (base, extension),
        None => (name, ""),
    }
}

/// Media type for a video file name, or `None` if it is not a known video type
pub fn media_type_for(name: &str) -> Option<&'static str> {
    let (_, extension) = split_file_name(name);
    if extension.is_empty() {
        return None;
    }
    let extension = extension.to_ascii_lowercase();
    VIDEO_MEDIA_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, media_type)| *media_type)
}

/// Output name of the segment with the given 0-based ordinal
pub fn segment_output_name(source_name: &str, ordinal: usize) -> String {
    let (base, extension) = split_file_name(source_name);
    if extension.is_empty() {
        format!("{}-{}", base, ordinal + 1)
    } else {
        format!("{}-{}.{}", base, ordinal + 1, extension)
    }
}

/// Slice a source into contiguous segments of `interval` length
///
/// Returns an empty plan while the duration is unknown. The last segment is
/// clamped to the duration and may be shorter than the interval.
pub fn plan_segments(source: &MediaSource, interval: SplitInterval) -> Vec<Segment> {
    if !source.has_duration() {
        return Vec::new();
    }

    let duration = source.duration_seconds;
    let step = f64::from(interval.seconds());
    let segment_count = (duration / step).ceil() as usize;

    (0..segment_count)
        .map(|i| {
            let from_seconds = i as f64 * step;
            let to_seconds = ((i + 1) as f64 * step).min(duration);
            Segment {
                id: i,
                from_seconds,
                to_seconds,
                output_name: segment_output_name(&source.name, i),
                status: SegmentStatus::Pending,
            }
        })
        .collect()
}

/// Build the full plan for a source, including the engine input name and media type
pub fn plan_for_source(source: &MediaSource, interval: SplitInterval) -> SegmentPlan {
    let media_type = media_type_for(&source.name).unwrap_or("application/octet-stream");
    SegmentPlan::new(
        source.name.clone(),
        media_type,
        plan_segments(source, interval),
    )
}
