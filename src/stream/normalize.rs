//! Merge a stream descriptor and its extracted variants into the response
//! shape.

use super::lang::normalize_language;
use super::{ResolutionResult, ResolutionSource, StreamDescriptor, SubtitleTrack};

/// Build the final result.
///
/// `None` (no usable stream) gives empty lists. Otherwise the master
/// manifest is listed first as `"auto"`, followed by `extracted` unchanged.
/// Duplicate qualities or URLs are kept.
pub fn normalize(
    descriptor: Option<&StreamDescriptor>,
    extracted: Vec<ResolutionSource>,
) -> ResolutionResult {
    let Some(descriptor) = descriptor else {
        return ResolutionResult::default();
    };

    let auto = ResolutionSource {
        is_manifest_format: descriptor.is_manifest_format,
        ..ResolutionSource::auto(&descriptor.manifest_url)
    };

    let subtitles = descriptor
        .caption_tracks
        .iter()
        .map(|track| SubtitleTrack {
            language: normalize_language(&track.language_code),
            url: track.url.clone(),
        })
        .collect();

    ResolutionResult {
        sources: std::iter::once(auto).chain(extracted).collect(),
        subtitles,
    }
}
