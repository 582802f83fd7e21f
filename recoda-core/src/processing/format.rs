//! Encoder MIME negotiation.

use crate::models::config::FormatPreference;

/// MP4 variants, most specific first.
pub const MP4_CANDIDATES: [&str; 3] = [
    "video/mp4;codecs=avc1,opus",
    "video/mp4;codecs=avc1",
    "video/mp4",
];

/// WebM variants, most specific first.
pub const WEBM_CANDIDATES: [&str; 3] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
];

pub fn mp4_supported(is_supported: impl Fn(&str) -> bool) -> bool {
    MP4_CANDIDATES.iter().any(|m| is_supported(m))
}

/// Pick the encoder MIME type for `preference`.
///
/// MP4 variants are tried when MP4 is requested, or on `Auto` when any MP4
/// variant is supported. WebM variants are always the fallback. `None` only
/// when nothing at all is supported.
pub fn negotiate_mime(
    preference: FormatPreference,
    is_supported: impl Fn(&str) -> bool,
) -> Option<&'static str> {
    let try_mp4 = match preference {
        FormatPreference::Mp4 => true,
        FormatPreference::Auto => mp4_supported(&is_supported),
        FormatPreference::Webm => false,
    };

    let mp4 = if try_mp4 { &MP4_CANDIDATES[..] } else { &[][..] };
    mp4.iter()
        .chain(WEBM_CANDIDATES.iter())
        .copied()
        .find(|m| is_supported(m))
}
