//! Pure match predicates used by the cascade
//!
//! Each helper is a total function over strings so the acceptance rules can
//! be tested without a catalog. The cascade composes them; it never does ad
//! hoc string membership checks inline.

use bridge_traits::catalog::{CatalogAlbum, CatalogTrack};

/// Strip a trailing `(feat. …)` suffix from a title, if present
///
/// Only a *trailing* parenthetical is stripped; a feature credit in the
/// middle of a title is part of the title proper.
pub fn strip_feat_suffix(title: &str) -> &str {
    let trimmed = title.trim_end();
    if !trimmed.ends_with(')') {
        return title;
    }

    if let Some(open) = trimmed.rfind("(feat.") {
        let suffix = &trimmed[open..];
        // The feature credit must be the trailing parenthetical itself, not
        // one closed earlier in the title
        if !suffix[..suffix.len() - 1].contains(')') {
            return trimmed[..open].trim_end();
        }
    }
    title
}

/// Locate a track by exact title in an album track list
///
/// Tries exact equality first; if that misses, retries with the trailing
/// `(feat. …)` suffix stripped from both sides.
pub fn find_track_by_title<'a>(
    tracks: &'a [CatalogTrack],
    title: &str,
) -> Option<&'a CatalogTrack> {
    if let Some(track) = tracks.iter().find(|t| t.title == title) {
        return Some(track);
    }

    let wanted = strip_feat_suffix(title);
    tracks
        .iter()
        .find(|t| strip_feat_suffix(&t.title) == wanted)
}

/// Select an album from a discography by name
///
/// Ordered preference, first match wins:
/// 1. exact title equality
/// 2. the wanted name contained in a candidate title (e.g. "Album (Extended)")
/// 3. a candidate title contained in the wanted name (source carries an
///    edition suffix the catalog does not)
pub fn select_album<'a>(albums: &'a [CatalogAlbum], wanted: &str) -> Option<&'a CatalogAlbum> {
    albums
        .iter()
        .find(|a| a.title == wanted)
        .or_else(|| albums.iter().find(|a| a.title.contains(wanted)))
        .or_else(|| albums.iter().find(|a| wanted.contains(&a.title)))
}
