//! Final failure report of one sync pass

use tracing::warn;

use core_resolver::UnresolvedTrack;

/// Descriptors that failed both catalogs, final, no further retry
#[derive(Debug, Default)]
pub struct NotFoundReport {
    entries: Vec<UnresolvedTrack>,
}

impl NotFoundReport {
    pub fn new(entries: Vec<UnresolvedTrack>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[UnresolvedTrack] {
        &self.entries
    }

    /// One line per failure, catalog and track label retained
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(UnresolvedTrack::report_line).collect()
    }

    /// Surface the report to the operator via the log
    pub fn log(&self, playlist: &str) {
        if self.is_empty() {
            return;
        }
        warn!(playlist, count = self.len(), "tracks not found on any catalog");
        for line in self.lines() {
            warn!(playlist, "  {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_resolver::TrackDescriptor;

    #[test]
    fn test_lines_retain_catalog_and_label() {
        let report = NotFoundReport::new(vec![UnresolvedTrack {
            descriptor: TrackDescriptor {
                title: "Song".to_string(),
                album: "Album".to_string(),
                artists: vec!["Artist".to_string()],
                isrc: None,
                position: 0,
            },
            catalog: "soundcloud".to_string(),
            reason: "no search result".to_string(),
        }]);

        assert_eq!(report.lines(), vec!["SOUNDCLOUD - 'Song' - Artist"]);
    }
}
