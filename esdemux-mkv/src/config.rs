//! Demuxer configuration.

/// Options fixed for the lifetime of an [`MkvDemuxer`](crate::MkvDemuxer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxerConfig {
    /// Track numbers to emit; empty emits every track.
    pub track_filter: Vec<u64>,
    /// Prepend parameter sets to H.264/H.265 keyframes.
    pub emit_parameter_sets: bool,
    /// Reject child elements that end past their parent.
    pub containment_check: bool,
    /// Treat a fixed-size lace that does not divide evenly as an error.
    pub strict_fixed_lacing: bool,
    /// Emit end-of-stream when the demuxer is stopped.
    pub notify_end_of_stream: bool,
}

impl Default for DemuxerConfig {
    fn default() -> Self {
        Self {
            track_filter: Vec::new(),
            emit_parameter_sets: true,
            containment_check: true,
            strict_fixed_lacing: true,
            notify_end_of_stream: true,
        }
    }
}

impl DemuxerConfig {
    /// Create a configuration with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only emit frames of the given tracks.
    pub fn with_track_filter(mut self, tracks: impl IntoIterator<Item = u64>) -> Self {
        self.track_filter = tracks.into_iter().collect();
        self
    }

    /// Set whether keyframes carry parameter sets.
    pub fn with_parameter_sets(mut self, emit: bool) -> Self {
        self.emit_parameter_sets = emit;
        self
    }

    /// Set whether element containment is enforced.
    pub fn with_containment_check(mut self, enabled: bool) -> Self {
        self.containment_check = enabled;
        self
    }

    /// Set whether uneven fixed lacing is rejected.
    pub fn with_strict_fixed_lacing(mut self, strict: bool) -> Self {
        self.strict_fixed_lacing = strict;
        self
    }

    /// Set whether stopping emits end-of-stream.
    pub fn with_end_of_stream_notification(mut self, notify: bool) -> Self {
        self.notify_end_of_stream = notify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DemuxerConfig::default();
        assert!(config.track_filter.is_empty());
        assert!(config.emit_parameter_sets);
        assert!(config.containment_check);
        assert!(config.strict_fixed_lacing);
        assert!(config.notify_end_of_stream);
    }

    #[test]
    fn test_builder() {
        let config = DemuxerConfig::new()
            .with_track_filter([2, 1])
            .with_parameter_sets(false)
            .with_containment_check(false)
            .with_strict_fixed_lacing(false)
            .with_end_of_stream_notification(false);

        assert_eq!(config.track_filter, vec![2, 1]);
        assert!(!config.emit_parameter_sets);
        assert!(!config.containment_check);
        assert!(!config.strict_fixed_lacing);
        assert!(!config.notify_end_of_stream);
    }
}
