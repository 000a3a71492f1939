//! EPG mapping dialog state.

use guidegrid::{ChannelId, EpgCandidate};

/// State of the channel mapping dialog.
///
/// The dialog is open while `channel_id` is set. Candidates are loaded once
/// when it opens.
#[derive(Debug, Clone, Default)]
pub struct MappingState {
    channel_id: Option<ChannelId>,
    candidates: Vec<EpgCandidate>,
    search: String,
}

impl MappingState {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Queries =====

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel_id
    }

    pub fn is_open(&self) -> bool {
        self.channel_id.is_some()
    }

    /// Candidates whose name or key contains the search text.
    pub fn visible_candidates(&self) -> impl Iterator<Item = &EpgCandidate> + '_ {
        let needle = self.search.trim().to_lowercase();
        self.candidates.iter().filter(move |c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.epg_channel_id.to_lowercase().contains(&needle)
        })
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    // ===== Mutations =====

    pub fn open(&mut self, channel_id: ChannelId, candidates: Vec<EpgCandidate>) {
        self.channel_id = Some(channel_id);
        self.candidates = candidates;
        self.search.clear();
    }

    pub fn close(&mut self) {
        self.channel_id = None;
        self.candidates.clear();
        self.search.clear();
    }

    pub fn search_mut(&mut self) -> &mut String {
        &mut self.search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(key: &str, name: &str) -> EpgCandidate {
        EpgCandidate {
            epg_source_id: 1,
            epg_channel_id: key.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_search_filters_candidates() {
        let mut state = MappingState::new();
        state.open(7, vec![candidate("bbc.one", "BBC One"), candidate("itv.1", "ITV")]);
        assert!(state.is_open());

        *state.search_mut() = "bbc".to_string();
        let names: Vec<&str> = state.visible_candidates().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["BBC One"]);

        state.close();
        assert!(!state.is_open());
        assert_eq!(state.candidate_count(), 0);
    }
}
