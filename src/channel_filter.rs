//! Channel filtering for the guide sidebar.
//!
//! `filter` derives the ordered list of channels to show from the full
//! channel set and the user's filter criteria. Input order (by display
//! number) is preserved; the filter never re-sorts.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::model::Channel;

/// Exact-match selector that can also mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::All => "All",
            Selection::Only(value) => value,
        }
    }
}

/// User-selected filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub group: Selection,
    pub source: Selection,
    /// Case-insensitive substring matched against name, number and group
    pub search: String,
    /// Keep only channels without EPG data
    pub unmapped_only: bool,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }
}

/// Returns the channels passing `criteria`, in input order.
///
/// `has_epg_data` is only consulted when `unmapped_only` is set.
pub fn filter<'a, F>(
    channels: &'a [Channel],
    criteria: &FilterCriteria,
    has_epg_data: F,
) -> Vec<&'a Channel>
where
    F: Fn(&Channel) -> bool,
{
    filter_indices(channels, criteria, has_epg_data)
        .into_iter()
        .map(|i| &channels[i])
        .collect()
}

/// Same as [`filter`] but yields positions into `channels`.
pub fn filter_indices<F>(
    channels: &[Channel],
    criteria: &FilterCriteria,
    has_epg_data: F,
) -> Vec<usize>
where
    F: Fn(&Channel) -> bool,
{
    let needle = criteria.search.to_lowercase();

    channels
        .iter()
        .enumerate()
        .filter(|(_, channel)| {
            criteria.group.matches(&channel.group)
                && criteria.source.matches(&channel.source_name)
                && matches_search(channel, &needle)
                && (!criteria.unmapped_only || !has_epg_data(channel))
        })
        .map(|(i, _)| i)
        .collect()
}

fn matches_search(channel: &Channel, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    channel.name.to_lowercase().contains(needle)
        || channel.number.to_lowercase().contains(needle)
        || channel.group.to_lowercase().contains(needle)
}

/// Counts of channels lacking EPG data, overall and per group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmappedCounts {
    pub total: usize,
    pub by_group: HashMap<String, usize>,
}

impl UnmappedCounts {
    pub fn for_group(&self, group: &str) -> usize {
        self.by_group.get(group).copied().unwrap_or(0)
    }
}

/// Counts channels failing `has_epg_data` across the full channel set.
pub fn unmapped_counts<F>(channels: &[Channel], has_epg_data: F) -> UnmappedCounts
where
    F: Fn(&Channel) -> bool,
{
    let mut counts = UnmappedCounts::default();
    for channel in channels.iter().filter(|c| !has_epg_data(c)) {
        counts.total += 1;
        *counts.by_group.entry(channel.group.clone()).or_insert(0) += 1;
    }
    counts
}

/// Distinct group names in first-seen order (empty names skipped).
pub fn groups(channels: &[Channel]) -> Vec<String> {
    distinct(channels.iter().map(|c| c.group.as_str()))
}

/// Distinct source names in first-seen order (empty names skipped).
pub fn sources(channels: &[Channel]) -> Vec<String> {
    distinct(channels.iter().map(|c| c.source_name.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}
