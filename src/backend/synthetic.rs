//! Seeded synthetic guide generator.
//!
//! Produces a reproducible guide for demos and load testing: channels spread
//! over groups and sources, back-to-back programs per channel, a handful of
//! channels without EPG mapping (with candidates they can be mapped to), and
//! a few recordings.

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::backend::GuideFile;
use crate::model::{Channel, EpgCandidate, Program, ProgramFlags, Recording, RecordingStatus};

const DEFAULT_CHANNELS: usize = 200;
const DEFAULT_HOURS: u32 = 24;
const DEFAULT_SEED: u64 = 42;

const GROUPS: &[&str] = &[
    "News",
    "Sports",
    "Movies",
    "Kids",
    "Documentary",
    "Entertainment",
    "Music",
    "Local",
];
const SOURCES: &[&str] = &["Antenna", "Cable", "IPTV"];
const DURATIONS_MIN: &[i64] = &[15, 30, 30, 30, 60, 60, 60, 90, 120];
const SYNTHETIC_EPG_SOURCE: i64 = 1;

fn titles_for(group: &str) -> &'static [&'static str] {
    match group {
        "News" => &[
            "Morning Report",
            "World Tonight",
            "Newsroom",
            "Business Hour",
            "Weather Watch",
        ],
        "Sports" => &["Match Day", "Sports Center", "Fight Night", "Racing Live", "Golf Weekly"],
        "Movies" => &[
            "The Long Road",
            "Midnight Train",
            "Silent Harbor",
            "Red Canyon",
            "Paper Moon",
        ],
        "Kids" => &["Robot Friends", "Ocean Pals", "Story Time", "Dino Dig", "Space Cadets"],
        "Documentary" => &[
            "Planet Deep",
            "Ancient Cities",
            "Wild Frontiers",
            "How It's Built",
            "Night Sky",
        ],
        "Music" => &["Top 40", "Live Sessions", "Classic Hits", "Jazz Corner", "Rock Vault"],
        "Local" => &[
            "City Council",
            "Community Calendar",
            "Local Eats",
            "Town Talk",
            "High School Sports",
        ],
        _ => &["Game Show", "Late Show", "Cooking Today", "Home Makeover", "Comedy Hour"],
    }
}

pub struct SyntheticGuide {
    channels: usize,
    hours: u32,
    seed: u64,
    start: DateTime<Utc>,
}

impl SyntheticGuide {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            hours: DEFAULT_HOURS,
            seed: DEFAULT_SEED,
            start,
        }
    }

    pub fn with_config(start: DateTime<Utc>, channels: usize, hours: u32, seed: u64) -> Self {
        Self {
            channels,
            hours,
            seed,
            start,
        }
    }

    pub fn generate(&self) -> GuideFile {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut guide = GuideFile::default();

        // Programs begin an hour before `start`, on the hour
        let origin = floor_to_hour(self.start) - Duration::hours(1);
        let horizon = origin + Duration::hours(i64::from(self.hours) + 1);
        let mut next_program_id = 1;

        for index in 0..self.channels {
            let id = index as i64 + 1;
            let group = GROUPS[rng.gen_range(0..GROUPS.len())];
            let source = SOURCES[rng.gen_range(0..SOURCES.len())];
            let mapped = !rng.gen_bool(0.08);

            let key = format!("ch{:04}.guide", id);
            let number = if rng.gen_bool(0.15) {
                format!("{}.{}", index + 2, rng.gen_range(1..4))
            } else {
                (index + 2).to_string()
            };

            // Unmapped channels have no programs under their own key; their
            // programs sit under an EPG candidate they can be mapped to
            let program_key = if mapped {
                key.clone()
            } else {
                let epg_key = format!("epg.{:04}", id);
                guide.epg_candidates.push(EpgCandidate {
                    epg_source_id: SYNTHETIC_EPG_SOURCE,
                    epg_channel_id: epg_key.clone(),
                    name: format!("{} {} HD", group, id),
                });
                epg_key
            };

            guide.channels.push(Channel {
                id,
                channel_id: key,
                number,
                name: format!("{} {}", group, id),
                logo: None,
                group: group.to_string(),
                source_name: source.to_string(),
                stream_url: Some(format!("http://stream.invalid/{}", id)),
                enabled: true,
                epg_mapped: mapped,
            });

            let mut cursor = origin;
            while cursor < horizon {
                let minutes = DURATIONS_MIN[rng.gen_range(0..DURATIONS_MIN.len())];
                let mut end = cursor + Duration::minutes(minutes);
                // Rare malformed entry, dropped by consumers
                if rng.gen_bool(0.002) {
                    end = cursor;
                }

                let program =
                    generate_program(&mut rng, next_program_id, &program_key, group, cursor, end);
                guide.programs.push(program);
                next_program_id += 1;
                cursor += Duration::minutes(minutes);
            }
        }

        self.generate_recordings(&mut rng, &mut guide);

        tracing::info!(
            channels = guide.channels.len(),
            programs = guide.programs.len(),
            recordings = guide.recordings.len(),
            seed = self.seed,
            "generated synthetic guide"
        );
        guide
    }

    fn generate_recordings(&self, rng: &mut StdRng, guide: &mut GuideFile) {
        let wanted = guide.channels.len() / 20 + 1;
        let mapped: Vec<&Channel> = guide.channels.iter().filter(|c| c.epg_mapped).collect();
        let mut next_id = 1;

        for channel in mapped.choose_multiple(rng, wanted) {
            let candidates: Vec<&Program> = guide
                .programs
                .iter()
                .filter(|p| p.channel_id == channel.channel_id && p.is_well_formed())
                .collect();
            let Some(program) = candidates.choose(rng) else {
                continue;
            };

            let status = match rng.gen_range(0..10) {
                0 => RecordingStatus::Completed,
                1 | 2 => RecordingStatus::Recording,
                _ => RecordingStatus::Scheduled,
            };
            guide.recordings.push(Recording {
                id: next_id,
                channel_id: channel.id,
                start_time: program.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                status,
                program_id: Some(program.id),
                series: rng.gen_bool(0.3),
            });
            next_id += 1;
        }
    }
}

fn generate_program(
    rng: &mut StdRng,
    id: i64,
    channel_key: &str,
    group: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Program {
    let titles = titles_for(group);
    let title = titles[rng.gen_range(0..titles.len())];
    let episode = rng.gen_range(1..=24);

    Program {
        id,
        channel_id: channel_key.to_string(),
        title: title.to_string(),
        subtitle: rng.gen_bool(0.5).then(|| format!("Episode {}", episode)),
        description: Some(format!("{} ({} group), episode {}.", title, group, episode)),
        start,
        end,
        category: Some(group.to_string()),
        flags: ProgramFlags {
            is_new: rng.gen_bool(0.2),
            is_live: group == "Sports" && rng.gen_bool(0.4),
            is_premiere: rng.gen_bool(0.03),
            is_finale: rng.gen_bool(0.02),
        },
    }
}

fn floor_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant - Duration::seconds(i64::from(instant.minute() * 60 + instant.second()))
        - Duration::nanoseconds(i64::from(instant.nanosecond()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 17, 0).unwrap()
    }

    #[test]
    fn test_generation_is_reproducible() {
        let a = SyntheticGuide::with_config(start(), 30, 6, 7).generate();
        let b = SyntheticGuide::with_config(start(), 30, 6, 7).generate();
        assert_eq!(a, b);
        let c = SyntheticGuide::with_config(start(), 30, 6, 8).generate();
        assert_ne!(a, c);
    }

    #[test]
    fn test_programs_cover_requested_hours() {
        let guide = SyntheticGuide::with_config(start(), 10, 6, 1).generate();
        assert_eq!(guide.channels.len(), 10);

        let origin = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        for channel in guide.channels.iter().filter(|c| c.epg_mapped) {
            let programs: Vec<&Program> = guide
                .programs
                .iter()
                .filter(|p| p.channel_id == channel.channel_id)
                .collect();
            assert_eq!(programs[0].start, origin);
            assert!(programs.last().unwrap().start >= origin + Duration::hours(5));
        }
    }

    #[test]
    fn test_unmapped_channels_have_candidates() {
        let guide = SyntheticGuide::with_config(start(), 200, 2, 3).generate();
        let unmapped = guide.channels.iter().filter(|c| !c.epg_mapped).count();
        assert!(unmapped > 0);
        assert_eq!(guide.epg_candidates.len(), unmapped);
        assert!(!guide.recordings.is_empty());
    }
}
