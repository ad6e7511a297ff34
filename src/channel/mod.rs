//! Channel Scheduler (C10, spec §4.10): expands each channel's sources
//! into a weighted playback cycle and answers "what's on now" as a pure
//! function of wall-clock time.
//!
//! Grounded on spec §4.10 directly — the pack has no close analog for a
//! linear-channel scheduler. The interleaving algorithm is the
//! "smooth weighted round robin" nginx uses to pick upstreams: each round,
//! every source's running `current` accumulates by its `weight`; the
//! source with the largest `current` plays next and has `total_weight`
//! subtracted back off. This gives the highest-weight source the most
//! frequent turns while still alternating sources within a single cycle,
//! matching spec §4.10's "source with weight W appears W times more often
//! than a source with weight 1" without repeating items inside one cycle.

use rand::seq::SliceRandom;

use crate::error::Result;
use crate::ids::{ChannelId, MediaKind};
use crate::store::models::{ChannelSourceRow, ScheduleEntryRow};
use crate::store::Store;

/// One playable item pulled from a source, before it's placed on the
/// timeline.
#[derive(Debug, Clone)]
pub struct ScheduleCandidate {
    pub kind: MediaKind,
    pub media_id: i64,
    pub duration_seconds: i64,
}

/// Expands one channel source into its pool of playable items (spec §4.10
/// "each source expands to the media it currently resolves to").
async fn expand_source(store: &Store, source: &ChannelSourceRow) -> Result<Vec<ScheduleCandidate>> {
    let mut items = Vec::new();

    match source.kind.as_str() {
        "section" => {
            let section_id = source
                .source_ref
                .map(crate::ids::SectionId)
                .ok_or_else(|| crate::error::AppError::validation("source_ref", "section source requires source_ref"))?;
            let rows = store.list_section_media(section_id, i64::MAX, 0).await?;
            for row in rows {
                items.push(ScheduleCandidate {
                    kind: MediaKind::Movie,
                    media_id: row.id,
                    duration_seconds: row.duration_seconds,
                });
            }
        }
        "playlist" => {
            let playlist_id = source
                .source_ref
                .map(crate::ids::PlaylistId)
                .ok_or_else(|| crate::error::AppError::validation("source_ref", "playlist source requires source_ref"))?;
            let rows = store.list_playlist_items(playlist_id).await?;
            for row in rows {
                let kind: MediaKind = row.media_kind.parse().map_err(|e| {
                    crate::error::AppError::ValidationError {
                        field: "media_kind".into(),
                        message: e,
                    }
                })?;
                let duration = store.media_duration_seconds(kind, row.media_id).await?;
                items.push(ScheduleCandidate {
                    kind,
                    media_id: row.media_id,
                    duration_seconds: duration,
                });
            }
        }
        "show" => {
            let show_id = source
                .source_ref
                .map(crate::ids::ShowId)
                .ok_or_else(|| crate::error::AppError::validation("source_ref", "show source requires source_ref"))?;
            let rows = store.list_episodes(show_id, None).await?;
            for row in rows {
                items.push(ScheduleCandidate {
                    kind: MediaKind::Episode,
                    media_id: row.id,
                    duration_seconds: row.duration_seconds,
                });
            }
        }
        "movie" => {
            let media_id = source
                .source_ref
                .ok_or_else(|| crate::error::AppError::validation("source_ref", "movie source requires source_ref"))?;
            let row = store.get_movie(media_id.into()).await?;
            items.push(ScheduleCandidate {
                kind: MediaKind::Movie,
                media_id: row.id,
                duration_seconds: row.duration_seconds,
            });
        }
        "extra_category" => {
            let category = source.source_value.clone().ok_or_else(|| {
                crate::error::AppError::validation("source_value", "extra_category source requires source_value")
            })?;
            let rows = store.list_extras_by_category(&category).await?;
            for row in rows {
                items.push(ScheduleCandidate {
                    kind: MediaKind::Extra,
                    media_id: row.id,
                    duration_seconds: row.duration_seconds,
                });
            }
        }
        other => {
            return Err(crate::error::AppError::validation(
                "kind",
                format!("unknown channel source kind: {other}"),
            ))
        }
    }

    if source.shuffle {
        items.shuffle(&mut rand::thread_rng());
    }

    Ok(items)
}

/// One weighted lane feeding the interleave.
struct Lane {
    items: std::collections::VecDeque<ScheduleCandidate>,
    weight: i64,
    current: i64,
}

/// Interleaves multiple weighted sources into one ordered sequence using
/// nginx-style smooth weighted round robin. Each source's items appear
/// exactly once, in source order; higher-weight sources are spaced closer
/// together in the output.
fn weighted_interleave(mut lanes: Vec<Lane>) -> Vec<ScheduleCandidate> {
    let total_weight: i64 = lanes.iter().map(|l| l.weight).sum();
    let mut out = Vec::new();
    if total_weight == 0 {
        return out;
    }

    loop {
        let remaining: usize = lanes.iter().map(|l| l.items.len()).sum();
        if remaining == 0 {
            break;
        }

        for lane in lanes.iter_mut() {
            if !lane.items.is_empty() {
                lane.current += lane.weight;
            }
        }

        let Some((best_idx, _)) = lanes
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.items.is_empty())
            .max_by_key(|(_, l)| l.current)
        else {
            break;
        };

        let lane = &mut lanes[best_idx];
        if let Some(item) = lane.items.pop_front() {
            out.push(item);
        }
        lane.current -= total_weight;
    }

    out
}

/// Rebuilds a channel's entire schedule from its current sources (spec
/// §4.10 "Regenerate schedule"). Persists exactly one cycle
/// (`cycle_number = 1`); repeated playback over wall-clock time is handled
/// by `now_playing`'s modular arithmetic, not by re-emitting rows.
pub async fn regenerate(store: &Store, channel_id: ChannelId) -> Result<()> {
    let sources = store.list_channel_sources(channel_id).await?;

    let mut lanes = Vec::with_capacity(sources.len());
    for source in &sources {
        let items = expand_source(store, source).await?;
        if items.is_empty() {
            continue;
        }
        lanes.push(Lane {
            items: items.into_iter().collect(),
            weight: source.weight.max(1),
            current: 0,
        });
    }

    let sequence = weighted_interleave(lanes);

    let mut entries = Vec::with_capacity(sequence.len());
    let mut cumulative = 0i64;
    for (position, item) in sequence.into_iter().enumerate() {
        entries.push(ScheduleEntryRow {
            channel_id: channel_id.get(),
            media_kind: item.kind.to_string(),
            media_id: item.media_id,
            cycle_number: 1,
            scheduled_position: position as i64,
            duration_seconds: item.duration_seconds,
            cumulative_start_seconds: cumulative,
            played: false,
        });
        cumulative += item.duration_seconds;
    }

    store.replace_schedule(channel_id, &entries).await
}

/// What's playing `offset_seconds` into the channel's life, plus how far
/// into that item playback currently is — a pure function of the stored
/// schedule and elapsed wall-clock time (spec §4.10, properties P7 "two
/// nodes computing now_playing for the same channel at the same instant
/// agree" and P8 "now_playing(T) == now_playing(T + cycle_duration)").
pub fn now_playing(
    entries: &[ScheduleEntryRow],
    offset_seconds: i64,
) -> Option<(&ScheduleEntryRow, i64)> {
    if entries.is_empty() {
        return None;
    }
    let cycle_duration: i64 = entries.iter().map(|e| e.duration_seconds).sum();
    if cycle_duration <= 0 {
        return None;
    }

    let position_in_cycle = offset_seconds.rem_euclid(cycle_duration);
    let mut acc = 0i64;
    for entry in entries {
        let end = acc + entry.duration_seconds;
        if position_in_cycle < end {
            return Some((entry, position_in_cycle - acc));
        }
        acc = end;
    }
    entries.last().map(|e| (e, 0))
}

/// The `k` items that play after the one returned by `now_playing`, in
/// schedule order, wrapping around the cycle (spec §4.10 "Up next").
pub fn up_next<'a>(
    entries: &'a [ScheduleEntryRow],
    current: &ScheduleEntryRow,
    k: usize,
) -> Vec<&'a ScheduleEntryRow> {
    if entries.is_empty() {
        return Vec::new();
    }
    let current_idx = entries
        .iter()
        .position(|e| e.scheduled_position == current.scheduled_position)
        .unwrap_or(0);
    (1..=k)
        .map(|offset| &entries[(current_idx + offset) % entries.len()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pos: i64, duration: i64) -> ScheduleEntryRow {
        ScheduleEntryRow {
            channel_id: 1,
            media_kind: "movie".into(),
            media_id: pos + 1,
            cycle_number: 1,
            scheduled_position: pos,
            duration_seconds: duration,
            cumulative_start_seconds: 0,
            played: false,
        }
    }

    fn build_entries(durations: &[i64]) -> Vec<ScheduleEntryRow> {
        let mut cumulative = 0;
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let mut e = entry(i as i64, d);
                e.cumulative_start_seconds = cumulative;
                cumulative += d;
                e
            })
            .collect()
    }

    #[test]
    fn weighted_interleave_favors_higher_weight_lane() {
        let lanes = vec![
            Lane {
                items: vec![
                    ScheduleCandidate { kind: MediaKind::Movie, media_id: 1, duration_seconds: 100 },
                    ScheduleCandidate { kind: MediaKind::Movie, media_id: 2, duration_seconds: 100 },
                ]
                .into(),
                weight: 3,
                current: 0,
            },
            Lane {
                items: vec![ScheduleCandidate { kind: MediaKind::Movie, media_id: 9, duration_seconds: 100 }].into(),
                weight: 1,
                current: 0,
            },
        ];
        let out = weighted_interleave(lanes);
        assert_eq!(out.len(), 3);
        // Every source's items appear exactly once.
        let ids: Vec<i64> = out.iter().map(|c| c.media_id).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(ids.contains(&9));
    }

    #[test]
    fn now_playing_wraps_at_cycle_boundary() {
        let entries = build_entries(&[100, 200, 300]);
        let (entry, into) = now_playing(&entries, 50).unwrap();
        assert_eq!(entry.scheduled_position, 0);
        assert_eq!(into, 50);

        let (entry, into) = now_playing(&entries, 150).unwrap();
        assert_eq!(entry.scheduled_position, 1);
        assert_eq!(into, 50);
    }

    #[test]
    fn now_playing_is_periodic_across_cycles() {
        let entries = build_entries(&[100, 200, 300]);
        let cycle = 600;
        let a = now_playing(&entries, 250).unwrap();
        let b = now_playing(&entries, 250 + cycle).unwrap();
        assert_eq!(a.0.scheduled_position, b.0.scheduled_position);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn now_playing_handles_negative_offset_before_channel_creation() {
        let entries = build_entries(&[100, 200]);
        let (entry, _) = now_playing(&entries, -50).unwrap();
        assert_eq!(entry.scheduled_position, 1);
    }

    #[test]
    fn up_next_wraps_around_the_cycle() {
        let entries = build_entries(&[100, 200, 300]);
        let current = &entries[2];
        let next = up_next(&entries, current, 2);
        assert_eq!(next[0].scheduled_position, 0);
        assert_eq!(next[1].scheduled_position, 1);
    }

    #[test]
    fn empty_schedule_has_no_now_playing() {
        assert!(now_playing(&[], 10).is_none());
    }
}
