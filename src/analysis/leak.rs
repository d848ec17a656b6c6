// Sustained-growth leak detection over per-process private bytes.
//
// Per pid: Idle -> Growing(n) on positive growth, back to Idle on any non-growth sample,
// Flagged while rate > threshold and n >= min_consecutive_growth. The leak event fires
// only on the transition into Flagged.

use std::collections::HashMap;

use crate::models::{
    GrowthState, LeakClassification, LeakReport, LeakTrackState, MonitorEvent,
    ProcessMemorySnapshot,
};
use crate::policy::{BYTES_PER_MB, LeakPolicy};

const MS_PER_MINUTE: f64 = 60_000.0;

/// Result of one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub state: GrowthState,
    pub classification: LeakClassification,
    pub growth_rate_mb_per_min: f64,
    /// True only on the observation that entered `Flagged`.
    pub leak_detected: bool,
}

#[derive(Debug, Clone)]
pub struct GrowthLeakDetector {
    policy: LeakPolicy,
    enabled: bool,
    tracks: HashMap<u32, LeakTrackState>,
}

impl Default for GrowthLeakDetector {
    fn default() -> Self {
        Self::new(LeakPolicy::default())
    }
}

impl GrowthLeakDetector {
    pub fn new(policy: LeakPolicy) -> Self {
        Self {
            policy,
            enabled: true,
            tracks: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &LeakPolicy {
        &self.policy
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// While disabled, snapshots only refresh baselines; streaks and flags stay frozen.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Feeds one sample for `pid`. The first sighting only records the baseline.
    ///
    /// `elapsed_minutes` must be positive; a non-positive or non-finite interval is
    /// ignored and the current classification is returned unchanged.
    pub fn observe(&mut self, pid: u32, current_bytes: u64, elapsed_minutes: f64) -> Classification {
        let policy = self.policy;
        match self.tracks.get_mut(&pid) {
            Some(track) => step(&policy, track, current_bytes, elapsed_minutes),
            None => {
                let track = LeakTrackState::new(pid, String::new(), current_bytes, None);
                let c = classify(&policy, &track, false);
                self.tracks.insert(pid, track);
                c
            }
        }
    }

    /// Runs one poll cycle: observes every pid in `snapshot` with the elapsed time taken
    /// from its previous timestamp, and drops pids that are no longer present.
    ///
    /// Returns the `LeakDetected` events raised in this cycle, highest growth rate first.
    pub fn observe_snapshot(
        &mut self,
        snapshot: &HashMap<u32, ProcessMemorySnapshot>,
    ) -> Vec<MonitorEvent> {
        let policy = self.policy;
        let mut detected: Vec<(f64, MonitorEvent)> = Vec::new();

        for (pid, proc_snap) in snapshot {
            let Some(track) = self.tracks.get_mut(pid) else {
                self.tracks.insert(
                    *pid,
                    LeakTrackState::new(
                        *pid,
                        proc_snap.name.clone(),
                        proc_snap.private_bytes,
                        Some(proc_snap.timestamp),
                    ),
                );
                continue;
            };

            if track.name != proc_snap.name {
                track.name.clone_from(&proc_snap.name);
            }

            // tracks created by `observe` carry no timestamp yet
            if track.last_timestamp.is_none() {
                track.previous_bytes = proc_snap.private_bytes;
                track.last_timestamp = Some(proc_snap.timestamp);
                continue;
            }

            if !self.enabled {
                track.previous_bytes = proc_snap.private_bytes;
                track.last_timestamp = Some(proc_snap.timestamp);
                continue;
            }

            let elapsed_minutes = track
                .last_timestamp
                .map(|t| (proc_snap.timestamp - t) as f64 / MS_PER_MINUTE)
                .unwrap_or(0.0);
            let c = step(&policy, track, proc_snap.private_bytes, elapsed_minutes);
            if elapsed_minutes < 0.0 {
                // clock went backwards: re-baseline
                track.previous_bytes = proc_snap.private_bytes;
            }
            if elapsed_minutes != 0.0 {
                track.last_timestamp = Some(proc_snap.timestamp);
            }

            if c.leak_detected {
                detected.push((
                    c.growth_rate_mb_per_min,
                    MonitorEvent::LeakDetected {
                        pid: *pid,
                        name: track.name.clone(),
                        growth_rate_mb_per_min: c.growth_rate_mb_per_min,
                    },
                ));
            }
        }

        self.tracks.retain(|pid, _| snapshot.contains_key(pid));

        detected.sort_by(|a, b| b.0.total_cmp(&a.0));
        detected.into_iter().map(|(_, e)| e).collect()
    }

    /// Drops the state of a single pid.
    pub fn forget(&mut self, pid: u32) -> Option<LeakTrackState> {
        self.tracks.remove(&pid)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn track(&self, pid: u32) -> Option<&LeakTrackState> {
        self.tracks.get(&pid)
    }

    pub fn tracked_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn classification(&self, pid: u32) -> Option<LeakClassification> {
        self.tracks
            .get(&pid)
            .map(|t| classify(&self.policy, t, false).classification)
    }

    /// Flagged processes, highest growth rate first.
    pub fn potential_leaks(&self) -> Vec<LeakReport> {
        let mut leaks: Vec<LeakReport> = self
            .tracks
            .values()
            .filter(|t| t.is_flagged_leak)
            .map(LeakReport::from)
            .collect();
        leaks.sort_by(|a, b| {
            b.growth_rate_mb_per_min
                .total_cmp(&a.growth_rate_mb_per_min)
                .then(a.pid.cmp(&b.pid))
        });
        leaks
    }

    /// Early-warning list: long enough growth streak but not (yet) flagged.
    pub fn growing(&self) -> Vec<LeakReport> {
        let mut growing: Vec<LeakReport> = self
            .tracks
            .values()
            .filter(|t| {
                !t.is_flagged_leak && t.consecutive_growth_count >= self.policy.growing_min_consecutive
            })
            .map(LeakReport::from)
            .collect();
        growing.sort_by(|a, b| {
            b.consecutive_growth_count
                .cmp(&a.consecutive_growth_count)
                .then(a.pid.cmp(&b.pid))
        });
        growing
    }
}

fn step(
    policy: &LeakPolicy,
    track: &mut LeakTrackState,
    current_bytes: u64,
    elapsed_minutes: f64,
) -> Classification {
    if !(elapsed_minutes.is_finite() && elapsed_minutes > 0.0) {
        return classify(policy, track, false);
    }

    let delta_mb = (current_bytes as f64 - track.previous_bytes as f64) / BYTES_PER_MB;
    let rate = delta_mb / elapsed_minutes;
    track.previous_bytes = current_bytes;
    track.growth_rate_mb_per_min = rate;

    if rate > 0.0 {
        track.consecutive_growth_count = track.consecutive_growth_count.saturating_add(1);
    } else {
        track.consecutive_growth_count = 0;
    }

    let was_flagged = track.is_flagged_leak;
    track.is_flagged_leak = rate > policy.rate_threshold_mb_per_min
        && track.consecutive_growth_count >= policy.min_consecutive_growth;

    classify(policy, track, track.is_flagged_leak && !was_flagged)
}

fn classify(policy: &LeakPolicy, track: &LeakTrackState, leak_detected: bool) -> Classification {
    let classification = if track.is_flagged_leak {
        LeakClassification::Leak
    } else if track.consecutive_growth_count >= policy.growing_min_consecutive {
        LeakClassification::Growing
    } else {
        LeakClassification::Normal
    };

    Classification {
        state: track.growth_state(),
        classification,
        growth_rate_mb_per_min: track.growth_rate_mb_per_min,
        leak_detected,
    }
}
