//! Euclidean lane evaluation.
//!
//! Lanes hold no step cursor; every decision is recomputed from the absolute
//! rhythm step, so a lane's output at step N is the same no matter how the
//! transport got there. All randomized decisions fold the step through the
//! shared `rand_cycle` first, which bounds the period of every modifier.

use eucalypso_types::{EngineConfig, LaneConfig, MissingNotePolicy, MAX_REGISTER_NOTES};

use crate::rng;

// Salt layout keeping the per-purpose draw streams apart.
const SALT_DROP: u32 = 0x1000;
const SALT_NOTE: u32 = 0x2000;
const SALT_OCTAVE: u32 = 0x3000;
const SALT_VELOCITY: u32 = 0x4000;
const SALT_GATE: u32 = 0x5000;
const SALT_MISSING: u32 = 0x6000;

/// One scheduled note from a lane: pitch, velocity and gate percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneOutput {
    pub pitch: u8,
    pub velocity: u8,
    pub gate: u16,
}

/// Euclidean hit test for a rhythm step over a rotated pattern.
pub fn euclidean_hit(rhythm_step: u64, steps: u8, pulses: u8, rotation: u8) -> bool {
    let steps = u64::from(steps.max(1));
    let pulses = u64::from(pulses);
    if pulses == 0 {
        return false;
    }
    if pulses >= steps {
        return true;
    }
    let pos = (rhythm_step % steps + u64::from(rotation)) % steps;
    (pos * pulses) % steps < pulses
}

/// Evaluate one lane at one rhythm step against the current register pool.
/// Returns nothing for a rest, a dropped hit, or a skipped missing index.
pub fn evaluate_lane(
    config: &EngineConfig,
    lane: &LaneConfig,
    lane_idx: usize,
    rhythm_step: u64,
    pool: &[u8],
) -> Option<LaneOutput> {
    if !lane.enabled {
        return None;
    }
    let steps = lane.steps.clamp(1, 128);
    let pulses = lane.pulses.min(steps);
    if !euclidean_hit(rhythm_step, steps, pulses, lane.rotation) {
        return None;
    }

    let cycle_step = cycle_step(config, rhythm_step);
    if lane.drop > 0 {
        let r = rng::step_rand(
            u32::from(lane.drop_seed) + 1,
            cycle_step,
            SALT_DROP + lane_idx as u32,
        );
        if rng::chance(r, lane.drop) {
            return None;
        }
    }

    let pitch = select_note(config, lane, lane_idx, cycle_step, pool)?;
    Some(LaneOutput {
        pitch,
        velocity: velocity_for(config, lane, lane_idx, cycle_step),
        gate: gate_for(config, lane, lane_idx, cycle_step),
    })
}

fn cycle_step(config: &EngineConfig, rhythm_step: u64) -> u64 {
    rhythm_step % u64::from(config.rand_cycle.clamp(1, 128))
}

fn select_note(
    config: &EngineConfig,
    lane: &LaneConfig,
    lane_idx: usize,
    cycle_step: u64,
    pool: &[u8],
) -> Option<u8> {
    if pool.is_empty() {
        return None;
    }
    let requested = usize::from(lane.note.clamp(1, MAX_REGISTER_NOTES as u8)) - 1;
    let base_idx = resolve_index(config, lane_idx, requested, pool.len(), cycle_step)?;

    let mut idx = base_idx;
    if lane.note_rnd > 0 && pool.len() > 1 {
        let r = rng::step_rand(
            u32::from(lane.note_seed) + 1,
            cycle_step,
            SALT_NOTE + lane_idx as u32,
        );
        if rng::chance(r, lane.note_rnd) {
            // Substitution always lands on a different index.
            idx = ((r >> 8) as usize) % (pool.len() - 1);
            if idx >= base_idx {
                idx += 1;
            }
        }
    }

    let mut pitch = i32::from(pool[idx]);
    pitch += i32::from(config.octave.clamp(-3, 3)) * 12;
    pitch += i32::from(lane.octave.clamp(-3, 3)) * 12;
    if lane.oct_rnd > 0 {
        let r = rng::step_rand(
            u32::from(lane.oct_seed) + 1,
            cycle_step,
            SALT_OCTAVE + lane_idx as u32,
        );
        if rng::chance(r, lane.oct_rnd) {
            let offsets = lane.oct_range.offsets();
            let pick = ((r >> 8) as usize) % offsets.len();
            pitch += i32::from(offsets[pick]) * 12;
        }
    }
    Some(pitch.clamp(0, 127) as u8)
}

/// Map an out-of-pool register index according to the missing-note policy.
fn resolve_index(
    config: &EngineConfig,
    lane_idx: usize,
    requested: usize,
    pool_len: usize,
    cycle_step: u64,
) -> Option<usize> {
    if requested < pool_len {
        return Some(requested);
    }
    match config.missing_note_policy {
        MissingNotePolicy::Skip => None,
        MissingNotePolicy::Fold => Some(fold_index(requested, pool_len)),
        MissingNotePolicy::Wrap => Some(requested % pool_len),
        MissingNotePolicy::Random => {
            let seed = u32::from(config.missing_note_seed)
                + 1
                + (lane_idx as u32 + 1) * 1000
                + SALT_MISSING;
            let r = rng::step_rand(seed, cycle_step, SALT_MISSING);
            Some(r as usize % pool_len)
        }
    }
}

/// Triangular-wave reflection back into `0..count`.
fn fold_index(idx: usize, count: usize) -> usize {
    if count <= 1 {
        return 0;
    }
    let period = (count - 1) * 2;
    let m = idx % period;
    if m >= count {
        period - m
    } else {
        m
    }
}

fn global_lane_seed(config: &EngineConfig, lane_idx: usize, offset: u32) -> u32 {
    u32::from(config.rnd_seed) + 1 + (lane_idx as u32 + 1) * 1000 + offset
}

fn velocity_for(config: &EngineConfig, lane: &LaneConfig, lane_idx: usize, cycle_step: u64) -> u8 {
    let base = if lane.velocity > 0 {
        lane.velocity
    } else {
        config.velocity
    };
    let mut velocity = i32::from(base.clamp(1, 127));
    if config.velocity_rnd > 0 {
        let r = rng::step_rand(
            global_lane_seed(config, lane_idx, SALT_VELOCITY),
            cycle_step,
            SALT_VELOCITY,
        );
        velocity += rng::signed_offset(r, i32::from(config.velocity_rnd));
    }
    velocity.clamp(1, 127) as u8
}

fn gate_for(config: &EngineConfig, lane: &LaneConfig, lane_idx: usize, cycle_step: u64) -> u16 {
    let base = if lane.gate > 0 { lane.gate } else { config.gate };
    let mut gate = i32::from(base.min(1600));
    if config.gate_rnd > 0 {
        let r = rng::step_rand(
            global_lane_seed(config, lane_idx, SALT_GATE),
            cycle_step,
            SALT_GATE,
        );
        gate += rng::signed_offset(r, i32::from(config.gate_rnd));
    }
    gate.clamp(0, 1600) as u16
}
