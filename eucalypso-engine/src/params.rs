//! Flat string parameter surface.
//!
//! Keys are `field` for globals and `laneN_field` for lanes. Values clamp at
//! assignment; unknown keys and unparseable values are ignored. The `state`
//! key aggregates every field into one flat JSON object for bulk
//! save/restore, applied tolerantly field by field.

use eucalypso_types::{
    HeldOrder, LaneConfig, MissingNotePolicy, OctaveRange, PlayMode, Rate, RegisterMode,
    RetriggerMode, ScaleMode, SyncMode, MAX_LANES, MAX_REGISTER_NOTES, MAX_VOICES,
};
use serde_json::{Map, Value};

use crate::engine::Eucalypso;

const LANE_FIELDS: [&str; 15] = [
    "enabled", "steps", "pulses", "rotation", "drop", "drop_seed", "note", "n_rnd", "n_seed",
    "octave", "oct_rnd", "oct_seed", "oct_rng", "velocity", "gate",
];

const GLOBAL_FIELDS: [&str; 22] = [
    "play_mode",
    "retrigger_mode",
    "rate",
    "sync",
    "bpm",
    "swing",
    "max_voices",
    "global_velocity",
    "global_v_rnd",
    "global_gate",
    "global_g_rnd",
    "global_rnd_seed",
    "rand_cycle",
    "register_mode",
    "held_order",
    "held_order_seed",
    "missing_note_policy",
    "missing_note_seed",
    "scale_mode",
    "scale_rng",
    "root_note",
    "octave",
];

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Split `laneN_field` into a zero-based lane index and the field suffix.
fn lane_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("lane")?;
    let (num, field) = rest.split_once('_')?;
    let n: usize = num.parse().ok()?;
    if (1..=MAX_LANES).contains(&n) {
        Some((n - 1, field))
    } else {
        None
    }
}

pub(crate) fn set(fx: &mut Eucalypso, key: &str, value: &str) {
    if let Some((idx, field)) = lane_key(key) {
        set_lane(&mut fx.lanes[idx], field, value);
        return;
    }
    match key {
        "play_mode" => {
            if let Some(mode) = PlayMode::parse(value) {
                fx.config.play_mode = mode;
                fx.tracker.set_play_mode(mode);
            }
        }
        "retrigger_mode" => {
            if let Some(mode) = RetriggerMode::parse(value) {
                fx.config.retrigger_mode = mode;
            }
        }
        "rate" => {
            if let Some(rate) = Rate::parse(value) {
                fx.config.rate = rate;
                fx.clock.set_rate(rate);
            }
        }
        "sync" => {
            if let Some(sync) = SyncMode::parse(value) {
                fx.config.sync = sync;
                fx.clock.set_sync(sync);
            }
        }
        "bpm" => {
            if let Some(v) = parse_int(value) {
                fx.config.bpm = v.clamp(40, 240) as u16;
                fx.clock.set_bpm(fx.config.bpm);
            }
        }
        "swing" => {
            if let Some(v) = parse_int(value) {
                fx.config.swing = v.clamp(0, 100) as u8;
                fx.clock.set_swing(fx.config.swing);
            }
        }
        "max_voices" => {
            if let Some(v) = parse_int(value) {
                fx.config.max_voices = v.clamp(1, MAX_VOICES as i64) as u8;
            }
        }
        "global_velocity" => {
            if let Some(v) = parse_int(value) {
                fx.config.velocity = v.clamp(1, 127) as u8;
            }
        }
        "global_v_rnd" => {
            if let Some(v) = parse_int(value) {
                fx.config.velocity_rnd = v.clamp(0, 127) as u8;
            }
        }
        "global_gate" => {
            if let Some(v) = parse_int(value) {
                fx.config.gate = v.clamp(1, 1600) as u16;
            }
        }
        "global_g_rnd" => {
            if let Some(v) = parse_int(value) {
                fx.config.gate_rnd = v.clamp(0, 1600) as u16;
            }
        }
        "global_rnd_seed" => {
            if let Some(v) = parse_int(value) {
                fx.config.rnd_seed = v.clamp(0, 65_535) as u16;
            }
        }
        "rand_cycle" => {
            if let Some(v) = parse_int(value) {
                fx.config.rand_cycle = v.clamp(1, 128) as u8;
            }
        }
        "register_mode" => {
            if let Some(mode) = RegisterMode::parse(value) {
                fx.config.register_mode = mode;
            }
        }
        "held_order" => {
            if let Some(order) = HeldOrder::parse(value) {
                fx.config.held_order = order;
            }
        }
        "held_order_seed" => {
            if let Some(v) = parse_int(value) {
                fx.config.held_order_seed = v.clamp(0, 65_535) as u16;
            }
        }
        "missing_note_policy" => {
            if let Some(policy) = MissingNotePolicy::parse(value) {
                fx.config.missing_note_policy = policy;
            }
        }
        "missing_note_seed" => {
            if let Some(v) = parse_int(value) {
                fx.config.missing_note_seed = v.clamp(0, 65_535) as u16;
            }
        }
        "scale_mode" => {
            if let Some(mode) = ScaleMode::parse(value) {
                fx.config.scale_mode = mode;
            }
        }
        "scale_rng" => {
            if let Some(v) = parse_int(value) {
                fx.config.scale_range = v.clamp(1, MAX_REGISTER_NOTES as i64) as u8;
            }
        }
        "root_note" => {
            if let Some(v) = parse_int(value) {
                fx.config.root_note = v.clamp(0, 11) as u8;
            }
        }
        "octave" => {
            if let Some(v) = parse_int(value) {
                fx.config.octave = v.clamp(-3, 3) as i8;
            }
        }
        "state" => apply_state(fx, value),
        _ => {}
    }
}

fn set_lane(lane: &mut LaneConfig, field: &str, value: &str) {
    match field {
        "enabled" => lane.enabled = value == "on",
        "steps" => {
            if let Some(v) = parse_int(value) {
                lane.steps = v.clamp(1, 128) as u8;
            }
        }
        "pulses" => {
            if let Some(v) = parse_int(value) {
                lane.pulses = v.clamp(0, 128) as u8;
            }
        }
        "rotation" => {
            if let Some(v) = parse_int(value) {
                lane.rotation = v.clamp(0, 127) as u8;
            }
        }
        "drop" => {
            if let Some(v) = parse_int(value) {
                lane.drop = v.clamp(0, 100) as u8;
            }
        }
        "drop_seed" => {
            if let Some(v) = parse_int(value) {
                lane.drop_seed = v.clamp(0, 65_535) as u16;
            }
        }
        "note" => {
            if let Some(v) = parse_int(value) {
                lane.note = v.clamp(1, MAX_REGISTER_NOTES as i64) as u8;
            }
        }
        "n_rnd" => {
            if let Some(v) = parse_int(value) {
                lane.note_rnd = v.clamp(0, 100) as u8;
            }
        }
        "n_seed" => {
            if let Some(v) = parse_int(value) {
                lane.note_seed = v.clamp(0, 65_535) as u16;
            }
        }
        "octave" => {
            if let Some(v) = parse_int(value) {
                lane.octave = v.clamp(-3, 3) as i8;
            }
        }
        "oct_rnd" => {
            if let Some(v) = parse_int(value) {
                lane.oct_rnd = v.clamp(0, 100) as u8;
            }
        }
        "oct_seed" => {
            if let Some(v) = parse_int(value) {
                lane.oct_seed = v.clamp(0, 65_535) as u16;
            }
        }
        "oct_rng" => {
            if let Some(range) = OctaveRange::parse(value) {
                lane.oct_range = range;
            }
        }
        "velocity" => {
            if let Some(v) = parse_int(value) {
                lane.velocity = v.clamp(0, 127) as u8;
            }
        }
        "gate" => {
            if let Some(v) = parse_int(value) {
                lane.gate = v.clamp(0, 1600) as u16;
            }
        }
        _ => return,
    }
    lane.normalize();
}

pub(crate) fn get(fx: &Eucalypso, key: &str) -> Option<String> {
    if let Some((idx, field)) = lane_key(key) {
        return get_lane(&fx.lanes[idx], field);
    }
    let config = &fx.config;
    let value = match key {
        "play_mode" => config.play_mode.name().to_string(),
        "retrigger_mode" => config.retrigger_mode.name().to_string(),
        "rate" => config.rate.name().to_string(),
        "sync" => config.sync.name().to_string(),
        "bpm" => config.bpm.to_string(),
        "swing" => config.swing.to_string(),
        "max_voices" => config.max_voices.to_string(),
        "global_velocity" => config.velocity.to_string(),
        "global_v_rnd" => config.velocity_rnd.to_string(),
        "global_gate" => config.gate.to_string(),
        "global_g_rnd" => config.gate_rnd.to_string(),
        "global_rnd_seed" => config.rnd_seed.to_string(),
        "rand_cycle" => config.rand_cycle.to_string(),
        "register_mode" => config.register_mode.name().to_string(),
        "held_order" => config.held_order.name().to_string(),
        "held_order_seed" => config.held_order_seed.to_string(),
        "missing_note_policy" => config.missing_note_policy.name().to_string(),
        "missing_note_seed" => config.missing_note_seed.to_string(),
        "scale_mode" => config.scale_mode.name().to_string(),
        "scale_rng" => config.scale_range.to_string(),
        "root_note" => config.root_note.to_string(),
        "octave" => config.octave.to_string(),
        "name" => fx.host.name.clone(),
        "bank_name" => fx.host.bank_name.clone(),
        "state" => state_json(fx),
        _ => return None,
    };
    Some(value)
}

fn get_lane(lane: &LaneConfig, field: &str) -> Option<String> {
    let value = match field {
        "enabled" => (if lane.enabled { "on" } else { "off" }).to_string(),
        "steps" => lane.steps.to_string(),
        "pulses" => lane.pulses.to_string(),
        "rotation" => lane.rotation.to_string(),
        "drop" => lane.drop.to_string(),
        "drop_seed" => lane.drop_seed.to_string(),
        "note" => lane.note.to_string(),
        "n_rnd" => lane.note_rnd.to_string(),
        "n_seed" => lane.note_seed.to_string(),
        "octave" => lane.octave.to_string(),
        "oct_rnd" => lane.oct_rnd.to_string(),
        "oct_seed" => lane.oct_seed.to_string(),
        "oct_rng" => lane.oct_range.name().to_string(),
        "velocity" => lane.velocity.to_string(),
        "gate" => lane.gate.to_string(),
        _ => return None,
    };
    Some(value)
}

/// Serialize every field into one flat JSON object.
fn state_json(fx: &Eucalypso) -> String {
    let config = &fx.config;
    let mut map = Map::new();
    map.insert("play_mode".into(), Value::from(config.play_mode.name()));
    map.insert(
        "retrigger_mode".into(),
        Value::from(config.retrigger_mode.name()),
    );
    map.insert("rate".into(), Value::from(config.rate.name()));
    map.insert("sync".into(), Value::from(config.sync.name()));
    map.insert("bpm".into(), Value::from(config.bpm));
    map.insert("swing".into(), Value::from(config.swing));
    map.insert("max_voices".into(), Value::from(config.max_voices));
    map.insert("global_velocity".into(), Value::from(config.velocity));
    map.insert("global_v_rnd".into(), Value::from(config.velocity_rnd));
    map.insert("global_gate".into(), Value::from(config.gate));
    map.insert("global_g_rnd".into(), Value::from(config.gate_rnd));
    map.insert("global_rnd_seed".into(), Value::from(config.rnd_seed));
    map.insert("rand_cycle".into(), Value::from(config.rand_cycle));
    map.insert(
        "register_mode".into(),
        Value::from(config.register_mode.name()),
    );
    map.insert("held_order".into(), Value::from(config.held_order.name()));
    map.insert(
        "held_order_seed".into(),
        Value::from(config.held_order_seed),
    );
    map.insert(
        "missing_note_policy".into(),
        Value::from(config.missing_note_policy.name()),
    );
    map.insert(
        "missing_note_seed".into(),
        Value::from(config.missing_note_seed),
    );
    map.insert("scale_mode".into(), Value::from(config.scale_mode.name()));
    map.insert("scale_rng".into(), Value::from(config.scale_range));
    map.insert("root_note".into(), Value::from(config.root_note));
    map.insert("octave".into(), Value::from(config.octave));
    for (i, lane) in fx.lanes.iter().enumerate() {
        let n = i + 1;
        for field in LANE_FIELDS {
            let key = format!("lane{}_{}", n, field);
            let value = match field {
                "enabled" => Value::from(if lane.enabled { "on" } else { "off" }),
                "steps" => Value::from(lane.steps),
                "pulses" => Value::from(lane.pulses),
                "rotation" => Value::from(lane.rotation),
                "drop" => Value::from(lane.drop),
                "drop_seed" => Value::from(lane.drop_seed),
                "note" => Value::from(lane.note),
                "n_rnd" => Value::from(lane.note_rnd),
                "n_seed" => Value::from(lane.note_seed),
                "octave" => Value::from(lane.octave),
                "oct_rnd" => Value::from(lane.oct_rnd),
                "oct_seed" => Value::from(lane.oct_seed),
                "oct_rng" => Value::from(lane.oct_range.name()),
                "velocity" => Value::from(lane.velocity),
                "gate" => Value::from(lane.gate),
                _ => continue,
            };
            map.insert(key, value);
        }
    }
    Value::Object(map).to_string()
}

/// Apply a bulk `state` JSON object field by field; anything malformed is
/// skipped individually. Fields apply in declaration order so dependent
/// clamps (pulses against steps) see their base value first.
fn apply_state(fx: &mut Eucalypso, value: &str) {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(value) else {
        return;
    };
    for field in GLOBAL_FIELDS {
        apply_field(fx, &map, field);
    }
    for n in 1..=MAX_LANES {
        for field in LANE_FIELDS {
            apply_field(fx, &map, &format!("lane{}_{}", n, field));
        }
    }
}

fn apply_field(fx: &mut Eucalypso, map: &Map<String, Value>, key: &str) {
    let Some(val) = map.get(key) else {
        return;
    };
    let text = match val {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return,
    };
    set(fx, key, &text);
}
