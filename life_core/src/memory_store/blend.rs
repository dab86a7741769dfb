//! World tint blending over held memories.

use life_rules::{Tint, TintBlend};

use super::MemoryRecord;

/// Blend the tint contributions of `records`, each weighted by
/// `weight × vividness`, starting from [`Tint::NEUTRAL`].
pub fn blend_tints<'a>(
    records: impl IntoIterator<Item = &'a MemoryRecord>,
    mode: TintBlend,
) -> Tint {
    match mode {
        TintBlend::Running => running_blend(records),
        TintBlend::Weighted => weighted_blend(records),
    }
}

/// Each record pulls the blend towards its tint by `w / (total + w)`, where
/// `total` already includes `w`. Later records get a shrinking share and the
/// result depends on acquisition order.
fn running_blend<'a>(records: impl IntoIterator<Item = &'a MemoryRecord>) -> Tint {
    let mut blended = Tint::NEUTRAL;
    let mut total = 0.0;
    for record in records {
        let weight = record.weighted_presence();
        if weight <= 0.0 {
            continue;
        }
        total += weight;
        blended = blended.lerp(&record.definition.tint, weight / (total + weight));
    }
    blended
}

fn weighted_blend<'a>(records: impl IntoIterator<Item = &'a MemoryRecord>) -> Tint {
    let mut sum = [0.0f32; 4];
    let mut total = 0.0;
    for record in records {
        let weight = record.weighted_presence();
        if weight <= 0.0 {
            continue;
        }
        let tint = &record.definition.tint;
        sum[0] += tint.r * weight;
        sum[1] += tint.g * weight;
        sum[2] += tint.b * weight;
        sum[3] += tint.a * weight;
        total += weight;
    }
    if total <= 0.0 {
        return Tint::NEUTRAL;
    }
    Tint::rgba(sum[0] / total, sum[1] / total, sum[2] / total, sum[3] / total)
}
