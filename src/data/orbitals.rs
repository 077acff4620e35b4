//! Orbital character classification.
//!
//! A band's character is decided from its ion-summed projection weights by
//! nonzero-channel tests, not magnitude thresholds: any d weight wins, then
//! s and p together count as mixed, then p alone, then s alone.

use std::fmt;

use crate::data::model::{OrbitalProjection, NUM_CHANNELS};

/// Channel layout of a projection record.
const S_CHANNEL: usize = 0;
const P_CHANNELS: std::ops::Range<usize> = 1..4;
const D_CHANNELS: std::ops::Range<usize> = 4..9;

/// Dominant orbital character of one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitalCharacter {
    /// No nonzero projection weight in any channel.
    None,
    S,
    P,
    /// Both s and p weight present, no d.
    Mixed,
    D,
}

impl OrbitalCharacter {
    /// Injective numeric encoding kept for comparison-style predicates
    /// against the historical float labels: None → -1, s → 0, mixed → 0.5,
    /// p → 1, d → 2.
    pub fn legacy_code(self) -> f64 {
        match self {
            OrbitalCharacter::None => -1.0,
            OrbitalCharacter::S => 0.0,
            OrbitalCharacter::Mixed => 0.5,
            OrbitalCharacter::P => 1.0,
            OrbitalCharacter::D => 2.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            OrbitalCharacter::None => "-",
            OrbitalCharacter::S => "s",
            OrbitalCharacter::P => "p",
            OrbitalCharacter::Mixed => "s+p",
            OrbitalCharacter::D => "d",
        }
    }
}

impl fmt::Display for OrbitalCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Classify every band of a projection: sum weights across ions into a
/// 9-wide aggregate, then apply the nonzero-channel rule.
pub fn classify(projections: &OrbitalProjection) -> Vec<OrbitalCharacter> {
    (0..projections.nbands())
        .map(|band| classify_aggregate(&projections.aggregate(band)))
        .collect()
}

fn classify_aggregate(aggregate: &[f64; NUM_CHANNELS]) -> OrbitalCharacter {
    let s = aggregate[S_CHANNEL] != 0.0;
    let p = aggregate[P_CHANNELS].iter().any(|&w| w != 0.0);
    let d = aggregate[D_CHANNELS].iter().any(|&w| w != 0.0);
    if d {
        OrbitalCharacter::D
    } else if s && p {
        OrbitalCharacter::Mixed
    } else if p {
        OrbitalCharacter::P
    } else if s {
        OrbitalCharacter::S
    } else {
        OrbitalCharacter::None
    }
}

/// Ascending, duplicate-free indices of the bands whose label satisfies the
/// predicate; empty when none do.
pub fn band_indices(
    labels: &[OrbitalCharacter],
    predicate: impl Fn(OrbitalCharacter) -> bool,
) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, &label)| predicate(label))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::OrbitalProjection;

    fn projection_from_aggregates(aggregates: &[[f64; NUM_CHANNELS]]) -> OrbitalProjection {
        let bands = aggregates
            .iter()
            .map(|agg| vec![agg.to_vec()])
            .collect();
        OrbitalProjection::try_from_bands(bands).unwrap()
    }

    #[test]
    fn pure_s_band_is_s_not_none_or_mixed() {
        let proj = projection_from_aggregates(&[[2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);
        assert_eq!(classify(&proj), vec![OrbitalCharacter::S]);
    }

    #[test]
    fn d_weight_dominates_everything() {
        let proj = projection_from_aggregates(&[[1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.3]]);
        assert_eq!(classify(&proj), vec![OrbitalCharacter::D]);
    }

    #[test]
    fn s_and_p_without_d_is_mixed() {
        let proj = projection_from_aggregates(&[[0.4, 0.0, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);
        assert_eq!(classify(&proj), vec![OrbitalCharacter::Mixed]);
    }

    #[test]
    fn p_only_and_empty_bands() {
        let proj = projection_from_aggregates(&[
            [0.0, 0.0, 0.0, 0.7, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0; NUM_CHANNELS],
        ]);
        assert_eq!(
            classify(&proj),
            vec![OrbitalCharacter::P, OrbitalCharacter::None]
        );
    }

    #[test]
    fn channel_4_counts_as_d() {
        let proj = projection_from_aggregates(&[[0.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0]]);
        assert_eq!(classify(&proj), vec![OrbitalCharacter::D]);
    }

    #[test]
    fn classification_is_ion_order_independent() {
        let ion_a = vec![0.3, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.0, 0.0];
        let ion_b = vec![0.0, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let forward =
            OrbitalProjection::try_from_bands(vec![vec![ion_a.clone(), ion_b.clone()]]).unwrap();
        let reversed = OrbitalProjection::try_from_bands(vec![vec![ion_b, ion_a]]).unwrap();
        assert_eq!(classify(&forward), classify(&reversed));
    }

    #[test]
    fn band_indices_are_ascending_and_duplicate_free() {
        let labels = vec![
            OrbitalCharacter::S,
            OrbitalCharacter::D,
            OrbitalCharacter::Mixed,
            OrbitalCharacter::D,
        ];
        let d_bands = band_indices(&labels, |l| l == OrbitalCharacter::D);
        assert_eq!(d_bands, vec![1, 3]);

        let none: Vec<usize> = band_indices(&labels, |l| l == OrbitalCharacter::None);
        assert!(none.is_empty());
    }

    #[test]
    fn legacy_codes_are_injective() {
        let all = [
            OrbitalCharacter::None,
            OrbitalCharacter::S,
            OrbitalCharacter::P,
            OrbitalCharacter::Mixed,
            OrbitalCharacter::D,
        ];
        for a in all {
            for b in all {
                assert_eq!(a == b, a.legacy_code() == b.legacy_code());
            }
        }
    }

    #[test]
    fn legacy_code_predicate_selects_d_bands() {
        let labels = vec![OrbitalCharacter::Mixed, OrbitalCharacter::D];
        let selected = band_indices(&labels, |l| l.legacy_code() == 2.0);
        assert_eq!(selected, vec![1]);
    }
}
