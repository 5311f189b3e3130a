//! Re-expressing lock sets in the post-exclusion index space.

use crate::ir::PlanningUnitId;

use super::InclusionMask;

/// Maps original-space planning-unit ids onto final-space ids.
///
/// Ids of excluded units disappear. The result is strictly ascending.
/// Ids must already be range-checked against the original planning units;
/// anything outside the mask is ignored.
pub fn remap_indices(ids: &[PlanningUnitId], mask: &InclusionMask) -> Vec<PlanningUnitId> {
    let flags = match mask {
        InclusionMask::All => {
            let mut out = ids.to_vec();
            out.sort_unstable();
            out.dedup();
            return out;
        }
        InclusionMask::Mask(flags) => flags,
    };

    let mut listed = vec![false; flags.len()];
    for id in ids {
        if let Some(slot) = id.offset().and_then(|o| listed.get_mut(o)) {
            *slot = true;
        }
    }

    listed
        .iter()
        .zip(flags)
        .filter(|(_, &included)| included)
        .map(|(&listed, _)| listed)
        .enumerate()
        .filter(|(_, listed)| *listed)
        .map(|(offset, _)| PlanningUnitId::from_offset(offset))
        .collect()
}

/// Remaps both lock sets independently.
pub fn remap_locked(
    locked_in: &[PlanningUnitId],
    locked_out: &[PlanningUnitId],
    mask: &InclusionMask,
) -> (Vec<PlanningUnitId>, Vec<PlanningUnitId>) {
    (remap_indices(locked_in, mask), remap_indices(locked_out, mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[usize]) -> Vec<PlanningUnitId> {
        values.iter().copied().map(PlanningUnitId).collect()
    }

    #[test]
    fn test_all_is_passthrough() {
        assert_eq!(remap_indices(&ids(&[3, 1, 2]), &InclusionMask::All), ids(&[1, 2, 3]));
    }

    #[test]
    fn test_shifts_after_excluded_units() {
        // unit 2 excluded: 3 -> 2, 5 -> 4
        let mask = InclusionMask::Mask(vec![true, false, true, true, true]);
        assert_eq!(remap_indices(&ids(&[1, 3, 5]), &mask), ids(&[1, 2, 4]));
    }

    #[test]
    fn test_excluded_ids_disappear() {
        let mask = InclusionMask::Mask(vec![true, false, false, true]);
        assert_eq!(remap_indices(&ids(&[2, 3, 4]), &mask), ids(&[2]));
    }

    #[test]
    fn test_unordered_duplicates_become_ascending() {
        let mask = InclusionMask::Mask(vec![true, true, false, true]);
        assert_eq!(remap_indices(&ids(&[4, 1, 4, 2]), &mask), ids(&[1, 2, 3]));
    }

    #[test]
    fn test_remap_locked_keeps_sets_independent() {
        let mask = InclusionMask::Mask(vec![false, true, true, true]);
        let (locked_in, locked_out) = remap_locked(&ids(&[2]), &ids(&[4]), &mask);
        assert_eq!(locked_in, ids(&[1]));
        assert_eq!(locked_out, ids(&[3]));
    }
}
