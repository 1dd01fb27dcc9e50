use log::debug;

use crate::errors::{CoverageError, CoverageResult, CoverageSource, StitchDefect};
use crate::reading::DepthInterval;
use crate::transform::TrustedLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseCoverage {
    pub pos: u32,
    pub depth: u32,
}

///
/// Per-base depth in canonical coordinates, one entry per base of the
/// genome, ordered by position.
///
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageSeries {
    pub contig: String,
    pub entries: Vec<BaseCoverage>,
}

impl CoverageSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth_at(&self, pos: u32) -> Option<u32> {
        // entries[i].pos == i + 1 by construction
        self.entries
            .get((pos as usize).checked_sub(1)?)
            .map(|base| base.depth)
    }
}

struct Slots {
    slots: Vec<Option<(u32, CoverageSource)>>,
}

impl Slots {
    fn new(genome_length: u32) -> Self {
        Slots {
            slots: vec![None; genome_length as usize + 1],
        }
    }

    fn place(&mut self, pos: u32, depth: u32, source: CoverageSource) -> CoverageResult<()> {
        let genome_length = self.slots.len() as u32 - 1;
        let slot = self
            .slots
            .get_mut(pos as usize)
            .filter(|_| pos > 0)
            .ok_or(CoverageError::InvalidPosition { pos, genome_length })?;
        if let Some((_, first)) = slot {
            return Err(CoverageError::CoordinateStitching {
                pos,
                defect: StitchDefect::Overlap {
                    first: *first,
                    second: source,
                },
            });
        }
        *slot = Some((depth, source));
        Ok(())
    }
}

///
/// Combine the per-base depth of the canonical and the shifted alignment
/// into one canonical-coordinate series.
///
/// Each source is truncated to its trusted interval; shifted positions are
/// mapped back with the layout's transform. Any base covered twice or not
/// at all is reported as a [`CoverageError::CoordinateStitching`] error.
///
/// # Arguments
/// - contig: name written alongside every base of the output
/// - canonical: depth rows from the canonical alignment
/// - shifted: depth rows from the shifted alignment (shifted coordinates)
/// - layout: trusted intervals and shift transform
pub fn stitch(
    contig: &str,
    canonical: &[DepthInterval],
    shifted: &[DepthInterval],
    layout: &TrustedLayout,
) -> CoverageResult<CoverageSeries> {
    let genome_length = layout.genome_length();
    let mut slots = Slots::new(genome_length);

    for interval in canonical {
        if let Some((start, end)) = layout.canonical().clip(interval.start, interval.end) {
            for pos in start..=end {
                slots.place(pos, interval.depth, CoverageSource::Canonical)?;
            }
        }
    }

    for interval in shifted {
        if let Some((start, end)) = layout.shifted().clip(interval.start, interval.end) {
            for pos in start..=end {
                let canonical_pos = layout.transform().shift_back(pos)?;
                slots.place(canonical_pos, interval.depth, CoverageSource::Shifted)?;
            }
        }
    }

    let mut entries = Vec::with_capacity(genome_length as usize);
    for pos in 1..=genome_length {
        match slots.slots[pos as usize] {
            Some((depth, _)) => entries.push(BaseCoverage { pos, depth }),
            None => {
                return Err(CoverageError::CoordinateStitching {
                    pos,
                    defect: StitchDefect::Gap,
                });
            }
        }
    }

    debug!(
        "Stitched {} bases from {} canonical and {} shifted depth rows",
        entries.len(),
        canonical.len(),
        shifted.len()
    );

    Ok(CoverageSeries {
        contig: contig.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use crate::transform::{ShiftTransform, TrustedInterval};

    fn row(start: u32, end: u32, depth: u32) -> DepthInterval {
        DepthInterval {
            chrom: "chrM".to_string(),
            start,
            end,
            depth,
        }
    }

    /// A toy genome of 20 bases shifted by 10; canonical trusted [4, 15],
    /// shifted trusted [6, 13] -> canonical [16, 20] and [1, 3].
    #[fixture]
    fn small_layout() -> TrustedLayout {
        TrustedLayout::new(
            ShiftTransform::new(20, 10).unwrap(),
            TrustedInterval::new(4, 15, 20).unwrap(),
            TrustedInterval::new(6, 13, 20).unwrap(),
        )
        .unwrap()
    }

    #[rstest]
    fn test_stitch_small_genome(small_layout: TrustedLayout) {
        let canonical = vec![row(1, 20, 7)];
        let shifted = vec![row(1, 10, 3), row(11, 20, 5)];

        let series = stitch("chrM", &canonical, &shifted, &small_layout).unwrap();

        let positions: Vec<u32> = series.entries.iter().map(|b| b.pos).collect();
        assert_eq!(positions, (1..=20).collect::<Vec<u32>>());

        // shifted 11..=13 -> canonical 1..=3
        assert_eq!(series.depth_at(1), Some(5));
        assert_eq!(series.depth_at(3), Some(5));
        assert_eq!(series.depth_at(4), Some(7));
        assert_eq!(series.depth_at(15), Some(7));
        // shifted 6..=10 -> canonical 16..=20
        assert_eq!(series.depth_at(16), Some(3));
        assert_eq!(series.depth_at(20), Some(3));
        assert_eq!(series.depth_at(0), None);
    }

    #[rstest]
    fn test_stitch_detects_gap_in_source(small_layout: TrustedLayout) {
        // canonical source does not reach position 15
        let canonical = vec![row(1, 14, 7)];
        let shifted = vec![row(1, 20, 3)];

        let result = stitch("chrM", &canonical, &shifted, &small_layout);
        assert!(matches!(
            result,
            Err(CoverageError::CoordinateStitching {
                pos: 15,
                defect: StitchDefect::Gap
            })
        ));
    }

    #[rstest]
    fn test_stitch_detects_overlapping_rows(small_layout: TrustedLayout) {
        let canonical = vec![row(1, 10, 7), row(10, 20, 8)];
        let shifted = vec![row(1, 20, 3)];

        let result = stitch("chrM", &canonical, &shifted, &small_layout);
        assert!(matches!(
            result,
            Err(CoverageError::CoordinateStitching {
                pos: 10,
                defect: StitchDefect::Overlap {
                    first: CoverageSource::Canonical,
                    second: CoverageSource::Canonical
                }
            })
        ));
    }

    #[rstest]
    fn test_stitch_ignores_untrusted_bases(small_layout: TrustedLayout) {
        // depth outside the trusted intervals is dropped, not double counted
        let canonical = vec![row(1, 3, 100), row(4, 15, 7), row(16, 20, 100)];
        let shifted = vec![row(1, 5, 100), row(6, 13, 3), row(14, 20, 100)];

        let series = stitch("chrM", &canonical, &shifted, &small_layout).unwrap();
        assert_eq!(series.len(), 20);
        assert!(series.entries.iter().all(|b| b.depth != 100));
    }

    #[rstest]
    #[case(0)]
    #[case(21)]
    fn test_slot_outside_genome_is_an_error(#[case] pos: u32) {
        let mut slots = Slots::new(20);
        assert!(matches!(
            slots.place(pos, 7, CoverageSource::Canonical),
            Err(CoverageError::InvalidPosition { genome_length: 20, .. })
        ));
        assert!(slots.place(20, 7, CoverageSource::Canonical).is_ok());
    }
}
