use mitors_core::config::CoverageSettings;
use mitors_core::consts::{DEFAULT_SHIFT, MT_GENOME_LENGTH};

use crate::errors::{CoverageError, CoverageResult, CoverageSource, StitchDefect};

///
/// Maps positions on the shifted reference back onto the canonical one.
///
/// The shifted reference is the canonical sequence rotated by `shift`
/// bases, so that the origin of the canonical genome lands in the middle
/// of the shifted one.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftTransform {
    genome_length: u32,
    shift: u32,
}

impl Default for ShiftTransform {
    fn default() -> Self {
        ShiftTransform {
            genome_length: MT_GENOME_LENGTH,
            shift: DEFAULT_SHIFT,
        }
    }
}

impl ShiftTransform {
    pub fn new(genome_length: u32, shift: u32) -> CoverageResult<Self> {
        if shift == 0 || shift >= genome_length {
            return Err(CoverageError::InvalidShift {
                shift,
                genome_length,
            });
        }
        Ok(ShiftTransform {
            genome_length,
            shift,
        })
    }

    pub fn genome_length(&self) -> u32 {
        self.genome_length
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    ///
    /// Convert a one-based shifted position to canonical coordinates.
    ///
    /// ```
    /// use mitors_coverage::ShiftTransform;
    ///
    /// let transform = ShiftTransform::default();
    /// assert_eq!(transform.shift_back(1).unwrap(), 8001);
    /// assert_eq!(transform.shift_back(8569).unwrap(), 16569);
    /// assert_eq!(transform.shift_back(8570).unwrap(), 1);
    /// ```
    pub fn shift_back(&self, pos: u32) -> CoverageResult<u32> {
        if pos == 0 || pos > self.genome_length {
            return Err(CoverageError::InvalidPosition {
                pos,
                genome_length: self.genome_length,
            });
        }

        if pos <= self.shift {
            Ok(pos + (self.genome_length - self.shift))
        } else {
            Ok(pos - self.shift)
        }
    }
}

/// Closed, one-based interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedInterval {
    start: u32,
    end: u32,
}

impl TrustedInterval {
    pub fn new(start: u32, end: u32, genome_length: u32) -> CoverageResult<Self> {
        if start == 0 || start > end || end > genome_length {
            return Err(CoverageError::InvalidInterval {
                start,
                end,
                genome_length,
            });
        }
        Ok(TrustedInterval { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    #[inline]
    pub fn contains(&self, pos: u32) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Clip a closed interval to this one. `None` when they don't overlap.
    #[inline]
    pub fn clip(&self, start: u32, end: u32) -> Option<(u32, u32)> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        (start <= end).then_some((start, end))
    }
}

///
/// The regions each alignment is authoritative for: the canonical
/// alignment for the bulk of the genome (canonical coordinates) and the
/// shifted alignment for the control region (shifted coordinates).
///
/// Only built through [`TrustedLayout::new`] (or the defaults), so every
/// layout in hand tiles its genome.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedLayout {
    transform: ShiftTransform,
    canonical: TrustedInterval,
    shifted: TrustedInterval,
}

impl Default for TrustedLayout {
    fn default() -> Self {
        let settings = CoverageSettings::default();
        TrustedLayout {
            transform: ShiftTransform::default(),
            canonical: TrustedInterval {
                start: settings.canonical_trusted[0],
                end: settings.canonical_trusted[1],
            },
            shifted: TrustedInterval {
                start: settings.shifted_trusted[0],
                end: settings.shifted_trusted[1],
            },
        }
    }
}

impl TrustedLayout {
    ///
    /// Build a layout and check that the two trusted intervals tile the
    /// genome exactly once after shifting back.
    ///
    pub fn new(
        transform: ShiftTransform,
        canonical: TrustedInterval,
        shifted: TrustedInterval,
    ) -> CoverageResult<Self> {
        let layout = TrustedLayout {
            transform,
            canonical,
            shifted,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_settings(settings: &CoverageSettings) -> CoverageResult<Self> {
        let transform = ShiftTransform::new(settings.genome_length, settings.shift)?;
        let [c_start, c_end] = settings.canonical_trusted;
        let [s_start, s_end] = settings.shifted_trusted;

        TrustedLayout::new(
            transform,
            TrustedInterval::new(c_start, c_end, settings.genome_length)?,
            TrustedInterval::new(s_start, s_end, settings.genome_length)?,
        )
    }

    pub fn genome_length(&self) -> u32 {
        self.transform.genome_length()
    }

    pub fn transform(&self) -> &ShiftTransform {
        &self.transform
    }

    pub fn canonical(&self) -> &TrustedInterval {
        &self.canonical
    }

    pub fn shifted(&self) -> &TrustedInterval {
        &self.shifted
    }

    fn validate(&self) -> CoverageResult<()> {
        let genome_length = self.genome_length();
        for interval in [&self.canonical, &self.shifted] {
            if interval.end > genome_length {
                return Err(CoverageError::InvalidInterval {
                    start: interval.start,
                    end: interval.end,
                    genome_length,
                });
            }
        }

        let length = genome_length as usize;
        let mut owners: Vec<Option<CoverageSource>> = vec![None; length + 1];

        for pos in self.canonical.start..=self.canonical.end {
            owners[pos as usize] = Some(CoverageSource::Canonical);
        }

        for pos in self.shifted.start..=self.shifted.end {
            let canonical_pos = self.transform.shift_back(pos)?;
            let slot = &mut owners[canonical_pos as usize];
            if let Some(first) = slot {
                return Err(CoverageError::CoordinateStitching {
                    pos: canonical_pos,
                    defect: StitchDefect::Overlap {
                        first: *first,
                        second: CoverageSource::Shifted,
                    },
                });
            }
            *slot = Some(CoverageSource::Shifted);
        }

        match (1..=length).find(|&pos| owners[pos].is_none()) {
            Some(pos) => Err(CoverageError::CoordinateStitching {
                pos: pos as u32,
                defect: StitchDefect::Gap,
            }),
            None => Ok(()),
        }
    }
}
