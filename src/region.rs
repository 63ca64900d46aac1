use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("invalid region format: expected 'chr:start-end', got '{0}'")]
    InvalidFormat(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] std::num::ParseIntError),
    #[error("invalid region: start ({start}) must be less than end ({end})")]
    InvalidRange { start: u64, end: u64 },
    #[error("region {chrom}:{start}-{end} exceeds chromosome length {length}")]
    OutOfBounds {
        chrom: String,
        start: u64,
        end: u64,
        length: u64,
    },
    #[error("unknown chromosome: {0}")]
    UnknownChromosome(String),
}

/// A genomic region specified as chromosome:start-end (0-based, half-open).
///
/// The span of the region is `end - start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicRegion {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicRegion {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Result<Self, RegionError> {
        if start >= end {
            return Err(RegionError::InvalidRange { start, end });
        }
        Ok(Self {
            chrom: chrom.into(),
            start,
            end,
        })
    }

    /// Span of the region in bases.
    pub fn span(&self) -> u64 {
        self.end - self.start
    }

    /// Genomic midpoint of the region.
    pub fn center(&self) -> f64 {
        (self.start + self.end) as f64 / 2.0
    }

    /// Whether an interval `[start, end)` overlaps this region.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        start < self.end && end > self.start
    }

    /// Whether a single position falls inside this region.
    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos < self.end
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl FromStr for GenomicRegion {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chrom, rest) = s
            .split_once(':')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        let (start_str, end_str) = rest
            .split_once('-')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        if chrom.is_empty() {
            return Err(RegionError::InvalidFormat(s.to_string()));
        }
        let start: u64 = start_str.replace(',', "").parse()?;
        let end: u64 = end_str.replace(',', "").parse()?;
        GenomicRegion::new(chrom, start, end)
    }
}

/// Chromosome name to length table used to validate region bounds.
#[derive(Debug, Clone)]
pub struct Genome {
    lengths: HashMap<String, u64>,
}

/// GRCh38 primary assembly chromosome lengths.
const GRCH38_LENGTHS: &[(&str, u64)] = &[
    ("chr1", 248_956_422),
    ("chr2", 242_193_529),
    ("chr3", 198_295_559),
    ("chr4", 190_214_555),
    ("chr5", 181_538_259),
    ("chr6", 170_805_979),
    ("chr7", 159_345_973),
    ("chr8", 145_138_636),
    ("chr9", 138_394_717),
    ("chr10", 133_797_422),
    ("chr11", 135_086_622),
    ("chr12", 133_275_309),
    ("chr13", 114_364_328),
    ("chr14", 107_043_718),
    ("chr15", 101_991_189),
    ("chr16", 90_338_345),
    ("chr17", 83_257_441),
    ("chr18", 80_373_285),
    ("chr19", 58_617_616),
    ("chr20", 64_444_167),
    ("chr21", 46_709_983),
    ("chr22", 50_818_468),
    ("chrX", 156_040_895),
    ("chrY", 57_227_415),
    ("chrM", 16_569),
];

impl Genome {
    /// Build a genome from explicit chromosome lengths.
    pub fn new(lengths: HashMap<String, u64>) -> Self {
        Self { lengths }
    }

    /// GRCh38 primary chromosomes (chr1-chr22, chrX, chrY, chrM).
    pub fn grch38() -> Self {
        Self {
            lengths: GRCH38_LENGTHS
                .iter()
                .map(|(name, len)| (name.to_string(), *len))
                .collect(),
        }
    }

    /// Length of a chromosome, if known.
    pub fn length(&self, chrom: &str) -> Option<u64> {
        self.lengths.get(chrom).copied()
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = (&str, u64)> {
        self.lengths.iter().map(|(name, len)| (name.as_str(), *len))
    }

    /// Validate a region against this genome: `0 <= start < end <= length`.
    pub fn validate(&self, region: &GenomicRegion) -> Result<(), RegionError> {
        let length = self
            .length(&region.chrom)
            .ok_or_else(|| RegionError::UnknownChromosome(region.chrom.clone()))?;
        if region.start >= region.end {
            return Err(RegionError::InvalidRange {
                start: region.start,
                end: region.end,
            });
        }
        if region.end > length {
            return Err(RegionError::OutOfBounds {
                chrom: region.chrom.clone(),
                start: region.start,
                end: region.end,
                length,
            });
        }
        Ok(())
    }
}
