//! Feature records carried by tracks. Immutable once loaded.

use serde::{Deserialize, Serialize};

/// Strand of a stranded feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
    #[serde(rename = ".")]
    Unstranded,
}

impl Strand {
    pub fn arrow(&self) -> char {
        match self {
            Strand::Forward => '>',
            Strand::Reverse => '<',
            Strand::Unstranded => '.',
        }
    }
}

/// One exon of a gene model, in genomic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub start: u64,
    pub end: u64,
}

/// A gene model: outer span plus exon blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneModel {
    pub name: String,
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    #[serde(default)]
    pub exons: Vec<Exon>,
}

/// Functional consequence class of a point mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consequence {
    Missense,
    Nonsense,
    Synonymous,
    Frameshift,
    Splice,
    Other,
}

impl Consequence {
    pub fn label(&self) -> &'static str {
        match self {
            Consequence::Missense => "missense",
            Consequence::Nonsense => "nonsense",
            Consequence::Synonymous => "synonymous",
            Consequence::Frameshift => "frameshift",
            Consequence::Splice => "splice",
            Consequence::Other => "other",
        }
    }

    /// All classes, in breakdown display order.
    pub const ALL: [Consequence; 6] = [
        Consequence::Missense,
        Consequence::Nonsense,
        Consequence::Synonymous,
        Consequence::Frameshift,
        Consequence::Splice,
        Consequence::Other,
    ];
}

/// A point mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub id: String,
    pub chrom: String,
    pub position: u64,
    pub consequence: Consequence,
    /// Variant allele fraction, if known.
    #[serde(default)]
    pub allele_fraction: Option<f64>,
}

impl Mutation {
    /// Half-open interval covered by this mutation (a single base).
    pub fn end(&self) -> u64 {
        self.position + 1
    }
}

/// One bin of a continuous signal (coverage, conservation, expression).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalBin {
    pub start: u64,
    pub end: u64,
    pub value: f64,
}

/// A generic labeled interval annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFeature {
    pub label: String,
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub category: String,
}

/// An aligned sequencing read, reduced to its layout-relevant fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadAlignment {
    pub name: String,
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub mapq: u8,
    pub strand: Strand,
}

/// A splice junction supported by spanning reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpliceJunction {
    pub chrom: String,
    pub donor: u64,
    pub acceptor: u64,
    pub read_count: u32,
    pub strand: Strand,
}

impl SpliceJunction {
    pub fn start(&self) -> u64 {
        self.donor.min(self.acceptor)
    }

    pub fn end(&self) -> u64 {
        self.donor.max(self.acceptor)
    }
}
