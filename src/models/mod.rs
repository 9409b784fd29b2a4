//! Concrete schemas for each supported file type.
//!
//! - [`ensembl_gff3`]: Ensembl genome GFF3 (`ensembl-genome-gff3`)
//! - [`tss_parquet`]: TSS Parquet dumps (`tss-parquet`)
//! - [`tss_bed`]: TSS BED (`tss-bed`)
//! - [`cds_counts_bed`]: CDS counts BED (`cds-counts-bed`)
//!
//! A [`FileType`] ties a selector to its adapter and its [`Model`]. A model
//! is usually a single schema; GFF3 routes some records to a richer one.

use crate::formats::{self, bed, gff, RecordStream};
use crate::schema::{Mode, Outcome, RawRecord, RecordSchema, SchemaError};
use std::fmt;
use std::path::Path;

pub mod cds_counts_bed;
pub mod ensembl_gff3;
pub mod tss_bed;
pub mod tss_parquet;

/// Predicate selecting an alternative schema for a raw record.
pub type RouteFn = fn(&RawRecord) -> bool;

/// The schemas a file type validates against.
#[derive(Debug, Clone)]
pub struct Model {
    default: RecordSchema,
    routes: Vec<(RouteFn, RecordSchema)>,
}

impl Model {
    /// A model with a single schema.
    pub fn new(default: RecordSchema) -> Self {
        Model {
            default,
            routes: Vec::new(),
        }
    }

    /// Validates records matching `applies` against `schema` instead.
    ///
    /// Routes are tried in registration order.
    pub fn route(mut self, applies: RouteFn, schema: RecordSchema) -> Self {
        self.routes.push((applies, schema));
        self
    }

    /// Schema a raw record is validated against.
    pub fn schema_for(&self, raw: &RawRecord) -> &RecordSchema {
        self.routes
            .iter()
            .find(|(applies, _)| applies(raw))
            .map(|(_, schema)| schema)
            .unwrap_or(&self.default)
    }

    /// Validates a raw record against its schema.
    pub fn validate(&self, raw: &RawRecord, mode: Mode) -> Outcome {
        self.schema_for(raw).validate(raw, mode)
    }
}

/// Input file type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum FileType {
    /// Ensembl genome GFF3 (`.gff3`, `.gff3.gz`)
    #[default]
    #[value(name = "ensembl-genome-gff3")]
    EnsemblGenomeGff3,
    /// TSS Parquet dump (`.parquet`)
    #[value(name = "tss-parquet")]
    TssParquet,
    /// TSS BED (`.bed`)
    #[value(name = "tss-bed")]
    TssBed,
    /// CDS counts BED (`.bed`)
    #[value(name = "cds-counts-bed")]
    CdsCountsBed,
}

impl FileType {
    /// Every supported file type.
    pub const ALL: [FileType; 4] = [
        FileType::EnsemblGenomeGff3,
        FileType::TssParquet,
        FileType::TssBed,
        FileType::CdsCountsBed,
    ];

    /// Selector name.
    pub fn name(&self) -> &'static str {
        match self {
            FileType::EnsemblGenomeGff3 => "ensembl-genome-gff3",
            FileType::TssParquet => "tss-parquet",
            FileType::TssBed => "tss-bed",
            FileType::CdsCountsBed => "cds-counts-bed",
        }
    }

    /// Accepted file name suffixes.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileType::EnsemblGenomeGff3 => &[".gff3", ".gff3.gz"],
            FileType::TssParquet => &[".parquet"],
            FileType::TssBed | FileType::CdsCountsBed => &[".bed"],
        }
    }

    /// True if the file name ends in one of [`FileType::extensions`].
    pub fn accepts(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| self.extensions().iter().any(|ext| name.ends_with(ext)))
    }

    /// How record positions are labelled in reports.
    pub fn position_label(&self) -> &'static str {
        match self {
            FileType::TssParquet => "Row",
            _ => "Line",
        }
    }

    /// Builds the validation model.
    ///
    /// # Errors
    ///
    /// Returns an error if a schema pattern fails to compile.
    pub fn model(&self) -> Result<Model, SchemaError> {
        Ok(match self {
            FileType::EnsemblGenomeGff3 => ensembl_gff3::model()?,
            FileType::TssParquet => Model::new(tss_parquet::schema()),
            FileType::TssBed => Model::new(tss_bed::schema()?),
            FileType::CdsCountsBed => Model::new(cds_counts_bed::schema()),
        })
    }

    /// Opens the matching adapter over `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded.
    pub fn open(&self, path: &Path) -> formats::primitives::Result<RecordStream> {
        Ok(match self {
            FileType::EnsemblGenomeGff3 => Box::new(gff::open(path)?),
            FileType::TssParquet => Box::new(formats::parquet::ParquetRecords::open(
                path,
                tss_parquet::COLUMNS,
            )?),
            FileType::TssBed => Box::new(bed::open(path, bed::TSS_LAYOUT)?),
            FileType::CdsCountsBed => Box::new(bed::open(path, bed::CDS_COUNTS_LAYOUT)?),
        })
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
