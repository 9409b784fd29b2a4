//! Ensembl genome GFF3.
//!
//! Every feature line is validated against [`row`]. Transcripts tagged
//! `gencode_basic` are routed to [`gencode_basic_transcript_row`] instead,
//! whose attribute column is a structured sub-schema with a closed biotype
//! vocabulary.
//!
//! ```text
//! 1	havana	lnc_RNA	89295	133566	.	-	.	ID=transcript:ENST00000466430;Parent=gene:ENSG00000238009;biotype=lncRNA;tag=basic;transcript_id=ENST00000466430;version=5
//! ```

use crate::formats::gff::parse_attributes;
use crate::models::Model;
use crate::schema::{rules, Field, RawRecord, RawValue, RecordSchema, SchemaError};

/// GFF3 seqid alphabet.
pub const SEQID_PATTERN: &str = r"^[a-zA-Z0-9.:^*$@!+_?\-|]+$";

/// Ensembl transcript biotypes.
pub const TRANSCRIPT_BIOTYPES: &[&str] = &[
    "IG_C_gene",
    "IG_C_pseudogene",
    "IG_D_gene",
    "IG_J_gene",
    "IG_J_pseudogene",
    "IG_V_gene",
    "IG_V_pseudogene",
    "IG_pseudogene",
    "Mt_rRNA",
    "Mt_tRNA",
    "TEC",
    "TR_C_gene",
    "TR_D_gene",
    "TR_J_gene",
    "TR_J_pseudogene",
    "TR_V_gene",
    "TR_V_pseudogene",
    "artifact",
    "lncRNA",
    "miRNA",
    "misc_RNA",
    "nonsense_mediated_decay",
    "processed_pseudogene",
    "processed_transcript",
    "protein_coding",
    "protein_coding_LoF",
    "pseudogene",
    "rRNA",
    "rRNA_pseudogene",
    "retained_intron",
    "ribozyme",
    "sRNA",
    "scRNA",
    "scaRNA",
    "snRNA",
    "snoRNA",
    "transcribed_processed_pseudogene",
    "transcribed_unitary_pseudogene",
    "transcribed_unprocessed_pseudogene",
    "translated_processed_pseudogene",
    "unitary_pseudogene",
    "unprocessed_pseudogene",
    "vault_RNA",
];

/// Transcript tags allowed on `gencode_basic` transcripts.
pub const TRANSCRIPT_TAGS: &[&str] = &[
    "gencode_basic",
    "Ensembl_canonical",
    "gencode_primary",
    "MANE_Select",
    "MANE_Plus_Clinical",
];

const GENCODE_BASIC: &str = "gencode_basic";

/// 1-based closed interval, `start <= end`.
pub fn genomic_range() -> RecordSchema {
    RecordSchema::new("GenomicRange")
        .field(Field::int("start").ge(1))
        .field(Field::int("end").ge(1))
        .rule("start_not_after_end", rules::start_not_after_end)
}

/// The eight fixed GFF3 columns; callers add `attributes`.
fn feature_columns(name: &'static str) -> Result<RecordSchema, SchemaError> {
    Ok(RecordSchema::new(name)
        .field(Field::str("seqid").pattern(SEQID_PATTERN)?)
        .field(Field::str("source"))
        .field(Field::str("type"))
        .field(Field::record("location", genomic_range()))
        .field(Field::float("score").optional())
        .field(Field::literal("strand", &["+", "-", ".", "?"]))
        .field(Field::literal("phase", &["0", "1", "2"]).optional())
        .before("score", rules::dot_as_null)
        .before("phase", rules::dot_as_null)
        .after("seqid", rules::no_chr_prefix))
}

/// Generic feature row; attributes parsed to a map of value lists.
///
/// # Errors
///
/// Returns an error if a pattern constraint fails to compile.
pub fn row() -> Result<RecordSchema, SchemaError> {
    Ok(feature_columns("Row")?
        .field(Field::map("attributes"))
        .before("attributes", attribute_map))
}

/// Structured attributes of a `gencode_basic` transcript.
pub fn gencode_basic_transcript_attributes() -> RecordSchema {
    RecordSchema::new("GencodeBasicTranscriptAttributes")
        .field(Field::str("id").alias("ID"))
        .field(Field::str("parent").alias("Parent"))
        .field(Field::str("name").alias("Name").optional())
        .field(Field::literal("biotype", TRANSCRIPT_BIOTYPES))
        .field(Field::list("tags").alias("tag").one_of(TRANSCRIPT_TAGS))
        .field(Field::str("transcript_id"))
        .field(Field::str("transcript_support_level").optional())
        .field(Field::int("version"))
}

/// Feature row of a `gencode_basic` transcript.
///
/// # Errors
///
/// Returns an error if a pattern constraint fails to compile.
pub fn gencode_basic_transcript_row() -> Result<RecordSchema, SchemaError> {
    Ok(feature_columns("GencodeBasicTranscriptRow")?
        .field(Field::record(
            "attributes",
            gencode_basic_transcript_attributes(),
        ))
        .before("attributes", gencode_basic_attributes))
}

/// Routes `gencode_basic` transcripts to their own schema.
///
/// # Errors
///
/// Returns an error if a pattern constraint fails to compile.
pub fn model() -> Result<Model, SchemaError> {
    Ok(Model::new(row()?).route(is_gencode_basic, gencode_basic_transcript_row()?))
}

/// True if the raw attribute column carries a `gencode_basic` tag.
pub fn is_gencode_basic(raw: &RawRecord) -> bool {
    raw.get("attributes")
        .and_then(RawValue::as_text)
        .and_then(|column| parse_attributes(column).ok())
        .is_some_and(|attributes| {
            attributes
                .iter()
                .any(|(key, values)| key == "tag" && values.iter().any(|v| v == GENCODE_BASIC))
        })
}

/// `key=v1,v2;key2=v3` → `{key: [v1, v2], key2: [v3]}`
fn attribute_map(raw: RawValue) -> Result<RawValue, String> {
    let column = match raw {
        RawValue::Text(column) => column,
        other => return Ok(other),
    };

    let mut map = RawRecord::new();
    for (key, values) in parse_attributes(&column)? {
        map.insert(key, RawValue::List(values.into_iter().map(RawValue::Text).collect()));
    }
    Ok(RawValue::Record(map))
}

/// Like [`attribute_map`], but only `tag` may carry several values.
fn gencode_basic_attributes(raw: RawValue) -> Result<RawValue, String> {
    let column = match raw {
        RawValue::Text(column) => column,
        other => return Ok(other),
    };

    let mut attributes = RawRecord::new();
    for (key, mut values) in parse_attributes(&column)? {
        if key == "tag" {
            attributes.insert(key, RawValue::List(values.into_iter().map(RawValue::Text).collect()));
        } else if values.len() == 1 {
            attributes.insert(key, RawValue::Text(values.remove(0)));
        } else {
            return Err(format!(
                "Expected single value for {} in attributes column, got {:?}",
                key, values
            ));
        }
    }
    Ok(RawValue::Record(attributes))
}
