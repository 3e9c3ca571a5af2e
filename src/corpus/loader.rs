//! Ingestion-artifact loaders
//!
//! Reads the JSON artifacts produced by the external ingestion stage: the
//! processed statutory corpus, the public-law classification mapping, and the
//! bill table. A missing artifact yields an empty result with a warning, not
//! an error - resolution over a partial corpus is an expected mode.

use crate::Result;
use crate::bill::{Bill, BillId, BillType};
use crate::corpus::store::{CorpusStore, METADATA_TYPES, MetadataRef, PublicLaw, SectionRef};
use crate::section::StatutorySection;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Accept string, integer, or float values where upstream typing varies.
fn flexible_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Missing,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Missing => String::new(),
    })
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default, deserialize_with = "flexible_string")]
    title_number: String,
    #[serde(default, deserialize_with = "flexible_string")]
    section_number: String,
    #[serde(default)]
    section_name: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawLawRef {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    title: String,
    #[serde(default, deserialize_with = "flexible_string")]
    section: String,
}

#[derive(Debug, Deserialize)]
struct RawLaw {
    #[serde(default)]
    title: String,
    #[serde(default)]
    us_code_sections: Vec<RawLawRef>,
    #[serde(default)]
    metadata: Vec<RawLawRef>,
}

#[derive(Debug, Deserialize)]
struct RawBill {
    congress: u16,
    bill_type: String,
    bill_number: u32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    became_law: bool,
    #[serde(default)]
    public_law_number: Option<String>,
    #[serde(default)]
    bill_text_raw: String,
}

fn read_artifact<T: serde::de::DeserializeOwned + Default>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "{} artifact not found, continuing with empty data", what);
        return Ok(T::default());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load the processed statutory corpus into `store`. Returns the number of
/// sections loaded.
pub fn load_sections(path: &Path, store: &mut CorpusStore) -> Result<usize> {
    let raw: HashMap<String, RawSection> = read_artifact(path, "statutory corpus")?;

    let mut loaded = 0;
    for (source_id, raw_section) in raw {
        let section = StatutorySection::new(
            source_id,
            &raw_section.title_number,
            &raw_section.section_number,
            raw_section.section_name,
            raw_section.content,
        )
        .with_status(raw_section.status);
        store.insert_section(section);
        loaded += 1;
    }

    tracing::info!(count = loaded, path = %path.display(), "loaded statutory sections");
    Ok(loaded)
}

/// Load the public-law classification mapping into `store`. Returns the
/// number of laws loaded.
///
/// Rows whose `type` is one of the non-substantive markers (`nt`, `prec`,
/// `new`, `repealed`) are classified as metadata regardless of which list
/// they arrive in; they never become resolution candidates.
pub fn load_law_mapping(path: &Path, store: &mut CorpusStore) -> Result<usize> {
    let raw: HashMap<String, RawLaw> = read_artifact(path, "public-law mapping")?;

    let mut loaded = 0;
    for (number, raw_law) in raw {
        let mut law = PublicLaw::new(number);
        if !raw_law.title.is_empty() {
            law.title = raw_law.title;
        }

        for entry in raw_law.us_code_sections {
            match entry.kind.as_deref().filter(|k| METADATA_TYPES.contains(k)) {
                Some(kind) => law.metadata.push(MetadataRef {
                    kind: kind.to_string(),
                    title: entry.title,
                    section: entry.section,
                }),
                None => law.sections.push(SectionRef::new(&entry.title, &entry.section)),
            }
        }
        for entry in raw_law.metadata {
            law.metadata.push(MetadataRef {
                kind: entry.kind.unwrap_or_default(),
                title: entry.title,
                section: entry.section,
            });
        }

        store.insert_law(law);
        loaded += 1;
    }

    tracing::info!(count = loaded, path = %path.display(), "loaded public-law mapping");
    Ok(loaded)
}

/// Load the bill table. Bills whose type is outside the ingested set (hr, s)
/// are skipped with a warning.
pub fn load_bills(path: &Path) -> Result<HashMap<BillId, Bill>> {
    let raw: HashMap<String, RawBill> = read_artifact(path, "bill table")?;

    let mut bills = HashMap::new();
    for (key, raw_bill) in raw {
        let bill_type = match BillType::from_str(&raw_bill.bill_type) {
            Ok(t) => t,
            Err(_) => {
                tracing::warn!(key = %key, bill_type = %raw_bill.bill_type, "skipping bill of unsupported type");
                continue;
            }
        };
        let id = BillId::new(raw_bill.congress, bill_type, raw_bill.bill_number);

        let mut bill = Bill::new(id.clone(), raw_bill.title).with_text(raw_bill.bill_text_raw);
        bill.became_law = raw_bill.became_law;
        bill.public_law_number = raw_bill.public_law_number.filter(|n| !n.is_empty());
        bills.insert(id, bill);
    }

    tracing::info!(count = bills.len(), path = %path.display(), "loaded bills");
    Ok(bills)
}
