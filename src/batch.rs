//! Batch builds producing documents named for packaging.
//!
//! Records are built in parallel with rayon.  Output order follows input order, and the first
//! failing build aborts the batch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;

use crate::assets::Resources;
use crate::canvas::RenderError;
use crate::labels::{build_product, build_tea, build_tips, TeaDocuments};
use crate::records::{ProductRecord, TeaRecord, TipsRecord};
use crate::text::{safe_filename, unique_names};

/// Directory holding tea bank labels inside a tea batch.
pub const BANK_DIR: &str = "bank";

/// Directory holding tea box labels inside a tea batch.
pub const BOX_DIR: &str = "box";

/// A serialized document and its path relative to the batch root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedDocument {
    /// Relative output path.
    pub path: PathBuf,
    /// PDF bytes.
    pub bytes: Vec<u8>,
}

impl NamedDocument {
    /// Writes the document under `root`, creating parent directories, and returns the full path.
    pub fn write_to(&self, root: &Path) -> io::Result<PathBuf> {
        let target = root.join(&self.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &self.bytes)?;
        Ok(target)
    }
}

/// Safe, de-duplicated base names for `names`, in order.
pub fn output_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let safe: Vec<String> = names.into_iter().map(safe_filename).collect();
    unique_names(&safe)
}

fn pdf_name(base: &str) -> String {
    format!("{base}.pdf")
}

/// Builds `bank/<name>.pdf` and `box/<name>.pdf` for every record: `2 * records.len()` documents.
pub fn build_tea_batch(records: &[TeaRecord], resources: &Resources) -> Result<Vec<NamedDocument>, RenderError> {
    build_tea_batch_with(records, |record| build_tea(record, resources))
}

/// [`build_tea_batch`] with a caller-supplied per-record build.
pub fn build_tea_batch_with<F>(records: &[TeaRecord], build: F) -> Result<Vec<NamedDocument>, RenderError>
where
    F: Fn(&TeaRecord) -> Result<TeaDocuments, RenderError> + Sync,
{
    let names = output_names(records.iter().map(|record| record.name.as_str()));
    let built: Vec<TeaDocuments> = records
        .par_iter()
        .map(&build)
        .collect::<Result<_, _>>()?;

    let documents: Vec<NamedDocument> = names
        .iter()
        .zip(built)
        .flat_map(|(name, TeaDocuments { bank, box_label })| {
            [
                NamedDocument {
                    path: Path::new(BANK_DIR).join(pdf_name(name)),
                    bytes: bank,
                },
                NamedDocument {
                    path: Path::new(BOX_DIR).join(pdf_name(name)),
                    bytes: box_label,
                },
            ]
        })
        .collect();
    info!("Built {} tea document(s) from {} record(s)", documents.len(), records.len());
    Ok(documents)
}

/// Builds `<name>.pdf` for every record: one two-page document each.
pub fn build_product_batch(
    records: &[ProductRecord],
    resources: &Resources,
) -> Result<Vec<NamedDocument>, RenderError> {
    build_product_batch_with(records, |record| build_product(record, resources))
}

/// [`build_product_batch`] with a caller-supplied per-record build.
pub fn build_product_batch_with<F>(
    records: &[ProductRecord],
    build: F,
) -> Result<Vec<NamedDocument>, RenderError>
where
    F: Fn(&ProductRecord) -> Result<Vec<u8>, RenderError> + Sync,
{
    let names = output_names(records.iter().map(|record| record.name.as_str()));
    let built: Vec<Vec<u8>> = records
        .par_iter()
        .map(&build)
        .collect::<Result<_, _>>()?;

    let documents: Vec<NamedDocument> = names
        .into_iter()
        .zip(built)
        .map(|(name, bytes)| NamedDocument {
            path: PathBuf::from(pdf_name(&name)),
            bytes,
        })
        .collect();
    info!("Built {} product document(s)", documents.len());
    Ok(documents)
}

/// Builds `tips_<name>.pdf` for a single card.
pub fn tips_document(record: &TipsRecord, resources: &Resources) -> Result<NamedDocument, RenderError> {
    let bytes = build_tips(record, resources)?;
    let name = format!("tips_{}", safe_filename(&record.name));
    Ok(NamedDocument {
        path: PathBuf::from(pdf_name(&name)),
        bytes,
    })
}
