mod common;

use std::path::PathBuf;

use common::{template, RecordingSurface, SyntheticFonts};
use label_press::assets::TemplateKind;
use label_press::batch::{build_product_batch_with, build_tea_batch_with, BANK_DIR, BOX_DIR};
use label_press::canvas::RenderError;
use label_press::labels::{compose_product, compose_tea_bank, compose_tea_box, LabelGeometry, TeaDocuments};
use label_press::records::{ProductRecord, TeaRecord};

/// Stand-in document: one byte per page started on the surface.
fn pages_of(surface: &RecordingSurface) -> Vec<u8> {
    surface.pages.iter().map(|kind| *kind as u8).collect()
}

fn compose_tea(record: &TeaRecord) -> Result<TeaDocuments, RenderError> {
    let fonts = SyntheticFonts::new();
    let geometry = LabelGeometry::default();

    let mut bank = RecordingSurface::default();
    compose_tea_bank(&mut bank, &fonts, &template(TemplateKind::TeaBank), &geometry.tea_bank, record)?;
    let mut box_label = RecordingSurface::default();
    compose_tea_box(&mut box_label, &fonts, &template(TemplateKind::TeaBox), &geometry.tea_box, record)?;

    Ok(TeaDocuments {
        bank: pages_of(&bank),
        box_label: pages_of(&box_label),
    })
}

fn compose_products(record: &ProductRecord) -> Result<Vec<u8>, RenderError> {
    let mut surface = RecordingSurface::default();
    compose_product(
        &mut surface,
        &SyntheticFonts::new(),
        &template(TemplateKind::Products),
        &LabelGeometry::default().products,
        record,
    )?;
    Ok(pages_of(&surface))
}

fn teas() -> Vec<TeaRecord> {
    ["Шу Пуэр", "Те Гуань Инь", "Шу Пуэр"]
        .into_iter()
        .map(|name| TeaRecord {
            tea_type: "Улун".into(),
            name: name.into(),
            price: 30,
        })
        .collect()
}

#[test]
fn tea_batch_yields_bank_and_box_per_record() {
    let records = teas();
    let documents = build_tea_batch_with(&records, compose_tea).expect("batch builds");
    assert_eq!(documents.len(), 2 * records.len());

    let paths: Vec<PathBuf> = documents.iter().map(|doc| doc.path.clone()).collect();
    let expected: Vec<PathBuf> = ["Шу Пуэр", "Те Гуань Инь", "Шу Пуэр_2"]
        .iter()
        .flat_map(|name| {
            [
                PathBuf::from(BANK_DIR).join(format!("{name}.pdf")),
                PathBuf::from(BOX_DIR).join(format!("{name}.pdf")),
            ]
        })
        .collect();
    assert_eq!(paths, expected);

    for document in &documents {
        let kind = if document.path.starts_with(BANK_DIR) {
            TemplateKind::TeaBank
        } else {
            TemplateKind::TeaBox
        };
        assert_eq!(document.bytes, vec![kind as u8], "{:?}", document.path);
    }
}

#[test]
fn product_batch_yields_one_two_page_document_per_record() {
    let records: Vec<ProductRecord> = (1..=4)
        .map(|hours| ProductRecord {
            name: format!("круассан {hours}"),
            price: 150,
            hours,
        })
        .collect();
    let documents = build_product_batch_with(&records, compose_products).expect("batch builds");

    assert_eq!(documents.len(), records.len());
    for (document, record) in documents.iter().zip(&records) {
        assert_eq!(document.path, PathBuf::from(format!("{}.pdf", record.name)));
        let page = TemplateKind::Products as u8;
        assert_eq!(document.bytes, vec![page, page]);
    }
}

#[test]
fn failing_record_aborts_the_batch() {
    let records = teas();
    let result = build_tea_batch_with(&records, |record| {
        if record.name == "Те Гуань Инь" {
            Err(RenderError::EmptyDocument)
        } else {
            compose_tea(record)
        }
    });
    assert!(matches!(result, Err(RenderError::EmptyDocument)));
}

#[test]
fn empty_batches_build_nothing() {
    assert!(build_tea_batch_with(&[], compose_tea).expect("empty batch").is_empty());
    assert!(build_product_batch_with(&[], compose_products)
        .expect("empty batch")
        .is_empty());
}
