//! Shared helpers for integration tests.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Write a small PDF with one text line per operation block, so extracted
/// page text comes back newline-separated.
pub fn write_test_pdf(path: &Path, pages: &[&[&str]]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new(
                "Td",
                vec![50.into(), (750 - (i as i64) * 14).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save test pdf");
}

/// Two pages, two clearly segmentable Spanish articles with section markers.
pub fn sample_edition_pages() -> Vec<Vec<&'static str>> {
    vec![
        vec![
            "DEPORTES",
            "EQUIPO CAMPEON CELEBRA TITULO EN EL ESTADIO",
            "El equipo campeon celebro anoche el titulo ante miles de",
            "aficionados reunidos en el estadio municipal de la ciudad.",
        ],
        vec![
            "POLITICA",
            "CONGRESO APRUEBA NUEVA LEY DE PRESUPUESTO NACIONAL",
            "El congreso aprobo la nueva ley de presupuesto con una",
            "mayoria amplia tras un debate extenso entre las bancadas.",
        ],
    ]
}
