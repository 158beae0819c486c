//! Test fixtures: small but valid PDFs built with lopdf

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfInfo<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub creation_date: Option<&'a str>,
}

/// Serialize a one-page PDF whose info dictionary carries `info`
pub fn sample_pdf(info: &PdfInfo<'_>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut entries = Dictionary::new();
    for (key, value) in [
        ("Title", info.title),
        ("Author", info.author),
        ("CreationDate", info.creation_date),
    ] {
        if let Some(value) = value {
            entries.set(key, Object::string_literal(value));
        }
    }
    let info_id = doc.add_object(entries);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("serialize sample pdf");
    buffer
}

/// A sample PDF whose bytes differ per `seed`
pub fn distinct_pdf(seed: &str) -> Vec<u8> {
    sample_pdf(&PdfInfo {
        title: Some(seed),
        author: Some("Fixture Author"),
        creation_date: Some("D:20200101000000Z"),
    })
}
