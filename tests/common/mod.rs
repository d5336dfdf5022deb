//! Shared fixture builders for integration tests

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Builds a document with one page per entry; each page shows its
/// lines top-down in a single column.
pub fn build_pdf(pages: &[Vec<&str>]) -> Document {
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

    let mut kids = Vec::new();
    for lines in pages {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            page_operations(lines).encode().unwrap(),
        ));
        kids.push(add_page(&mut doc, pages_id, resources_id, content_id));
    }

    finish_document(&mut doc, pages_id, kids);
    doc
}

/// Like `build_pdf`, but the given page's content stream holds bytes
/// that cannot be decoded as content operations.
pub fn build_pdf_with_broken_page(pages: &[Vec<&str>], broken_index: usize) -> Document {
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

    let mut kids = Vec::new();
    for (index, lines) in pages.iter().enumerate() {
        let bytes = if index == broken_index {
            b"(unbalanced".to_vec()
        } else {
            page_operations(lines).encode().unwrap()
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
        kids.push(add_page(&mut doc, pages_id, resources_id, content_id));
    }

    finish_document(&mut doc, pages_id, kids);
    doc
}

/// Attaches an Info dictionary and an XMP metadata stream
pub fn add_metadata(doc: &mut Document, author: &str) {
    let info_id = doc.add_object(dictionary! {
        "Author" => Object::string_literal(author),
        "Producer" => Object::string_literal("fixture-writer"),
    });
    doc.trailer.set("Info", info_id);

    let xmp = format!(
        "<?xpacket begin=\"\"?><x:xmpmeta><dc:creator>{author}</dc:creator></x:xmpmeta><?xpacket end=\"w\"?>"
    );
    let xmp_id = doc.add_object(Stream::new(
        dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
        xmp.into_bytes(),
    ));

    let root_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .unwrap();
    if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(root_id) {
        catalog.set("Metadata", xmp_id);
    }
}

pub fn write_pdf(doc: &mut Document, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

fn page_operations(lines: &[&str]) -> Content {
    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new(
            "Td",
            vec![72.into(), (720 - 16 * i as i64).into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

fn add_page(
    doc: &mut Document,
    pages_id: lopdf::ObjectId,
    resources_id: lopdf::ObjectId,
    content_id: lopdf::ObjectId,
) -> lopdf::ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    })
}

fn finish_document(doc: &mut Document, pages_id: lopdf::ObjectId, kids: Vec<lopdf::ObjectId>) {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
}
