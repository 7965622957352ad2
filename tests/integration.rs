//! End-to-end coverage over a small hand-built multi-page document:
//! catalog/page-tree resolution, MediaBox inheritance, annotation text,
//! inline images, and the text-extraction/canvas-reset behavior of
//! [`Viewer`].

use pdf::document::Document;
use pdf::object::{Object, Reference, Resolve};
use pdf::Viewer;

/// Three pages under one `Pages` node:
///   1. plain text content, no inherited-override MediaBox
///   2. an annotation with `Subj`/`Contents`
///   3. its own `MediaBox` override plus one inline image
fn push_obj(buf: &mut Vec<u8>, offsets: &mut Vec<usize>, num: usize, body: &[u8]) {
    offsets[num] = buf.len();
    buf.extend_from_slice(format!("{num} 0 obj\n").as_bytes());
    buf.extend_from_slice(body);
    buf.extend_from_slice(b"\nendobj\n");
}

fn push_stream(buf: &mut Vec<u8>, offsets: &mut Vec<usize>, num: usize, dict: &str, content: &[u8]) {
    offsets[num] = buf.len();
    buf.extend_from_slice(format!("{num} 0 obj\n<< {dict} /Length {} >>\nstream\n", content.len()).as_bytes());
    buf.extend_from_slice(content);
    buf.extend_from_slice(b"\nendstream\nendobj\n");
}

fn fixture_pdf() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.6\n");
    let mut offsets = vec![0usize; 10]; // index by object number, 1-based used

    push_obj(&mut buf, &mut offsets, 1, b"<< /Type /Catalog /Pages 2 0 R >>");
    push_obj(
        &mut buf,
        &mut offsets,
        2,
        b"<< /Type /Pages /Kids [3 0 R 4 0 R 5 0 R] /Count 3 /MediaBox [0 0 612 792] >>",
    );
    push_obj(
        &mut buf,
        &mut offsets,
        3,
        b"<< /Type /Page /Parent 2 0 R /Contents 6 0 R /Resources << /Font << >> >> >>",
    );
    push_obj(
        &mut buf,
        &mut offsets,
        4,
        b"<< /Type /Page /Parent 2 0 R /Contents 7 0 R /Annots [8 0 R] >>",
    );
    push_obj(
        &mut buf,
        &mut offsets,
        5,
        b"<< /Type /Page /Parent 2 0 R /Contents 9 0 R /MediaBox [0 0 300 300] >>",
    );

    push_stream(&mut buf, &mut offsets, 6, "", b"BT\n0 0 0 rg\n(Hi) Tj\nET");
    push_stream(&mut buf, &mut offsets, 7, "", b"BT\n(Yo) Tj\nET");

    push_obj(
        &mut buf,
        &mut offsets,
        8,
        b"<< /Type /Annot /Subtype /Text /Rect [10 10 20 20] /Contents (A note) /Subj (Text Box) >>",
    );

    push_stream(
        &mut buf,
        &mut offsets,
        9,
        "",
        b"q\nBI /Width 2 /Height 1 /BitsPerComponent 8 /ColorSpace /DeviceGray /Filter /ASCIIHexDecode ID FFFF00\nEI\nQ",
    );

    let xref_offset = buf.len();
    buf.extend_from_slice(b"xref\n0 10\n");
    buf.extend_from_slice(b"0000000000 65535 f \n");
    for off in &offsets[1..] {
        buf.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    buf.extend_from_slice(b"trailer\n<< /Size 10 /Root 1 0 R >>\n");
    buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());
    buf
}

#[test]
fn header_version_is_read() {
    let doc = Document::from_bytes(fixture_pdf()).unwrap();
    assert_eq!(doc.header.version, "1.6");
}

#[test]
fn catalog_points_at_the_page_tree_root() {
    let mut doc = Document::from_bytes(fixture_pdf()).unwrap();
    let catalog = doc.root().unwrap();
    assert_eq!(catalog.pages, Reference::new(2, 0));
}

#[test]
fn page_count_and_tree_shape() {
    let mut doc = Document::from_bytes(fixture_pdf()).unwrap();
    let pages = doc.pages().unwrap();
    assert_eq!(pages.len(), 3);

    let parent_ref = pages[0].parent.unwrap();
    let parent_dict = doc.assert_dict(Object::Reference(parent_ref)).unwrap();
    let parent = pdf::catalog::Pages::load(&parent_dict, &mut doc).unwrap();
    assert_eq!(parent.count, 3);
    assert_eq!(parent.kids.len(), 3);
}

#[test]
fn media_box_inherits_unless_overridden() {
    let mut doc = Document::from_bytes(fixture_pdf()).unwrap();
    let pages = doc.pages().unwrap();
    assert_eq!(pages[0].media_box, [0.0, 0.0, 612.0, 792.0]);
    assert_eq!(pages[1].media_box, [0.0, 0.0, 612.0, 792.0]);
    assert_eq!(pages[2].media_box, [0.0, 0.0, 300.0, 300.0]);
}

#[test]
fn annotation_subj_and_contents_are_resolved() {
    let mut doc = Document::from_bytes(fixture_pdf()).unwrap();
    let pages = doc.pages().unwrap();
    let annot = &pages[1].annots[0];
    assert_eq!(annot.subj.as_deref(), Some("Text Box"));
    assert_eq!(annot.contents.as_deref(), Some("A note"));
}

#[test]
fn text_extraction_and_content_reproduction() {
    let doc = Document::from_bytes(fixture_pdf()).unwrap();
    let mut viewer = Viewer::new(doc).unwrap();
    viewer.navigate(1).unwrap().render().unwrap();
    assert_eq!(viewer.canvas.strings, vec!["Hi".to_string()]);
    assert_eq!(viewer.canvas.text_content, "BT\n0 0 0 rg\nHi Tj\nET");
}

#[test]
fn inline_image_is_captured_and_canvas_resets_between_pages() {
    let doc = Document::from_bytes(fixture_pdf()).unwrap();
    let mut viewer = Viewer::new(doc).unwrap();

    viewer.navigate(3).unwrap().render().unwrap();
    assert_eq!(viewer.canvas.inline_images.len(), 1);
    let image = &viewer.canvas.inline_images[0];
    assert_eq!(image.width, 2);
    assert_eq!(image.height, 1);
    assert_eq!(image.filter.as_deref(), Some("ASCIIHexDecode"));
    assert_eq!(image.data, vec![0xFF, 0xFF, 0x00]);

    viewer.prev().unwrap().render().unwrap();
    assert!(viewer.canvas.inline_images.is_empty());
    assert_eq!(viewer.canvas.strings, vec!["Yo".to_string()]);
}

#[test]
fn missing_object_is_tolerated_with_a_warning() {
    let mut doc = Document::from_bytes(fixture_pdf()).unwrap();
    let obj = doc.resolve(Object::Reference(Reference::new(999, 0))).unwrap();
    assert!(obj.is_null());
    assert!(!doc.warnings.is_empty());
}
