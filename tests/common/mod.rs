//! Helpers shared by the integration tests.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

fn media_box(width: i64) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(792),
    ])
}

fn add_page_content(doc: &mut Document, label: &str) -> ObjectId {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
            ),
            Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
            Operation::new(
                "Tj",
                vec![Object::String(
                    label.as_bytes().to_vec(),
                    lopdf::StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()))
}

fn finish(mut doc: Document, pages_id: ObjectId, kids: Vec<Object>, count: usize) -> Vec<u8> {
    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(count as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A flat PDF whose page `i` (1-based) has a MediaBox width of
/// `tag * 1000 + i`, so page order survives any rewrite and can be read
/// back with [`page_markers`].
pub fn create_test_pdf(num_pages: u32, tag: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 1..=num_pages {
        let content_id = add_page_content(&mut doc, &format!("Page {}", i));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", media_box(tag * 1000 + i as i64)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    finish(doc, pages_id, kids, num_pages as usize)
}

/// A PDF with pages grouped under intermediate `/Pages` nodes that carry
/// the MediaBox, so pages only inherit it. Group `g` (0-based) gives its
/// pages a width of `500 + g`.
pub fn create_nested_pdf(groups: &[u32]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();

    let mut root_kids = Vec::new();
    let mut total = 0;
    for (g, &size) in groups.iter().enumerate() {
        let node_id = doc.new_object_id();
        let mut kids = Vec::new();
        for i in 0..size {
            let content_id = add_page_content(&mut doc, &format!("Group {} page {}", g, i));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(node_id)),
                ("Contents", Object::Reference(content_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }
        let node = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Parent", Object::Reference(root_id)),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(size as i64)),
            ("MediaBox", media_box(500 + g as i64)),
        ]);
        doc.objects.insert(node_id, Object::Dictionary(node));
        root_kids.push(Object::Reference(node_id));
        total += size as usize;
    }

    finish(doc, root_id, root_kids, total)
}

/// MediaBox width of every page, in page order. Inherited boxes are
/// looked up through the page tree.
pub fn page_markers(pdf: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let mut node = doc.get_dictionary(page_id).unwrap();
            loop {
                if let Ok(mb) = node.get(b"MediaBox") {
                    return mb.as_array().unwrap()[2].as_i64().unwrap();
                }
                let parent = node.get(b"Parent").unwrap().as_reference().unwrap();
                node = doc.get_dictionary(parent).unwrap();
            }
        })
        .collect()
}

/// Markers [`create_test_pdf`] gives to pages `first..=last`.
pub fn markers(tag: i64, first: u32, last: u32) -> Vec<i64> {
    (first..=last).map(|i| tag * 1000 + i as i64).collect()
}
