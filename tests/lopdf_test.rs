//! End-to-end tests over PDFs generated with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdf2csv::{
    convert_file, convert_file_with_options, ConvertOptions, EncodingMode, Error, ExtractMode,
    LopdfBackend, PdfBackend, TableConverter,
};

/// Build a PDF with one page per entry, every line in its own text object.
fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
            operations.push(Operation::new(
                "Td",
                vec![50.into(), (750 - 14 * i as i64).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
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

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn listing() -> Vec<u8> {
    build_pdf(&[
        &["Name    Age   City", "Alice Smith    34   New York"],
        &["Bob    29    Boston"],
    ])
}

fn read_records(bytes: &[u8]) -> Vec<Vec<String>> {
    let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body)
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_backend_pages() {
    let backend = LopdfBackend::load_bytes(&listing()).unwrap();
    assert_eq!(backend.page_count(), 2);
    assert!(backend.page(1).is_some());
    assert!(backend.page(3).is_none());
    assert!(backend.page(0).is_none());

    let text = backend.page_text(&backend.page(1).unwrap()).unwrap();
    assert!(text.contains("Name    Age   City"));
}

#[test]
fn test_convert_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("listing.pdf");
    let output = dir.path().join("listing.csv");
    std::fs::write(&input, listing()).unwrap();

    let report = convert_file(&input, &output).unwrap();
    assert_eq!(report.page_count, 2);
    assert_eq!(report.null_pages, 0);
    assert_eq!(report.output.as_deref(), Some(output.as_path()));

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
    assert_eq!(report.bytes_written, bytes.len() as u64);

    let records = read_records(&bytes);
    assert!(records.contains(&vec!["Name".into(), "Age".into(), "City".into()]));
    assert!(records.contains(&vec![
        "Alice Smith".into(),
        "34".into(),
        "New York".into()
    ]));
    assert!(records.contains(&vec!["Bob".into(), "29".into(), "Boston".into()]));
}

#[test]
fn test_text_items_mode_end_to_end() {
    let backend = LopdfBackend::load_bytes(&listing()).unwrap();
    let options = ConvertOptions::new().with_extract_mode(ExtractMode::TextItems);

    let mut out = Vec::new();
    let report = TableConverter::new(options)
        .unwrap()
        .convert(&backend, &mut out)
        .unwrap();

    assert_eq!(report.row_count, 3);
    assert_eq!(
        read_records(&out),
        vec![
            vec!["Name", "Age", "City"],
            vec!["Alice Smith", "34", "New York"],
            vec!["Bob", "29", "Boston"],
        ]
    );
}

#[test]
fn test_shift_jis_file_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("listing.pdf");
    let output = dir.path().join("listing.csv");
    std::fs::write(&input, listing()).unwrap();

    let options = ConvertOptions::new().with_encoding(EncodingMode::ShiftJis);
    convert_file_with_options(&input, &output, options).unwrap();

    let bytes = std::fs::read(&output).unwrap();
    assert_ne!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
    assert!(read_records(&bytes).contains(&vec!["Bob".into(), "29".into(), "Boston".into()]));
}

#[test]
fn test_not_a_pdf_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.pdf");
    let output = dir.path().join("notes.csv");
    std::fs::write(&input, "just some text\n").unwrap();

    let err = convert_file(&input, &output).unwrap_err();
    assert!(matches!(err, Error::OpenFailed { .. }));
    assert!(err.to_string().contains("notes.pdf"));
    assert!(!output.exists());
}

#[test]
fn test_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("listing.pdf");
    std::fs::write(&input, listing()).unwrap();

    let output = dir.path().join("no-such-dir").join("out.csv");
    let err = convert_file(&input, &output).unwrap_err();
    assert!(matches!(err, Error::OutputCreate { .. }));
    assert_eq!(err.stage(), "write");
}
