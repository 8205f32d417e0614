//! Extraction Benchmarks
//!
//! Run with: `cargo bench --bench extraction`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::{Cursor, Write};
use std::time::Duration;

use book_processor::{markup, Extractor, Format};
use zip::{write::SimpleFileOptions, ZipWriter};

const CHAPTERS: usize = 12;
const PAGES: usize = 60;

fn zip_entries(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in entries {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

fn chapter_html(n: usize) -> String {
    let paragraphs: String = (0..40)
        .map(|i| format!("<p>Paragraph {} of chapter {} &amp; some <em>emphasis</em>.</p>\n", i, n))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter {}</title><style>p {{ margin: 0 }}</style></head>
<body>
<h1>Chapter {}</h1>
{}</body>
</html>"#,
        n, n, paragraphs
    )
}

/// EPUB with several chapters, a stylesheet and a cover
fn create_epub() -> Vec<u8> {
    let manifest: String = (1..=CHAPTERS)
        .map(|n| format!(r#"<item id="c{n}" href="text/c{n}.xhtml" media-type="application/xhtml+xml"/>"#))
        .collect();
    let spine: String = (1..=CHAPTERS).map(|n| format!(r#"<itemref idref="c{n}"/>"#)).collect();
    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Benchmark EPUB</dc:title>
    <dc:creator>Bench Author</dc:creator>
    <meta name="cover" content="cover"/>
  </metadata>
  <manifest>
    <item id="css" href="style.css" media-type="text/css"/>
    <item id="cover" href="images/cover.jpg" media-type="image/jpeg"/>
    {}
  </manifest>
  <spine>{}</spine>
</package>"#,
        manifest, spine
    );

    let mut entries = vec![
        ("mimetype".to_string(), b"application/epub+zip".to_vec()),
        (
            "META-INF/container.xml".to_string(),
            br#"<container><rootfiles><rootfile full-path="OEBPS/content.opf"/></rootfiles></container>"#.to_vec(),
        ),
        ("OEBPS/content.opf".to_string(), opf.into_bytes()),
        (
            "OEBPS/style.css".to_string(),
            b"body { font-family: 'Literata', serif; font-size: 12pt; }".to_vec(),
        ),
        ("OEBPS/images/cover.jpg".to_string(), vec![0xFF; 4096]),
    ];
    entries.extend((1..=CHAPTERS).map(|n| (format!("OEBPS/text/c{}.xhtml", n), chapter_html(n).into_bytes())));
    zip_entries(&entries)
}

fn create_cbz() -> Vec<u8> {
    let entries: Vec<_> = (1..=PAGES)
        .map(|n| (format!("pages/{:03}.jpg", n), vec![0xAB; 8192]))
        .collect();
    zip_entries(&entries)
}

fn bench_epub_extraction(c: &mut Criterion) {
    let epub_data = create_epub();
    let epub_size = epub_data.len();
    let extractor = Extractor::default();

    let mut group = c.benchmark_group("epub_extraction");
    group.throughput(Throughput::Bytes(epub_size as u64));
    group.measurement_time(Duration::from_secs(10));

    group.bench_with_input(BenchmarkId::new("content", epub_size), &epub_data, |b, data| {
        b.iter(|| black_box(extractor.extract_content_from_bytes(black_box(data.clone()), &Format::Epub)))
    });

    group.bench_with_input(BenchmarkId::new("metadata", epub_size), &epub_data, |b, data| {
        b.iter(|| black_box(extractor.extract_metadata_from_bytes(black_box(data.clone()), "bench.epub")))
    });

    group.finish();
}

fn bench_cbz_extraction(c: &mut Criterion) {
    let cbz_data = create_cbz();
    let cbz_size = cbz_data.len();
    let extractor = Extractor::default();

    let mut group = c.benchmark_group("cbz_extraction");
    group.throughput(Throughput::Bytes(cbz_size as u64));

    group.bench_with_input(BenchmarkId::new("content", PAGES), &cbz_data, |b, data| {
        b.iter(|| black_box(extractor.extract_content_from_bytes(black_box(data.clone()), &Format::Cbz)))
    });

    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let html = chapter_html(1);

    let mut group = c.benchmark_group("segmentation");
    group.throughput(Throughput::Bytes(html.len() as u64));

    group.bench_function("parse_chapter", |b| {
        b.iter(|| black_box(markup::parse_chapter(black_box(&html), 200)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_epub_extraction,
    bench_cbz_extraction,
    bench_segmentation
);
criterion_main!(benches);
