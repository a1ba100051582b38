mod common;

use common::{source_doc, FakeEngine};
use pdf_page_cache::cache;
use pdf_page_cache::engine::Engine;
use pdf_page_cache::render::{Dimensions, Renderer, Resolution};

#[test]
fn second_render_is_a_cache_hit() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = source_doc(tmp.path(), "doc.pdf");
    let engine = FakeEngine::with_pages(3);
    let doc = engine.open(&pdf).unwrap();
    let dir = cache::resolve(&pdf).unwrap();
    let renderer = Renderer::new(150);

    let first = renderer.render(&doc, 0, &dir, Resolution::Dpi(150)).unwrap();
    assert!(!first.cached);
    let written_at = std::fs::metadata(&first.path).unwrap().modified().unwrap();
    let bytes = std::fs::read(&first.path).unwrap();

    let second = renderer.render(&doc, 0, &dir, Resolution::Dpi(150)).unwrap();
    assert!(second.cached);
    assert_eq!(first.path, second.path);
    assert_eq!(engine.counters.rasterized(), 1);
    assert_eq!(std::fs::read(&second.path).unwrap(), bytes);
    assert_eq!(
        std::fs::metadata(&second.path).unwrap().modified().unwrap(),
        written_at
    );
}

#[test]
fn cache_hit_reports_real_dimensions() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = source_doc(tmp.path(), "doc.pdf");
    let engine = FakeEngine::with_pages(1);
    let doc = engine.open(&pdf).unwrap();
    let dir = cache::resolve(&pdf).unwrap();
    let renderer = Renderer::new(150);

    let fresh = renderer.render(&doc, 0, &dir, Resolution::Dpi(144)).unwrap();
    let hit = renderer.render(&doc, 0, &dir, Resolution::Dpi(144)).unwrap();
    assert_eq!(
        fresh.dimensions,
        Some(Dimensions {
            width: 20,
            height: 28
        })
    );
    assert_eq!(hit.dimensions, fresh.dimensions);
}

#[test]
fn unreadable_artifact_is_served_with_unknown_dimensions() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = source_doc(tmp.path(), "doc.pdf");
    let engine = FakeEngine::with_pages(1);
    let doc = engine.open(&pdf).unwrap();
    let dir = cache::resolve(&pdf).unwrap();
    std::fs::write(dir.join("page_001.png"), b"not a png").unwrap();

    let hit = Renderer::new(150)
        .render(&doc, 0, &dir, Resolution::Default)
        .unwrap();
    assert!(hit.cached);
    assert_eq!(hit.dimensions, None);
    assert_eq!(engine.counters.rasterized(), 0);
    assert_eq!(std::fs::read(&hit.path).unwrap(), b"not a png");
}

#[test]
fn each_resolution_gets_its_own_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = source_doc(tmp.path(), "doc.pdf");
    let engine = FakeEngine::with_pages(2);
    let doc = engine.open(&pdf).unwrap();
    let dir = cache::resolve(&pdf).unwrap();
    let renderer = Renderer::new(150);

    let low = renderer.render(&doc, 1, &dir, Resolution::Dpi(150)).unwrap();
    let high = renderer.render(&doc, 1, &dir, Resolution::Dpi(300)).unwrap();
    let default = renderer.render(&doc, 1, &dir, Resolution::Default).unwrap();

    assert!(low.path.ends_with("page_002_150dpi.png"));
    assert!(high.path.ends_with("page_002_300dpi.png"));
    assert!(default.path.ends_with("page_002.png"));
    assert_eq!(default.dpi, 150);
    assert_eq!(engine.counters.rasterized(), 3);

    let low_dims = image::image_dimensions(&low.path).unwrap();
    let high_dims = image::image_dimensions(&high.path).unwrap();
    assert!(high_dims.0 > low_dims.0);
}

#[test]
fn failed_rasterize_leaves_no_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = source_doc(tmp.path(), "doc.pdf");
    let mut engine = FakeEngine::with_pages(2);
    engine.fail_rasterize = Some(0);
    let doc = engine.open(&pdf).unwrap();
    let dir = cache::resolve(&pdf).unwrap();

    assert!(Renderer::new(150)
        .render(&doc, 0, &dir, Resolution::Default)
        .is_err());
    assert!(!dir.join("page_001.png").exists());
}
