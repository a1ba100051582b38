use pdf_page_cache::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../pdf-page-cache.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.render.default_dpi, 150);
    assert_eq!(cfg.preview.max_pages, 10);
    assert_eq!(cfg.cache.max_listed_files, 20);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[render]\ndefault_dpi = 200\nmax_dpi = 600\n").unwrap();
    assert_eq!(cfg.render.default_dpi, 200);
    assert_eq!(cfg.preview.snippet_chars, 50);
    assert!(cfg.security.reject_url_inputs);
}
