use url::Url;

use libreshockwave::player::net_task::{cache_key_for_url, resolve_candidates, ResourceKind};

fn paths(candidates: &[Url]) -> Vec<String> {
    candidates.iter().map(|u| u.as_str().to_string()).collect()
}

#[test]
fn local_casts_try_uncompressed_extensions_first() {
    let base = Url::parse("file:///games/habbo/").unwrap();
    let candidates = resolve_candidates(Some(&base), "hh_furni", ResourceKind::Cast);
    assert_eq!(
        paths(&candidates),
        vec![
            "file:///games/habbo/hh_furni",
            "file:///games/habbo/hh_furni.cst",
            "file:///games/habbo/hh_furni.cct",
        ]
    );
}

#[test]
fn http_casts_prefer_shockwave_compressed_extensions() {
    let base = Url::parse("http://example.com/movies/").unwrap();
    let candidates = resolve_candidates(Some(&base), "hh_furni", ResourceKind::Cast);
    assert_eq!(
        paths(&candidates),
        vec![
            "http://example.com/movies/hh_furni",
            "http://example.com/movies/hh_furni.cct",
            "http://example.com/movies/hh_furni.cst",
        ]
    );
}

#[test]
fn local_movies_try_dir_then_compressed_variants() {
    let base = Url::parse("file:///games/").unwrap();
    let candidates = resolve_candidates(Some(&base), "intro", ResourceKind::Movie);
    assert_eq!(
        paths(&candidates),
        vec![
            "file:///games/intro",
            "file:///games/intro.dir",
            "file:///games/intro.dcr",
            "file:///games/intro.dxr",
        ]
    );
}

#[test]
fn http_movies_prefer_dcr() {
    let base = Url::parse("https://example.com/").unwrap();
    let candidates = resolve_candidates(Some(&base), "intro.dir", ResourceKind::Movie);
    assert_eq!(
        paths(&candidates),
        vec![
            "https://example.com/intro.dir",
            "https://example.com/intro.dcr",
            // ".dir" itself is already first; the remaining fallback
            "https://example.com/intro.dxr",
        ]
    );
}

#[test]
fn extension_replacement_only_touches_the_file_name() {
    let base = Url::parse("http://cdn.example.com/v1.2/assets/").unwrap();
    let candidates = resolve_candidates(Some(&base), "pack", ResourceKind::Cast);
    assert_eq!(
        paths(&candidates)[1],
        "http://cdn.example.com/v1.2/assets/pack.cct"
    );
}

#[test]
fn absolute_urls_bypass_the_base() {
    let base = Url::parse("file:///local/").unwrap();
    let candidates = resolve_candidates(
        Some(&base),
        "http://example.com/thing.txt",
        ResourceKind::Generic,
    );
    assert_eq!(paths(&candidates), vec!["http://example.com/thing.txt"]);
}

#[test]
fn backslash_paths_are_normalized() {
    let base = Url::parse("file:///games/").unwrap();
    let candidates = resolve_candidates(Some(&base), r"sub\movie.dcr", ResourceKind::Movie);
    assert!(paths(&candidates)[0].ends_with("sub/movie.dcr"));
}

#[test]
fn cache_keys_are_the_lowercased_file_name() {
    assert_eq!(cache_key_for_url("http://x.com/a/B.CCT"), "b.cct");
    assert_eq!(cache_key_for_url(r"dir\Sub\Pack.cst"), "pack.cst");
    assert_eq!(cache_key_for_url("plain"), "plain");
}
