mod common;

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use minifyd::transform::SourceFamily;
use minifyd::watch::{Classification, IgnoreReason, classify};

#[test]
fn artifacts_are_ignored_before_anything_else() {
    common::init_tracing();

    // The .min.js suffix wins even though the extension is a source family.
    assert_eq!(
        classify(Path::new("/srv/app/bundle.min.js")),
        Classification::Ignored(IgnoreReason::ArtifactSuffix)
    );
    assert_eq!(
        classify(Path::new("theme.min.css")),
        Classification::Ignored(IgnoreReason::ArtifactSuffix)
    );
}

#[test]
fn hidden_and_vendor_directories_are_ignored() {
    for path in [
        "/srv/app/node_modules/pkg/index.js",
        "/srv/app/lib/vendor.ts",
        "/srv/app/assets/style.less",
        "/srv/app/cometchat/chat.js",
        "/srv/app/.git/hooks/pre-commit.js",
        "/srv/app/.hidden.js",
    ] {
        assert_eq!(
            classify(Path::new(path)),
            Classification::Ignored(IgnoreReason::IgnoredDirectory),
            "expected {path} to be ignored"
        );
    }

    // Only exact segment matches count; substrings do not.
    assert_eq!(
        classify(Path::new("/srv/app/library/main.js")),
        Classification::Source(SourceFamily::JavaScript)
    );
}

#[test]
fn extensions_pick_the_source_family() {
    let cases = [
        ("main.js", SourceFamily::JavaScript),
        ("main.ts", SourceFamily::TypeScript),
        ("style.less", SourceFamily::Less),
        ("style.scss", SourceFamily::Sass),
        ("style.sass", SourceFamily::Sass),
        ("style.styl", SourceFamily::Stylus),
    ];
    for (name, family) in cases {
        assert_eq!(classify(Path::new(name)), Classification::Source(family));
    }
}

#[test]
fn unknown_extensions_are_unsupported() {
    for name in ["readme.md", "photo.png", "style.css", "Makefile"] {
        assert_eq!(
            classify(Path::new(name)),
            Classification::Ignored(IgnoreReason::UnsupportedExtension),
            "expected {name} to be unsupported"
        );
    }
}

#[test]
fn artifact_paths_sit_next_to_the_source() {
    let js = SourceFamily::JavaScript.output_path(Path::new("/srv/app/main.js"));
    assert_eq!(js, PathBuf::from("/srv/app/main.min.js"));

    let ts = SourceFamily::TypeScript.output_path(Path::new("mod.ts"));
    assert_eq!(ts, PathBuf::from("mod.min.js"));

    let less = SourceFamily::Less.output_path(Path::new("/srv/theme.less"));
    assert_eq!(less, PathBuf::from("/srv/theme.css"));
}

fn any_family() -> impl Strategy<Value = SourceFamily> {
    prop_oneof![
        Just(SourceFamily::JavaScript),
        Just(SourceFamily::TypeScript),
        Just(SourceFamily::Less),
        Just(SourceFamily::Sass),
        Just(SourceFamily::Stylus),
    ]
}

proptest! {
    // The loop-prevention property: no transform output ever classifies as
    // a source again, no matter the stem or directory.
    #[test]
    fn transform_outputs_never_retrigger(
        stem in "[a-zA-Z][a-zA-Z0-9_-]{0,20}",
        dir in "[a-z][a-z0-9_-]{0,10}",
        family in any_family(),
    ) {
        let source = PathBuf::from(&dir).join(format!("{stem}.js"));
        let output = family.output_path(&source);
        prop_assert!(
            classify(&output).is_ignored(),
            "artifact {:?} classified as a source",
            output
        );
    }
}
