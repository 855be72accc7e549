//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use std::cell::Cell;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use avatarforge_core::{
    batch::MANIFEST_FILENAME,
    color::resolve_colors,
    compute_manifest_hash,
    conflict::remove_excluded,
    generate_batch,
    hashing::sha256_hex,
    pick,
    selection::select_layers,
    BatchRequest, ColorPalette, CompositionEngine, CompositionError, CompositionRequest, Gender,
    GroupId, LayerCatalog, LayerGroup, MemoryAssetStore, Variant,
};

fn group(id: GroupId, z_index: i32, variants: Vec<Variant>) -> LayerGroup {
    LayerGroup {
        id,
        dir: id.as_str().to_string(),
        description: None,
        z_index,
        variants,
    }
}

fn catalog(groups: Vec<LayerGroup>) -> LayerCatalog {
    LayerCatalog {
        version: "1.0.0".to_string(),
        engine_min_version: "1.0.0".to_string(),
        groups,
        background_palettes: vec![],
    }
}

fn two_tone() -> Vec<ColorPalette> {
    vec![
        ColorPalette::new(1, &["#111111"]),
        ColorPalette::new(1, &["#222222"]),
    ]
}

#[test]
fn invariant_weighted_pick_follows_weights() {
    let candidates = vec![ColorPalette::new(9, &["a"]), ColorPalette::new(1, &["b"])];
    let mut rng = StdRng::seed_from_u64(2024);

    let draws = 100_000;
    let heavy = (0..draws)
        .filter(|_| pick(&candidates, &mut rng).and_then(ColorPalette::first_color) == Some("a"))
        .count();

    let ratio = heavy as f64 / draws as f64;
    assert!((ratio - 0.9).abs() < 0.02, "ratio was {}", ratio);
}

#[test]
fn invariant_single_candidate_always_wins() {
    let mut rng = StdRng::seed_from_u64(5);
    for weight in [1, 7, 10_000] {
        let only = vec![ColorPalette::new(weight, &["only"])];
        for _ in 0..100 {
            assert_eq!(pick(&only, &mut rng), Some(&only[0]));
        }
    }
}

#[test]
fn invariant_female_request_never_draws_male_variants() {
    let store = MemoryAssetStore::new()
        .with("hair", "m", "<svg><path id=\"male\"/></svg>")
        .with("hair", "f", "<svg><path id=\"female\"/></svg>")
        .with("hair", "u", "<svg><path id=\"neutral\"/></svg>");
    let engine = CompositionEngine::new(
        catalog(vec![group(
            GroupId::Hair,
            400,
            vec![
                Variant::template("m", 50).gender(Gender::Male),
                Variant::template("f", 1).gender(Gender::Female),
                Variant::template("u", 1),
            ],
        )]),
        Arc::new(store),
    );

    let request = CompositionRequest::new(280, Gender::Female);
    let mut rng = StdRng::seed_from_u64(3);
    let mut saw_neutral = false;
    for _ in 0..2_000 {
        let result = engine.compose_with(&request, &mut rng, None).unwrap();
        assert!(!result.document.contains(r#"id="male""#));
        saw_neutral |= result.document.contains(r#"id="neutral""#);
    }
    assert!(saw_neutral, "unspecified variants must stay eligible");
}

#[test]
fn invariant_excluded_group_never_rendered() {
    let store = MemoryAssetStore::new()
        .with("hair", "long", "<svg><path id=\"long\"/></svg>")
        .with("hair", "short", "<svg><path id=\"short\"/></svg>")
        .with("facialHair", "beard", "<svg><path id=\"beard\"/></svg>");
    let engine = CompositionEngine::new(
        catalog(vec![
            group(GroupId::FacialHair, 201, vec![Variant::template("beard", 1_000)]),
            group(
                GroupId::Hair,
                400,
                vec![
                    Variant::template("long", 1).excludes(&[GroupId::FacialHair]),
                    Variant::template("short", 1),
                ],
            ),
        ]),
        Arc::new(store),
    );

    let mut rng = StdRng::seed_from_u64(11);
    let mut excluded_trials = 0;
    for _ in 0..1_000 {
        let doc = engine
            .compose_with(&CompositionRequest::default(), &mut rng, None)
            .unwrap()
            .document;
        if doc.contains(r#"id="long""#) {
            excluded_trials += 1;
            assert!(!doc.contains("avatar-facialHair"));
        } else {
            assert!(doc.contains("avatar-facialHair"));
        }
    }
    assert!(excluded_trials > 0);
}

#[test]
fn invariant_follower_copies_source_colors() {
    let store = MemoryAssetStore::new()
        .with("base", "1", "<svg/>")
        .with("ear", "1", "<svg/>");
    let catalog = catalog(vec![
        group(
            GroupId::Base,
            100,
            vec![Variant::template("1", 1).palettes(vec![
                ColorPalette::new(1, &["#F9C9B6", "#AC6651"]),
                ColorPalette::new(1, &["#9A5B41", "#5A2E1F"]),
            ])],
        ),
        group(
            GroupId::Ear,
            500,
            vec![Variant::template("1", 1)
                .palettes(two_tone())
                .follows(GroupId::Base)],
        ),
    ]);

    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..500 {
        let mut layers = remove_excluded(select_layers(&catalog, Gender::Unspecified, &store, &mut rng));
        resolve_colors(&mut layers, &mut rng);

        let base = layers.iter().find(|l| l.group_id() == GroupId::Base).unwrap();
        let ear = layers.iter().find(|l| l.group_id() == GroupId::Ear).unwrap();
        assert!(base.colors.is_some());
        assert_eq!(ear.colors, base.colors);
    }
}

#[test]
fn invariant_differs_from_makes_collisions_rare() {
    let store = MemoryAssetStore::new()
        .with("background", "bg", "<svg/>")
        .with("hair", "1", "<svg/>");
    let catalog = catalog(vec![
        group(GroupId::Background, 0, vec![Variant::template("bg", 1).palettes(two_tone())]),
        group(
            GroupId::Hair,
            400,
            vec![Variant::template("1", 1)
                .palettes(two_tone())
                .differs_from(&[GroupId::Background])],
        ),
    ]);

    let trials = 2_000;
    let mut rng = StdRng::seed_from_u64(21);
    let collisions = (0..trials)
        .filter(|_| {
            let mut layers = select_layers(&catalog, Gender::Unspecified, &store, &mut rng);
            resolve_colors(&mut layers, &mut rng);
            layers[0].first_color() == layers[1].first_color()
        })
        .count();

    assert!((collisions as f64 / trials as f64) < 0.01, "{} collisions", collisions);
}

#[test]
fn invariant_one_group_per_layer_plus_one_fill() {
    let store = MemoryAssetStore::new()
        .with("base", "1", "<svg><circle/></svg>")
        .with("eyes", "1", "<svg><ellipse/></svg>")
        .with("mouth", "1", "<svg><path/></svg>");
    let engine = CompositionEngine::new(
        catalog(vec![
            group(GroupId::Base, 100, vec![Variant::template("1", 1)]),
            group(GroupId::Eyes, 200, vec![Variant::template("1", 1)]),
            group(GroupId::Mouth, 202, vec![Variant::template("1", 1), Variant::empty(1)]),
        ]),
        Arc::new(store),
    );

    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let doc = engine
            .compose_with(&CompositionRequest::default(), &mut rng, None)
            .unwrap()
            .document;
        let layers = if doc.contains("avatar-mouth") { 3 } else { 2 };

        assert!(doc.starts_with("<svg "));
        assert_eq!(doc.matches("<svg").count(), 1);
        assert!(doc.ends_with("</svg>"));
        assert_eq!(doc.matches("<g ").count(), layers);
        assert_eq!(doc.matches("<rect").count(), 1);
        assert!(doc.find("<rect").unwrap() < doc.find("<g ").unwrap());
    }
}

#[test]
fn invariant_background_fill_precedes_base_content() {
    let store = MemoryAssetStore::new()
        .with("background", "bg", "<svg viewBox=\"0 0 380 380\">\n\t<path d=\"M0 0\"/>\n</svg>")
        .with("base", "1", "<?xml version=\"1.0\"?><svg><circle r=\"10\"/></svg>");
    let engine = CompositionEngine::new(
        catalog(vec![
            group(
                GroupId::Background,
                0,
                vec![Variant::template("bg", 1).palettes(vec![ColorPalette::new(1, &["#112233"])])],
            ),
            group(GroupId::Base, 100, vec![Variant::template("1", 1)]),
        ]),
        Arc::new(store),
    );

    let result = engine
        .compose_with(
            &CompositionRequest::new(280, Gender::Unspecified),
            &mut StdRng::seed_from_u64(0),
            None,
        )
        .unwrap();

    assert_eq!(
        result.document,
        concat!(
            r#"<svg width="280" height="280" viewBox="0 0 380 380" fill="none" xmlns="http://www.w3.org/2000/svg">"#,
            r##"<rect width="100%" height="100%" fill="#112233"/>"##,
            r#"<g id="avatar-background"><path d="M0 0"/></g>"#,
            r#"<g id="avatar-base"><circle r="10"/></g>"#,
            "</svg>"
        )
    );
    assert!(!result.celebration_triggered);
}

#[test]
fn invariant_celebration_hook_fires_once_per_trigger() {
    let store = MemoryAssetStore::new().with("headwear", "cowHorn", "<svg><path id=\"horn\"/></svg>");
    let engine = CompositionEngine::new(
        catalog(vec![group(
            GroupId::Headwear,
            450,
            vec![Variant::empty(30), Variant::template("cowHorn", 2).celebrating()],
        )]),
        Arc::new(store),
    );

    let fired = Cell::new(0u32);
    let hook = || fired.set(fired.get() + 1);
    let hook: &dyn Fn() = &hook;
    let request = CompositionRequest::default();
    let mut rng = StdRng::seed_from_u64(32);

    let trials = 10_000;
    let mut triggered = 0u32;
    for _ in 0..trials {
        let before = fired.get();
        let result = engine.compose_with(&request, &mut rng, Some(hook)).unwrap();
        let calls = fired.get() - before;
        if result.celebration_triggered {
            triggered += 1;
            assert_eq!(calls, 1);
            assert!(result.document.contains(r#"id="horn""#));
        } else {
            assert_eq!(calls, 0);
        }
    }

    let ratio = triggered as f64 / trials as f64;
    assert!((ratio - 2.0 / 32.0).abs() < 0.015, "ratio was {}", ratio);
    assert_eq!(fired.get(), triggered);
}

#[test]
fn invariant_missing_templates_never_fail() {
    let engine = CompositionEngine::with_builtin(Arc::new(MemoryAssetStore::new()));
    let result = engine.compose(&CompositionRequest::new(64, Gender::Male)).unwrap();
    assert!(result.document.starts_with(r#"<svg width="64" height="64""#));
    assert_eq!(result.document.matches("<rect").count(), 1);
}

#[test]
fn invariant_non_positive_size_rejected() {
    let engine = CompositionEngine::with_builtin(Arc::new(MemoryAssetStore::new()));
    let err = engine
        .compose(&CompositionRequest::new(0, Gender::Unspecified))
        .unwrap_err();
    assert!(matches!(err, CompositionError::InvalidRequest(_)));
    assert!(err.to_string().contains("Invalid request"));
}

#[test]
fn invariant_written_manifest_verifies() {
    let store = MemoryAssetStore::new()
        .with("base", "1", "<svg><circle fill=\"{{color[0]}}\"/></svg>")
        .with("headwear", "cowHorn", "<svg><path/></svg>");
    let engine = CompositionEngine::new(
        catalog(vec![
            group(
                GroupId::Base,
                100,
                vec![Variant::template("1", 1).palettes(two_tone())],
            ),
            group(
                GroupId::Headwear,
                450,
                vec![Variant::empty(30), Variant::template("cowHorn", 2).celebrating()],
            ),
        ]),
        Arc::new(store),
    );
    let request = BatchRequest {
        amount: 4,
        request: CompositionRequest::new(96, Gender::Unspecified),
        seed: Some(404),
    };

    let batch = generate_batch(&engine, &request, None).unwrap();
    let dir = tempfile::tempdir().unwrap();
    batch.write_to_dir(dir.path()).unwrap();

    let written = std::fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
    let mut manifest: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(compute_manifest_hash(&manifest).unwrap(), batch.manifest_hash);

    for item in manifest["items"].as_array().unwrap() {
        let filename = item["filename"].as_str().unwrap();
        let document = std::fs::read_to_string(dir.path().join(filename)).unwrap();
        assert_eq!(item["sha256"], sha256_hex(document.as_bytes()));
    }

    // Any edit to the recorded items breaks verification
    manifest["items"][0]["celebrationTriggered"] = serde_json::Value::Bool(true);
    manifest["items"][0]["sha256"] = serde_json::Value::String(sha256_hex(b"tampered"));
    assert_ne!(compute_manifest_hash(&manifest).unwrap(), batch.manifest_hash);
}
