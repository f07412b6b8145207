//! Out-of-order and failed model fetches

use super::*;
use crate::foundation::collections::GenerationTag;

#[test]
fn test_late_response_for_superseded_model_is_discarded() {
    let mut harness = Harness::new();
    harness.configurator.start();
    harness.send(r#"{"type":"changeModel","modelType":"loving"}"#);
    assert_eq!(harness.loader.pending_models(), 2);

    harness.deliver_model("loving", heart_hierarchy());
    assert_eq!(harness.configurator.mounted_model(), Some("loving"));
    let frames = harness.frames().len();

    harness.deliver_model("minimal", ring_hierarchy());
    assert_eq!(harness.configurator.mounted_model(), Some("loving"));
    assert_eq!(harness.frames().len(), frames);
    assert!(matches!(
        harness.errors.borrow().as_slice(),
        [ConfiguratorError::StaleResponse {
            tag: GenerationTag(1),
            current: GenerationTag(2)
        }]
    ));
}

#[test]
fn test_early_response_for_superseded_model_is_discarded() {
    let mut harness = Harness::new();
    harness.configurator.start();
    harness.send(r#"{"type":"changeModel","modelType":"loving"}"#);

    harness.deliver_model("minimal", ring_hierarchy());
    assert_eq!(harness.configurator.mounted_model(), None);
    assert!(harness.configurator.is_model_pending());
    assert!(harness.frames().is_empty());

    harness.deliver_model("loving", heart_hierarchy());
    assert_eq!(harness.configurator.mounted_model(), Some("loving"));
    assert_eq!(harness.last_list().len(), 2);
}

#[test]
fn test_messages_during_fetch_apply_in_order() {
    let mut harness = Harness::new();
    harness.configurator.start();

    harness.send(r#"{"type":"materialChange","material":"925-silver"}"#);
    harness.send(r#"{"type":"diamondChange","diamond":"emerald"}"#);
    harness.send(r#"{"type":"changeEngravingText","text":"A"}"#);
    harness.send(r#"{"type":"changeEngravingText","text":"AB"}"#);
    harness.send(r#"{"type":"materialChange","material":"gold"}"#);

    // nothing mounted, nothing drawn, but every message applied
    assert!(harness.frames().is_empty());
    let snapshot = harness.configurator.snapshot();
    assert_eq!(snapshot.metal_finish, "18k-solid-gold");
    assert_eq!(snapshot.gem_variant, "emerald");
    assert_eq!(snapshot.engraving.text, "AB");
    assert_eq!(snapshot.revision, 5);

    harness.deliver_model("minimal", ring_hierarchy());
    assert_eq!(harness.frames().len(), 1);

    let list = harness.last_list();
    let (expected, active) = harness
        .configurator
        .rasterizer()
        .render(&harness.configurator.snapshot().engraving);
    assert!(active);
    assert_eq!(list.engraving.image(), &expected);
    let band = list.items.iter().find(|i| i.name == "Band").unwrap();
    assert_eq!(band.params.as_metal().unwrap().roughness, 0.05 * 1.5);
}

#[test]
fn test_environment_fetched_once_per_id() {
    let mut harness = Harness::new();
    harness.configurator.start();
    harness.send(r#"{"type":"diamondChange","diamond":"ruby"}"#);
    harness.send(r#"{"type":"diamondChange","diamond":"real-diamond"}"#);
    harness.send(r#"{"type":"diamondChange","diamond":"ruby"}"#);

    let requested = harness.loader.requested();
    let ruby = requested.iter().filter(|url| url.contains("ruby_studio")).count();
    assert_eq!(ruby, 1);
    // studio serves both the scene and real-diamond
    let studio = requested.iter().filter(|url| url.contains("custom5.hdr")).count();
    assert_eq!(studio, 1);
}

#[test]
fn test_failed_fetch_keeps_current_model() {
    let mut harness = Harness::started();
    let frames = harness.frames().len();

    harness.send(r#"{"type":"changeModel","modelType":"special"}"#);
    harness
        .loader
        .resolve_model(&model_url("special"), Err(AssetError::Fetch("HTTP 503".into())));
    harness.configurator.pump();

    assert_eq!(harness.configurator.mounted_model(), Some("minimal"));
    assert!(!harness.configurator.is_model_pending());
    assert_eq!(harness.last_list().len(), 4);
    assert!(harness.frames().len() > frames);
    assert!(matches!(
        harness.errors.borrow().last(),
        Some(ConfiguratorError::Asset(AssetError::Fetch(_)))
    ));

    // the runtime keeps working after the failure
    harness.send(r#"{"type":"materialChange","material":"silver"}"#);
    assert_eq!(harness.configurator.snapshot().metal_finish, "925-silver");
    assert_eq!(harness.configurator.mounted_model(), Some("minimal"));
}

#[test]
fn test_malformed_hierarchy_is_reported() {
    let mut harness = Harness::started();
    harness.send(r#"{"type":"changeModel","modelType":"loving"}"#);
    harness.deliver_model(
        "loving",
        MeshHierarchy::new(vec![MeshNode::group("orphan").with_parent(4)]),
    );

    assert_eq!(harness.configurator.mounted_model(), Some("minimal"));
    assert!(matches!(
        harness.errors.borrow().last(),
        Some(ConfiguratorError::Asset(AssetError::Decode(_)))
    ));
}
