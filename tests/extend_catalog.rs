use std::sync::{Arc, Mutex};

use synthra::{RegistryChange, TransformDef, TransformKind, TransformRegistry, compile};

fn load_fixture() -> Vec<TransformDef> {
    let s = include_str!("data/extra_transforms.json");
    serde_json::from_str(s).unwrap()
}

#[test]
fn json_catalog_extends_the_registry() {
    let r = TransformRegistry::with_builtins().unwrap();
    r.extend(load_fixture()).unwrap();

    assert_eq!(r.kind_of("scrollX"), Some(TransformKind::Coordinate));
    assert_eq!(r.kind_of("chroma"), Some(TransformKind::Color));

    let p = r
        .start("osc", vec![])
        .unwrap()
        .chain(&r, "scrollX", vec![])
        .unwrap()
        .chain(&r, "chroma", vec![])
        .unwrap()
        .chain(&r, "tint", vec![])
        .unwrap();
    let program = compile(&r, &p).unwrap();

    assert!(program.source.contains("vec2 scrollX(vec2 _st, float scrollX, float speed)"));
    assert!(
        program
            .source
            .contains("chroma(scrollX(osc(st, 60.0, 0.1, 0.0), 0.5, 0.0), 1.0)")
    );
    // vec4 default with three components pads w to 1.0.
    assert!(program.source.contains("tint(") && program.source.contains("vec4(0.2, 0.4, 0.9, 1.0)"));
}

#[test]
fn extension_fires_change_notifications() {
    let r = TransformRegistry::with_builtins().unwrap();
    let seen: Arc<Mutex<Vec<RegistryChange>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    r.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

    r.extend(load_fixture()).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|c| matches!(c, RegistryChange::Added { .. })));
}

#[test]
fn unknown_kind_in_a_catalog_rejects_the_whole_batch() {
    let r = TransformRegistry::new();
    let json = r#"[
        { "name": "ok", "type": "color", "inputs": [], "glsl": "return _c0;" },
        { "name": "bad", "type": "renderpass", "inputs": [], "glsl": "return _c0;" }
    ]"#;
    let defs: Vec<TransformDef> = serde_json::from_str(json).unwrap();
    assert!(r.extend(defs).is_err());
    assert!(r.names().is_empty());
}
