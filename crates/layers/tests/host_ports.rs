use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::Vec2;
use layers::{
    EventPort, LayerId, MeshBuffers, MeshKey, OverlayLayer, PointerEvent, PointerEventKind,
    RenderBackend, ShaderParams, WellboreLayer,
};
use pretty_assertions::assert_eq;
use runtime::FrameBudget;
use wellbores::{SourceData, WellboreConfig};

#[derive(Default)]
struct RecordingPort {
    registered: Vec<PointerEventKind>,
    unregistered: bool,
}

impl EventPort for RecordingPort {
    fn register(&mut self, kinds: &[PointerEventKind]) {
        self.registered.extend_from_slice(kinds);
    }

    fn unregister(&mut self) {
        self.unregistered = true;
    }
}

#[derive(Default)]
struct RecordingBackend {
    meshes: BTreeMap<MeshKey, (MeshBuffers, ShaderParams, i64)>,
    submits: usize,
}

impl RenderBackend for RecordingBackend {
    fn submit(&mut self, key: MeshKey, mesh: &MeshBuffers, params: &ShaderParams, z_order: i64) {
        self.submits += 1;
        self.meshes.insert(key, (mesh.clone(), params.clone(), z_order));
    }

    fn remove(&mut self, key: &MeshKey) {
        self.meshes.remove(key);
    }
}

/// Geographic `[lat, long]` to planar `(long, -lat) * 100`.
fn project(coord: [f64; 2], _zoom: Option<f64>) -> Vec2 {
    Vec2::new(coord[1] * 100.0, -coord[0] * 100.0)
}

fn wells() -> Vec<SourceData> {
    vec![
        SourceData::new("15/9-F-1", vec![[0.0, 0.0], [-0.1, 0.0], [-0.2, 0.05]]).with_interval(0.3, 0.6),
        SourceData::new("15/9-F-2", vec![[0.0, 0.0], [0.0, 0.1]]),
        SourceData::new("15/9-F-3", vec![[1.0, 1.0], [1.0, 1.0]]),
    ]
}

fn loaded() -> WellboreLayer {
    let mut layer = WellboreLayer::new(LayerId(7), WellboreConfig::default())
        .unwrap()
        .with_projector(project);
    layer.set(wells(), "default").unwrap();
    while layer.is_loading() {
        layer.tick(&mut FrameBudget::new(1));
    }
    layer
}

#[test]
fn registers_pointer_events_on_add() {
    let mut layer = loaded();
    let mut port = RecordingPort::default();
    layer.on_add(&mut port);
    assert_eq!(
        port.registered,
        vec![PointerEventKind::Move, PointerEventKind::Out, PointerEventKind::Click]
    );
    layer.on_remove(&mut port);
    assert!(port.unregistered);
}

#[test]
fn pointer_session_reports_highlights_and_clicks() {
    let mut layer = loaded();
    let log = Rc::new(RefCell::new(Vec::new()));

    let on = log.clone();
    layer.on_highlight_on(move |e| {
        let labels: Vec<String> = e.event_data.iter().map(|d| d.data.label.clone()).collect();
        on.borrow_mut().push(format!("on {} {}", labels.join(","), e.changed));
    });
    let off = log.clone();
    layer.on_highlight_off(move || off.borrow_mut().push("off".into()));
    let click = log.clone();
    layer.on_wellbore_click(move |e| click.borrow_mut().push(format!("click {} {}", e.group, e.data.label)));

    // Halfway along the southward path of F-1.
    let over_f1 = PointerEvent::new(PointerEventKind::Move, [-0.05, 0.001]);
    assert!(layer.handle_pointer(&over_f1));
    assert!(layer.handle_pointer(&over_f1));
    assert!(layer.handle_pointer(&PointerEvent::new(PointerEventKind::Click, [-0.05, 0.0])));
    // The shared root selects both members.
    assert!(layer.handle_pointer(&PointerEvent::new(PointerEventKind::Move, [0.0, 0.0])));
    assert!(!layer.handle_pointer(&PointerEvent::new(PointerEventKind::Click, [0.0, 0.0])));
    assert!(!layer.handle_pointer(&PointerEvent::new(PointerEventKind::Move, [0.5, 0.5])));

    assert_eq!(
        *log.borrow(),
        vec![
            "on 15/9-F-1 true".to_string(),
            "on 15/9-F-1 false".to_string(),
            "click default 15/9-F-1".to_string(),
            "on 15/9-F-1,15/9-F-2 true".to_string(),
            "off".to_string(),
        ]
    );
}

#[test]
fn flush_submits_once_per_pending_redraw() {
    let mut layer = loaded();
    let mut backend = RecordingBackend::default();

    assert!(layer.flush(&mut backend));
    assert!(!layer.flush(&mut backend));
    // Two roots, and ribbons only for the two paths that leave their root.
    let roots = backend.meshes.keys().filter(|k| matches!(k, MeshKey::Root(_))).count();
    let ribbons = backend.meshes.keys().filter(|k| matches!(k, MeshKey::Wellbore(_))).count();
    assert_eq!((roots, ribbons), (2, 2));

    let (mesh, _, _) = &backend.meshes[&MeshKey::Wellbore(0)];
    assert_eq!(mesh.attribute_size, 5);
    assert_eq!(mesh.attributes.len(), mesh.vertex_count() * 5);
    // The interval adds tick markers.
    assert!(mesh.attributes.chunks(5).any(|a| a[4] == 2.0));

    layer.set_highlight("15/9-F-2", &[]);
    assert!(layer.flush(&mut backend));
    let (_, params, z) = &backend.meshes[&MeshKey::Wellbore(1)];
    assert!(*z >= 100_000);
    match params {
        ShaderParams::Wellbore { col1, .. } => assert_ne!(*col1, [0.0, 0.0, 0.0]),
        other => panic!("unexpected params {other:?}"),
    }

    layer.clear(&[]);
    assert!(layer.flush(&mut backend));
    assert!(backend.meshes.is_empty());
}
