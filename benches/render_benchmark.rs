use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cuescene::script::{Metadata, NodeKind, NodeSpec, Property, Step, TransitionSpec};
use cuescene::{CueTable, RenderEngine, SceneScript};

fn create_test_script() -> SceneScript {
    let mut steps = Vec::new();
    let mut transitions = Vec::new();
    for i in 0..50 {
        let name = format!("dot{}", i);
        steps.push(Step::Add {
            parent: None,
            node: NodeSpec::new(NodeKind::Circle)
                .named(&name)
                .with(Property::X, i as f64 * 20.0)
                .with(Property::Fill, "#3366ff"),
        });
        transitions.push(TransitionSpec::new(&name, Property::Y, -200.0, 1.0));
    }
    steps.push(Step::AnimateAll { transitions });
    steps.push(Step::WaitUntil {
        cue: "outro".into(),
    });

    SceneScript {
        metadata: Metadata {
            fps: 60,
            ..Metadata::new("Benchmark")
        },
        steps,
    }
}

fn bench_render_all(c: &mut Criterion) {
    let script = create_test_script();
    let cues = CueTable::new().with("outro", 2.0).unwrap();

    c.bench_function("render_50_nodes_2s_60fps", |b| {
        b.iter(|| {
            let mut engine = RenderEngine::new(black_box(&script), cues.clone());
            engine.render_all().unwrap()
        })
    });
}

criterion_group!(benches, bench_render_all);
criterion_main!(benches);
