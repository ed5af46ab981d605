//! Translation hot-path benchmarks
//!
//! Measures the per-event cost of the translator for the three paths an
//! event can take: managed motion, pass-through, and disarmed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vmoused::config::MotionConfig;
use vmoused::input::{KeyMap, MotionSink, MotionTranslator, MouseButton};

const CONTROL: u16 = 100; // KEY_RIGHTALT
const KP8: u16 = 72;
const KEY_A: u16 = 30;

/// Sink that discards everything.
struct NullSink;

impl MotionSink for NullSink {
    fn report_relative(&mut self, _dx: i32, _dy: i32) {}
    fn report_button(&mut self, _button: MouseButton, _down: bool) {}
    fn sync(&mut self) {}
}

fn bench_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation");

    group.bench_function("managed_motion", |b| {
        let mut t = MotionTranslator::new(KeyMap::default(), MotionConfig::default());
        let mut sink = NullSink;
        t.handle(CONTROL, true, &mut sink);
        b.iter(|| {
            t.handle(black_box(KP8), true, &mut sink);
            t.handle(black_box(KP8), false, &mut sink);
        });
    });

    group.bench_function("unmanaged_pass_through", |b| {
        let mut t = MotionTranslator::new(KeyMap::default(), MotionConfig::default());
        let mut sink = NullSink;
        t.handle(CONTROL, true, &mut sink);
        b.iter(|| t.handle(black_box(KEY_A), true, &mut sink));
    });

    group.bench_function("disarmed", |b| {
        let mut t = MotionTranslator::new(KeyMap::default(), MotionConfig::default());
        let mut sink = NullSink;
        b.iter(|| t.handle(black_box(KP8), true, &mut sink));
    });

    group.finish();
}

criterion_group!(benches, bench_translation);
criterion_main!(benches);
