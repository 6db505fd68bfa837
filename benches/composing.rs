//! Benchmarks for frame composition and SVG serialization.

use std::collections::HashMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use codeframe::export::{SvgOptions, UI_FONT_STACK, font_stack, render_svg};
use codeframe::highlight::{LanguageTag, tokenize};
use codeframe::layout::{MonospaceMetrics, compose};
use codeframe::settings::{Dimension, HighlightKind, HighlightRange, RenderSettings};
use codeframe::theme::ThemeRegistry;

fn bench_compose(c: &mut Criterion) {
    let registry = ThemeRegistry::builtin();
    let settings = RenderSettings {
        line_numbers: true,
        width: Dimension::Fixed(640),
        word_wrap: true,
        highlights: vec![HighlightRange::new("h", 10, 20, HighlightKind::Add)],
        ..RenderSettings::default()
    };
    let theme = registry.resolve(&settings.theme).unwrap();
    let tokens = tokenize(include_str!("../src/layout/mod.rs"), &LanguageTag::new("rust"));
    let metrics = MonospaceMetrics::default();
    c.bench_function("compose_wrapped", |b| {
        b.iter(|| compose(black_box(&tokens), theme, &settings, &settings.highlights, &metrics))
    });
}

fn bench_render_svg(c: &mut Criterion) {
    let registry = ThemeRegistry::builtin();
    let settings = RenderSettings::default();
    let theme = registry.resolve(&settings.theme).unwrap();
    let tokens = tokenize(include_str!("../src/export/svg.rs"), &LanguageTag::new("rust"));
    let frame = compose(&tokens, theme, &settings, &[], &MonospaceMetrics::default());
    let code_font = font_stack(None);
    let images = HashMap::new();
    let options = SvgOptions {
        code_font: &code_font,
        ui_font: UI_FONT_STACK,
        images: &images,
        checkerboard: false,
    };
    c.bench_function("render_svg", |b| {
        b.iter(|| render_svg(black_box(&frame), &options))
    });
}

criterion_group!(benches, bench_compose, bench_render_svg);
criterion_main!(benches);
