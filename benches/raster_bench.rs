use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use statuz::rendering::layout::compose;
use statuz::rendering::paint::build_display_list;
use statuz::rendering::{PixelRasterizer, Rasterize, Typeface};
use statuz::{Quote, Size};
use std::sync::Arc;

fn bench_layout(c: &mut Criterion) {
    let typeface = Typeface::load(None).expect("typeface");
    let quote = Quote::new(
        "Programs must be written for people to read, and only incidentally for machines to execute.",
        "Harold Abelson",
    );
    c.bench_function("compose_layout", |b| {
        b.iter(|| compose(Size::new(430, 764), 1, Some(&quote), &typeface))
    });
}

fn bench_export_raster(c: &mut Criterion) {
    let typeface = Arc::new(Typeface::load(None).expect("typeface"));
    let quote = Quote::new("Simplicity is prerequisite for reliability.", "Edsger Dijkstra");
    let layout = compose(Size::new(430, 764), 1, Some(&quote), &typeface);
    let commands = build_display_list(&layout);
    let background = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1080, 1920, Rgba([40, 80, 120, 255])));
    let rasterizer = PixelRasterizer::new(typeface);

    c.bench_function("rasterize_export", |b| {
        b.iter(|| {
            rasterizer
                .rasterize(430, 764, &commands, Some(&background))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_layout, bench_export_raster);
criterion_main!(benches);
