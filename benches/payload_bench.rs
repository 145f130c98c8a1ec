use criterion::{black_box, criterion_group, criterion_main, Criterion};

use forge_sdk::{DitherMethod, ForgeClient, Orientation, OutputFormat, PalettePreset, Paper};

// Freezing and serializing happen on every send, before any I/O.
fn bench_build_and_serialize(c: &mut Criterion) {
    let client = ForgeClient::new("http://localhost:3000").expect("client");
    let html = "<html><body>".to_string() + &"<p>Lorem ipsum dolor sit amet</p>".repeat(200) + "</body></html>";

    let builder = client
        .render_html(html)
        .format(OutputFormat::Png)
        .paper(Paper::A4)
        .orientation(Orientation::Portrait)
        .margins("10,10,10,10")
        .and_then(|b| b.colors(16))
        .map(|b| b.palette(PalettePreset::Eink).dither(DitherMethod::FloydSteinberg))
        .expect("valid options");

    c.bench_function("build_request", |b| {
        b.iter(|| black_box(builder.build().unwrap()))
    });

    let request = builder.build().unwrap();
    c.bench_function("serialize_payload", |b| {
        b.iter(|| black_box(serde_json::to_vec(&request.to_payload().unwrap()).unwrap()))
    });
}

fn bench_custom_palette(c: &mut Criterion) {
    let client = ForgeClient::new("http://localhost:3000").expect("client");
    let colors: Vec<String> = (0..256).map(|i| format!("#{:02x}{:02x}{:02x}", i, 255 - i, i / 2)).collect();

    c.bench_function("custom_palette_256", |b| {
        b.iter(|| {
            let builder = client
                .render_html("<p>x</p>")
                .custom_palette(colors.iter().cloned())
                .unwrap();
            black_box(builder.build().unwrap())
        })
    });
}

criterion_group!(benches, bench_build_and_serialize, bench_custom_palette);
criterion_main!(benches);
