use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mazeray::engine::RenderOptions;
use mazeray::map::GridMap;
use mazeray::math::vec2::Vec2;
use mazeray::prelude::{Camera, MiniMap, PixelBuffer, Raycaster, SpriteRenderer};
use mazeray::texture::TextureSet;

const MAP_SIZE: usize = 21;

fn seeded_map() -> GridMap {
    let mut rng = StdRng::seed_from_u64(42);
    GridMap::with_rng(MAP_SIZE, MAP_SIZE, &mut rng).unwrap()
}

fn benchmark_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_frame");

    let textures = TextureSet::builtin();
    let options = RenderOptions::default();

    for (name, width, height) in [
        ("320x180", 320u32, 180u32),
        ("640x360", 640, 360),
        ("1280x720", 1280, 720),
    ] {
        group.bench_function(BenchmarkId::new("walls_floor_ceiling", name), |b| {
            let mut map = seeded_map();
            let camera = Camera::new(Vec2::new(1.5, 1.5));
            let mut caster = Raycaster::new(width, height);
            let mut buffer = PixelBuffer::new(width, height);
            let mut minimap = MiniMap::new(width);
            b.iter(|| {
                caster.render(
                    black_box(&mut buffer),
                    &mut map,
                    &camera,
                    &textures,
                    &mut minimap,
                    &options,
                    0.016,
                );
                minimap.clear_rays();
            });
        });
    }

    group.finish();
}

fn benchmark_sprite_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("sprite_pass");

    let textures = TextureSet::builtin();
    let options = RenderOptions::default();
    let width = 640u32;
    let height = 360u32;

    group.bench_function("scattered_sprites", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        let map = GridMap::with_rng(MAP_SIZE, MAP_SIZE, &mut rng).unwrap();
        let mut sprites = SpriteRenderer::scatter(&map, textures.sprite_count(), &mut rng);
        let camera = Camera::new(Vec2::new(1.5, 1.5));
        let mut buffer = PixelBuffer::new(width, height);
        let z_buffer = vec![8.0f32; width as usize];
        b.iter(|| {
            sprites.render(
                black_box(&mut buffer),
                &camera,
                &textures,
                &z_buffer,
                &options,
            );
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_full_frame, benchmark_sprite_pass);
criterion_main!(benches);
