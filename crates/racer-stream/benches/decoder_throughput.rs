//! 流式解码器吞吐基准测试
//!
//! 两类场景下的帧提取开销：
//! - 标记扫描（不解码）
//! - 完整 JPEG 解码

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use image::{ImageFormat, Rgb, RgbImage};
use racer_stream::{FrameDecodeError, FrameDecoder, StreamFrameDecoder};
use std::io::Cursor;

struct MarkerOnly;

impl FrameDecoder for MarkerOnly {
    type Output = usize;

    fn decode(&mut self, jpeg: &[u8]) -> Result<usize, FrameDecodeError> {
        Ok(jpeg.len())
    }
}

fn sample_stream(frames: usize) -> Vec<u8> {
    let img = RgbImage::from_fn(480, 360, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Jpeg).unwrap();
    let jpeg = cursor.into_inner();

    let mut stream = Vec::with_capacity(frames * (jpeg.len() + 64));
    for _ in 0..frames {
        stream.extend_from_slice(b"--boundarydonotcross\r\nContent-Type: image/jpeg\r\n\r\n");
        stream.extend_from_slice(&jpeg);
        stream.extend_from_slice(b"\r\n");
    }
    stream
}

fn bench_marker_scan(c: &mut Criterion) {
    let stream = sample_stream(20);
    let mut group = c.benchmark_group("marker_scan");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    for chunk_size in [1024usize, 16 * 1024, 64 * 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    let mut decoder = StreamFrameDecoder::new(MarkerOnly);
                    let mut frames = 0;
                    for chunk in stream.chunks(size) {
                        frames += decoder.feed(black_box(chunk)).len();
                    }
                    black_box(frames)
                });
            },
        );
    }
    group.finish();
}

fn bench_jpeg_decode(c: &mut Criterion) {
    let stream = sample_stream(5);
    let mut group = c.benchmark_group("jpeg_decode");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.sample_size(20);

    group.bench_function("480x360_16k_chunks", |b| {
        b.iter(|| {
            let mut decoder = StreamFrameDecoder::jpeg();
            let mut frames = 0;
            for chunk in stream.chunks(16 * 1024) {
                frames += decoder.feed(black_box(chunk)).len();
            }
            black_box(frames)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_marker_scan, bench_jpeg_decode);
criterion_main!(benches);
