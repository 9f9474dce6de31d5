use criterion::{black_box, criterion_group, criterion_main, Criterion};
use posedriver_core::distance::distance_matrix;
use posedriver_core::{
    AxisFlags, BBoneChannel, ChannelSelection, EulerOrder, PoseSample, PoseTransform,
    RotationChannel,
};

fn poses(count: usize) -> Vec<PoseSample> {
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            PoseSample::new(PoseTransform::compose(
                [t, 0.5 * t, -t],
                EulerOrder::Xyz.to_quaternion([t, 2.0 * t, -0.5 * t]),
                [1.0, 1.0 + 0.1 * t, 1.0],
            ))
            .with_bbone(BBoneChannel::RollIn, t)
        })
        .collect()
}

fn bench_distance_matrix(c: &mut Criterion) {
    let selection = ChannelSelection::default()
        .with_location(AxisFlags::ALL)
        .with_rotation(RotationChannel::Quaternion)
        .with_scale(AxisFlags::ALL)
        .with_bbone(BBoneChannel::RollIn);
    for count in [8, 32] {
        let poses = poses(count);
        c.bench_function(&format!("distance_matrix_{count}"), |b| {
            b.iter(|| black_box(distance_matrix(black_box(&poses), &selection)))
        });
    }
}

criterion_group!(benches, bench_distance_matrix);
criterion_main!(benches);
