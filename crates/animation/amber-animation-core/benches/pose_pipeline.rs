//! Criterion micro-benchmarks for the per-frame sample -> blend -> world pipeline.

use amber_animation_core::{
    ArmatureDesc, Instance, InstanceTable, PoseDesc, PoseHandle, SequenceDesc, SequenceHandle,
    Transform,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

struct Rig {
    inst: Instance,
    sequence: SequenceHandle,
    rest: PoseHandle,
    sampled: PoseHandle,
    blended: PoseHandle,
    world: PoseHandle,
}

/// Humanoid rig from the shared fixtures with one sequence and four poses.
fn make_rig() -> Rig {
    let armature_desc: ArmatureDesc =
        amber_test_fixtures::armatures::load("humanoid").unwrap();
    let rest_transforms: Vec<Transform> =
        amber_test_fixtures::poses::load("humanoid-rest").unwrap();
    let mut sequence_desc: SequenceDesc =
        amber_test_fixtures::sequences::load("humanoid-wave").unwrap();

    let mut inst = Instance::default();
    let armature = inst.create_armature(&armature_desc).unwrap();
    sequence_desc.armature = armature;
    let sequence = inst.create_sequence(&sequence_desc).unwrap();

    let rest = inst
        .create_pose(&PoseDesc {
            armature,
            joint_transforms: Some(rest_transforms),
        })
        .unwrap();
    let empty = PoseDesc {
        armature,
        joint_transforms: None,
    };
    let sampled = inst.create_pose(&empty).unwrap();
    let blended = inst.create_pose(&empty).unwrap();
    let world = inst.create_pose(&empty).unwrap();

    Rig {
        inst,
        sequence,
        rest,
        sampled,
        blended,
        world,
    }
}

fn bench_pipeline(c: &mut Criterion) {
    let mut rig = make_rig();
    let mut time = 0.0f32;

    c.bench_function("sample_blend_world_humanoid", |b| {
        b.iter(|| {
            time = (time + 1.0 / 60.0) % 1.0;
            rig.inst
                .sample_pose(rig.sequence, black_box(time), rig.sampled)
                .unwrap();
            rig.inst
                .blend_poses(&[rig.rest, rig.sampled], &[0.25, 0.75], rig.blended)
                .unwrap();
            rig.inst
                .convert_to_world_pose(rig.blended, rig.world)
                .unwrap();
            black_box(rig.inst.pose_transforms(rig.world).unwrap()[22]);
        });
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let mut rig = make_rig();

    c.bench_function("world_local_round_trip_humanoid", |b| {
        b.iter(|| {
            rig.inst.convert_to_world_pose(rig.rest, rig.world).unwrap();
            rig.inst
                .convert_to_local_pose(rig.world, rig.blended)
                .unwrap();
        });
    });
}

criterion_group!(benches, bench_pipeline, bench_round_trip);
criterion_main!(benches);
