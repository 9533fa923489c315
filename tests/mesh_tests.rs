// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for depth mesh reconstruction

use depth_mesh::config::MeshSettings;
use depth_mesh::mesh::triangle_index_count;
use depth_mesh::{DepthFrame, DepthMeshBuilder, Intrinsics, UnprojectParams, build_point_grid};

fn params() -> UnprojectParams {
    UnprojectParams {
        min_valid_depth: 0.01,
        invalid_replacement: 5.0,
    }
}

/// Deterministic pseudo-random depth field with some dropouts
fn noisy_frame(width: usize, height: usize) -> DepthFrame {
    let mut state = 0x2545_f491_u32;
    let data = (0..width * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let r = (state % 1000) as f32 / 1000.0;
            if r < 0.1 { 0.0 } else { 0.4 + r * 3.0 }
        })
        .collect();
    DepthFrame::new(width, height, data).unwrap()
}

#[test]
fn test_constant_depth_grid() {
    let frame = DepthFrame::filled(4, 4, 2.0).unwrap();
    let k = Intrinsics::new(100.0, 100.0, 2.0, 2.0);
    let grid = build_point_grid(&frame, 4, 4, &params(), &k).unwrap();

    assert!(grid.points.iter().all(|p| p.z == 2.0));

    let p = grid.point(3, 0).unwrap();
    assert!((p.x - 0.02).abs() < 1e-6);
    assert!((p.y - -0.04).abs() < 1e-6);
}

#[test]
fn test_deterministic_output() {
    let frame = noisy_frame(64, 48);
    let k = Intrinsics::new(60.0, 60.0, 32.0, 24.0);

    let a = build_point_grid(&frame, 64, 48, &params(), &k).unwrap();
    let b = build_point_grid(&frame, 64, 48, &params(), &k).unwrap();

    let bits = |g: &depth_mesh::PointGrid| -> Vec<u32> {
        g.points
            .iter()
            .flat_map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
            .collect()
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.indices, b.indices);
}

#[test]
fn test_shape_invariants() {
    let frame = noisy_frame(37, 23);
    let k = Intrinsics::new(40.0, 40.0, 18.0, 11.0);

    for (w, h) in [(37, 23), (10, 6), (2, 2), (50, 30)] {
        let grid = build_point_grid(&frame, w, h, &params(), &k).unwrap();
        assert_eq!(grid.points.len(), w * h);
        assert_eq!(grid.indices.len(), 6 * (w - 1) * (h - 1));
        assert_eq!(grid.indices.len(), triangle_index_count(w, h));
        assert!(grid.indices.iter().all(|&i| (i as usize) < w * h));
    }
}

#[test]
fn test_all_invalid_input_is_planar() {
    let frame = DepthFrame::filled(6, 5, 0.0).unwrap();
    let k = Intrinsics::new(20.0, 25.0, 2.5, 2.0);
    let grid = build_point_grid(&frame, 6, 5, &params(), &k).unwrap();

    for v in 0..5 {
        for u in 0..6 {
            let p = grid.point(u, v).unwrap();
            assert_eq!(p.z, 5.0);
            assert_eq!(p.x, (u as f32 - 2.5) * 5.0 / 20.0);
            assert_eq!(p.y, (v as f32 - 2.0) * 5.0 / 25.0);
        }
    }
}

#[test]
fn test_identity_resolution_reads_mirrored_source() {
    let frame = noisy_frame(7, 5);
    let k = Intrinsics::new(30.0, 30.0, 3.0, 2.0);
    let grid = build_point_grid(&frame, 7, 5, &params(), &k).unwrap();

    for v in 0..5 {
        for u in 0..7 {
            let mut expected = frame.data()[v * 7 + (7 - 1 - u)];
            if expected < 0.01 {
                expected = 5.0;
            }
            assert_eq!(grid.point(u, v).unwrap().z, expected);
        }
    }
}

#[test]
fn test_decimated_grid_preserves_discontinuities() {
    // Left half near, right half far: nearest-neighbour resampling
    // never produces depths between the two
    let width = 16;
    let height = 8;
    let data = (0..width * height)
        .map(|i| if i % width < width / 2 { 1.0 } else { 3.0 })
        .collect();
    let frame = DepthFrame::new(width, height, data).unwrap();
    let k = Intrinsics::new(10.0, 10.0, 2.0, 2.0);

    let grid = build_point_grid(&frame, 5, 3, &params(), &k).unwrap();
    assert!(grid.points.iter().all(|p| p.z == 1.0 || p.z == 3.0));
}

#[test]
fn test_builder_full_frame() {
    let frame = noisy_frame(64, 48);
    let k = Intrinsics::new(60.0, 60.0, 32.0, 24.0);
    let mut builder = DepthMeshBuilder::new(MeshSettings {
        min_valid_depth: 0.01,
        invalid_replacement: 5.0,
        collision_decimation: 4,
    });

    let mesh = builder.build(&frame, &k).unwrap();
    assert_eq!((mesh.render.width, mesh.render.height), (64, 48));

    let collision = mesh.collision.expect("collision mesh enabled");
    assert_eq!((collision.width, collision.height), (16, 12));
    assert_eq!(collision.indices.len(), 6 * 15 * 11);
    assert!(collision.points.iter().all(|p| p.z.is_finite() && p.z > 0.0));
}

#[test]
fn test_degenerate_destination_rejected() {
    let frame = DepthFrame::filled(4, 4, 1.0).unwrap();
    let k = Intrinsics::new(1.0, 1.0, 0.0, 0.0);
    assert!(build_point_grid(&frame, 1, 1, &params(), &k).is_err());
    assert!(build_point_grid(&frame, 4, 1, &params(), &k).is_err());
}
