//! Properties of the time-dependent bound queries, checked over small integer-valued meshes so
//! that no generated coordinate is NaN or infinite.

use nalgebra::{point, Point3};
use quickcheck_macros::quickcheck;
use rtgeom::{
    time::{map_time, step_time, TimeSegment},
    BufferView, Primitives, TimeRange, Triangle, TriangleMesh,
};

type Corner = (i8, i8, i8);
type Step = (Corner, Corner, Corner);

fn to_point((x, y, z): Corner) -> Point3<f32> {
    point![x as f32, y as f32, z as f32]
}

fn to_points((a, b, c): Step) -> Vec<Point3<f32>> {
    vec![to_point(a), to_point(b), to_point(c)]
}

/// One triangle, sampled at one time step per entry of `steps`.
fn single_triangle<'buf>(
    triangles: &'buf [Triangle],
    steps: &'buf [Vec<Point3<f32>>],
) -> TriangleMesh<'buf> {
    let mut mesh = TriangleMesh::new(steps.len() as u32).unwrap();
    mesh.set_index_buffer(BufferView::from_elements(triangles));
    for (itime, vertices) in steps.iter().enumerate() {
        mesh.set_vertex_buffer(itime, BufferView::from_elements(vertices))
            .unwrap();
    }
    mesh
}

fn unit(n: u8) -> f32 {
    n as f32 / u8::MAX as f32
}

#[quickcheck]
fn approximate_bounds_contain_vertices(step0: Step, step1: Step, time: u8) -> bool {
    let triangles = [Triangle::new(0, 1, 2)];
    let steps = [to_points(step0), to_points(step1)];
    let mesh = single_triangle(&triangles, &steps);
    let time = unit(time);
    let bounds = mesh.bounds_at(0, time);
    let TimeSegment { fraction, .. } = map_time(time, 1.0);
    (0..3).all(|k| {
        let p = steps[0][k].coords * (1.0 - fraction) + steps[1][k].coords * fraction;
        bounds.contains(&p.into())
    })
}

#[quickcheck]
fn linear_bounds_are_conservative(
    first: Step,
    second: Step,
    rest: Vec<Step>,
    lo: u8,
    hi: u8,
) -> bool {
    let steps: Vec<Vec<Point3<f32>>> = [first, second]
        .into_iter()
        .chain(rest.into_iter().take(6))
        .map(to_points)
        .collect();
    let triangles = [Triangle::new(0, 1, 2)];
    let mesh = single_triangle(&triangles, &steps);
    let num_segments = (steps.len() - 1) as f32;

    let (lo, hi) = (unit(lo.min(hi)), unit(lo.max(hi)));
    let range = TimeRange::new(lo, hi);
    let linear = mesh.linear_bounds(0, range);
    if range.size() <= 0.0 {
        return linear.bounds0.dilated(1e-3).contains_aabb(&mesh.bounds_at(0, lo));
    }
    let first = (lo * num_segments).ceil() as usize;
    let last = (hi * num_segments).floor() as usize;
    (first..=last).all(|itime| {
        let t = (step_time(itime, num_segments) - lo) / range.size();
        linear
            .interpolate(t)
            .dilated(1e-2)
            .contains_aabb(&mesh.bounds(0, itime))
    })
}

#[quickcheck]
fn out_of_range_indices_are_invalid(index: u32, other: u8, num_time_steps: u8) -> bool {
    let num_time_steps = num_time_steps as usize % 4 + 1;
    let triangles = [Triangle::new(0, other as u32 % 3, index)];
    let steps = vec![vec![point![0.0f32, 0.0, 0.0]; 3]; num_time_steps];
    let mesh = single_triangle(&triangles, &steps);
    let in_range = index < 3;
    (0..num_time_steps + 3).all(|itime| mesh.valid(0, itime) == (in_range && itime < num_time_steps))
        && mesh.build_bounds(0).is_some() == in_range
        && (0..num_time_steps + 3).all(|itime| {
            mesh.build_bounds_segment(0, itime, num_time_steps).is_some()
                == (in_range && itime < num_time_steps)
        })
}

#[test]
fn map_time_four_steps() {
    assert_eq!(
        map_time(0.5, 3.0),
        TimeSegment {
            segment: 1,
            fraction: 0.5
        }
    );
    assert_eq!(
        map_time(1.0, 3.0),
        TimeSegment {
            segment: 2,
            fraction: 1.0
        }
    );
    assert_eq!(map_time(0.0, 3.0).segment, 0);
    assert_eq!(map_time(f32::NAN, 3.0).segment, 0);
}
