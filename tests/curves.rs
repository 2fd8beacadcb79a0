use nalgebra::{point, vector, Vector3, Vector4};
use rtgeom::{
    geometry::HermiteSegment, Aabb, BufferSlot, BufferView, CurveBasis, Curves, Error, Geometry,
    Primitives, TimeRange,
};

const STARTS: [u32; 1] = [0];

fn row(y: f32, radius: f32) -> Vec<Vector4<f32>> {
    (0..4).map(|x| vector![x as f32, y, 0.0, radius]).collect()
}

fn bezier<'buf>(steps: &'buf [Vec<Vector4<f32>>]) -> Curves<'buf> {
    let mut curves = Curves::new(CurveBasis::Bezier, steps.len() as u32).unwrap();
    curves.set_curve_buffer(BufferView::from_elements(&STARTS));
    for (itime, vertices) in steps.iter().enumerate() {
        curves
            .set_vertex_buffer(itime, BufferView::from_elements(vertices))
            .unwrap();
    }
    curves
}

#[test]
fn gather_in_time() {
    let steps = [row(0.0, 0.5), row(2.0, 0.5)];
    let curves = bezier(&steps);
    assert_eq!(curves.gather(0), curves.gather_step(0, 0));
    assert_eq!(curves.gather_at(0, 0.0), curves.gather_step(0, 0));
    assert_eq!(curves.gather_at(0, 1.0), curves.gather_step(0, 1));
    assert_eq!(curves.gather_at(0, 0.5)[3], vector![3.0, 1.0, 0.0, 0.5]);
    assert_eq!(curves.radius_at(2, 1), 0.5);
}

#[test]
fn oriented_gather() {
    let steps = [row(0.0, 0.5), row(2.0, 0.5)];
    let normals = [
        vec![Vector3::<f32>::z(); 4],
        vec![Vector3::y(); 4],
    ];
    let mut curves = bezier(&steps);
    for (itime, n) in normals.iter().enumerate() {
        curves
            .set_normal_buffer(itime, BufferView::from_elements(n))
            .unwrap();
    }
    curves.verify().unwrap();
    let (points, n) = curves.gather_oriented_at(0, 1.0);
    assert_eq!(points, curves.gather_step(0, 1));
    assert_eq!(n, [Vector3::y(); 2]);
    assert_eq!(curves.gather_oriented(0).1, [Vector3::z(); 2]);
    assert_eq!(
        curves.gather_oriented_at(0, 0.5).1[0],
        vector![0.0, 0.5, 0.5]
    );
}

#[test]
fn bezier_bounds() {
    let steps = [row(0.0, 0.5), row(2.0, -0.25)];
    let curves = bezier(&steps);
    let expected = Aabb::new(point![-0.5, -0.5, -0.5], point![3.5, 0.5, 0.5]);
    assert_eq!(curves.first_bounds(0), expected);
    assert_eq!(curves.bounds(0, 0), expected);
    assert_eq!(
        curves.bounds(0, 1),
        Aabb::new(point![-0.25, 1.75, -0.25], point![3.25, 2.25, 0.25])
    );
    assert_eq!(curves.build_bounds(0), Some(expected));
    // negative radii only fail the commit-time check
    assert!(matches!(
        curves.verify(),
        Err(Error::InvalidElement {
            slot: BufferSlot::Vertex,
            itime: 1,
            index: 0
        })
    ));
}

#[test]
fn hermite_bounds() {
    let vertices = [vector![0.0, 0.0, 0.0, 1.0], vector![3.0, 0.0, 0.0, 1.0]];
    let tangents = [vector![3.0, 3.0, 0.0, 0.0], vector![3.0, -3.0, 0.0, 0.0]];
    let mut curves = Curves::new(CurveBasis::Hermite, 1).unwrap();
    curves.set_curve_buffer(BufferView::from_elements(&STARTS));
    curves
        .set_vertex_buffer(0, BufferView::from_elements(&vertices))
        .unwrap();
    assert!(!curves.valid(0, 0));
    assert!(matches!(
        curves.verify(),
        Err(Error::MissingBuffer(BufferSlot::Tangent))
    ));

    curves
        .set_tangent_buffer(0, BufferView::from_elements(&tangents))
        .unwrap();
    curves.verify().unwrap();
    assert!(curves.valid(0, 0));

    let segment = curves.gather_hermite(0);
    assert_eq!(
        segment,
        HermiteSegment {
            p0: vertices[0],
            t0: tangents[0],
            p1: vertices[1],
            t1: tangents[1],
        }
    );
    // only one time step, so every time sees it
    assert_eq!(curves.gather_hermite_at(0, 0.8), segment);
    assert_eq!(
        segment.to_bezier(),
        [
            vertices[0],
            vector![1.0, 1.0, 0.0, 1.0],
            vector![2.0, 1.0, 0.0, 1.0],
            vertices[1],
        ]
    );
    assert_eq!(
        curves.first_bounds(0),
        Aabb::new(point![-1.0, -1.0, -1.0], point![4.0, 2.0, 1.0])
    );
}

#[test]
fn hermite_without_tangents() {
    let vertices = [vector![0.0, 0.0, 0.0, 1.0], vector![3.0, 0.0, 0.0, 1.0]];
    let mut curves = Curves::new(CurveBasis::Hermite, 2).unwrap();
    curves.set_curve_buffer(BufferView::from_elements(&STARTS));
    for itime in 0..2 {
        curves
            .set_vertex_buffer(itime, BufferView::from_elements(&vertices))
            .unwrap();
    }
    assert!(!curves.valid(0, 0));
    assert!(!curves.valid(0, 2));
    assert!(curves.build_bounds(0).is_none());
    assert!(curves.build_bounds_segment(0, 1, 2).is_none());
    assert!(curves.linear_bounds_checked(0, TimeRange::FULL).is_none());
    assert!(curves.linear_bounds_segment(0, 0, 2).is_none());
}

#[test]
#[should_panic]
fn hermite_bounds_need_tangents() {
    let vertices = [vector![0.0, 0.0, 0.0, 1.0], vector![3.0, 0.0, 0.0, 1.0]];
    let mut curves = Curves::new(CurveBasis::Hermite, 1).unwrap();
    curves.set_curve_buffer(BufferView::from_elements(&STARTS));
    curves
        .set_vertex_buffer(0, BufferView::from_elements(&vertices))
        .unwrap();
    curves.bounds_at(0, 0.5);
}

#[test]
fn past_last_step() {
    let steps = [row(0.0, 0.5), row(1.0, 0.5)];
    let curves = bezier(&steps);
    assert!(curves.valid(0, 1));
    assert!(!curves.valid(0, 2));
    assert!(!curves.valid_range(0, 2, 5));
    assert!(curves.build_bounds_segment(0, 2, 2).is_none());
    assert!(curves.build_bounds_segment(0, 1, 2).is_some());
}

#[test]
fn hermite_lerp() {
    let a = HermiteSegment {
        p0: Vector4::zeros(),
        t0: Vector4::x(),
        p1: Vector4::y(),
        t1: Vector4::zeros(),
    };
    let b = HermiteSegment {
        p0: Vector4::z() * 2.0,
        ..a
    };
    let mid = rtgeom::time::lerp(a, b, 0.5);
    assert_eq!(mid.p0, Vector4::z());
    assert_eq!(mid.t0, a.t0);
}

#[test]
fn invalid_curves() {
    let steps = [row(0.0, 0.5)];
    let starts = [0u32, 1];
    let mut curves = bezier(&steps);
    curves.set_curve_buffer(BufferView::from_elements(&starts));
    assert!(curves.valid(0, 0));
    // the second curve would read past the last control point
    assert!(!curves.valid(1, 0));
    assert!(curves.build_bounds(1).is_none());

    let mut broken = row(0.0, 0.5);
    broken[2].x = f32::INFINITY;
    let steps = [row(0.0, 0.5), broken];
    let curves = bezier(&steps);
    assert!(curves.valid(0, 0));
    assert!(!curves.valid_range(0, 0, 1));
    assert!(curves.build_bounds_segment(0, 0, 2).is_some());
    assert!(curves.build_bounds_segment(0, 1, 2).is_none());
}

#[test]
fn flags_and_settings() {
    let steps = [row(0.0, 0.5)];
    let flags = [0b111u8];
    let starts = [0u32, 0];
    let mut curves = bezier(&steps);
    assert_eq!(curves.start_end_bit_mask(0), 0);
    curves.set_flag_buffer(BufferView::from_elements(&flags));
    assert_eq!(curves.start_end_bit_mask(0), 0b11 << 30);

    curves.set_curve_buffer(BufferView::from_elements(&starts));
    assert!(matches!(
        curves.verify(),
        Err(Error::MismatchedElementCount {
            slot: BufferSlot::Flags,
            ..
        })
    ));

    assert_eq!(curves.tessellation_rate(), 4);
    curves.set_tessellation_rate(100.0);
    assert_eq!(curves.tessellation_rate(), 16);
    curves.set_tessellation_rate(7.9);
    assert_eq!(curves.tessellation_rate(), 7);
    curves.set_tessellation_rate(f32::NAN);
    assert_eq!(curves.tessellation_rate(), 1);
}

#[test]
fn dispatch() {
    let steps = [row(0.0, 0.5), row(1.0, 0.5)];
    let mut geometry = Geometry::from(bezier(&steps));
    assert_eq!(geometry.num_vertices(), 4);
    assert_eq!(geometry.len(), 1);
    geometry.set_num_time_steps(3).unwrap();
    // the new third step has no data yet
    assert!(geometry.verify().is_err());
    geometry.update_buffer(BufferSlot::Vertex);
    assert_eq!(geometry.info().num_time_steps(), 3);
}
