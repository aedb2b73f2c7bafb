use approx::assert_relative_eq;
use frame_solver::prelude::*;
use nalgebra::{Rotation3, Vector3};

// Axial-only members: E = 200, areas in the 10^4 range
const E: f64 = 200.0;

fn bar(id: usize, i: &Node, j: &Node, area: f64) -> Element {
    Element::new(id, i.clone(), j.clone(), Material::new(E, 0.3), Section::truss(area)).unwrap()
}

#[test]
fn single_bar_axial_load() {
    let length = 5.0;
    let force = 100.0;
    let area = 20000.0;

    let support = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
    let end = Node::new(1, length, 0.0, 0.0)
        .with_conditions(Conditions::new().with_load(Dof::Ux, force));

    let mut frame = Frame::new();
    frame.add_element(bar(0, &support, &end, area)).unwrap();
    frame.assemble().unwrap();
    let solution = frame.solve().unwrap().clone();

    let disp = solution.node_displacement(1).unwrap();
    assert_relative_eq!(disp.dx, force * length / (E * area), max_relative = 1e-12);
    for other in [disp.dy, disp.dz, disp.rx, disp.ry, disp.rz] {
        assert_eq!(other, 0.0);
    }

    let rxn = solution.node_reactions(0).unwrap();
    assert_relative_eq!(rxn.fx, -force, max_relative = 1e-12);
    assert_relative_eq!(rxn.force_magnitude(), force, max_relative = 1e-12);
    assert_eq!(rxn.moment_magnitude(), 0.0);

    let (forces_i, forces_j) = frame.member_forces(0).unwrap();
    assert_relative_eq!(forces_i.axial, force, max_relative = 1e-12);
    assert_relative_eq!(forces_j.axial, force, max_relative = 1e-12);
    assert!(solution.warnings().is_empty());
}

#[test]
fn transverse_load_on_bar_is_a_mechanism() {
    let support = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
    let end = Node::new(1, 5.0, 0.0, 0.0)
        .with_conditions(Conditions::new().with_load(Dof::Uy, 1.0));

    let mut frame = Frame::new();
    frame.add_element(bar(0, &support, &end, 20000.0)).unwrap();
    frame.assemble().unwrap();

    let err = frame.solve().unwrap_err();
    assert!(matches!(err, FrameError::Mechanism { node: 1, dof: "u_y" }));
    assert_eq!(err.kind(), ErrorKind::SingularSystem);
}

/// Three bars meeting at a free apex, two supports fully fixed
#[test]
fn triangle_truss_balances_at_loaded_node() {
    let load = [5.0, -10.0, 0.0];
    let a = Node::new(0, 0.0, 0.0, 0.0)
        .with_conditions(Conditions::new().with_force(load[0], load[1], load[2]));
    let b = Node::new(1, 4.0, -4.0, 0.0).with_conditions(Conditions::fixed());
    let c = Node::new(2, -6.928, -4.0, 0.0).with_conditions(Conditions::fixed());

    let mut frame = Frame::new();
    frame
        .add_elements([
            bar(0, &a, &b, 20e3),
            bar(1, &b, &c, 18e3),
            bar(2, &a, &c, 15e3),
        ])
        .unwrap();
    frame.assemble().unwrap();
    let solution = frame.solve().unwrap().clone();
    assert!(solution.warnings().is_empty());

    let disp = solution.node_displacement(0).unwrap();
    assert!(disp.translation_magnitude() > 0.0);
    assert_eq!(disp.dz, 0.0);
    assert_eq!(disp.rotation_magnitude(), 0.0);

    // Bars 0 and 2 both start at the apex
    let mut internal = [0.0; 3];
    for id in [0, 2] {
        let element = frame.element(id).unwrap();
        let d = frame.element_displacements(element).unwrap();
        let end_forces = element.global_end_forces(&d);
        for k in 0..3 {
            internal[k] += end_forces[k];
        }
    }
    for k in 0..3 {
        assert_relative_eq!(internal[k], load[k], epsilon = 1e-9);
    }

    let r1 = solution.node_reactions(1).unwrap();
    let r2 = solution.node_reactions(2).unwrap();
    assert_relative_eq!(r1.fx + r2.fx, -load[0], epsilon = 1e-9);
    assert_relative_eq!(r1.fy + r2.fy, -load[1], epsilon = 1e-9);

    // Bar between the supports carries nothing
    let (forces_i, _) = frame.member_forces(1).unwrap();
    assert_relative_eq!(forces_i.axial, 0.0, epsilon = 1e-9);
}

/// The triangle of `triangle_truss_balances_at_loaded_node`, rigidly rotated in space
fn rotated_triangle(rotation: &Rotation3<f64>, load: Vector3<f64>) -> Frame {
    let place = |id: usize, p: [f64; 3]| {
        let p = rotation * Vector3::new(p[0], p[1], p[2]);
        Node::new(id, p.x, p.y, p.z)
    };
    let a = place(0, [0.0, 0.0, 0.0])
        .with_conditions(Conditions::new().with_force(load.x, load.y, load.z));
    let b = place(1, [4.0, -4.0, 0.0]).with_conditions(Conditions::fixed());
    let c = place(2, [-6.928, -4.0, 0.0]).with_conditions(Conditions::fixed());

    let mut frame = Frame::new();
    frame
        .add_elements([
            bar(0, &a, &b, 20e3),
            bar(1, &b, &c, 18e3),
            bar(2, &a, &c, 15e3),
        ])
        .unwrap();
    frame.assemble().unwrap();
    frame
}

#[test]
fn inclined_triangle_truss_matches_planar_one() {
    let planar_load = Vector3::new(5.0, -10.0, 0.0);
    let mut planar = rotated_triangle(&Rotation3::identity(), planar_load);
    let expected = planar.solve().unwrap().node_displacement(0).unwrap();
    let expected = Vector3::new(expected.dx, expected.dy, expected.dz);

    // No apex DOF lines up with the plane's normal, so no diagonal entry vanishes
    let rotation = Rotation3::from_euler_angles(0.4, 0.3, 0.2);
    let mut frame = rotated_triangle(&rotation, rotation * planar_load);
    let solution = frame.solve().unwrap();
    assert!(solution.warnings().is_empty());

    let disp = solution.node_displacement(0).unwrap();
    let rotated = rotation * expected;
    assert_relative_eq!(disp.dx, rotated.x, epsilon = 1e-12);
    assert_relative_eq!(disp.dy, rotated.y, epsilon = 1e-12);
    assert_relative_eq!(disp.dz, rotated.z, epsilon = 1e-12);
    assert_eq!(disp.rotation_magnitude(), 0.0);

    // Nothing moves out of the triangle's plane
    let normal = rotation * Vector3::z();
    assert_relative_eq!(
        Vector3::new(disp.dx, disp.dy, disp.dz).dot(&normal),
        0.0,
        epsilon = 1e-12
    );

    let r1 = solution.node_reactions(1).unwrap();
    let r2 = solution.node_reactions(2).unwrap();
    let load = rotation * planar_load;
    assert_relative_eq!(r1.fx + r2.fx, -load.x, epsilon = 1e-9);
    assert_relative_eq!(r1.fy + r2.fy, -load.y, epsilon = 1e-9);
    assert_relative_eq!(r1.fz + r2.fz, -load.z, epsilon = 1e-9);
}

#[test]
fn load_normal_to_inclined_triangle_is_a_mechanism() {
    let rotation = Rotation3::from_euler_angles(0.4, 0.3, 0.2);
    let mut frame = rotated_triangle(&rotation, rotation * Vector3::new(0.0, 0.0, 1.0));

    let err = frame.solve().unwrap_err();
    assert!(matches!(err, FrameError::Mechanism { node: 0, .. }));
    assert_eq!(err.kind(), ErrorKind::SingularSystem);
    assert!(matches!(frame.solution(), Err(FrameError::NotSolved)));
}

#[test]
fn negligible_unresisted_load_is_reported_as_imbalance() {
    // A 1e-8 transverse load is dropped next to the 100 axial load, leaving it unbalanced
    let assemble = || {
        let support = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
        let end = Node::new(1, 5.0, 0.0, 0.0)
            .with_conditions(Conditions::new().with_force(100.0, 1e-8, 0.0));
        let mut frame = Frame::new();
        frame.add_element(bar(0, &support, &end, 20000.0)).unwrap();
        frame.assemble().unwrap();
        frame
    };

    let mut frame = assemble();
    let solution = frame.solve().unwrap();
    assert!(solution.warnings().is_empty());
    assert_eq!(solution.node_displacement(1).unwrap().dy, 0.0);

    let mut frame = assemble();
    let options = AnalysisOptions::default().with_statics_tolerance(1e-12);
    let solution = frame.solve_with(&options).unwrap();
    match solution.warnings() {
        [NumericalWarning::Equilibrium { imbalance, tolerance }] => {
            assert!(*imbalance > 1e-12 && *imbalance < 1e-9, "imbalance {imbalance}");
            assert_eq!(*tolerance, 1e-12);
        }
        other => panic!("expected one equilibrium warning, got {other:?}"),
    }
    assert_relative_eq!(
        solution.node_displacement(1).unwrap().dx,
        100.0 * 5.0 / (E * 20000.0),
        max_relative = 1e-12
    );
}
