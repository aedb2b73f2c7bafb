use approx::assert_relative_eq;
use frame_solver::prelude::*;

/// Space frame: two columns, a beam and an out-of-plane cantilever, mixed loads
fn space_frame() -> Frame {
    let steel = Material::steel();
    let column = Section::rectangular(0.3, 0.3);
    let beam = Section::rectangular(0.2, 0.4);

    let n0 = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
    let n1 = Node::new(1, 6.0, 0.0, 0.0).with_conditions(Conditions::pinned());
    let n2 = Node::new(2, 0.0, 0.0, 4.0).with_conditions(
        Conditions::new()
            .with_force(12e3, -3e3, -20e3)
            .with_load(Dof::Rz, 1.5e3),
    );
    let n3 = Node::new(3, 6.0, 0.0, 4.0)
        .with_conditions(Conditions::new().with_force(0.0, 5e3, -20e3));
    let n4 = Node::new(4, 6.0, 3.0, 4.0)
        .with_conditions(Conditions::new().with_load(Dof::Uz, -8e3));

    let mut frame = Frame::new();
    frame
        .add_elements([
            Element::new(0, n0, n2.clone(), steel, column).unwrap(),
            Element::new(1, n1, n3.clone(), steel, column).unwrap(),
            Element::new(2, n2, n3.clone(), steel, beam).unwrap(),
            Element::new(3, n3, n4, steel, beam)
                .unwrap()
                .with_local_z([1.0, 0.0, 1.0])
                .unwrap(),
        ])
        .unwrap();
    frame.assemble().unwrap();
    frame
}

#[test]
fn unloaded_structure_stays_at_rest() {
    let base = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
    let tip = Node::new(1, 0.0, 2.0, 1.0);
    let mut frame = Frame::new();
    frame
        .add_element(Element::new(0, base, tip, Material::default(), Section::default()).unwrap())
        .unwrap();
    frame.assemble().unwrap();
    let solution = frame.solve().unwrap();

    assert!(solution.displacements().iter().all(|v| *v == 0.0));
    assert!(solution.reactions().iter().all(|v| *v == 0.0));
    assert!(solution.warnings().is_empty());
}

#[test]
fn loads_and_reactions_balance_on_all_axes() {
    let mut frame = space_frame();
    frame.solve().unwrap();
    let solution = frame.solution().unwrap();
    assert!(
        solution.warnings().is_empty(),
        "unexpected warnings: {:?}",
        solution.warnings()
    );

    let resultant = frame.resultant().unwrap();
    for component in resultant {
        assert_relative_eq!(component, 0.0, epsilon = 1e-4);
    }

    // Vertical reactions carry the total vertical load
    let fz: f64 = [0, 1]
        .iter()
        .map(|&id| solution.node_reactions(id).unwrap().fz)
        .sum();
    assert_relative_eq!(fz, 48e3, max_relative = 1e-9);

    // Pinned support transmits no moment
    let pinned = solution.node_reactions(1).unwrap();
    assert_eq!(pinned.moment_magnitude(), 0.0);
}

#[test]
fn internal_work_equals_external_work() {
    let mut frame = space_frame();
    frame.solve().unwrap();

    let k = frame.stiffness_matrix().unwrap();
    let f = frame.load_vector().unwrap();
    let delta = frame.solution().unwrap().displacements();

    let internal = delta.dot(&(k * delta));
    let external = delta.dot(f);
    assert!(internal > 0.0);
    assert_relative_eq!(internal, external, max_relative = 1e-8);
}

#[test]
fn stiffness_matrix_is_symmetric() {
    let frame = space_frame();
    let k = frame.stiffness_matrix().unwrap();
    assert_eq!(k.nrows(), 30);
    let scale = k.amax();
    for i in 0..k.nrows() {
        for j in 0..i {
            assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-12 * scale);
        }
    }
}

#[test]
fn deformed_shape_endpoints_follow_nodes() {
    let mut frame = space_frame();
    frame.solve().unwrap();
    let solution = frame.solution().unwrap();

    for interpolation in [Interpolation::Linear, Interpolation::Hermite] {
        let options = AnalysisOptions::default()
            .with_scale(25.0)
            .with_samples(9)
            .with_interpolation(interpolation);
        let shapes = frame.deformed_shapes(&options).unwrap();
        assert_eq!(shapes.len(), frame.elements().len());

        for (shape, element) in shapes.iter().zip(frame.elements()) {
            assert_eq!(shape.element, element.id());
            assert_eq!(shape.points.len(), 9);
            for (node, point) in [(element.i_node(), shape.start), (element.j_node(), shape.end)] {
                let d = solution.node_displacement(node.id).unwrap();
                assert_relative_eq!(point[0], node.x + 25.0 * d.dx, epsilon = 1e-12);
                assert_relative_eq!(point[1], node.y + 25.0 * d.dy, epsilon = 1e-12);
                assert_relative_eq!(point[2], node.z + 25.0 * d.dz, epsilon = 1e-12);
            }
            assert_eq!(shape.points[0], shape.start);
            assert_eq!(shape.points[8], shape.end);
        }
    }
}

#[test]
fn unstable_structure_is_rejected() {
    // Translations held at both ends; nothing resists twisting about the axis
    let a = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::pinned());
    let b = Node::new(1, 4.0, 0.0, 0.0).with_conditions(
        Conditions::pinned().with_load(Dof::Rz, 10.0),
    );

    let mut frame = Frame::new();
    frame
        .add_element(Element::new(0, a, b, Material::steel(), Section::rectangular(0.2, 0.2)).unwrap())
        .unwrap();
    frame.assemble().unwrap();

    let err = frame.solve().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SingularSystem);
    assert!(matches!(err, FrameError::SingularMatrix { .. }));
    assert!(matches!(frame.solution(), Err(FrameError::NotSolved)));
}

#[test]
fn lifecycle_is_enforced() {
    let mut frame = space_frame();
    assert!(matches!(
        frame.add_element(
            Element::new(
                9,
                Node::new(7, 0.0, 0.0, 0.0),
                Node::new(8, 1.0, 0.0, 0.0),
                Material::default(),
                Section::default()
            )
            .unwrap()
        ),
        Err(FrameError::AlreadyAssembled)
    ));

    frame.solve().unwrap();
    assert!(frame.is_solved());
    assert!(matches!(frame.solve(), Err(FrameError::AlreadySolved)));
    assert!(matches!(frame.assemble(), Err(FrameError::AlreadySolved)));

    let mut fresh = Frame::new();
    assert!(matches!(fresh.solve(), Err(FrameError::NotAssembled)));
    assert!(matches!(fresh.resultant(), Err(FrameError::NotSolved)));
    assert!(matches!(fresh.member_forces(0), Err(FrameError::ElementNotFound(0))));
}
