//! Frame Solver Example - three-bar truss and a portal frame

use frame_solver::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    truss()?;
    portal_frame()?;

    println!("\n=== Analysis Complete ===");
    Ok(())
}

/// Three axial-only bars meeting at a loaded apex
///
///          a (free, loaded)
///         / \
///        /   \
///       c --- b
///   (fixed)  (fixed)
fn truss() -> anyhow::Result<()> {
    println!("=== Frame Solver Example: Three-Bar Truss ===\n");

    let a = Node::new(0, 0.0, 0.0, 0.0)
        .with_conditions(Conditions::new().with_force(5.0, -10.0, 0.0));
    let b = Node::new(1, 4.0, -4.0, 0.0).with_conditions(Conditions::fixed());
    let c = Node::new(2, -6.928, -4.0, 0.0).with_conditions(Conditions::fixed());

    let steel = Material::new(200.0, 0.3);
    let elements = vec![
        Element::new(0, a.clone(), b.clone(), steel, Section::truss(20e3))?,
        Element::new(1, b, c.clone(), steel, Section::truss(18e3))?,
        Element::new(2, a, c, steel, Section::truss(15e3))?,
    ];

    println!("Global stiffness of bar a-b (translational block at a):");
    let k = elements[0].global_stiffness();
    for row in 0..3 {
        println!(
            "  [{:>10.2} {:>10.2} {:>10.2}]",
            k[(row, 0)],
            k[(row, 1)],
            k[(row, 2)]
        );
    }

    let mut frame = Frame::new();
    frame.add_elements(elements)?;
    frame.assemble()?;
    let solution = frame.solve()?;

    let disp = solution.node_displacement(0)?;
    println!("\nApex displacement: DX={:.6e}, DY={:.6e}", disp.dx, disp.dy);

    println!("\nSupport Reactions:");
    for id in [1, 2] {
        let rxn = solution.node_reactions(id)?;
        println!("  Node {}: FX={:.4}, FY={:.4}", id, rxn.fx, rxn.fy);
    }

    println!("\nBar Forces (positive = tension):");
    for element in frame.elements() {
        let (forces_i, _) = frame.member_forces(element.id())?;
        println!("  Bar {}: N={:.4}", element.id(), forces_i.axial);
    }

    Ok(())
}

/// Portal frame with a lateral load at the roof
///
///     N2 -------- N3
///     |          |
///     |          |
///     N0        N1
///   Fixed     Fixed
fn portal_frame() -> anyhow::Result<()> {
    println!("\n=== Frame Solver Example: Portal Frame ===\n");

    let height = 4.0;
    let span = 6.0;
    let gravity = -span * 20000.0 / 2.0;

    let n0 = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
    let n1 = Node::new(1, span, 0.0, 0.0).with_conditions(Conditions::fixed());
    let n2 = Node::new(2, 0.0, height, 0.0)
        .with_conditions(Conditions::new().with_force(10000.0, gravity, 0.0));
    let n3 = Node::new(3, span, height, 0.0)
        .with_conditions(Conditions::new().with_force(0.0, gravity, 0.0));

    // W12x26 (approximate properties)
    let section = Section::new(0.00494, 8.49e-5, 7.2e-6, 1.25e-7);
    let steel = Material::steel();

    let mut frame = Frame::new();
    frame.add_elements([
        Element::new(0, n0, n2.clone(), steel, section)?,
        Element::new(1, n1, n3.clone(), steel, section)?,
        Element::new(2, n2, n3, steel, section)?,
    ])?;
    frame.assemble()?;

    let options = AnalysisOptions::default().with_scale(100.0).with_samples(5);
    let solution = frame.solve_with(&options)?;

    println!("Node Displacements:");
    for id in 0..4 {
        let disp = solution.node_displacement(id)?;
        println!(
            "  N{}: DX={:.4}mm, DY={:.4}mm, RZ={:.6}rad",
            id,
            disp.dx * 1000.0,
            disp.dy * 1000.0,
            disp.rz
        );
    }

    println!("\nSupport Reactions:");
    for id in [0, 1] {
        let rxn = solution.node_reactions(id)?;
        println!(
            "  N{}: FX={:.2}kN, FY={:.2}kN, MZ={:.2}kN·m",
            id,
            rxn.fx / 1000.0,
            rxn.fy / 1000.0,
            rxn.mz / 1000.0
        );
    }

    let summary = solution.summary();
    println!("\nSummary:");
    println!(
        "  Max displacement: {:.4}mm at node {:?}",
        summary.max_displacement * 1000.0,
        summary.max_disp_node
    );
    println!(
        "  Max reaction: {:.2}kN at node {:?}",
        summary.max_reaction / 1000.0,
        summary.max_reaction_node
    );
    for warning in solution.warnings() {
        println!("  Warning: {warning}");
    }

    println!("\nDeformed beam (x{}):", options.deformation_scale);
    let shapes = frame.deformed_shapes(&options)?;
    for point in &shapes[2].points {
        println!("  ({:.4}, {:.4}, {:.4})", point[0], point[1], point[2]);
    }

    Ok(())
}
