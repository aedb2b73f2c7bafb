//! Request layer - JSON node/element records in, formatted results out
//!
//! Node ids arrive as strings of the form `"node-<n>"` (or a bare `"<n>"`); the numeric
//! part becomes the node id used for DOF numbering. Elements are numbered by their
//! position in the request.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOptions, Interpolation};
use crate::elements::{Conditions, Element, Material, Node, Section};
use crate::error::{ErrorKind, FrameError, FrameResult};
use crate::frame::Frame;
use crate::results::{AnalysisSummary, DofValue, MemberForces, NumericalWarning};

fn default_deformation_scale() -> f64 {
    AnalysisOptions::default().deformation_scale
}

/// Parse `"node-<n>"` or `"<n>"` into a node id
pub fn parse_node_id(id: &str) -> FrameResult<usize> {
    id.strip_prefix("node-")
        .unwrap_or(id)
        .parse()
        .map_err(|_| FrameError::InvalidInput(format!("node id '{id}' is not of the form node-<n>")))
}

/// Loads and prescribed displacements of a node; omitted or null keys leave the DOF
/// free with zero load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionRecord {
    #[serde(rename = "F_x")]
    pub f_x: Option<f64>,
    #[serde(rename = "F_y")]
    pub f_y: Option<f64>,
    #[serde(rename = "F_z")]
    pub f_z: Option<f64>,
    #[serde(rename = "M_x")]
    pub m_x: Option<f64>,
    #[serde(rename = "M_y")]
    pub m_y: Option<f64>,
    #[serde(rename = "M_z")]
    pub m_z: Option<f64>,
    pub u_x: Option<f64>,
    pub u_y: Option<f64>,
    pub u_z: Option<f64>,
    pub theta_x: Option<f64>,
    pub theta_y: Option<f64>,
    pub theta_z: Option<f64>,
}

impl ConditionRecord {
    pub fn to_conditions(&self, node: usize) -> FrameResult<Conditions> {
        let loads = [self.f_x, self.f_y, self.f_z, self.m_x, self.m_y, self.m_z];
        let displacements = [
            self.u_x,
            self.u_y,
            self.u_z,
            self.theta_x,
            self.theta_y,
            self.theta_z,
        ];
        Conditions::from_parts(loads, displacements).map_err(|dof| {
            FrameError::ConflictingCondition {
                node,
                dof: dof.displacement_name(),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(rename = "loadingBC", default)]
    pub loading_bc: ConditionRecord,
}

impl NodeRecord {
    pub fn to_node(&self) -> FrameResult<Node> {
        let id = parse_node_id(&self.id)?;
        let conditions = self.loading_bc.to_conditions(id)?;
        Ok(Node::new(id, self.x, self.y, self.z).with_conditions(conditions))
    }
}

/// Material and section values of an element
///
/// The defaults are placeholders carried over from the interactive front end, not
/// physical properties of any real member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementProperties {
    #[serde(rename = "E")]
    pub e: f64,
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "Iy")]
    pub iy: f64,
    #[serde(rename = "Iz")]
    pub iz: f64,
    #[serde(rename = "J")]
    pub j: f64,
    pub nu: f64,
    pub local_z: Option<[f64; 3]>,
}

impl Default for ElementProperties {
    fn default() -> Self {
        let material = Material::default();
        let section = Section::default();
        Self {
            e: material.e,
            a: section.a,
            iy: section.iy,
            iz: section.iz,
            j: section.j,
            nu: material.nu,
            local_z: None,
        }
    }
}

impl ElementProperties {
    pub fn material(&self) -> Material {
        Material::new(self.e, self.nu)
    }

    pub fn section(&self) -> Section {
        Section::new(self.a, self.iy, self.iz, self.j)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "nodeIds")]
    pub node_ids: Vec<String>,
    #[serde(default)]
    pub properties: ElementProperties,
}

/// A complete analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(rename = "deformationScale", default = "default_deformation_scale")]
    pub deformation_scale: f64,
    #[serde(default)]
    pub samples: Option<usize>,
    #[serde(default)]
    pub interpolation: Option<Interpolation>,
}

impl AnalysisRequest {
    /// Analysis options implied by the request
    pub fn options(&self) -> AnalysisOptions {
        let mut options = AnalysisOptions::default().with_scale(self.deformation_scale);
        if let Some(samples) = self.samples {
            options = options.with_samples(samples);
        }
        if let Some(interpolation) = self.interpolation {
            options = options.with_interpolation(interpolation);
        }
        options
    }

    /// Build the frame described by the request, without assembling it
    pub fn build_frame(&self) -> FrameResult<Frame> {
        if self.nodes.is_empty() {
            return Err(FrameError::InvalidInput("request has no nodes".to_string()));
        }
        if self.elements.is_empty() {
            return Err(FrameError::InvalidInput(
                "request has no elements to analyze".to_string(),
            ));
        }

        let mut nodes: BTreeMap<usize, Arc<Node>> = BTreeMap::new();
        for record in &self.nodes {
            let node = record.to_node()?;
            if let Some(existing) = nodes.get(&node.id) {
                if **existing != node {
                    return Err(FrameError::DuplicateNode { node: node.id });
                }
                continue;
            }
            nodes.insert(node.id, Arc::new(node));
        }

        let mut frame = Frame::new();
        for (index, record) in self.elements.iter().enumerate() {
            let [i_id, j_id] = record.node_ids.as_slice() else {
                return Err(FrameError::WrongNodeCount {
                    element: record
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("element-{index}")),
                    found: record.node_ids.len(),
                });
            };

            let lookup = |id: &String| -> FrameResult<Arc<Node>> {
                nodes
                    .get(&parse_node_id(id)?)
                    .cloned()
                    .ok_or_else(|| FrameError::NodeNotFound(id.clone()))
            };

            let properties = &record.properties;
            let mut element = Element::new(
                index,
                lookup(i_id)?,
                lookup(j_id)?,
                properties.material(),
                properties.section(),
            )?;
            if let Some(local_z) = properties.local_z {
                element = element.with_local_z(local_z)?;
            }
            debug!(
                "Element {index}: E={}, A={}, Iy={}, Iz={}, J={}, nu={}, local_z={:?}",
                properties.e,
                properties.a,
                properties.iy,
                properties.iz,
                properties.j,
                properties.nu,
                properties.local_z
            );
            frame.add_element(element)?;
        }

        let unused = nodes.len() - frame.node_count();
        if unused > 0 {
            debug!("{unused} node(s) are not connected to any element and were skipped");
        }

        Ok(frame)
    }
}

/// Deformed centerline of one element
#[derive(Debug, Clone, Serialize)]
pub struct ElementShape {
    pub element_index: usize,
    pub shape_data: Vec<[f64; 3]>,
    /// Deformed i-node and j-node positions
    pub deformed_nodes: [[f64; 3]; 2],
}

/// Internal forces at both ends of one element
#[derive(Debug, Clone, Serialize)]
pub struct ElementForces {
    pub element_index: usize,
    pub i_node: MemberForces,
    pub j_node: MemberForces,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormattedResults {
    pub displacements: Vec<DofValue>,
    pub reactions: Vec<DofValue>,
}

/// Results of a successful analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    pub analysis_results: FormattedResults,
    pub node_count: usize,
    pub element_count: usize,
    pub deformed_shapes: Vec<ElementShape>,
    pub member_forces: Vec<ElementForces>,
    pub summary: AnalysisSummary,
    pub warnings: Vec<NumericalWarning>,
}

/// Parse a raw JSON request body
pub fn parse_request(body: &[u8]) -> FrameResult<AnalysisRequest> {
    Ok(serde_json::from_slice(body)?)
}

/// Parse and run a raw request body, folding every failure into the response
pub fn respond(body: &[u8]) -> AnalysisResponse {
    AnalysisResponse::from(parse_request(body).and_then(|request| run_analysis(&request)))
}

/// Run a request end to end: build, assemble, solve and post-process
pub fn run_analysis(request: &AnalysisRequest) -> FrameResult<AnalysisResults> {
    info!(
        "Received {} nodes and {} elements with deformation scale {}",
        request.nodes.len(),
        request.elements.len(),
        request.deformation_scale
    );

    let options = request.options();
    options.validate()?;
    let mut frame = request.build_frame()?;
    frame.assemble()?;
    frame.solve_with(&options)?;
    let solution = frame.solution()?;

    let deformed_shapes = frame
        .deformed_shapes(&options)?
        .into_iter()
        .map(|shape| ElementShape {
            element_index: shape.element,
            deformed_nodes: [shape.start, shape.end],
            shape_data: shape.points,
        })
        .collect();

    let member_forces = frame
        .elements()
        .iter()
        .map(|element| {
            let (i_node, j_node) = frame.member_forces(element.id())?;
            Ok(ElementForces {
                element_index: element.id(),
                i_node,
                j_node,
            })
        })
        .collect::<FrameResult<Vec<_>>>()?;

    Ok(AnalysisResults {
        analysis_results: FormattedResults {
            displacements: solution.displacement_records(),
            reactions: solution.reaction_records(),
        },
        node_count: request.nodes.len(),
        element_count: request.elements.len(),
        deformed_shapes,
        member_forces,
        summary: solution.summary(),
        warnings: solution.warnings().to_vec(),
    })
}

/// Response envelope returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisResponse {
    Success {
        message: String,
        results: AnalysisResults,
    },
    Error {
        kind: ErrorKind,
        error: String,
    },
}

impl AnalysisResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResponse::Success { .. })
    }
}

impl From<FrameResult<AnalysisResults>> for AnalysisResponse {
    fn from(result: FrameResult<AnalysisResults>) -> Self {
        match result {
            Ok(results) => AnalysisResponse::Success {
                message: "Calculations completed successfully".to_string(),
                results,
            },
            Err(e) => AnalysisResponse::Error {
                kind: e.kind(),
                error: e.to_string(),
            },
        }
    }
}
