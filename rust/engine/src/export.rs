// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export adapter: serializes `SpatialData` into a versioned JSON
//! interchange document and reads it back.
//!
//! Export is the trust boundary for downstream consumers, so referential
//! and geometric invariants are re-checked here. A violation at this
//! point means a bug upstream and aborts the job with
//! `EngineError::InvariantViolation`; it is never retried.

use serde::{Deserialize, Serialize};

use planrecon_core::{
    EngineError, JobId, Opening, OpeningId, OpeningKind, Point2D, Result, Room, RoomId,
    RoomKind, SpatialData, SpatialVertex, Stage, ValidationStatus, VertexId, Wall, WallId,
    WallKind,
};

const FORMAT: &str = "planrecon.spatial";
const VERSION: u32 = 1;

/// The versioned interchange document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportDocument {
    pub format: String,
    pub version: u32,
    pub vertices: Vec<VertexRecord>,
    pub walls: Vec<WallRecord>,
    pub rooms: Vec<RoomRecord>,
    pub openings: Vec<OpeningRecord>,
    pub extraction_accuracy: f64,
    pub validation_status: ValidationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VertexRecord {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallRecord {
    pub id: WallId,
    pub start: VertexId,
    pub end: VertexId,
    pub thickness: f64,
    pub height: f64,
    pub confidence: f64,
    pub kind: WallKind,
    /// Reserved for downstream material assignment; always empty here.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomRecord {
    pub id: RoomId,
    pub boundary: Vec<VertexId>,
    pub area: f64,
    pub perimeter: f64,
    pub centroid: Point2D,
    pub height: f64,
    pub kind: RoomKind,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningRecord {
    pub id: OpeningId,
    pub wall: WallId,
    pub offset: f64,
    pub width: f64,
    pub kind: OpeningKind,
    pub confidence: f64,
}

/// Serializes the model to the interchange JSON after re-checking its
/// invariants.
pub fn export(job: JobId, data: &SpatialData) -> Result<String> {
    if let Err(detail) = check_invariants(data) {
        return Err(EngineError::InvariantViolation {
            job,
            stage: Stage::Export,
            detail,
        });
    }

    let document = to_document(data);
    serde_json::to_string_pretty(&document).map_err(|e| EngineError::Format(e.to_string()))
}

/// Parses an interchange document back into `SpatialData`. The document's
/// invariants are re-checked: a document that fails them is corrupt.
pub fn import(json: &str) -> Result<SpatialData> {
    let document: ExportDocument =
        serde_json::from_str(json).map_err(|e| EngineError::Format(e.to_string()))?;

    if document.format != FORMAT {
        return Err(EngineError::Format(format!(
            "unknown format {:?}, expected {FORMAT:?}",
            document.format
        )));
    }
    if document.version != VERSION {
        return Err(EngineError::Format(format!(
            "unsupported version {}, expected {VERSION}",
            document.version
        )));
    }

    let data = from_document(document);
    check_invariants(&data).map_err(EngineError::Format)?;
    Ok(data)
}

fn to_document(data: &SpatialData) -> ExportDocument {
    ExportDocument {
        format: FORMAT.to_string(),
        version: VERSION,
        vertices: data
            .vertices
            .iter()
            .map(|v| VertexRecord {
                id: v.id,
                x: v.position.x,
                y: v.position.y,
            })
            .collect(),
        walls: data
            .walls
            .iter()
            .map(|w| WallRecord {
                id: w.id,
                start: w.start,
                end: w.end,
                thickness: w.thickness,
                height: w.height,
                confidence: w.confidence,
                kind: w.kind,
                material: None,
            })
            .collect(),
        rooms: data
            .rooms
            .iter()
            .map(|r| RoomRecord {
                id: r.id,
                boundary: r.boundary.clone(),
                area: r.area,
                perimeter: r.perimeter,
                centroid: r.centroid,
                height: r.height,
                kind: r.kind,
                confidence: r.confidence,
            })
            .collect(),
        openings: data
            .openings
            .iter()
            .map(|o| OpeningRecord {
                id: o.id,
                wall: o.wall,
                offset: o.offset,
                width: o.width,
                kind: o.kind,
                confidence: o.confidence,
            })
            .collect(),
        extraction_accuracy: data.extraction_accuracy,
        validation_status: data.validation_status,
    }
}

fn from_document(document: ExportDocument) -> SpatialData {
    SpatialData {
        vertices: document
            .vertices
            .into_iter()
            .map(|v| SpatialVertex {
                id: v.id,
                position: Point2D::new(v.x, v.y),
            })
            .collect(),
        walls: document
            .walls
            .into_iter()
            .map(|w| Wall {
                id: w.id,
                start: w.start,
                end: w.end,
                thickness: w.thickness,
                height: w.height,
                confidence: w.confidence,
                kind: w.kind,
            })
            .collect(),
        rooms: document
            .rooms
            .into_iter()
            .map(|r| Room {
                id: r.id,
                boundary: r.boundary,
                area: r.area,
                perimeter: r.perimeter,
                centroid: r.centroid,
                height: r.height,
                kind: r.kind,
                confidence: r.confidence,
            })
            .collect(),
        openings: document
            .openings
            .into_iter()
            .map(|o| Opening {
                id: o.id,
                wall: o.wall,
                offset: o.offset,
                width: o.width,
                kind: o.kind,
                confidence: o.confidence,
            })
            .collect(),
        extraction_accuracy: document.extraction_accuracy,
        validation_status: document.validation_status,
    }
}

/// Referential and geometric checks shared by export and import.
fn check_invariants(data: &SpatialData) -> std::result::Result<(), String> {
    const EPS: f64 = 1e-9;

    for pair in data.vertices.windows(2) {
        if pair[0].id >= pair[1].id {
            return Err(format!("vertices not strictly ordered at {}", pair[1].id));
        }
    }

    for wall in &data.walls {
        if wall.start == wall.end {
            return Err(format!("{} starts and ends at {}", wall.id, wall.start));
        }
        for vertex in [wall.start, wall.end] {
            if data.vertex_position(vertex).is_none() {
                return Err(format!("{} references missing {vertex}", wall.id));
            }
        }
        if wall.thickness <= 0.0 || wall.height <= 0.0 {
            return Err(format!("{} has non-positive thickness/height", wall.id));
        }
    }

    for room in &data.rooms {
        if room.boundary.len() < 3 {
            return Err(format!("{} boundary has fewer than 3 vertices", room.id));
        }
        for &vertex in &room.boundary {
            if data.vertex_position(vertex).is_none() {
                return Err(format!("{} references missing {vertex}", room.id));
            }
        }
        if room.area <= 0.0 {
            return Err(format!("{} has non-positive area", room.id));
        }
    }

    for opening in &data.openings {
        let Some(wall) = data.wall(opening.wall) else {
            return Err(format!(
                "{} references missing {}",
                opening.id, opening.wall
            ));
        };
        let length = match (
            data.vertex_position(wall.start),
            data.vertex_position(wall.end),
        ) {
            (Some(a), Some(b)) => a.distance_to(&b),
            _ => return Err(format!("{} host wall has missing vertices", opening.id)),
        };
        if opening.width <= 0.0 {
            return Err(format!("{} has non-positive width", opening.id));
        }
        if opening.offset < 0.0 || opening.offset + opening.width > length + EPS {
            return Err(format!(
                "{} spans [{:.3}, {:.3}] outside wall length {length:.3}",
                opening.id,
                opening.offset,
                opening.offset + opening.width
            ));
        }
    }

    if !(0.0..=1.0).contains(&data.extraction_accuracy) {
        return Err(format!(
            "extraction accuracy {} outside [0, 1]",
            data.extraction_accuracy
        ));
    }

    Ok(())
}
