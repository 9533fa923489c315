// SPDX-License-Identifier: GPL-3.0-only

//! GLB (binary glTF) mesh export
//!
//! Writes a point grid as a single indexed triangle primitive. Origin is at
//! the camera, units are metres.

use crate::constants::app_info;
use crate::errors::ExportError;
use crate::mesh::PointGrid;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// GLB magic "glTF"
const GLB_MAGIC: &[u8; 4] = b"glTF";
/// Chunk type "JSON"
const CHUNK_JSON: u32 = 0x4E4F534A;
/// Chunk type "BIN\0"
const CHUNK_BIN: u32 = 0x004E4942;

/// glTF accessor component types and buffer targets
const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Export a point grid as a GLB file
pub async fn export_mesh_glb(grid: &PointGrid, output_path: &Path) -> Result<(), ExportError> {
    let grid = grid.clone();
    let output_path = output_path.to_path_buf();

    tokio::task::spawn_blocking(move || write_glb(&grid, &output_path)).await?
}

fn write_glb(grid: &PointGrid, output_path: &PathBuf) -> Result<(), ExportError> {
    let glb = encode_glb(grid)?;

    info!(
        vertex_count = grid.points.len(),
        triangle_count = grid.triangle_count(),
        bytes = glb.len(),
        path = %output_path.display(),
        "Exporting mesh"
    );

    std::fs::write(output_path, glb)?;

    debug!(path = %output_path.display(), "GLB export complete");
    Ok(())
}

/// Encode a point grid as GLB bytes
pub fn encode_glb(grid: &PointGrid) -> Result<Vec<u8>, ExportError> {
    let (min_pos, max_pos) = grid.bounds().ok_or(ExportError::Empty)?;
    if grid.indices.is_empty() {
        return Err(ExportError::Empty);
    }

    // Buffer layout: positions | indices (both 4-byte aligned by construction)
    let mut bin: Vec<u8> =
        Vec::with_capacity(grid.points.len() * 12 + grid.indices.len() * 4);
    if cfg!(target_endian = "little") {
        bin.extend_from_slice(grid.position_bytes());
    } else {
        for p in &grid.points {
            for c in p.to_array() {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
    }
    let position_len = bin.len();
    for i in grid.indices.iter() {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let index_len = bin.len() - position_len;

    let gltf_json = serde_json::json!({
        "asset": {
            "generator": app_info::generator(),
            "version": "2.0"
        },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{
            "primitives": [{
                "attributes": { "POSITION": 0 },
                "indices": 1,
                "mode": 4
            }]
        }],
        "accessors": [
            {
                "bufferView": 0,
                "byteOffset": 0,
                "componentType": COMPONENT_FLOAT,
                "count": grid.points.len(),
                "type": "VEC3",
                "min": min_pos.to_array(),
                "max": max_pos.to_array()
            },
            {
                "bufferView": 1,
                "byteOffset": 0,
                "componentType": COMPONENT_UNSIGNED_INT,
                "count": grid.indices.len(),
                "type": "SCALAR"
            }
        ],
        "bufferViews": [
            {
                "buffer": 0,
                "byteOffset": 0,
                "byteLength": position_len,
                "byteStride": 12,
                "target": TARGET_ARRAY_BUFFER
            },
            {
                "buffer": 0,
                "byteOffset": position_len,
                "byteLength": index_len,
                "target": TARGET_ELEMENT_ARRAY_BUFFER
            }
        ],
        "buffers": [{ "byteLength": bin.len() }]
    });

    let json_string = serde_json::to_string(&gltf_json)
        .map_err(|e| ExportError::Encode(format!("glTF JSON: {}", e)))?;
    let json_bytes = json_string.as_bytes();

    // JSON chunk is padded with spaces, BIN chunk with zeros
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;
    let bin_padding = (4 - (bin.len() % 4)) % 4;
    let padded_bin_len = bin.len() + bin_padding;

    let total_length = 12 + 8 + padded_json_len + 8 + padded_bin_len;
    let total_u32 = u32::try_from(total_length)
        .map_err(|_| ExportError::Encode("mesh exceeds 4 GiB GLB limit".to_string()))?;

    let mut glb: Vec<u8> = Vec::with_capacity(total_length);

    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&total_u32.to_le_bytes());

    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(0x20u8, json_padding));

    glb.extend_from_slice(&(padded_bin_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(&bin);
    glb.extend(std::iter::repeat_n(0u8, bin_padding));

    Ok(glb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::{DepthFrame, Intrinsics};
    use crate::mesh::{UnprojectParams, build_point_grid};

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn grid() -> PointGrid {
        let frame = DepthFrame::filled(3, 3, 1.5).unwrap();
        build_point_grid(
            &frame,
            3,
            3,
            &UnprojectParams::default(),
            &Intrinsics::new(10.0, 10.0, 1.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_glb_layout() {
        let grid = grid();
        let glb = encode_glb(&grid).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32_at(&glb, 4), 2);
        assert_eq!(u32_at(&glb, 8) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);

        let json_len = u32_at(&glb, 12) as usize;
        assert_eq!(u32_at(&glb, 16), CHUNK_JSON);
        assert_eq!(json_len % 4, 0);

        let json: serde_json::Value =
            serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
        assert_eq!(json["accessors"][0]["count"], 9);
        assert_eq!(json["accessors"][1]["count"], 24);

        let bin_header = 20 + json_len;
        let bin_len = u32_at(&glb, bin_header) as usize;
        assert_eq!(u32_at(&glb, bin_header + 4), CHUNK_BIN);
        assert_eq!(bin_len, 9 * 12 + 24 * 4);

        // First index after the positions
        let first_index = bin_header + 8 + 9 * 12;
        assert_eq!(u32_at(&glb, first_index), 0);
        assert_eq!(u32_at(&glb, first_index + 4), 3);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let mut grid = grid();
        grid.points.clear();
        assert!(matches!(encode_glb(&grid), Err(ExportError::Empty)));
    }
}
