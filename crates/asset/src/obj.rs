//! OBJ loader: positions, normals, texture coordinates, groups and materials.
//!
//! Parsing keeps the file's own attribute numbering; [`ObjDocument::to_mesh`]
//! then collapses face corners with identical (position, normal, texcoord)
//! index triplets into one vertex, in first-seen order.

use std::{
    collections::{HashMap, hash_map::Entry},
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{Attribute, MeshError, MeshResult},
    material::{self, MaterialInfo},
    mesh::{DEFAULT_NORMAL, Mesh, MeshVertex},
};

/// How malformed input is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Fail on the first unreadable file or malformed line.
    Strict,
    /// Log the problem, skip it and keep whatever parsed.
    #[default]
    Lenient,
}

/// Zero-based attribute indices of one face corner. This is the dedup key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    pub position: u32,
    pub normal: Option<u32>,
    pub texcoord: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub corners: [AttributeKey; 3],
    /// 1-based source line of the face it came from.
    pub line: usize,
}

/// Run of faces sharing a group name and material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub name: String,
    pub material: Option<String>,
    pub triangles: Vec<Triangle>,
}

/// Parsed OBJ contents before deduplication.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjDocument {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub shapes: Vec<Shape>,
    /// `mtllib` file names, as written.
    pub material_libs: Vec<String>,
    /// Diagnostics for input skipped in lenient mode.
    pub warnings: Vec<String>,
}

/// A loaded OBJ: the deduplicated mesh and its materials.
#[derive(Clone, Debug, Default)]
pub struct ObjAsset {
    pub mesh: Mesh,
    pub materials: Vec<MaterialInfo>,
    pub warnings: Vec<String>,
}

impl Mesh {
    /// Load an OBJ file leniently.
    ///
    /// A missing or malformed file is reported through the log and yields an
    /// empty or partial mesh. A face pointing past the parsed attributes is
    /// still an error.
    pub fn load_from_file(path: impl AsRef<Path>) -> MeshResult<Mesh> {
        load_obj(path, ParseMode::Lenient).map(|asset| asset.mesh)
    }
}

/// Load an OBJ mesh and its material libraries from a file path.
pub fn load_obj(path: impl AsRef<Path>, mode: ParseMode) -> MeshResult<ObjAsset> {
    let path = path.as_ref();
    let name = path.display().to_string();

    let doc = match File::open(path) {
        Ok(file) => parse_obj(BufReader::new(file), &name, mode)?,
        Err(source) => {
            let err = MeshError::Io { path: name, source };
            if mode == ParseMode::Strict {
                return Err(err);
            }
            log::warn!("{}", err);
            return Ok(ObjAsset {
                warnings: vec![err.to_string()],
                ..Default::default()
            });
        }
    };

    let mesh = doc.to_mesh()?;
    let base_dir = path.parent();
    let mut materials = Vec::new();
    for lib in &doc.material_libs {
        let mtl_path = base_dir.map_or_else(|| Path::new(lib).to_path_buf(), |dir| dir.join(lib));
        match material::load_mtl(&mtl_path) {
            Ok(found) => materials.extend(found),
            Err(e) => log::warn!("Failed to load material library {}: {}", mtl_path.display(), e),
        }
    }

    log::info!(
        "Loaded OBJ {}: {} shapes, {} vertices, {} triangles, {} materials",
        name,
        doc.shapes.len(),
        mesh.vertex_count(),
        mesh.triangle_count(),
        materials.len()
    );

    Ok(ObjAsset {
        mesh,
        materials,
        warnings: doc.warnings,
    })
}

/// Load an OBJ mesh from a [`BufRead`] implementation. Material libraries are ignored.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> MeshResult<Mesh> {
    parse_obj(reader, "<reader>", ParseMode::Strict)?.to_mesh()
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> MeshResult<Mesh> {
    parse_obj(io::Cursor::new(contents), "<string>", ParseMode::Strict)?.to_mesh()
}

/// Parse OBJ text into an [`ObjDocument`]. `name` labels diagnostics.
pub fn parse_obj<R: BufRead>(reader: R, name: &str, mode: ParseMode) -> MeshResult<ObjDocument> {
    let mut doc = ObjDocument::default();
    let mut current = Shape::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = match line {
            Ok(line) => line,
            Err(source) => {
                let err = MeshError::Io {
                    path: name.to_string(),
                    source,
                };
                if mode == ParseMode::Strict {
                    return Err(err);
                }
                log::warn!("{}; keeping the first {} lines", err, line_no - 1);
                doc.warnings.push(err.to_string());
                break;
            }
        };

        let message = match parse_line(&mut doc, &mut current, line.trim(), line_no) {
            Ok(()) => continue,
            Err(LineError::Malformed(message)) => message,
            Err(LineError::OutOfRange {
                attribute,
                index,
                available,
            }) => {
                return Err(MeshError::IndexOutOfRange {
                    shape: current.name.clone(),
                    line: line_no,
                    attribute,
                    index,
                    available,
                });
            }
        };
        let err = MeshError::Syntax {
            path: name.to_string(),
            line: line_no,
            message,
        };
        if mode == ParseMode::Strict {
            return Err(err);
        }
        log::warn!("{}", err);
        doc.warnings.push(err.to_string());
    }
    flush_shape(&mut doc, &mut current, None);

    Ok(doc)
}

/// Why a line was rejected. Out-of-range indices abort the load in every mode.
#[derive(Debug)]
enum LineError {
    Malformed(String),
    OutOfRange {
        attribute: Attribute,
        index: i64,
        available: usize,
    },
}

impl From<String> for LineError {
    fn from(message: String) -> Self {
        LineError::Malformed(message)
    }
}

fn parse_line(
    doc: &mut ObjDocument,
    current: &mut Shape,
    line: &str,
    line_no: usize,
) -> Result<(), LineError> {
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let mut parts = line.split_whitespace();
    let Some(tag) = parts.next() else {
        return Ok(());
    };

    match tag {
        "v" => {
            let x = parse_f32(parts.next(), "x coordinate")?;
            let y = parse_f32(parts.next(), "y coordinate")?;
            let z = parse_f32(parts.next(), "z coordinate")?;
            doc.positions.push([x, y, z]);
        }
        "vt" => {
            let u = parse_f32(parts.next(), "u coordinate")?;
            let v = match parts.next() {
                Some(token) => parse_f32(Some(token), "v coordinate")?,
                None => 0.0,
            };
            doc.texcoords.push([u, v]);
        }
        "vn" => {
            let nx = parse_f32(parts.next(), "nx coordinate")?;
            let ny = parse_f32(parts.next(), "ny coordinate")?;
            let nz = parse_f32(parts.next(), "nz coordinate")?;
            doc.normals.push([nx, ny, nz]);
        }
        "f" => {
            let corners = parts
                .map(|token| parse_corner(token, doc))
                .collect::<Result<Vec<_>, _>>()?;
            if corners.len() < 3 {
                return Err(format!("face needs at least 3 corners, got {}", corners.len()).into());
            }
            // Triangulate fan
            for i in 1..(corners.len() - 1) {
                current.triangles.push(Triangle {
                    corners: [corners[0], corners[i], corners[i + 1]],
                    line: line_no,
                });
            }
        }
        "o" | "g" => {
            let name = parts.collect::<Vec<_>>().join(" ");
            flush_shape(doc, current, Some(name));
        }
        "usemtl" => {
            let material = parts.next().map(str::to_string);
            if current.material != material {
                let name = current.name.clone();
                flush_shape(doc, current, Some(name));
                current.material = material;
            }
        }
        "mtllib" => doc.material_libs.extend(parts.map(str::to_string)),
        _ => {
            // Ignore other directives (s/l/p/vp/etc.)
        }
    }
    Ok(())
}

/// Move `current` into the document if it has faces and start a new shape.
fn flush_shape(doc: &mut ObjDocument, current: &mut Shape, next_name: Option<String>) {
    let material = current.material.clone();
    let finished = std::mem::take(current);
    if !finished.triangles.is_empty() {
        doc.shapes.push(finished);
    }
    if let Some(name) = next_name {
        current.name = name;
    }
    current.material = material;
}

fn parse_f32(value: Option<&str>, what: &str) -> Result<f32, String> {
    let token = value.ok_or_else(|| format!("missing {}", what))?;
    token
        .parse::<f32>()
        .map_err(|e| format!("failed to parse {} '{}': {}", what, token, e))
}

fn parse_corner(token: &str, doc: &ObjDocument) -> Result<AttributeKey, LineError> {
    let mut split = token.split('/');
    let position = match split.next() {
        Some(value) if !value.is_empty() => {
            resolve_index(value, doc.positions.len(), Attribute::Position)?
        }
        _ => return Err(format!("malformed face element '{}'", token).into()),
    };

    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(
            value,
            doc.texcoords.len(),
            Attribute::TexCoord,
        )?),
        _ => None,
    };

    let normal = match split.next() {
        Some(value) if !value.is_empty() => {
            Some(resolve_index(value, doc.normals.len(), Attribute::Normal)?)
        }
        _ => None,
    };

    Ok(AttributeKey {
        position,
        normal,
        texcoord,
    })
}

/// Turn a 1-based (or negative, relative) OBJ index into a 0-based one.
///
/// A relative index reaching before the first element, or an index past
/// `u32`, is out of range. Other forward references are bounds-checked when
/// the mesh is built.
fn resolve_index(token: &str, len: usize, attribute: Attribute) -> Result<u32, LineError> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| format!("invalid index '{}'", token))?;
    if raw == 0 {
        return Err("OBJ indices are 1-based; found 0".to_string().into());
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };
    u32::try_from(idx).map_err(|_| LineError::OutOfRange {
        attribute,
        index: raw,
        available: len,
    })
}

impl ObjDocument {
    /// Deduplicate face corners into an indexed mesh.
    ///
    /// Corners with identical index triplets share one vertex, numbered in the
    /// order they are first seen across all shapes.
    pub fn to_mesh(&self) -> MeshResult<Mesh> {
        let corner_count: usize = self.shapes.iter().map(|s| s.triangles.len() * 3).sum();
        let mut unique: HashMap<AttributeKey, u32> = HashMap::new();
        let mut vertices: Vec<MeshVertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::with_capacity(corner_count);

        for shape in &self.shapes {
            for triangle in &shape.triangles {
                for key in triangle.corners {
                    let index = match unique.entry(key) {
                        Entry::Occupied(entry) => *entry.get(),
                        Entry::Vacant(entry) => {
                            let vertex = self.vertex(key, shape, triangle.line)?;
                            let idx = u32::try_from(vertices.len())
                                .map_err(|_| MeshError::TooManyVertices)?;
                            vertices.push(vertex);
                            *entry.insert(idx)
                        }
                    };
                    indices.push(index);
                }
            }
        }

        log::debug!(
            "Deduplicated {} face corners into {} vertices",
            indices.len(),
            vertices.len()
        );
        Mesh::new(vertices, indices)
    }

    fn vertex(&self, key: AttributeKey, shape: &Shape, line: usize) -> MeshResult<MeshVertex> {
        // Keys past the arrays came from positive indices; report them 1-based, as written.
        let out_of_range = |attribute, index: u32, available| MeshError::IndexOutOfRange {
            shape: shape.name.clone(),
            line,
            attribute,
            index: i64::from(index) + 1,
            available,
        };

        let position = lookup(&self.positions, key.position)
            .ok_or_else(|| out_of_range(Attribute::Position, key.position, self.positions.len()))?;
        let normal = match key.normal {
            Some(i) => lookup(&self.normals, i)
                .ok_or_else(|| out_of_range(Attribute::Normal, i, self.normals.len()))?,
            None => DEFAULT_NORMAL,
        };
        let uv = match key.texcoord {
            Some(i) => lookup(&self.texcoords, i)
                .ok_or_else(|| out_of_range(Attribute::TexCoord, i, self.texcoords.len()))?,
            None => [0.0, 0.0],
        };

        Ok(MeshVertex::new(position, normal, uv))
    }
}

fn lookup<T: Copy>(values: &[T], index: u32) -> Option<T> {
    values.get(index as usize).copied()
}
