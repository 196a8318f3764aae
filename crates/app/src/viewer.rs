//! Viewer state: the loaded mesh and everything needed to hand it to a renderer.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use asset::{Mesh, layout, material::MaterialInfo, obj};

use crate::config::{MeshSource, ViewerConfig};

pub struct Viewer {
    config: ViewerConfig,
    mesh: Mesh,
    materials: Vec<MaterialInfo>,
}

impl Viewer {
    /// Load or generate the mesh named by the config.
    pub fn load(config: ViewerConfig) -> Result<Self> {
        let (mesh, materials) = match &config.source {
            MeshSource::File(path) => {
                let asset = obj::load_obj(path, config.mode)
                    .with_context(|| format!("Failed to load model {}", path.display()))?;
                if asset.mesh.is_empty() {
                    log::warn!("{} produced no triangles; nothing to draw", path.display());
                }
                (asset.mesh, asset.materials)
            }
            MeshSource::Grid(n) => {
                let mesh = Mesh::create_grid(*n).context("Failed to build grid")?;
                log::info!("Generated {}x{} grid", n, n);
                (mesh, Vec::new())
            }
        };

        Ok(Self {
            config,
            mesh,
            materials,
        })
    }

    /// Run the configured object-space steps: normals, normalization, model transform.
    pub fn prepare(&mut self) {
        if self.config.compute_normals {
            self.mesh.compute_normals();
        }
        if self.config.normalize {
            self.mesh.normalize();
        }
        if !self.config.transform.is_identity() {
            self.mesh.apply_matrix(self.config.transform.matrix());
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn materials(&self) -> &[MaterialInfo] {
        &self.materials
    }

    pub fn report(&self) {
        let mesh = self.mesh();
        log::info!(
            "Mesh ready: {} vertices, {} triangles ({} indices)",
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.index_count()
        );
        if let Some(bounds) = mesh.bounds() {
            log::info!("Bounds: min {:?}, max {:?}", bounds.min, bounds.max);
        }
        for material in self.materials() {
            match &material.diffuse_texture {
                Some(tex) => log::info!("Material '{}': texture {}", material.name, tex.display()),
                None => log::info!("Material '{}': no texture", material.name),
            }
        }
    }

    /// Write the upload-ready buffers next to `prefix`, in native byte order.
    pub fn write_buffers(&self, prefix: &Path) -> Result<(PathBuf, PathBuf)> {
        let vertex_path = with_suffix(prefix, "vertices.bin");
        let index_path = with_suffix(prefix, "indices.bin");

        if let Some(dir) = prefix.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(&vertex_path, self.mesh.vertex_bytes())
            .with_context(|| format!("Failed to write {}", vertex_path.display()))?;
        fs::write(&index_path, self.mesh.index_bytes())
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        log::info!(
            "Wrote {} and {} (stride {} bytes)",
            vertex_path.display(),
            index_path.display(),
            layout::VERTEX_STRIDE
        );
        for attr in layout::ATTRIBUTES {
            log::debug!(
                "  location {}: {} x f32 at offset {} ({})",
                attr.location,
                attr.components,
                attr.offset,
                attr.name
            );
        }
        Ok((vertex_path, index_path))
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
