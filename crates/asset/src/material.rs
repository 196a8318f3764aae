//! Materials from the OBJ's companion MTL library.
//! Only what the viewer binds is kept; textures are referenced by path, not decoded.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialInfo {
    pub name: String,
    /// `Kd` colour.
    pub diffuse: Option<[f32; 3]>,
    /// `map_Kd` path, resolved against the OBJ directory when one is known.
    pub diffuse_texture: Option<PathBuf>,
}

impl MaterialInfo {
    pub fn from_tobj(material: &tobj::Material, base_dir: Option<&Path>) -> Self {
        let diffuse_texture = material.diffuse_texture.as_deref().map(|tex| match base_dir {
            Some(dir) => dir.join(tex),
            None => PathBuf::from(tex),
        });
        Self {
            name: material.name.clone(),
            diffuse: material.diffuse,
            diffuse_texture,
        }
    }
}

/// Load every material of the MTL file at `path`.
pub fn load_mtl(path: &Path) -> Result<Vec<MaterialInfo>, tobj::LoadError> {
    let (materials, _) = tobj::load_mtl(path)?;
    let base_dir = path.parent();
    Ok(materials
        .iter()
        .map(|m| MaterialInfo::from_tobj(m, base_dir))
        .collect())
}
