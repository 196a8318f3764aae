//! Command line configuration.

use std::path::PathBuf;

use anyhow::{Result, bail};
use asset::ParseMode;
use clap::Parser;
use corelib::{Vec3, transform::Transform};

/// Load an OBJ mesh (or build a grid) and prepare GPU-ready buffers.
#[derive(Debug, Parser)]
#[command(name = "orbitview", version)]
pub struct Cli {
    /// OBJ file to load.
    pub model: Option<PathBuf>,

    /// Build an N x N grid instead of loading a model.
    #[arg(long, value_name = "N", conflicts_with = "model")]
    pub grid: Option<usize>,

    /// Recompute normals from triangle geometry.
    #[arg(long)]
    pub compute_normals: bool,

    /// Center the mesh and fit its largest side to 1.
    #[arg(long)]
    pub normalize: bool,

    /// Uniform scale applied after normalization.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Rotation in degrees, as X,Y,Z.
    #[arg(
        long,
        value_name = "X,Y,Z",
        value_parser = parse_vec3,
        default_value = "0,0,0",
        allow_hyphen_values = true
    )]
    pub rotate: Vec3,

    /// Translation, as X,Y,Z.
    #[arg(
        long,
        value_name = "X,Y,Z",
        value_parser = parse_vec3,
        default_value = "0,0,0",
        allow_hyphen_values = true
    )]
    pub translate: Vec3,

    /// Write PREFIX.vertices.bin and PREFIX.indices.bin.
    #[arg(long, value_name = "PREFIX")]
    pub out: Option<PathBuf>,

    /// Fail on malformed or missing OBJ input instead of skipping it.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MeshSource {
    File(PathBuf),
    Grid(usize),
}

/// Validated viewer settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub source: MeshSource,
    pub compute_normals: bool,
    pub normalize: bool,
    pub transform: Transform,
    pub output: Option<PathBuf>,
    pub mode: ParseMode,
}

impl ViewerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let source = match (cli.model, cli.grid) {
            (Some(path), None) => MeshSource::File(path),
            (None, Some(n)) if n >= 2 => MeshSource::Grid(n),
            (None, Some(n)) => bail!("--grid needs at least 2 points per side, got {}", n),
            (None, None) => bail!("Nothing to load: pass a MODEL path or --grid N"),
            (Some(_), Some(_)) => bail!("MODEL and --grid are mutually exclusive"),
        };

        if !cli.scale.is_finite() || cli.scale == 0.0 {
            bail!("--scale must be a finite, non-zero number, got {}", cli.scale);
        }

        Ok(Self {
            source,
            compute_normals: cli.compute_normals,
            normalize: cli.normalize,
            transform: Transform::from_trs(cli.translate, cli.rotate, Vec3::splat(cli.scale)),
            output: cli.out,
            mode: if cli.strict {
                ParseMode::Strict
            } else {
                ParseMode::Lenient
            },
        })
    }
}

fn parse_vec3(value: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected X,Y,Z, got '{}'", value));
    };
    let parse = |s: &str| {
        s.parse::<f32>()
            .map_err(|e| format!("invalid component '{}': {}", s, e))
    };
    Ok(Vec3::new(parse(*x)?, parse(*y)?, parse(*z)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::vec3;
    use rstest::rstest;

    fn config(args: &[&str]) -> Result<ViewerConfig> {
        let cli = Cli::try_parse_from(std::iter::once("orbitview").chain(args.iter().copied()))?;
        ViewerConfig::from_cli(cli)
    }

    #[test]
    fn help_describes_the_tool() {
        use clap::CommandFactory;

        let about = Cli::command().get_about().map(|s| s.to_string()).unwrap_or_default();
        assert!(about.starts_with("Load an OBJ mesh"), "{about}");
    }

    #[test]
    fn model_path_with_defaults() {
        let cfg = config(&["data/frankie.obj"]).expect("config");
        assert_eq!(cfg.source, MeshSource::File(PathBuf::from("data/frankie.obj")));
        assert!(cfg.transform.is_identity());
        assert_eq!(cfg.mode, ParseMode::Lenient);
        assert!(!cfg.compute_normals && !cfg.normalize);
        assert!(cfg.output.is_none());
    }

    #[test]
    fn grid_with_pipeline_flags() {
        let cfg = config(&[
            "--grid",
            "4",
            "--compute-normals",
            "--normalize",
            "--scale",
            "2",
            "--rotate",
            "0,90,0",
            "--translate",
            "1, 2, 3",
            "--out",
            "target/grid",
            "--strict",
        ])
        .expect("config");
        assert_eq!(cfg.source, MeshSource::Grid(4));
        assert!(cfg.compute_normals && cfg.normalize);
        assert_eq!(cfg.transform.scale, Vec3::splat(2.0));
        assert_eq!(cfg.transform.rotation_deg, vec3(0.0, 90.0, 0.0));
        assert_eq!(cfg.transform.translation, vec3(1.0, 2.0, 3.0));
        assert_eq!(cfg.output, Some(PathBuf::from("target/grid")));
        assert_eq!(cfg.mode, ParseMode::Strict);
    }

    #[rstest]
    #[case::no_source(&[])]
    #[case::tiny_grid(&["--grid", "1"])]
    #[case::both_sources(&["model.obj", "--grid", "3"])]
    #[case::zero_scale(&["model.obj", "--scale", "0"])]
    #[case::short_vector(&["model.obj", "--rotate", "1,2"])]
    #[case::bad_component(&["model.obj", "--translate", "1,x,2"])]
    fn rejected(#[case] args: &[&str]) {
        assert!(config(args).is_err());
    }

    #[rstest]
    #[case("1,2,3", vec3(1.0, 2.0, 3.0))]
    #[case(" -1 , 0.5 ,0 ", vec3(-1.0, 0.5, 0.0))]
    fn vectors(#[case] input: &str, #[case] expected: Vec3) {
        assert_eq!(parse_vec3(input), Ok(expected));
    }
}
