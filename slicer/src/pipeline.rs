//! # Pipeline Driver
//!
//! Wires the four core stages — [`crate::arrange`], [`crate::slice`],
//! [`crate::reconstruct`], [`crate::infill`] — into the single call the CLI
//! (and any other caller) makes: hand in a configuration and a set of
//! loaded meshes, get back a [`Plan`].
//!
//! Reconstruction and infill are independent across layers once slicing has
//! produced its per-layer segment bags, so with the `parallel` feature
//! enabled (off by default) that stage runs across a `rayon` thread pool
//! instead of sequentially. Arranging and slicing stay sequential: the
//! arranger's guillotine split is inherently ordered, and the slicer's
//! facet working-set migration is ordered by design (see its module docs).

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use config_types::Configuration;
use plan_types::{tolerance::approx_zero, LayerPlan, Mesh, Plan, Region};
use tracing::warn;

use crate::error::SlicerError;
use crate::{arrange, infill, reconstruct, slice};

/// Which stage of the pipeline a [`Progress`] report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Arranging,
    Slicing,
    Reconstructing,
    Infilling,
}

/// A coarse progress report; `current`/`total` are stage-relative, not
/// global (e.g. `current` is a layer index during `Infilling`).
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
}

/// Caller-supplied progress sink. Takes `&mut` so a caller can accumulate
/// state (a progress bar, a counter) across calls.
pub type ProgressCallback<'a> = dyn FnMut(Progress) + 'a;

/// Runs the full pipeline: arrange, slice, reconstruct, infill.
///
/// Consumes `meshes` because arranging translates them in place and nothing
/// downstream needs the pre-arrangement copies.
pub fn run(
    config: &Configuration,
    mut meshes: Vec<Mesh>,
    mut progress: Option<&mut ProgressCallback>,
) -> Result<Plan, SlicerError> {
    report(&mut progress, Phase::Arranging, 0, 1);
    arrange::run(config, &mut meshes)?;
    report(&mut progress, Phase::Arranging, 1, 1);

    drop_empty_models(&mut meshes);

    let z_max = meshes
        .iter()
        .map(|m| m.bbox_max()[2])
        .fold(0.0_f64, f64::max);

    report(&mut progress, Phase::Slicing, 0, 1);
    let layer_segments = slice::run(&meshes, config.quality, z_max);
    report(&mut progress, Phase::Slicing, 1, 1);

    let total_layers = layer_segments.len();
    report(&mut progress, Phase::Reconstructing, 0, total_layers);

    let build = |ls: &slice::LayerSegments| -> Result<LayerPlan, SlicerError> {
        let regions = ls
            .per_mesh
            .iter()
            .enumerate()
            .filter_map(|(mesh_index, segments)| {
                build_region(segments.clone(), mesh_index, ls.index, total_layers, config).transpose()
            })
            .collect::<Result<Vec<Region>, SlicerError>>()?;

        Ok(LayerPlan { index: ls.index, z: ls.z, regions })
    };

    let layers: Vec<LayerPlan> = {
        #[cfg(feature = "parallel")]
        {
            layer_segments.par_iter().map(build).collect::<Result<Vec<_>, _>>()?
        }
        #[cfg(not(feature = "parallel"))]
        {
            layer_segments.iter().map(build).collect::<Result<Vec<_>, _>>()?
        }
    };

    report(&mut progress, Phase::Reconstructing, total_layers, total_layers);
    report(&mut progress, Phase::Infilling, total_layers, total_layers);

    Ok(Plan { layers })
}

/// Reconstructs one mesh's segment bag for one layer into a [`Region`] with
/// its infill filled in. Returns `Ok(None)` if the mesh contributed no
/// segments at this layer (outside its z-extent).
fn build_region(
    segments: Vec<plan_types::Segment2D>,
    mesh_index: usize,
    layer_index: usize,
    total_layers: usize,
    config: &Configuration,
) -> Result<Option<Region>, SlicerError> {
    let perimeters = reconstruct::run(segments);
    if perimeters.is_empty() {
        return Ok(None);
    }

    let grid = infill::run(
        &perimeters,
        mesh_index,
        layer_index,
        total_layers,
        config.extruder.nozzle_diameter,
    )?;

    Ok(Some(Region { perimeters, infill: grid }))
}

/// Drops any mesh with zero z-extent after arrangement (§7 `EmptyModel`:
/// "logged and skipped", not terminal for the run). Must run before `z_max`
/// is computed so a skipped mesh can't inflate the layer count, and before
/// `slice::run` so it never reaches the slicer at all.
fn drop_empty_models(meshes: &mut Vec<Mesh>) {
    meshes.retain(|mesh| {
        let extent = mesh.bbox_max()[2] - mesh.bbox_min()[2];
        if approx_zero(extent) {
            let err = SlicerError::EmptyModel { mesh: mesh.name.clone() };
            warn!("{err}");
            false
        } else {
            true
        }
    });
}

fn report(progress: &mut Option<&mut ProgressCallback>, phase: Phase, current: usize, total: usize) {
    if let Some(cb) = progress.as_mut() {
        cb(Progress { phase, current, total });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_types::{Facet, Vertex};

    fn cube(name: &str, size: f64) -> Mesh {
        let s = size;
        let corners = [
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(s, 0.0, 0.0),
            Vertex::new(s, s, 0.0),
            Vertex::new(0.0, s, 0.0),
            Vertex::new(0.0, 0.0, s),
            Vertex::new(s, 0.0, s),
            Vertex::new(s, s, s),
            Vertex::new(0.0, s, s),
        ];
        let quads = [[0, 1, 2, 3], [4, 5, 6, 7], [0, 1, 5, 4], [1, 2, 6, 5], [2, 3, 7, 6], [3, 0, 4, 7]];
        let mut facets = Vec::new();
        for q in quads {
            facets.push(Facet::new(corners[q[0]], corners[q[1]], corners[q[2]]));
            facets.push(Facet::new(corners[q[0]], corners[q[2]], corners[q[3]]));
        }
        Mesh::new(name, facets)
    }

    #[test]
    fn runs_end_to_end_on_one_cube() {
        let config = Configuration::default();
        let meshes = vec![cube("cube", 10.0)];

        let mut phases_seen = Vec::new();
        let mut cb = |p: Progress| phases_seen.push(p.phase);
        let plan = run(&config, meshes, Some(&mut cb)).unwrap();

        assert!(plan.layer_count() > 1);
        assert!(phases_seen.contains(&Phase::Arranging));
        assert!(phases_seen.contains(&Phase::Infilling));

        let first_layer = &plan.layers[0];
        assert_eq!(first_layer.regions.len(), 1);
        assert!(!first_layer.regions[0].perimeters.is_empty());
    }

    #[test]
    fn oversized_mesh_propagates_plate_overflow() {
        let config = Configuration::default();
        let meshes = vec![cube("huge", 190.0)];
        let err = run(&config, meshes, None).unwrap_err();
        assert!(matches!(err, SlicerError::PlateOverflow { .. }));
    }

    fn flat_square(name: &str, size: f64) -> Mesh {
        let facets = vec![
            Facet::new(
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(size, 0.0, 0.0),
                Vertex::new(size, size, 0.0),
            ),
            Facet::new(
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(size, size, 0.0),
                Vertex::new(0.0, size, 0.0),
            ),
        ];
        Mesh::new(name, facets)
    }

    #[test]
    fn zero_extent_mesh_is_skipped_not_fatal() {
        let config = Configuration::default();
        let meshes = vec![flat_square("flat", 10.0), cube("cube", 10.0)];

        let plan = run(&config, meshes, None).unwrap();

        // Every region in the plan must have come from the cube; the flat
        // mesh contributed no layers at all, so no layer ever has more
        // than one region, and at least one layer has exactly the cube's.
        assert!(plan.layers.iter().all(|l| l.regions.len() <= 1));
        assert!(plan.layers.iter().any(|l| l.regions.len() == 1));
    }

    #[test]
    fn all_meshes_empty_yields_an_empty_plan() {
        let config = Configuration::default();
        let meshes = vec![flat_square("flat", 10.0)];

        let plan = run(&config, meshes, None).unwrap();

        assert!(plan.layers.iter().all(|l| l.regions.is_empty()));
    }
}
