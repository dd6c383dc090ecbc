//! # G-Code Writer
//!
//! A thin textual serializer that walks a [`Plan`] and emits the move and
//! extrude commands a firmware expects. Per §1/§6 of the slicer
//! specification this sits *outside* the core: `pipeline::run` never calls
//! into this module, and nothing here feeds back into the pipeline.
//!
//! Grounded in `original_source/gcode.py`'s `GCode.dump`/`GCode.do_path`:
//! same per-layer structure (a travel move to the first perimeter point at
//! `z + quality`, then print moves tracing the rest of the path, then an
//! infill pass), same cumulative-extrusion-length accounting via the
//! nozzle/filament area ratio. The Python original prints directly to
//! stdout as it walks; this version builds [`Command`] values (the
//! teacher's `gcode::commands` module builds a distinct command enum for
//! its valve-array dialect, adapted here to plain G-code) and writes their
//! text through a `Write` sink, so the command sequence itself is
//! unit-testable without a file.

use std::f64::consts::PI;
use std::io::{self, Write};

use plan_types::{Command, CommandBuilder, Plan, Point2D, Polyline};

/// Emits textual G-code for `plan` to `sink`, per `config`'s feed rates and
/// extruder geometry.
pub fn write(plan: &Plan, config: &config_types::Configuration, sink: &mut impl Write) -> io::Result<()> {
    let mut writer = GcodeWriter::new(config);
    for layer in &plan.layers {
        for command in writer.layer_commands(layer) {
            writeln!(sink, "{}", command.to_gcode_text())?;
        }
    }
    Ok(())
}

/// Walks a [`Plan`] layer by layer, tracking the cumulative extrusion
/// length across the whole run the way `original_source/gcode.py`'s
/// `e_len` accumulator does.
struct GcodeWriter {
    sp_travel: f64,
    sp_print: f64,
    sp_infill: f64,
    nozzle_area: f64,
    filament_area: f64,
    quality: f64,
    e_len: f64,
}

impl GcodeWriter {
    fn new(config: &config_types::Configuration) -> Self {
        Self {
            sp_travel: config.speed.travel * 60.0,
            sp_print: config.speed.print * 60.0,
            sp_infill: config.speed.infill * 60.0,
            nozzle_area: config.extruder.nozzle_diameter * config.extruder.nozzle_diameter * PI,
            filament_area: config.extruder.filament_diameter * config.extruder.filament_diameter * PI,
            quality: config.quality,
            e_len: 0.0,
        }
    }

    /// Extrusion length to travel from `(x0, y0)` to `(x1, y1)`, per the
    /// nozzle/filament cross-section ratio `original_source/gcode.py` uses.
    fn extrusion_length(&self, a: Point2D, b: Point2D) -> f64 {
        let distance = a.distance_to(&b);
        (self.nozzle_area * distance) / self.filament_area
    }

    /// Commands for one perimeter polyline: a travel move to the first
    /// point (at `z + quality`, matching the Python original's "lift to
    /// next layer's plane before the first print move" quirk), then print
    /// moves along the rest.
    fn path_commands(&mut self, path: &Polyline, z: f64) -> Vec<Command> {
        let mut out = Vec::with_capacity(path.points.len());
        if path.points.len() < 2 {
            return out;
        }

        let first = path.points[0];
        out.push(CommandBuilder::travel_z(first.x, first.y, z + self.quality, self.sp_travel));

        let mut prev = first;
        for &p in &path.points[1..] {
            self.e_len += self.extrusion_length(prev, p);
            out.push(CommandBuilder::print(p.x, p.y, self.e_len, self.sp_print));
            prev = p;
        }

        out
    }

    /// All commands for one layer: a `; layer #n` comment, each region's
    /// perimeters, then each region's infill as alternating travel/print
    /// move pairs (the infill pass never prints collinear travel; every
    /// `GridSegment` is a fresh travel-then-print pair since infill
    /// segments are not mutually connected).
    fn layer_commands(&mut self, layer: &plan_types::LayerPlan) -> Vec<Command> {
        let mut out = vec![CommandBuilder::comment(format!("layer #{}", layer.index))];

        for region in &layer.regions {
            out.push(CommandBuilder::comment("perimeter"));
            for path in &region.perimeters {
                out.extend(self.path_commands(path, layer.z));
            }

            out.push(CommandBuilder::comment("infill"));
            for seg in &region.infill {
                let (p0, p1) = (Point2D::new(seg.x0, seg.y0), Point2D::new(seg.x1, seg.y1));
                out.push(CommandBuilder::travel(p0.x, p0.y, self.sp_infill));
                self.e_len += self.extrusion_length(p0, p1);
                out.push(CommandBuilder::print(p1.x, p1.y, self.e_len, self.sp_infill));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_types::Configuration;
    use plan_types::{GridSegment, LayerPlan, Region};

    fn square_region() -> Region {
        Region {
            perimeters: vec![Polyline::new(vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
                Point2D::new(0.0, 10.0),
                Point2D::new(0.0, 0.0),
            ])],
            infill: vec![GridSegment::new(1.0, 1.0, 9.0, 1.0)],
        }
    }

    #[test]
    fn extrusion_length_is_nondecreasing_across_a_layer() {
        let config = Configuration::default();
        let mut writer = GcodeWriter::new(&config);
        let layer = LayerPlan { index: 0, z: 0.0, regions: vec![square_region()] };

        let mut last_e = 0.0_f64;
        for cmd in writer.layer_commands(&layer) {
            if let Command::Print { e, .. } = cmd {
                assert!(e >= last_e - 1e-9, "extrusion length must be non-decreasing");
                last_e = e;
            }
        }
        assert!(last_e > 0.0);
    }

    #[test]
    fn write_emits_one_line_per_command() {
        let config = Configuration::default();
        let plan = Plan {
            layers: vec![LayerPlan { index: 0, z: 0.0, regions: vec![square_region()] }],
        };

        let mut buf = Vec::new();
        write(&plan, &config, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("; layer #0"));
        assert!(text.contains("G0 "));
        assert!(text.contains("G1 "));
    }
}
