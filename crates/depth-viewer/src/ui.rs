use crate::camera::CameraState;
use crate::data::IngestStats;

/// Snapshot of what the HUD shows, gathered once per frame.
#[derive(Debug, Clone, Copy)]
pub struct HudStats {
    pub eye: [f32; 3],
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub vertices: u32,
    pub ingest: IngestStats,
    pub recomputes: u64,
}

impl HudStats {
    pub fn collect(camera: &CameraState, vertices: u32, ingest: IngestStats, recomputes: u64) -> Self {
        Self {
            eye: camera.eye.to_array(),
            yaw_deg: camera.yaw_deg,
            pitch_deg: camera.pitch_deg,
            vertices,
            ingest,
            recomputes,
        }
    }

    /// Text rows of the HUD, top to bottom; `None` marks a separator.
    pub fn rows(&self) -> Vec<Option<String>> {
        vec![
            Some(format!(
                "Eye: ({:.1}, {:.1}, {:.1})",
                self.eye[0], self.eye[1], self.eye[2]
            )),
            Some(format!("Yaw / Pitch: {:.1}° / {:.1}°", self.yaw_deg, self.pitch_deg)),
            None,
            Some(format!("Points: {}", self.vertices)),
            Some(format!(
                "Frames: {} accepted, {} rejected",
                self.ingest.accepted, self.ingest.rejected
            )),
            Some(format!("Allocations: {}", self.ingest.allocations)),
            Some(format!("Uniform updates: {}", self.recomputes)),
        ]
    }
}

pub fn draw_hud(ctx: &egui::Context, stats: &HudStats) {
    egui::Window::new("Depth View")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            for row in stats.rows() {
                match row {
                    Some(text) => ui.label(text),
                    None => ui.separator(),
                };
            }
            ui.separator();
            ui.small("Drag to orbit · wheel to zoom · W/A/S/D to pan");
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_copies_camera_state() {
        let mut cam = CameraState::new(250.0);
        cam.yaw_deg = 12.5;
        let stats = HudStats::collect(&cam, 42, IngestStats::default(), 3);
        assert_eq!(stats.eye, [0.0, 0.0, 250.0]);
        assert_eq!(stats.yaw_deg, 12.5);
        assert_eq!(stats.vertices, 42);
        assert_eq!(stats.recomputes, 3);
    }

    #[test]
    fn rows_include_allocation_count() {
        let ingest = IngestStats {
            accepted: 7,
            rejected: 2,
            allocations: 1,
        };
        let stats = HudStats::collect(&CameraState::new(500.0), 16, ingest, 4);
        let rows: Vec<String> = stats.rows().into_iter().flatten().collect();
        assert!(rows.contains(&"Allocations: 1".to_string()));
        assert!(rows.contains(&"Frames: 7 accepted, 2 rejected".to_string()));
        assert!(rows.contains(&"Points: 16".to_string()));
    }

    #[test]
    fn hud_builds_without_a_gpu() {
        let ctx = egui::Context::default();
        let stats = HudStats::collect(&CameraState::new(500.0), 0, IngestStats::default(), 0);
        let _ = ctx.run(egui::RawInput::default(), |ctx| draw_hud(ctx, &stats));
    }
}
