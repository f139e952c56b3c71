//! Debug utilities: a dump (F3 by default) of editor state, diagnostics,
//! entity and image counts and process memory, written to a timestamped
//! text file in './debug-dumps/'.
//!
//! This is a quick way to capture a snapshot of the editor's internal state
//! without attaching a debugger.
use crate::block::BlockRegistry;
use crate::editor::{EditorCommand, EditorState};
use crate::grid::{Grid, Layer};
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use sysinfo::{Pid, ProcessExt, System, SystemExt};

/// Directory the dumps are written to.
pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_dump_system);
    }
}

/// Everything a dump reports, gathered before formatting.
#[derive(Debug, Clone, Default)]
pub struct DumpInfo {
    pub timestamp: String,
    pub fps: f64,
    pub frame_time_ms: f64,
    pub entities: usize,
    pub images: usize,
    pub image_bytes: usize,
    pub process_memory: u64,
    pub system_memory: (u64, u64),
    pub cores: usize,
    pub editor: String,
    pub grid: String,
    pub blocks: Vec<String>,
}

fn bytes_to_mb(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mb = bytes as f64 / 1024.0 / 1024.0;
    format!("{mb:.2} MB")
}

/// One-line summary of the editor state.
#[must_use]
pub fn describe_editor(editor: &EditorState) -> String {
    format!(
        "selected={} layer={} tool={} rotate={} theme={} time={} frame={}",
        editor.selected.as_deref().unwrap_or("-"),
        editor.layer.name(),
        editor.tool.name(),
        editor.rotate,
        editor.theme.name(),
        editor.time_of_day.name(),
        editor.frame,
    )
}

/// Per-layer cell counts.
#[must_use]
pub fn describe_grid(grid: &Grid) -> String {
    let mut out = format!("{0}x{0}", grid.size());
    for layer in Layer::ALL {
        write!(out, " {}={}", layer.name(), grid.occupied(layer).count()).ok();
    }
    out
}

/// Format a dump as text.
#[must_use]
pub fn compose_dump(info: &DumpInfo) -> String {
    let mut out = String::new();
    writeln!(out, "Debug dump: {}", info.timestamp).ok();
    writeln!(out, "FPS: {:.1}, frame_time: {:.4} ms", info.fps, info.frame_time_ms).ok();
    writeln!(out, "Entities: {}", info.entities).ok();
    writeln!(
        out,
        "Images: {} (mem total={})",
        info.images,
        bytes_to_mb(info.image_bytes as u64)
    )
    .ok();
    writeln!(out, "CPU cores (available): {}", info.cores).ok();
    writeln!(out, "Process memory: {}", bytes_to_mb(info.process_memory)).ok();
    writeln!(
        out,
        "System memory: total={} used={}",
        bytes_to_mb(info.system_memory.0),
        bytes_to_mb(info.system_memory.1)
    )
    .ok();
    writeln!(out, "\nEditor: {}", info.editor).ok();
    writeln!(out, "Grid: {}", info.grid).ok();
    writeln!(out, "Blocks ({}): {}", info.blocks.len(), info.blocks.join(", ")).ok();
    out
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugDumpCtx<'w, 's> {
    pub commands: EventReader<'w, 's, EditorCommand>,
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub entities: Query<'w, 's, Entity>,
    pub images: Res<'w, Assets<Image>>,
    pub editor: Res<'w, EditorState>,
    pub grid: Res<'w, Grid>,
    pub registry: Res<'w, BlockRegistry>,
}

/// Write a dump whenever an `EditorCommand::DumpDebug` arrives.
pub fn debug_dump_system(mut ctx: DebugDumpCtx<'_, '_>) {
    let requested = ctx.commands.read().any(|c| *c == EditorCommand::DumpDebug);
    if !requested {
        return;
    }

    let now: DateTime<Utc> = Utc::now();
    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let frame_time = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let mut sys = System::new();
    sys.refresh_memory();
    let pid = Pid::from(std::process::id() as usize);
    sys.refresh_process(pid);

    let info = DumpInfo {
        timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        fps,
        frame_time_ms: frame_time,
        entities: ctx.entities.iter().count(),
        images: ctx.images.len(),
        image_bytes: ctx.images.iter().map(|(_, img)| img.data.len()).sum(),
        process_memory: sys.process(pid).map_or(0, ProcessExt::memory),
        system_memory: (sys.total_memory(), sys.used_memory()),
        cores: std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        editor: describe_editor(&ctx.editor),
        grid: describe_grid(&ctx.grid),
        blocks: ctx.registry.iter().map(|b| b.name.clone()).collect(),
    };

    let fname = format!("{DUMP_DIR}/debug-{}.txt", now.format("%Y%m%d-%H%M%S"));
    if let Err(e) = fs::create_dir_all(DUMP_DIR) {
        error!("debug dump: failed to create dir '{DUMP_DIR}': {e}");
        return;
    }
    match fs::write(&fname, compose_dump(&info)) {
        Ok(()) => info!("wrote debug dump: {fname}"),
        Err(e) => error!("debug dump: failed to write {fname}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_lists_editor_and_grid() {
        let registry = BlockRegistry::builtin();
        let mut grid = Grid::default();
        grid.place(Layer::Foreground, 1, 1, registry.get("Door").unwrap(), 0.0);
        let editor = EditorState { selected: Some("Door".into()), ..Default::default() };

        let text = compose_dump(&DumpInfo {
            timestamp: "2026-10-19 12:00:00".into(),
            process_memory: 3 * 1024 * 1024,
            editor: describe_editor(&editor),
            grid: describe_grid(&grid),
            blocks: registry.iter().map(|b| b.name.clone()).collect(),
            ..Default::default()
        });

        assert!(text.starts_with("Debug dump: 2026-10-19 12:00:00\n"));
        assert!(text.contains("Process memory: 3.00 MB"));
        assert!(text.contains("selected=Door layer=background tool=draw"));
        assert!(text.contains("Grid: 16x16 background=0 foreground=1"));
        assert!(text.contains("Blocks (5): Wall, Torch, Villager, Door, Bridge"));
    }
}
