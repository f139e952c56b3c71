//! Command handling: applies `EditorCommand`s to the editor state and runs
//! the save/load/clear/export/unlock actions.
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use castle_builder::block::BlockRegistry;
use castle_builder::editor::{EditorCommand, EditorState};
use castle_builder::grid::Grid;
use castle_builder::persistence::{self, FileStorage};
use castle_builder::settings::Settings;
use castle_builder::ui::StatusMessage;
use chrono::Utc;
use std::path::PathBuf;

use super::canvas::Canvas;

/// PNG encodes running on the async compute pool.
#[derive(Resource, Default)]
pub struct PendingExports {
    pub tasks: Vec<Task<Result<PathBuf, String>>>,
}

/// Restore the saved document, if any, once the registry is loaded.
#[allow(clippy::needless_pass_by_value)]
pub fn load_saved_document(
    settings: Res<Settings>,
    registry: Res<BlockRegistry>,
    mut grid: ResMut<Grid>,
    mut editor: ResMut<EditorState>,
) {
    let storage = FileStorage::new(&settings.storage.dir);
    match persistence::load(&storage, &settings.storage.slot, &mut grid, &mut editor, &registry) {
        Ok(None) => info!("no saved document under '{}'", settings.storage.slot),
        Ok(Some(report)) => {
            info!("loaded saved document ({} cells)", grid.count());
            if !report.missing.is_empty() {
                warn!("saved document uses unknown blocks: {}", report.missing.join(", "));
            }
            if report.dropped > 0 {
                warn!("dropped {} cells outside the {}x{} grid", report.dropped, grid.size(), grid.size());
            }
        }
        Err(e) => error!("failed to load saved document: {e}"),
    }
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct CommandCtx<'w, 's> {
    pub commands: EventReader<'w, 's, EditorCommand>,
    pub editor: ResMut<'w, EditorState>,
    pub grid: ResMut<'w, Grid>,
    pub registry: ResMut<'w, BlockRegistry>,
    pub settings: Res<'w, Settings>,
    pub status: ResMut<'w, StatusMessage>,
    pub canvas: Res<'w, Canvas>,
    pub exports: ResMut<'w, PendingExports>,
}

/// Apply every command sent this frame, in order.
pub fn handle_commands(mut ctx: CommandCtx<'_, '_>) {
    let commands: Vec<EditorCommand> = ctx.commands.read().cloned().collect();
    for command in commands {
        if !ctx.editor.accepts(&command) {
            debug!("ignored while confirming: {command:?}");
            continue;
        }
        if ctx.editor.apply(&command) {
            debug!("editor: {command:?}");
            continue;
        }
        match command {
            EditorCommand::Save => save_document(&mut ctx),
            EditorCommand::RequestClear => ctx.editor.request_clear(),
            EditorCommand::Confirm(accept) => {
                let grid = &mut *ctx.grid;
                if ctx.editor.resolve_confirmation(accept, grid) {
                    info!("grid cleared");
                    ctx.status.set("Grid cleared.");
                }
            }
            EditorCommand::Export => start_export(&mut ctx),
            EditorCommand::Unlock => {
                let name = ctx.registry.unlock();
                info!("unlocked block '{name}'");
                ctx.status.set(format!("Unlocked {name}!"));
                ctx.editor.selected = Some(name);
            }
            // handled by the debug dump plugin
            _ => {}
        }
    }
}

fn save_document(ctx: &mut CommandCtx<'_, '_>) {
    let mut storage = FileStorage::new(&ctx.settings.storage.dir);
    match persistence::save(&mut storage, &ctx.settings.storage.slot, &ctx.grid, &ctx.editor) {
        Ok(()) => {
            info!("saved document to {}", storage.dir().display());
            ctx.status.set(persistence::SAVED_MESSAGE);
        }
        Err(e) => {
            error!("save failed: {e}");
            ctx.status.set(format!("Save failed: {e}"));
        }
    }
}

fn start_export(ctx: &mut CommandCtx<'_, '_>) {
    let image = ctx.canvas.surface.image().clone();
    let dir = PathBuf::from(&ctx.settings.export.dir);
    let name = persistence::export_file_name(&ctx.settings.export.file_name, ctx.settings.export.timestamped, Utc::now());
    let task = AsyncComputeTaskPool::get()
        .spawn(async move { persistence::export_png(&image, &dir, &name).map_err(|e| e.to_string()) });
    ctx.exports.tasks.push(task);
    ctx.status.set("Exporting...");
}

/// Collect finished export tasks and report them.
#[allow(clippy::needless_pass_by_value)]
pub fn poll_exports(mut exports: ResMut<PendingExports>, mut status: ResMut<StatusMessage>) {
    exports.tasks.retain_mut(|task| {
        if !task.is_finished() {
            return true;
        }
        match futures::executor::block_on(&mut *task) {
            Ok(path) => {
                info!("exported {}", path.display());
                status.set(format!("Exported {}", path.display()));
            }
            Err(e) => {
                error!("export failed: {e}");
                status.set(format!("Export failed: {e}"));
            }
        }
        false
    });
}
