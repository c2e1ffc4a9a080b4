//! Minimal frame driver: threaded updates, a phase barrier, inline
//! rendering and a periodic resource sweep.
//!
//! Run with `cargo run --example frame_loop`.

use std::path::Path;

use ember_core::{
    logging, Component, EngineConfig, EngineContext, EntityId, Resource, ResourceError, System,
    SystemUsage,
};

/// Toy simulation component: integrates a 1D position.
struct Mover {
    position: f32,
    velocity: f32,
}

impl Component for Mover {
    fn on_update(&mut self) {
        self.position += self.velocity * (1.0 / 60.0);
    }

    fn on_render(&mut self) {
        // a real engine would push draw data here; printing every record
        // would swamp the terminal, so renders stay silent
    }
}

/// A resource loaded from disk: newline-separated color names.
struct Palette {
    colors: Vec<String>,
}

impl Resource for Palette {
    fn load(path: &Path) -> Result<Self, ResourceError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ResourceError::io(path, e))?;
        Ok(Self {
            colors: text.lines().map(str::to_string).collect(),
        })
    }
}

fn main() -> anyhow::Result<()> {
    logging::init_logging(log::LevelFilter::Debug)?;

    let config = EngineConfig::default().with_worker_threads(4);
    let mut ctx = EngineContext::new(config)?;

    // an asset to share; examples fabricate one next to the temp dir
    let palette_path = std::env::temp_dir().join("ember_frame_loop_palette.txt");
    std::fs::write(&palette_path, "crimson\nteal\nochre\n")?;

    let mut movers = System::<Mover>::new(SystemUsage::Both)
        .with_threading(true)
        .with_chunk_size(ctx.config().chunk_size);
    for id in 0..5000 {
        movers.attach(
            EntityId(id),
            Mover {
                position: 0.0,
                velocity: (id % 7) as f32,
            },
        );
    }

    let palette = ctx.resources.load::<Palette>(&palette_path)?;
    log::info!("palette has {} colors", palette.colors.len());

    for _ in 0..120 {
        let time = ctx.begin_frame();

        let chunks = movers.update(&ctx.tasks);
        ctx.frame_barrier();
        movers.render();

        if time.frame % 60 == 0 {
            log::info!(
                "frame {} ({} chunks, delta {:.4}s)",
                time.frame,
                chunks,
                time.delta
            );
            ctx.resources.unload_unused();
        }
    }

    // drop our handle and reclaim the palette on the way out
    drop(palette);
    let reclaimed = ctx.resources.unload_unused();
    log::info!("final sweep reclaimed {reclaimed} resource(s)");

    std::fs::remove_file(&palette_path).ok();
    Ok(())
}
