//! # Inpaint Canvas Editor
//!
//! Headless editor: build a canvas, mark it, submit it, save it.

use clap::Parser;
use inpaint_editor::{
    download, load_script, run_script, CliArgs, EditOrchestrator, EditorConfig, HttpEditTransport,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inpaint_editor=info,inpaint_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = EditorConfig::from(args);

    tracing::info!(
        "Canvas {}x{}, edit server {}",
        config.width,
        config.height,
        config.server
    );

    let mut session = config.build_session()?;
    session.set_on_change(|change, scene| {
        tracing::debug!(?change, drawables = scene.drawable_count(), "Canvas changed");
    });

    if let Some(path) = &config.strokes {
        let steps = load_script(path)?;
        let committed = run_script(&mut session, &steps)?;
        tracing::info!("Replayed {} steps from {}", committed, path.display());
    }

    if let Some(prompt) = &config.prompt {
        let orchestrator = EditOrchestrator::new(HttpEditTransport::new(&config.server)?);
        match orchestrator.apply_edit(&mut session, prompt).await {
            Ok(outcome) => println!("{}", outcome.message()),
            // Shown to the user like an alert; the canvas is still saved.
            Err(err) => eprintln!("{err}"),
        }
    }

    let path = download(session.scene(), &config.output_dir)?;
    println!("{}", path.display());

    Ok(())
}
