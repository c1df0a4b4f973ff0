use engine_logging::engine_error;
use reel_app::logging::{initialize, LogDestination};
use reel_app::runner::{run_pipeline, RunOutcome};
use reel_engine::{EngineConfig, EngineHandle};

fn main() {
    initialize(LogDestination::Both);

    let mut args = std::env::args().skip(1);
    let Some(source_url) = args.next() else {
        eprintln!("usage: reel_app <source-url> [--preview]");
        std::process::exit(2);
    };
    let preview_only = args.any(|arg| arg == "--preview");

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            engine_error!("{err}");
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    let engine = match EngineHandle::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            engine_error!("engine startup failed: {err}");
            eprintln!("engine startup failed: {err}");
            std::process::exit(1);
        }
    };

    match run_pipeline(&engine, source_url, preview_only) {
        RunOutcome::Preview { title, highlights } => {
            println!("preview: \"{title}\" ({highlights} highlights)");
        }
        RunOutcome::Rendered { media_id } => {
            println!("rendered media ready: {media_id}");
        }
        RunOutcome::Faulted { stage, fault } => {
            eprintln!("pipeline stopped at {stage}: {fault}");
            std::process::exit(1);
        }
    }
}
