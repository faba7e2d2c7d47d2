use clap::Parser;
use lookout::{Cli, init_logging, listen_for_quit};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Cli::parse().into_config()?;
    init_logging(&config.activity_log)?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    if config.headless {
        println!(
            "Headless mode active. Logging to '{}'. Press Ctrl+C to stop.",
            config.activity_log.display()
        );
    } else {
        let cancel = cancel.clone();
        std::thread::spawn(move || listen_for_quit(std::io::stdin().lock(), &cancel));
        println!(
            "Preview at '{}'. Type q and Enter to stop.",
            config.preview.display()
        );
    }

    let summary =
        tokio::task::spawn_blocking(move || lookout::run(&config, &cancel)).await??;
    info!(
        frames = summary.frames,
        motion_saved = summary.saved_motion,
        faces_saved = summary.saved_faces,
        "lookout finished"
    );
    Ok(())
}
