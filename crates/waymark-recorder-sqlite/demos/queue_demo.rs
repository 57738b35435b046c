//! Feeds a burst of presence events through a queueing SQLite recorder.
//!
//! Reads `WAYMARK_CONFIG_PATH` if set, otherwise uses a small in-memory setup.

use anyhow::Result;
use std::sync::Arc;
use std::thread;
use waymark_common_config::{ConfigSource, Environment, MemoryConfig, YamlConfig};
use waymark_common_log::{info, LogConfig};
use waymark_recorder::{QueueingRecorder, SubjectId, UserEvent, CONFIG_SECTION, MAX_QUEUE_SIZE_KEY};
use waymark_recorder_sqlite::{SqliteRecorder, CONNECTION_STRING_KEY};

fn load_config() -> Result<Box<dyn ConfigSource>> {
    match Environment::config_path() {
        Some(path) => Ok(Box::new(YamlConfig::load(path)?)),
        None => Ok(Box::new(
            MemoryConfig::new()
                .with(CONFIG_SECTION, MAX_QUEUE_SIZE_KEY, 64)
                .with(CONFIG_SECTION, CONNECTION_STRING_KEY, ":memory:"),
        )),
    }
}

fn main() -> Result<()> {
    Environment::init();
    waymark_common_log::init(LogConfig::from_env())?;

    let config = load_config()?;
    let queue = Arc::new(QueueingRecorder::initialise(SqliteRecorder::new(), config.as_ref())?);
    queue.start()?;

    let producers: Vec<_> = ["Lobby", "Harbor", "Market"]
        .into_iter()
        .map(|region| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut accepted = 0;
                for n in 0..40 {
                    let id = SubjectId::new();
                    let name = format!("visitor-{n}");
                    for event in [
                        UserEvent::login(id, &name, region),
                        UserEvent::region_enter(id, &name, region),
                        UserEvent::logout(id, &name, region),
                    ] {
                        if queue.submit(event) {
                            accepted += 1;
                        }
                    }
                }
                accepted
            })
        })
        .collect();

    let accepted: usize = producers
        .into_iter()
        .map(|p| p.join().unwrap_or(0))
        .sum();

    let stats = queue.stats();
    info!(accepted, dropped = stats.dropped, "producers finished");

    let queue = Arc::try_unwrap(queue).map_err(|_| anyhow::anyhow!("queue still shared"))?;
    let recorder = queue.into_inner()?;
    info!(stored = recorder.events()?.len(), "demo complete");
    Ok(())
}
