pub mod clock;
pub mod commands;
pub mod config;
pub mod events;
pub mod expiration;
pub mod logging;
pub mod models;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod view;

#[cfg(all(feature = "app", not(test)))]
use crate::clock::SystemClock;
#[cfg(all(feature = "app", not(test)))]
use crate::commands::{parse_command, run_command, Command, HELP_TEXT};
#[cfg(all(feature = "app", not(test)))]
use crate::config::AppConfig;
#[cfg(all(feature = "app", not(test)))]
use crate::render::render_payload;
#[cfg(all(feature = "app", not(test)))]
use crate::scheduler::PurgeScheduler;
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::{FileStore, KeyValueStore, MemoryStore, TaskStorage};

#[cfg(all(feature = "app", not(test)))]
fn open_store(config: &AppConfig) -> Box<dyn KeyValueStore> {
    let store = FileStore::new(config.data_dir.clone());
    match store.ensure_dirs() {
        Ok(()) => Box::new(store),
        Err(error) => {
            log::warn!(
                "storage: cannot use data dir={} ({error}); keeping tasks in memory",
                config.data_dir.display()
            );
            let memory = MemoryStore::new();
            // No durable backend this session.
            memory.set_writable(false);
            Box::new(memory)
        }
    }
}

#[cfg(all(feature = "app", not(test)))]
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    if let Err(error) = logging::init_logging(&config.data_dir) {
        eprintln!("logging disabled: {error}");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(event_loop(config))?;
    log::info!("shutdown complete");
    Ok(())
}

#[cfg(all(feature = "app", not(test)))]
async fn event_loop(config: AppConfig) -> std::io::Result<()> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let mut state = AppState::load(TaskStorage::new(open_store(&config)), Box::new(SystemClock));
    let mut scheduler = PurgeScheduler::start(config.purge_interval);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render_payload(&state.snapshot()));
    println!("type `help` for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP_TEXT}"),
                    command => {
                        let result = run_command(&mut state, command);
                        match (result.data, result.error) {
                            (Some(payload), _) => println!("{}", render_payload(&payload)),
                            (None, Some(message)) => println!("{message}"),
                            (None, None) => {}
                        }
                    }
                }
            }
            Some(_) = scheduler.next_tick() => {
                if state.purge_expired() > 0 {
                    println!("{}", render_payload(&state.snapshot()));
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    scheduler.shutdown();
    Ok(())
}
