use serde::Serialize;
use stackwise_db::ProfileSeedDataset;

use crate::commands::{load_config, with_pool, CommandResult, EXIT_INPUT, EXIT_MIGRATION};

#[derive(Debug, Serialize)]
struct SeedOutput {
    profiles: Vec<&'static str>,
}

pub fn run() -> CommandResult {
    let result = load_config().and_then(|config| {
        with_pool(&config, |pool| async move {
            let seeded = ProfileSeedDataset::load(&pool)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

            let verification = ProfileSeedDataset::verify(&pool)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), EXIT_INPUT))?;
            if !verification.all_present {
                return Err(("seed_verification", verification_message(&verification.checks), EXIT_INPUT));
            }

            Ok(SeedOutput { profiles: seeded.profiles_seeded })
        })
    });

    match result {
        Ok(output) => {
            let message = format!("default profiles seeded: {}", output.profiles.join(", "));
            CommandResult::success_with_data("seed", message, output)
        }
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}

fn verification_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks =
        checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "some seed profiles failed to load".to_string()
    } else {
        format!("seed verification failed for profiles: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [("dev-senior", true), ("dev", false), ("pm", false)];

        assert_eq!(verification_message(&checks), "seed verification failed for profiles: dev, pm");
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let checks = [("dev", true), ("pm", true)];

        assert_eq!(verification_message(&checks), "some seed profiles failed to load");
    }
}
