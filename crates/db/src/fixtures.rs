use rust_decimal::Decimal;
use tracing::info;

use stackwise_core::domain::profile::{ProfileCategory, ProfileId, ProfileLevel, TjmProfile};

use crate::connection::DbPool;
use crate::repositories::{ProfileRepository, RepositoryError, SqlProfileRepository};

struct SeedProfile {
    id: &'static str,
    name: &'static str,
    category: ProfileCategory,
    level: ProfileLevel,
    tjm: i64,
    default_percentage: i64,
}

/// Default staffing grid. Active shares add up to 100; the junior profile starts at zero
/// and only joins a budget through an explicit override.
const SEED_PROFILES: &[SeedProfile] = &[
    SeedProfile {
        id: "dev-senior",
        name: "Développeur senior",
        category: ProfileCategory::Dev,
        level: ProfileLevel::Senior,
        tjm: 650,
        default_percentage: 35,
    },
    SeedProfile {
        id: "dev",
        name: "Développeur",
        category: ProfileCategory::Dev,
        level: ProfileLevel::Standard,
        tjm: 500,
        default_percentage: 25,
    },
    SeedProfile {
        id: "design",
        name: "Designer UI/UX",
        category: ProfileCategory::Design,
        level: ProfileLevel::Standard,
        tjm: 550,
        default_percentage: 15,
    },
    SeedProfile {
        id: "devops",
        name: "DevOps",
        category: ProfileCategory::Devops,
        level: ProfileLevel::Standard,
        tjm: 600,
        default_percentage: 5,
    },
    SeedProfile {
        id: "pm",
        name: "Chef de projet",
        category: ProfileCategory::Management,
        level: ProfileLevel::Standard,
        tjm: 700,
        default_percentage: 20,
    },
    SeedProfile {
        id: "dev-junior",
        name: "Développeur junior",
        category: ProfileCategory::Dev,
        level: ProfileLevel::Junior,
        tjm: 350,
        default_percentage: 0,
    },
];

impl SeedProfile {
    fn to_profile(&self, sort: i64) -> TjmProfile {
        TjmProfile::new(
            self.id,
            self.name,
            Decimal::from(self.tjm),
            Decimal::from(self.default_percentage),
        )
        .with_category(self.category, self.level)
        .with_sort(sort)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub profiles_seeded: Vec<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Default TJM profiles used by `stackwise seed`.
pub struct ProfileSeedDataset;

impl ProfileSeedDataset {
    pub fn profiles() -> Vec<TjmProfile> {
        SEED_PROFILES
            .iter()
            .zip(1_i64..)
            .map(|(seed, sort)| seed.to_profile(sort))
            .collect()
    }

    /// Upserts the default profiles; running it twice leaves the same rows.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let repo = SqlProfileRepository::new(pool.clone());
        for profile in Self::profiles() {
            repo.save(profile).await?;
        }

        let profiles_seeded = SEED_PROFILES.iter().map(|seed| seed.id).collect::<Vec<_>>();
        info!(
            event_name = "seed.profiles_loaded",
            count = profiles_seeded.len(),
            "default profiles seeded"
        );
        Ok(SeedResult { profiles_seeded })
    }

    /// Checks that every default profile exists with its seeded rate.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let repo = SqlProfileRepository::new(pool.clone());
        let mut checks = Vec::with_capacity(SEED_PROFILES.len());

        for seed in SEED_PROFILES {
            let stored = repo.find_by_id(&ProfileId::new(seed.id)).await?;
            let matches = stored.is_some_and(|profile| {
                profile.tjm == Decimal::from(seed.tjm)
                    && profile.default_percentage == Decimal::from(seed.default_percentage)
            });
            checks.push((seed.id, matches));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}
