//! Random exercise selection.

use std::collections::BTreeSet;

use database::{exercise, Database, Exercise};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

/// Picks one eligible exercise for a profile.
///
/// An exercise is eligible when its level is at most the profile's fitness
/// level and it shares at least one tag with the profile.
#[derive(Debug, Clone)]
pub struct ExerciseSelector {
    database: Database,
}

impl ExerciseSelector {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Choose uniformly among eligible exercises.
    ///
    /// Returns `None` when nothing is eligible. Persistence errors are logged
    /// and also yield `None` so the caller can skip the reminder.
    pub async fn select(&self, level: u8, tags: &BTreeSet<String>) -> Option<Exercise> {
        if tags.is_empty() {
            debug!("No tags for level {}, nothing to select", level);
            return None;
        }

        let tags: Vec<String> = tags.iter().cloned().collect();
        let candidates = match exercise::list_eligible(self.database.pool(), level, &tags).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Exercise lookup failed (level {}, tags {:?}): {}", level, tags, e);
                return None;
            }
        };

        let picked = choose(candidates, &mut rand::thread_rng());
        if picked.is_none() {
            info!("No eligible exercise for level {} and tags {:?}", level, tags);
        }
        picked
    }
}

/// Uniform choice. Separate from the lookup so the rng never lives across an await.
pub fn choose<R: Rng + ?Sized>(candidates: Vec<Exercise>, rng: &mut R) -> Option<Exercise> {
    candidates.choose(rng).cloned()
}
