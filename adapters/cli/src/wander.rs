use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

use geocoin_core::{CellIndex, Command, Direction, Event};
use geocoin_system_navigation::NavigationInput;
use geocoin_world::{self as world, query};

use crate::session::Session;

const DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

/// Summary of an automated walk.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct WanderReport {
    /// Number of steps taken.
    pub(crate) steps: u32,
    /// Caches that came into view during the walk.
    pub(crate) revealed: usize,
    /// Coins collected along the way.
    pub(crate) collected: usize,
    /// Cell the player ended in.
    pub(crate) final_cell: CellIndex,
}

/// Walks the player along a seeded random path, sweeping coins on the way.
///
/// Each step draws one compass direction from the seeded stream, then
/// collects a coin from the entered cell when its cache holds any. The same
/// seed over the same world replays the same walk.
pub(crate) fn run(session: &mut Session, steps: u32, seed: u64) -> WanderReport {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut revealed = 0;
    let mut collected = 0;

    for _ in 0..steps {
        let direction = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];
        let mut commands = Vec::new();
        session.navigator.handle(
            NavigationInput::new(Some(direction), None),
            query::player(&session.world),
            query::tile_layout(&session.world),
            &mut commands,
        );

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut session.world, command, &mut events);
        }

        let here = query::player_cell(&session.world);
        let holds_coins =
            query::coins_at(&session.world, here).map_or(false, |coins| !coins.is_empty());
        if holds_coins {
            world::apply(
                &mut session.world,
                Command::Collect { cell: here },
                &mut events,
            );
        }

        session.autosave.observe(&events);
        for event in &events {
            match event {
                Event::CacheRevealed { .. } => revealed += 1,
                Event::CoinCollected { .. } => collected += 1,
                _ => {}
            }
        }
    }

    WanderReport {
        steps,
        revealed,
        collected,
        final_cell: query::player_cell(&session.world),
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::session::Session;
    use geocoin_core::GeoPosition;
    use geocoin_system_generation::Config;
    use geocoin_world::{query, WorldSettings};
    use tempfile::TempDir;

    const TILE: f64 = 1e-4;

    fn settings() -> WorldSettings {
        WorldSettings::new(
            TILE,
            GeoPosition::new(TILE * 0.5, TILE * 0.5),
            2,
            Config::new(0x77a1_7a1e_0f5e_ed00, 1.0, 6),
        )
    }

    fn fresh_session(dir: &TempDir) -> Session {
        Session::start(settings(), dir.path().join("geocoin-save.txt")).expect("session")
    }

    #[test]
    fn identical_seeds_walk_identical_paths() {
        let temp_a = TempDir::new().expect("tempdir");
        let temp_b = TempDir::new().expect("tempdir");
        let mut first = fresh_session(&temp_a);
        let mut second = fresh_session(&temp_b);

        let report_a = run(&mut first, 32, 7);
        let report_b = run(&mut second, 32, 7);

        assert_eq!(report_a, report_b);
        assert_eq!(
            query::session_snapshot(&first.world),
            query::session_snapshot(&second.world)
        );
    }

    #[test]
    fn every_step_extends_the_trail() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = fresh_session(&temp);

        let report = run(&mut session, 16, 3);

        assert_eq!(report.steps, 16);
        assert_eq!(query::trail(&session.world).len(), 17);
    }

    #[test]
    fn collected_coins_land_in_the_inventory() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = fresh_session(&temp);

        let report = run(&mut session, 24, 11);

        assert_eq!(query::inventory(&session.world).len(), report.collected);
    }

    #[test]
    fn walking_arms_the_autosave_latch() {
        let temp = TempDir::new().expect("tempdir");
        let mut session = fresh_session(&temp);

        let _ = run(&mut session, 1, 0);

        assert!(session.autosave.is_due());
    }
}
