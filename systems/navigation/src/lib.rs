#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input-side system that turns player intent into movement commands.

use geocoin_core::{Command, Direction, GeoPosition, TileLayout};

/// Input snapshot distilled from adapter-provided turn input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationInput {
    /// Compass step requested this turn, if any.
    pub step: Option<Direction>,
    /// Absolute position fix reported this turn, if any.
    pub fix: Option<GeoPosition>,
}

impl NavigationInput {
    /// Bundles the inputs gathered during one turn.
    #[must_use]
    pub const fn new(step: Option<Direction>, fix: Option<GeoPosition>) -> Self {
        Self { step, fix }
    }
}

impl Default for NavigationInput {
    fn default() -> Self {
        Self {
            step: None,
            fix: None,
        }
    }
}

/// Translates steps and position fixes into at most one movement command.
#[derive(Clone, Debug, Default)]
pub struct Navigator;

impl Navigator {
    /// Creates a new navigator instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes the turn's input and the player's current position to emit
    /// movement commands.
    ///
    /// A step advances the player exactly one tile along the compass axis. A
    /// position fix overwrites the position wholesale and takes precedence
    /// over a step arriving in the same turn; fixes carry no ordering token,
    /// so the newest one observed simply wins.
    pub fn handle(
        &self,
        input: NavigationInput,
        player: GeoPosition,
        layout: TileLayout,
        out: &mut Vec<Command>,
    ) {
        if let Some(position) = input.fix {
            out.push(Command::MoveTo { position });
            return;
        }

        if let Some(direction) = input.step {
            let (dlat, dlng) = direction.step_deltas(layout.tile_size_degrees());
            out.push(Command::MoveTo {
                position: player.offset_by(dlat, dlng),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NavigationInput, Navigator};
    use geocoin_core::{Command, Direction, GeoPosition, TileLayout};

    const TILE: f64 = 1e-4;

    fn emitted(input: NavigationInput, player: GeoPosition) -> Vec<Command> {
        let navigator = Navigator::new();
        let mut out = Vec::new();
        navigator.handle(input, player, TileLayout::new(TILE), &mut out);
        out
    }

    #[test]
    fn empty_input_emits_nothing() {
        assert!(emitted(NavigationInput::default(), GeoPosition::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn steps_advance_exactly_one_tile() {
        let player = GeoPosition::new(1.0, 2.0);
        let cases = [
            (Direction::North, (TILE, 0.0)),
            (Direction::East, (0.0, TILE)),
            (Direction::South, (-TILE, 0.0)),
            (Direction::West, (0.0, -TILE)),
        ];

        for (direction, (dlat, dlng)) in cases {
            let input = NavigationInput::new(Some(direction), None);
            let commands = emitted(input, player);
            assert_eq!(
                commands,
                vec![Command::MoveTo {
                    position: player.offset_by(dlat, dlng),
                }],
                "direction {direction:?}"
            );
        }
    }

    #[test]
    fn a_fix_replaces_the_position_wholesale() {
        let fix = GeoPosition::new(48.8584, 2.2945);
        let input = NavigationInput::new(None, Some(fix));
        let commands = emitted(input, GeoPosition::new(0.0, 0.0));
        assert_eq!(commands, vec![Command::MoveTo { position: fix }]);
    }

    #[test]
    fn a_fix_wins_over_a_step_in_the_same_turn() {
        let fix = GeoPosition::new(-33.8568, 151.2153);
        let input = NavigationInput::new(Some(Direction::North), Some(fix));
        let commands = emitted(input, GeoPosition::new(0.0, 0.0));
        assert_eq!(commands, vec![Command::MoveTo { position: fix }]);
    }
}
