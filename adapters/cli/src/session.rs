use std::{
    collections::HashMap,
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use geocoin_core::{
    kind_profile, CellIndex, CellKind, CollectError, Command, DepositError, Direction, Event,
};
use geocoin_persistence::{self as persistence, LoadSource};
use geocoin_system_autosave::Autosave;
use geocoin_system_bootstrap::Bootstrap;
use geocoin_system_navigation::{NavigationInput, Navigator};
use geocoin_world::{self as world, query, World, WorldSettings};

use crate::save;

/// Interactive session binding the world and its systems to the terminal.
pub(crate) struct Session {
    pub(crate) world: World,
    pub(crate) navigator: Navigator,
    pub(crate) autosave: Autosave,
    save_path: PathBuf,
    banner: &'static str,
}

impl Session {
    /// Boots a session from the save slot, falling back to a fresh world.
    pub(crate) fn start(settings: WorldSettings, save_path: PathBuf) -> Result<Self> {
        let payload = save::read_slot(&save_path)?;
        let outcome = persistence::load_or_init(payload.as_deref());
        match &outcome.source {
            LoadSource::Fresh => info!("no save found; starting a fresh session"),
            LoadSource::Restored => info!(
                caches = outcome.session.caches.len(),
                "restoring persisted session"
            ),
            LoadSource::DiscardedCorrupt(error) => {
                warn!(error = %error, "discarding corrupt save in favor of a fresh session");
            }
        }

        let bootstrap = Bootstrap::default();
        let mut world = World::with_settings(settings);
        let mut events = Vec::new();
        for command in bootstrap.commands(&outcome) {
            world::apply(&mut world, command, &mut events);
        }

        let mut autosave = Autosave::new();
        autosave.observe(&events);
        let banner = bootstrap.welcome_banner(&world);

        Ok(Self {
            world,
            navigator: Navigator::new(),
            autosave,
            save_path,
            banner,
        })
    }

    /// Runs the interactive loop until the player quits or input ends.
    pub(crate) fn run(&mut self, mut input: impl BufRead, out: &mut impl Write) -> Result<()> {
        writeln!(out, "{}", self.banner)?;
        self.render(out)?;

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let mut line = String::new();
            let read = input
                .read_line(&mut line)
                .context("failed to read player input")?;
            if read == 0 {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_action(line) {
                Ok(PlayerAction::Quit) => break,
                Ok(PlayerAction::Help) => write_help(out)?,
                Ok(PlayerAction::Coins) => self.write_inventory(out)?,
                Ok(PlayerAction::Play(command)) => self.execute(command, out)?,
                Err(message) => writeln!(out, "{message}")?,
            }
        }

        let _ = self.flush_save()?;
        Ok(())
    }

    /// Persists the session if any observed event changed persisted state.
    pub(crate) fn flush_save(&mut self) -> Result<bool> {
        if !self.autosave.take_due() {
            return Ok(false);
        }

        let payload = persistence::encode(&query::session_snapshot(&self.world));
        save::write_slot(&self.save_path, &payload)?;
        debug!(path = %self.save_path.display(), "session autosaved");
        Ok(true)
    }

    fn execute(&mut self, command: PlayCommand, out: &mut impl Write) -> Result<()> {
        let mut commands = Vec::new();
        match command {
            PlayCommand::Step(direction) => self.navigator.handle(
                NavigationInput::new(Some(direction), None),
                query::player(&self.world),
                query::tile_layout(&self.world),
                &mut commands,
            ),
            PlayCommand::Collect(cell) => commands.push(Command::Collect { cell }),
            PlayCommand::Deposit(cell) => commands.push(Command::Deposit { cell }),
            PlayCommand::Save => commands.push(Command::SaveCheckpoint),
            PlayCommand::Undo => commands.push(Command::Undo),
        }

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.autosave.observe(&events);

        if matches!(command, PlayCommand::Undo) && events.is_empty() {
            writeln!(out, "Nothing to undo.")?;
        }
        for line in events.iter().filter_map(describe_event) {
            writeln!(out, "{line}")?;
        }

        self.render(out)?;
        let _ = self.flush_save()?;
        Ok(())
    }

    fn render(&self, out: &mut impl Write) -> Result<()> {
        let neighborhood = query::neighborhood(&self.world);
        let player_cell = query::player_cell(&self.world);
        let materialized: HashMap<CellIndex, (CellKind, usize)> = query::cache_view(&self.world)
            .iter()
            .map(|overview| (overview.cell, (overview.kind, overview.coin_count)))
            .collect();

        let radius = i32::from(neighborhood.radius());
        for di in (-radius..=radius).rev() {
            for dj in -radius..=radius {
                let cell = neighborhood.center().offset(di, dj);
                let token = if cell == player_cell {
                    String::from("@")
                } else if let Some((kind, coin_count)) = materialized.get(&cell) {
                    format!("{}{coin_count}", kind_profile(*kind).glyph())
                } else {
                    String::from(".")
                };
                write!(out, "{token:>4}")?;
            }
            writeln!(out)?;
        }

        let position = query::player(&self.world);
        writeln!(
            out,
            "({:.5}, {:.5}) cell {player_cell} | carrying {} | checkpoints {}",
            position.lat(),
            position.lng(),
            query::inventory(&self.world).len(),
            query::checkpoint_depth(&self.world),
        )?;
        Ok(())
    }

    fn write_inventory(&self, out: &mut impl Write) -> Result<()> {
        let coins = query::inventory(&self.world);
        if coins.is_empty() {
            writeln!(out, "You carry no coins.")?;
            return Ok(());
        }

        writeln!(out, "Carrying {} coin(s), newest last:", coins.len())?;
        for coin in coins {
            writeln!(out, "  {coin}")?;
        }
        Ok(())
    }
}

/// Player intent parsed from one line of terminal input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayerAction {
    /// World-mutating request forwarded through the command pipeline.
    Play(PlayCommand),
    /// Lists the coins currently carried.
    Coins,
    /// Prints the command reference.
    Help,
    /// Ends the session.
    Quit,
}

/// World-mutating requests the session forwards as commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayCommand {
    /// Steps one tile along a compass direction.
    Step(Direction),
    /// Takes the top coin from the cache in the named cell.
    Collect(CellIndex),
    /// Drops the newest carried coin into the named cell.
    Deposit(CellIndex),
    /// Records an undo checkpoint.
    Save,
    /// Rewinds to the most recent checkpoint.
    Undo,
}

pub(crate) fn parse_action(line: &str) -> Result<PlayerAction, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err(String::from("type `help` for the command list"));
    };

    let action = match verb {
        "n" | "north" => PlayerAction::Play(PlayCommand::Step(Direction::North)),
        "e" | "east" => PlayerAction::Play(PlayCommand::Step(Direction::East)),
        "s" | "south" => PlayerAction::Play(PlayCommand::Step(Direction::South)),
        "w" | "west" => PlayerAction::Play(PlayCommand::Step(Direction::West)),
        "collect" => PlayerAction::Play(PlayCommand::Collect(parse_cell(&mut parts, verb)?)),
        "deposit" => PlayerAction::Play(PlayCommand::Deposit(parse_cell(&mut parts, verb)?)),
        "save" => PlayerAction::Play(PlayCommand::Save),
        "undo" => PlayerAction::Play(PlayCommand::Undo),
        "coins" => PlayerAction::Coins,
        "help" | "?" => PlayerAction::Help,
        "quit" | "q" | "exit" => PlayerAction::Quit,
        other => {
            return Err(format!(
                "unrecognized command `{other}`; type `help` for the command list"
            ))
        }
    };

    if parts.next().is_some() {
        return Err(format!("unexpected input after `{verb}`"));
    }
    Ok(action)
}

fn parse_cell<'line>(
    parts: &mut impl Iterator<Item = &'line str>,
    verb: &str,
) -> Result<CellIndex, String> {
    let (Some(i_raw), Some(j_raw)) = (parts.next(), parts.next()) else {
        return Err(format!("`{verb}` needs a cell, e.g. `{verb} 3 -2`"));
    };
    let i = parse_index(i_raw)?;
    let j = parse_index(j_raw)?;
    Ok(CellIndex::new(i, j))
}

fn parse_index(raw: &str) -> Result<i32, String> {
    raw.parse()
        .map_err(|_| format!("expected a cell index, got `{raw}`"))
}

fn describe_event(event: &Event) -> Option<String> {
    match event {
        Event::PlayerMoved { .. } => None,
        Event::CacheRevealed { cell, coin_count } => Some(format!(
            "A cache comes into view at {cell} holding {coin_count} coin(s)."
        )),
        Event::CoinCollected { cell, coin } => {
            Some(format!("Collected {coin} from the cache at {cell}."))
        }
        Event::CollectRejected {
            cell,
            reason: CollectError::EmptyCache,
        } => Some(format!("The cache at {cell} has no coins left.")),
        Event::CoinDeposited { cell, coin } => {
            Some(format!("Deposited {coin} into the cache at {cell}."))
        }
        Event::DepositRejected {
            reason: DepositError::EmptyInventory,
            ..
        } => Some(String::from("You carry no coins to deposit.")),
        Event::CheckpointSaved { depth } => Some(format!("Checkpoint saved ({depth} held).")),
        Event::CheckpointRestored { remaining } => Some(format!(
            "Rewound to the last checkpoint ({remaining} remaining)."
        )),
        Event::SessionRestored { cache_count } => Some(format!(
            "Resumed a session tracking {cache_count} cache(s)."
        )),
    }
}

fn write_help(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  n | e | s | w    step one tile in that direction")?;
    writeln!(out, "  collect I J      take the top coin from the cache in cell I:J")?;
    writeln!(out, "  deposit I J      drop the newest carried coin into cell I:J")?;
    writeln!(out, "  save             record an undo checkpoint")?;
    writeln!(out, "  undo             rewind to the most recent checkpoint")?;
    writeln!(out, "  coins            list carried coins")?;
    writeln!(out, "  help             show this list")?;
    writeln!(out, "  quit             end the session")?;
    Ok(())
}
