//! Synchronous UCI engine loop.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use tracing::{debug, info, warn};

use arbor_core::{Color, Game, uci};
use arbor_engine::{MoveChoice, MoveOrigin, SearchPlan, Searcher};

use crate::command::{
    Command, GoParams, MAX_DEPTH_RANGE, REUSE_CAP_RANGE, UciOption, parse_command,
};
use crate::error::UciError;

/// A `movetime` is treated as one move out of this many left on the clock.
pub const MOVETIME_HORIZON: u32 = 30;

/// The UCI engine, holding the current game and the searcher with its cache.
///
/// Searches run on the calling thread; `go` replies with `bestmove` before
/// the next command is read.
pub struct UciEngine {
    game: Game,
    searcher: Searcher,
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new() -> Self {
        Self {
            game: Game::startpos(),
            searcher: Searcher::new(),
        }
    }

    /// The current game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The searcher and its cache.
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// Run the UCI loop on stdin/stdout until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout.lock())
    }

    /// Run the UCI loop over arbitrary input and output.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), UciError> {
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(cmd = %trimmed, "received UCI command");

            match parse_command(trimmed) {
                Ok(Command::Quit) => break,
                Ok(cmd) => self.handle(cmd, out)?,
                Err(e) => warn!(error = %e, "UCI parse error"),
            }
            out.flush()?;
        }

        info!("arbor shutting down");
        Ok(())
    }

    fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<()> {
        match cmd {
            Command::Uci => self.handle_uci(out),
            Command::IsReady => writeln!(out, "readyok"),
            Command::UciNewGame => {
                self.handle_ucinewgame();
                Ok(())
            }
            Command::Position(game) => {
                self.game = game;
                Ok(())
            }
            Command::Go(params) => self.handle_go(&params, out),
            Command::SetOption(option) => {
                self.handle_setoption(option);
                Ok(())
            }
            Command::Stop | Command::Quit | Command::Unknown(_) => Ok(()),
        }
    }

    fn handle_uci<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let config = self.searcher.config();
        writeln!(out, "id name arbor")?;
        writeln!(out, "id author the arbor developers")?;
        writeln!(
            out,
            "option name ReuseCap type spin default {} min {} max {}",
            config.reuse_cap, REUSE_CAP_RANGE.0, REUSE_CAP_RANGE.1
        )?;
        writeln!(
            out,
            "option name MaxDepth type spin default {} min {} max {}",
            config.planner.max_depth(),
            MAX_DEPTH_RANGE.0,
            MAX_DEPTH_RANGE.1
        )?;
        writeln!(out, "uciok")
    }

    fn handle_ucinewgame(&mut self) {
        self.game = Game::startpos();
        self.searcher.clear_cache();
    }

    fn handle_setoption(&mut self, option: UciOption) {
        let config = self.searcher.config_mut();
        match option {
            UciOption::ReuseCap(cap) => config.reuse_cap = cap,
            UciOption::MaxDepth(depth) => config.planner.set_max_depth(Some(depth)),
        }
        debug!(?option, "option set");
    }

    fn handle_go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> io::Result<()> {
        let budget = self.budget(params);
        let plan = match params.depth {
            Some(depth) => SearchPlan::fixed_depth(depth.max(1)),
            None => self.searcher.config().planner.plan(budget),
        };
        let seed = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);

        match self.searcher.choose_with_plan(&mut self.game, plan, seed) {
            Ok(choice) => {
                self.write_info(&choice, out)?;
                writeln!(out, "bestmove {}", uci(&choice.mv))
            }
            // Only a position without legal moves yields no choice.
            Err(e) => {
                debug!(error = %e, "no move to play");
                writeln!(out, "bestmove 0000")
            }
        }
    }

    /// Remaining time for the side to move.
    ///
    /// Uses the side's clock, else `movetime` scaled by [`MOVETIME_HORIZON`].
    /// With neither (or `infinite`) the budget is unbounded.
    fn budget(&self, params: &GoParams) -> Duration {
        if params.infinite {
            return Duration::MAX;
        }
        let clock = match self.game.turn() {
            Color::White => params.wtime,
            Color::Black => params.btime,
        };
        clock
            .or_else(|| params.movetime.map(|mt| mt.saturating_mul(MOVETIME_HORIZON)))
            .unwrap_or(Duration::MAX)
    }

    fn write_info<W: Write>(&self, choice: &MoveChoice, out: &mut W) -> io::Result<()> {
        let result = &choice.result;
        if choice.origin == MoveOrigin::Fallback {
            return writeln!(out, "info string fallback move");
        }

        // Scores are kept from White's view; UCI reports them for the side to move.
        let score = match self.game.turn() {
            Color::White => result.score,
            Color::Black => -result.score,
        };
        let score_str = if score.is_mate() {
            if score.value() > 0.0 {
                "mate 1".to_string()
            } else {
                "mate -1".to_string()
            }
        } else {
            format!("cp {}", score.centipawns())
        };

        let pv: Vec<String> = result.pv.iter().map(uci).collect();
        writeln!(
            out,
            "info depth {} score {} nodes {} pv {}",
            result.depth,
            score_str,
            result.stats.nodes,
            pv.join(" ")
        )
    }
}
