//! UCI command parsing.

use std::time::Duration;

use arbor_core::Game;

use crate::error::UciError;

/// Accepted range for the `ReuseCap` option.
pub const REUSE_CAP_RANGE: (usize, usize) = (1, 256);

/// Accepted range for the `MaxDepth` option.
pub const MAX_DEPTH_RANGE: (u8, u8) = (1, 8);

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` uses defaults.
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// Search to this depth only.
    pub depth: Option<u8>,
    /// Time allotted for this move.
    pub movetime: Option<Duration>,
    /// No time limit.
    pub infinite: bool,
}

/// An option set via `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOption {
    /// Cached children re-searched per reused node.
    ReuseCap(usize),
    /// Ceiling on the planned search depth.
    MaxDepth(u8),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a game with optional moves applied.
    Position(Game),
    /// `go` -- search with the given parameters.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(UciOption),
    /// `stop` -- the search is synchronous, so there is nothing to halt.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command, ignored.
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
///
/// Moves are played onto the game so its fingerprint history matches the
/// actual game, which the subtree cache relies on.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.is_empty() {
        return Err(UciError::MalformedPosition);
    }

    let (mut game, rest) = if tokens[0] == "startpos" {
        (Game::startpos(), &tokens[1..])
    } else if tokens[0] == "fen" {
        // FEN is 6 space-separated fields
        if tokens.len() < 7 {
            return Err(UciError::InvalidFen {
                fen: tokens[1..].join(" "),
            });
        }
        let fen = tokens[1..7].join(" ");
        let game = Game::from_fen(&fen).map_err(|_| UciError::InvalidFen { fen: fen.clone() })?;
        (game, &tokens[7..])
    } else {
        return Err(UciError::MalformedPosition);
    };

    if !rest.is_empty() && rest[0] == "moves" {
        for uci_str in &rest[1..] {
            let mv = game
                .parse_uci_move(uci_str)
                .map_err(|_| UciError::InvalidMove {
                    uci_move: uci_str.to_string(),
                })?;
            game.play(&mv);
        }
    }

    Ok(Command::Position(game))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, depth, movetime, infinite. Unknown tokens
/// (increments, movestogo, nodes, ponder) are skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.wtime = Some(parse_millis(tokens.get(i + 1), "wtime")?);
                i += 2;
            }
            "btime" => {
                params.btime = Some(parse_millis(tokens.get(i + 1), "btime")?);
                i += 2;
            }
            "depth" => {
                params.depth = Some(parse_int(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "movetime" => {
                params.movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

/// Parse `setoption name <Name> value <N>`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    let (name, value) = match tokens {
        ["name", name, "value", value] => (*name, *value),
        _ => return Err(UciError::MalformedOption),
    };

    let invalid = || UciError::InvalidOptionValue {
        name: name.to_string(),
        value: value.to_string(),
    };

    match name.to_ascii_lowercase().as_str() {
        "reusecap" => {
            let cap: usize = value.parse().map_err(|_| invalid())?;
            let (min, max) = REUSE_CAP_RANGE;
            if !(min..=max).contains(&cap) {
                return Err(invalid());
            }
            Ok(Command::SetOption(UciOption::ReuseCap(cap)))
        }
        "maxdepth" => {
            let depth: u8 = value.parse().map_err(|_| invalid())?;
            let (min, max) = MAX_DEPTH_RANGE;
            if !(min..=max).contains(&depth) {
                return Err(invalid());
            }
            Ok(Command::SetOption(UciOption::MaxDepth(depth)))
        }
        _ => Err(UciError::UnknownOption {
            name: name.to_string(),
        }),
    }
}

/// Parse a millisecond value from a token.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    // Clocks can go negative in some GUIs after a flag; treat that as zero.
    let ms: i64 = value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
