use std::fmt;

use crate::error::InvalidCommand;

/// Line terminator accepted after a command when framed for line transport.
pub const TERMINATOR: u8 = b'\n';

/// Length of a command on the wire, terminator excluded.
pub const COMMAND_LEN: usize = 2;

/// Two-bit state exchanged between the nodes, one bit per output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogicalState {
    pub a: bool,
    pub b: bool,
}

impl LogicalState {
    /// All four states in cycling order.
    pub const CYCLE: [LogicalState; 4] = [
        LogicalState::new(false, false),
        LogicalState::new(false, true),
        LogicalState::new(true, false),
        LogicalState::new(true, true),
    ];

    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// State at position `index` of the cycle (taken modulo 4).
    pub const fn from_index(index: usize) -> Self {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    /// Position of this state in the cycle.
    pub const fn index(self) -> usize {
        ((self.a as usize) << 1) | self.b as usize
    }
}

impl From<(bool, bool)> for LogicalState {
    fn from((a, b): (bool, bool)) -> Self {
        Self::new(a, b)
    }
}

impl From<LogicalState> for (bool, bool) {
    fn from(state: LogicalState) -> Self {
        (state.a, state.b)
    }
}

impl fmt::Display for LogicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(encode(*self).as_str())
    }
}

/// A validated 2-character command, `'0'`/`'1'` per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCommand([u8; COMMAND_LEN]);

impl WireCommand {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> &'static str {
        match &self.0 {
            b"00" => "00",
            b"01" => "01",
            b"10" => "10",
            _ => "11",
        }
    }

    /// Command bytes followed by the line terminator.
    pub fn framed(&self) -> [u8; COMMAND_LEN + 1] {
        [self.0[0], self.0[1], TERMINATOR]
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn digit(level: bool) -> u8 {
    if level {
        b'1'
    } else {
        b'0'
    }
}

fn level(offset: usize, byte: u8) -> Result<bool, InvalidCommand> {
    match byte {
        b'0' => Ok(false),
        b'1' => Ok(true),
        _ => Err(InvalidCommand::Digit { offset, byte }),
    }
}

/// Encodes a state as its wire command.
pub fn encode(state: LogicalState) -> WireCommand {
    WireCommand([digit(state.a), digit(state.b)])
}

/// Decodes exactly 2 bytes, or 3 bytes ending in `\n`, into a state.
pub fn decode(bytes: &[u8]) -> Result<LogicalState, InvalidCommand> {
    let command = match bytes {
        [_, _] => bytes,
        [first, second, TERMINATOR] => return decode(&[*first, *second]),
        [_, _, other] => return Err(InvalidCommand::Terminator(*other)),
        _ => return Err(InvalidCommand::Length(bytes.len())),
    };

    Ok(LogicalState::new(level(0, command[0])?, level(1, command[1])?))
}
