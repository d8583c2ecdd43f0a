//! The one-byte test pattern shared by transmitter and receiver.

/// Byte sent and expected in single character mode.
pub const SINGLE_CHAR: u8 = b'U';

/// First byte of the rotating sequence.
pub const FIRST: u8 = b'A';

/// Last byte of the rotating sequence before wrapping.
pub const LAST: u8 = b'Z';

/// Which sequence the pattern follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    /// `A, B, ..., Z, A, ...`
    Rotating,
    /// `U, U, U, ...`
    Single,
}

impl PatternMode {
    pub fn from_single_flag(single: bool) -> Self {
        if single {
            Self::Single
        } else {
            Self::Rotating
        }
    }
}

/// Current position in the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    mode: PatternMode,
    current: u8,
}

impl Pattern {
    pub fn new(mode: PatternMode) -> Self {
        let current = match mode {
            PatternMode::Rotating => FIRST,
            PatternMode::Single => SINGLE_CHAR,
        };
        Self { mode, current }
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    /// The byte to send, or the byte expected next.
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Step to the next byte. A no-op in single mode.
    pub fn advance(&mut self) {
        if self.mode == PatternMode::Rotating {
            self.current = if self.current >= LAST {
                FIRST
            } else {
                self.current + 1
            };
        }
    }
}

/// Printable rendering of a byte for mismatch reports: `X(0x58)`.
pub fn describe_byte(byte: u8) -> String {
    let shown = if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    };
    format!("{shown}(0x{byte:02x})")
}
