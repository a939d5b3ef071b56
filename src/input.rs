/// A logical key on the 4×4 hex keypad shared by the backends, `0x0` to `0xF`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u8);

impl Key {
    pub const COUNT: usize = 16;

    pub fn new(code: u8) -> Option<Self> {
        (usize::from(code) < Self::COUNT).then_some(Self(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Position of the key in a `[_; Key::COUNT]` keypad array.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Host key identifiers laid out like the keypad:
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r  ->  4 5 6 D
/// a s d f      7 8 9 E
/// z x c v      A 0 B F
/// ```
const KEYMAP: [(&str, u8); Key::COUNT] = [
    ("1", 0x1),
    ("2", 0x2),
    ("3", 0x3),
    ("4", 0xc),
    ("q", 0x4),
    ("w", 0x5),
    ("e", 0x6),
    ("r", 0xd),
    ("a", 0x7),
    ("s", 0x8),
    ("d", 0x9),
    ("f", 0xe),
    ("z", 0xa),
    ("x", 0x0),
    ("c", 0xb),
    ("v", 0xf),
];

/// Translates a host key identifier (`"q"`, `"4"`, ...) to a keypad key. Letters
/// match regardless of case. Anything else is not a key and yields `None`.
pub fn map_key(identifier: &str) -> Option<Key> {
    KEYMAP
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(identifier))
        .map(|&(_, code)| Key(code))
}
