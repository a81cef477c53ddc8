use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Bitmask of the interaction modes that are currently active. Several may
/// be on at once (`EDIT | APPEND`); `NONE` is the empty set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode(u8);

impl Mode {
    pub const NONE: Mode = Mode(0);
    pub const CREATE: Mode = Mode(1);
    pub const EDIT: Mode = Mode(1 << 1);
    pub const DELETE: Mode = Mode(1 << 2);
    pub const APPEND: Mode = Mode(1 << 3);
    pub const EDIT_APPEND: Mode = Mode(Self::EDIT.0 | Self::APPEND.0);
    pub const ALL: Mode =
        Mode(Self::CREATE.0 | Self::EDIT.0 | Self::DELETE.0 | Self::APPEND.0);

    /// Presentation class for each flag, in the order the host receives them.
    pub const CLASSES: [(&'static str, Mode); 5] = [
        ("mode-none", Mode::NONE),
        ("mode-create", Mode::CREATE),
        ("mode-edit", Mode::EDIT),
        ("mode-delete", Mode::DELETE),
        ("mode-append", Mode::APPEND),
    ];

    pub fn from_bits(bits: u8) -> Self {
        Mode(bits & Self::ALL.0)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag of `other` is set. `NONE` is contained only in
    /// the empty mask, so the `mode-none` class tracks emptiness.
    #[inline]
    pub fn contains(self, other: Mode) -> bool {
        if other.is_empty() {
            self.is_empty()
        } else {
            self.0 & other.0 == other.0
        }
    }

    /// The class list mirroring this mask, one entry per flag.
    pub fn classes(self) -> [(&'static str, bool); 5] {
        Self::CLASSES.map(|(name, flag)| (name, self.contains(flag)))
    }
}

impl BitOr for Mode {
    type Output = Mode;

    fn bitor(self, rhs: Mode) -> Mode {
        Mode(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mode {
    fn bitor_assign(&mut self, rhs: Mode) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Mode {
    type Output = Mode;

    fn bitand(self, rhs: Mode) -> Mode {
        Mode(self.0 & rhs.0)
    }
}

impl Not for Mode {
    type Output = Mode;

    fn not(self) -> Mode {
        Mode(!self.0 & Self::ALL.0)
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names = [
            ("CREATE", Mode::CREATE),
            ("EDIT", Mode::EDIT),
            ("DELETE", Mode::DELETE),
            ("APPEND", Mode::APPEND),
        ];
        let mut first = true;
        for (name, flag) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let mode = Mode::EDIT | Mode::APPEND;
        assert_eq!(mode, Mode::EDIT_APPEND);
        assert!(mode.contains(Mode::EDIT));
        assert!(mode.contains(Mode::APPEND));
        assert!(!mode.contains(Mode::CREATE));
        assert!(!mode.contains(Mode::NONE));
        assert!(Mode::NONE.contains(Mode::NONE));
    }

    #[test]
    fn clearing_a_flag() {
        let mode = Mode::ALL & !Mode::CREATE;
        assert!(!mode.contains(Mode::CREATE));
        assert!(mode.contains(Mode::EDIT | Mode::DELETE | Mode::APPEND));
    }

    #[test]
    fn classes_mirror_the_mask() {
        let classes = (Mode::CREATE | Mode::DELETE).classes();
        assert_eq!(
            classes,
            [
                ("mode-none", false),
                ("mode-create", true),
                ("mode-edit", false),
                ("mode-delete", true),
                ("mode-append", false),
            ]
        );
        assert_eq!(Mode::NONE.classes()[0], ("mode-none", true));
    }

    #[test]
    fn debug_lists_flags() {
        assert_eq!(format!("{:?}", Mode::EDIT_APPEND), "EDIT|APPEND");
        assert_eq!(format!("{:?}", Mode::NONE), "NONE");
        assert_eq!(Mode::from_bits(0xff), Mode::ALL);
    }
}
