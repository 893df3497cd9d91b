//! # Conditional Execution
//!
//! Every ARM instruction carries a condition in its top 4 bits (31-28) and
//! only executes when the CPSR flags satisfy it:
//!
//! ```text
//! ┌──────┬────────┬──────────────────────┬────────────────┐
//! │ Code │ Suffix │ Meaning              │ Flags tested   │
//! ├──────┼────────┼──────────────────────┼────────────────┤
//! │ 0000 │  EQ    │ equal / zero         │ Z=1            │
//! │ 0001 │  NE    │ not equal            │ Z=0            │
//! │ 0010 │  CS    │ unsigned >=          │ C=1            │
//! │ 0011 │  CC    │ unsigned <           │ C=0            │
//! │ 0100 │  MI    │ negative             │ N=1            │
//! │ 0101 │  PL    │ positive or zero     │ N=0            │
//! │ 0110 │  VS    │ signed overflow      │ V=1            │
//! │ 0111 │  VC    │ no signed overflow   │ V=0            │
//! │ 1000 │  HI    │ unsigned >           │ C=1 and Z=0    │
//! │ 1001 │  LS    │ unsigned <=          │ C=0 or Z=1     │
//! │ 1010 │  GE    │ signed >=            │ N=V            │
//! │ 1011 │  LT    │ signed <             │ N<>V           │
//! │ 1100 │  GT    │ signed >             │ Z=0 and N=V    │
//! │ 1101 │  LE    │ signed <=            │ Z=1 or N<>V    │
//! │ 1110 │  AL    │ always               │ -              │
//! │ 1111 │  NV    │ reserved             │ never passes   │
//! └──────┴────────┴──────────────────────┴────────────────┘
//! ```
//!
//! The reserved code routes whole instructions into the unconditional
//! decode space; as a condition it always evaluates false.
//! See [`Psr::can_execute`](super::psr::Psr::can_execute) for the test.

use serde::{Deserialize, Serialize};

/// The 4-bit condition field preceding every instruction.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    /// Equal / zero (Z=1)
    EQ = 0x0,
    /// Not equal (Z=0)
    NE = 0x1,
    /// Carry set / unsigned higher or same (C=1)
    CS = 0x2,
    /// Carry clear / unsigned lower (C=0)
    CC = 0x3,
    /// Minus / negative (N=1)
    MI = 0x4,
    /// Plus / positive or zero (N=0)
    PL = 0x5,
    /// Signed overflow (V=1)
    VS = 0x6,
    /// No signed overflow (V=0)
    VC = 0x7,
    /// Unsigned higher (C=1 and Z=0)
    HI = 0x8,
    /// Unsigned lower or same (C=0 or Z=1)
    LS = 0x9,
    /// Signed greater or equal (N=V)
    GE = 0xA,
    /// Signed less than (N<>V)
    LT = 0xB,
    /// Signed greater than (Z=0 and N=V)
    GT = 0xC,
    /// Signed less or equal (Z=1 or N<>V)
    LE = 0xD,
    /// Always (the suffix is omitted in assembly)
    AL = 0xE,
    /// Reserved; never passes
    NV = 0xF,
}

impl From<u8> for Condition {
    fn from(item: u8) -> Self {
        match item {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::CS,
            0x3 => Self::CC,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            0xF => Self::NV,
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EQ => f.write_str("EQ"),
            Self::NE => f.write_str("NE"),
            Self::CS => f.write_str("CS"),
            Self::CC => f.write_str("CC"),
            Self::MI => f.write_str("MI"),
            Self::PL => f.write_str("PL"),
            Self::VS => f.write_str("VS"),
            Self::VC => f.write_str("VC"),
            Self::HI => f.write_str("HI"),
            Self::LS => f.write_str("LS"),
            Self::GE => f.write_str("GE"),
            Self::LT => f.write_str("LT"),
            Self::GT => f.write_str("GT"),
            Self::LE => f.write_str("LE"),
            Self::AL => Ok(()),
            Self::NV => f.write_str("_NEVER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_field_value() {
        for raw in 0x0..=0xF_u8 {
            assert_eq!(Condition::from(raw) as u8, raw);
        }
    }
}
