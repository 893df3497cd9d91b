use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

/// The 16 data-processing opcodes (instruction bits 24-21).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum AluOp {
    /// Rd = Rn AND Op2
    And = 0x0,
    /// Rd = Rn XOR Op2
    Eor = 0x1,
    /// Rd = Rn - Op2
    Sub = 0x2,
    /// Rd = Op2 - Rn
    Rsb = 0x3,
    /// Rd = Rn + Op2
    Add = 0x4,
    /// Rd = Rn + Op2 + C
    Adc = 0x5,
    /// Rd = Rn - Op2 + C - 1
    Sbc = 0x6,
    /// Rd = Op2 - Rn + C - 1
    Rsc = 0x7,
    /// flags from Rn AND Op2
    Tst = 0x8,
    /// flags from Rn XOR Op2
    Teq = 0x9,
    /// flags from Rn - Op2
    Cmp = 0xA,
    /// flags from Rn + Op2
    Cmn = 0xB,
    /// Rd = Rn OR Op2
    Orr = 0xC,
    /// Rd = Op2
    Mov = 0xD,
    /// Rd = Rn AND NOT Op2
    Bic = 0xE,
    /// Rd = NOT Op2
    Mvn = 0xF,
}

impl From<u32> for AluOp {
    fn from(opcode: u32) -> Self {
        use AluOp::{Adc, Add, And, Bic, Cmn, Cmp, Eor, Mov, Mvn, Orr, Rsb, Rsc, Sbc, Sub, Teq, Tst};
        match opcode {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x3 => Rsb,
            0x4 => Add,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Rsc,
            0x8 => Tst,
            0x9 => Teq,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mov,
            0xE => Bic,
            0xF => Mvn,
            _ => unreachable!(),
        }
    }
}

impl Display for AluOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Eor => f.write_str("EOR"),
            Self::Sub => f.write_str("SUB"),
            Self::Rsb => f.write_str("RSB"),
            Self::Add => f.write_str("ADD"),
            Self::Adc => f.write_str("ADC"),
            Self::Sbc => f.write_str("SBC"),
            Self::Rsc => f.write_str("RSC"),
            Self::Tst => f.write_str("TST"),
            Self::Teq => f.write_str("TEQ"),
            Self::Cmp => f.write_str("CMP"),
            Self::Cmn => f.write_str("CMN"),
            Self::Orr => f.write_str("ORR"),
            Self::Mov => f.write_str("MOV"),
            Self::Bic => f.write_str("BIC"),
            Self::Mvn => f.write_str("MVN"),
        }
    }
}

/// Unsigned direction of an arithmetic opcode; picks the carry rule.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Add,
    Sub,
    ReverseSub,
}

/// An ALU result before it is committed to the register file.
///
/// `carry`/`overflow` are `None` for the logical operations: there the
/// carry comes from the barrel shifter and V is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOutput {
    pub value: u32,
    pub write_destination: bool,
    pub carry: Option<bool>,
    pub overflow: Option<bool>,
}

/// Runs one data-processing opcode.
///
/// Carry is derived from the unsigned wrap of the operation direction
/// (add: result < op1; subtract: result > op1; reverse-subtract:
/// result > op2) and V from same-sign-operands/opposite-sign-result, for
/// arithmetic opcodes only. The compare/test family never writes back.
#[must_use]
pub fn alu_execute(op: AluOp, op1: u32, op2: u32, carry_in: bool) -> AluOutput {
    let carry = u32::from(carry_in);

    let (value, direction, write_destination) = match op {
        AluOp::And => (op1 & op2, None, true),
        AluOp::Eor => (op1 ^ op2, None, true),
        AluOp::Sub => (op1.wrapping_sub(op2), Some(Direction::Sub), true),
        AluOp::Rsb => (op2.wrapping_sub(op1), Some(Direction::ReverseSub), true),
        AluOp::Add => (op1.wrapping_add(op2), Some(Direction::Add), true),
        AluOp::Adc => (
            op1.wrapping_add(op2).wrapping_add(carry),
            Some(Direction::Add),
            true,
        ),
        AluOp::Sbc => (
            op1.wrapping_sub(op2).wrapping_add(carry).wrapping_sub(1),
            Some(Direction::Sub),
            true,
        ),
        AluOp::Rsc => (
            op2.wrapping_sub(op1).wrapping_add(carry).wrapping_sub(1),
            Some(Direction::ReverseSub),
            true,
        ),
        AluOp::Tst => (op1 & op2, None, false),
        AluOp::Teq => (op1 ^ op2, None, false),
        AluOp::Cmp => (op1.wrapping_sub(op2), Some(Direction::Sub), false),
        AluOp::Cmn => (op1.wrapping_add(op2), Some(Direction::Add), false),
        AluOp::Orr => (op1 | op2, None, true),
        AluOp::Mov => (op2, None, true),
        AluOp::Bic => (op1 & !op2, None, true),
        AluOp::Mvn => (!op2, None, true),
    };

    let carry = direction.map(|direction| match direction {
        Direction::Add => value < op1,
        Direction::Sub => value > op1,
        Direction::ReverseSub => value > op2,
    });
    let overflow = direction.map(|_| {
        let same_sign = op1.get_bit(31) == op2.get_bit(31);
        same_sign && value.get_bit(31) != op1.get_bit(31)
    });

    AluOutput {
        value,
        write_destination,
        carry,
        overflow,
    }
}

/// Shifted value plus the carry the shifter would leave in CPSR when the
/// instruction requests flag updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOutput {
    pub value: u32,
    pub carry: bool,
}

/// The barrel shifter.
///
/// A literal amount of 0 encodes special forms: LSR/ASR read it as a shift
/// by 32 and ROR#0 is rotate-right-extended (one-bit rotate through the
/// carry). `force` disables those readings and shifts by the literal
/// amount; the rotated-immediate operand always applies it.
#[must_use]
pub fn barrel_shift(
    kind: ShiftKind,
    base: u32,
    amount: u32,
    carry_in: bool,
    force: bool,
) -> ShiftOutput {
    match kind {
        ShiftKind::Lsl => match amount {
            // LSL#0: no shift performed, the carry is untouched
            0 => ShiftOutput {
                value: base,
                carry: carry_in,
            },
            1..=32 => ShiftOutput {
                value: ((u64::from(base)) << amount) as u32,
                carry: base.get_bit((32 - amount) as u8),
            },
            _ => ShiftOutput {
                value: 0,
                carry: false,
            },
        },
        ShiftKind::Lsr => {
            let amount = if amount == 0 && !force { 32 } else { amount };
            match amount {
                0 => ShiftOutput {
                    value: base,
                    carry: carry_in,
                },
                1..=32 => ShiftOutput {
                    value: (u64::from(base) >> amount) as u32,
                    carry: base.get_bit((amount - 1) as u8),
                },
                _ => ShiftOutput {
                    value: 0,
                    carry: false,
                },
            }
        }
        ShiftKind::Asr => {
            let amount = if amount == 0 && !force { 32 } else { amount };
            match amount {
                0 => ShiftOutput {
                    value: base,
                    carry: carry_in,
                },
                1..=31 => ShiftOutput {
                    value: ((base as i32) >> amount) as u32,
                    carry: base.get_bit((amount - 1) as u8),
                },
                // ASR#32 and beyond replicate the sign bit everywhere
                _ => ShiftOutput {
                    value: ((base as i32) >> 31) as u32,
                    carry: base.get_bit(31),
                },
            }
        }
        ShiftKind::Ror => {
            if amount == 0 {
                if force {
                    ShiftOutput {
                        value: base,
                        carry: carry_in,
                    }
                } else {
                    // ROR#0 encodes RRX: the carry becomes bit 31, the old
                    // bit 0 becomes the new carry
                    ShiftOutput {
                        value: (base >> 1) | (u32::from(carry_in) << 31),
                        carry: base.get_bit(0),
                    }
                }
            } else {
                let value = base.rotate_right(amount % 32);
                ShiftOutput {
                    value,
                    carry: value.get_bit(31),
                }
            }
        }
    }
}
