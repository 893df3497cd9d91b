//! # Instruction Decoding
//!
//! Classifies a fetched 32-bit word into one of the instruction families
//! and extracts the operand fields that family's executor needs. The
//! decoder is a pure function of the word: no register access, no side
//! effects, and every possible word classifies (unimplemented sub-spaces
//! come out as no-op records rather than panics).
//!
//! ## Classification
//!
//! Bits 27-25 select the basic space, with sub-spaces carved out by
//! nested predicates, checked in a fixed priority order:
//!
//! ```text
//! 000, bit4=0          data processing, immediate shift
//!                        └ miscellaneous (MRS/MSR/...) → no-op
//! 000, bit4=1, bit7=0  data processing, register shift
//!                        └ BX (0x012FFF1n)             → implemented
//!                        └ other miscellaneous         → no-op
//! 000, bit4=1, bit7=1  multiplies / extra load-store
//!                        └ SWP/SWPB, LDRH/STRH         → implemented
//!                        └ signed/doubleword/multiply  → no-op
//! 001                  data processing, rotated immediate
//!                        └ undefined (10x0, S=0)       → decode stub
//!                        └ MSR immediate (10x1, S=0)   → decode stub
//! 010                  load/store, immediate offset
//! 011, bit4=0          load/store, register offset
//! 011, bit4=1          media / architecturally undefined → no-op
//! 100                  load/store multiple
//! 101                  branch / branch with link
//! 110                  coprocessor load-store            → decode stub
//! 1110                 coprocessor data op / reg transfer → decode stub
//! 1111                 software interrupt                → decode stub
//! cond=1111            unconditional space               → decode stub
//! ```

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu::AluOp;
use crate::cpu::condition::Condition;
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting, ReadWriteKind, ShiftKind};

/// Offset operand of a halfword transfer: a split 8-bit immediate or a
/// plain register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfwordOffset {
    Immediate { offset: u32 },
    Register { rm: u32 },
}

/// A decoded instruction: the family tag plus exactly the fields its
/// executor consumes. Lives for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmInstruction {
    /// Data processing with an immediate-amount barrel shift on Rm.
    DataProcessingShiftImm {
        condition: Condition,
        op: AluOp,
        set_flags: bool,
        rn: u32,
        rd: u32,
        shift_kind: ShiftKind,
        shift_amount: u32,
        rm: u32,
    },
    /// Data processing with the shift amount read from Rs.
    DataProcessingShiftReg {
        condition: Condition,
        op: AluOp,
        set_flags: bool,
        rn: u32,
        rd: u32,
        rs: u32,
        shift_kind: ShiftKind,
        rm: u32,
    },
    /// Data processing with a rotated 8-bit immediate operand.
    DataProcessingImm {
        condition: Condition,
        op: AluOp,
        set_flags: bool,
        rn: u32,
        rd: u32,
        rotate: u32,
        immediate: u32,
    },
    /// MSR with an immediate operand. Decode stub.
    MoveImmToStatus {
        condition: Condition,
        mask: u32,
        rotate: u32,
        immediate: u32,
    },
    /// BX: branch to Rm, switching ARM/Thumb state from its bit 0.
    BranchExchange { condition: Condition, rm: u32 },
    /// SWP/SWPB: memory/register exchange through [Rn].
    Swap {
        condition: Condition,
        quantity: ReadWriteKind,
        rn: u32,
        rd: u32,
        rm: u32,
    },
    /// LDRH/STRH with either offset form.
    HalfwordTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        kind: LoadStoreKind,
        rn: u32,
        rd: u32,
        offset: HalfwordOffset,
    },
    /// LDR/STR/LDRB/STRB with a 12-bit immediate offset.
    SingleTransferImm {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        quantity: ReadWriteKind,
        write_back: bool,
        kind: LoadStoreKind,
        rn: u32,
        rd: u32,
        offset: u32,
    },
    /// LDR/STR/LDRB/STRB with a barrel-shifted register offset.
    SingleTransferReg {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        quantity: ReadWriteKind,
        write_back: bool,
        kind: LoadStoreKind,
        rn: u32,
        rd: u32,
        shift_kind: ShiftKind,
        shift_amount: u32,
        rm: u32,
    },
    /// LDM/STM over a 16-bit register list.
    BlockTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        load_psr: bool,
        write_back: bool,
        kind: LoadStoreKind,
        rn: u32,
        register_list: u32,
    },
    /// B/BL with a signed 24-bit word offset.
    Branch {
        condition: Condition,
        link: bool,
        offset: u32,
    },
    /// LDC/STC and the double-register transfer forms. Decode stub.
    CoprocessorTransfer {
        condition: Condition,
        rn: u32,
        offset: u32,
    },
    /// CDP. Decode stub.
    CoprocessorDataOperation { condition: Condition },
    /// MRC/MCR. Decode stub.
    CoprocessorRegisterTransfer { condition: Condition },
    /// SWI. Decode stub.
    SoftwareInterrupt { condition: Condition, comment: u32 },
    /// The condition-1111 space reserved for instructions this core does
    /// not implement.
    Unconditional,
    /// The undefined carve-out of the rotated-immediate space.
    Undefined,
    /// Recognized pattern with no implemented semantics.
    Nop,
}

/// Miscellaneous carve-out shared by both data-processing spaces: a
/// compare/test opcode that does not set flags is a status-register or
/// branch-exchange pattern, not an ALU operation.
fn is_miscellaneous(word: u32) -> bool {
    word.get_bits(23..=24) == 0b10 && !word.get_bit(20)
}

const BRANCH_EXCHANGE_PATTERN: u32 = 0b0001_0010_1111_1111_1111_0001;

/// Decodes the multiplies / extra load-store space (bits 27-25 = 000,
/// bit 7 and bit 4 set). Swap and the unsigned halfword transfers are
/// implemented; multiplies, signed and doubleword forms are no-ops.
fn decode_extra_load_store(word: u32, condition: Condition) -> ArmInstruction {
    if word.get_bits(23..=27) == 0b00010
        && word.get_bits(20..=21) == 0b00
        && word.get_bits(4..=11) == 0b0000_1001
    {
        return ArmInstruction::Swap {
            condition,
            quantity: ReadWriteKind::from(word.get_bit(22)),
            rn: word.get_bits(16..=19),
            rd: word.get_bits(12..=15),
            rm: word.get_bits(0..=3),
        };
    }

    // SH bits: 00 selects multiply/swap encodings, 01 the unsigned
    // halfword transfer, 10/11 the signed forms (not implemented).
    if word.get_bits(5..=6) == 0b01 {
        let offset = if word.get_bit(22) {
            HalfwordOffset::Immediate {
                offset: (word.get_bits(8..=11) << 4) | word.get_bits(0..=3),
            }
        } else {
            if word.get_bits(8..=11) != 0 {
                return ArmInstruction::Nop;
            }
            HalfwordOffset::Register {
                rm: word.get_bits(0..=3),
            }
        };

        return ArmInstruction::HalfwordTransfer {
            condition,
            indexing: Indexing::from(word.get_bit(24)),
            offsetting: Offsetting::from(word.get_bit(23)),
            write_back: word.get_bit(21),
            kind: LoadStoreKind::from(word.get_bit(20)),
            rn: word.get_bits(16..=19),
            rd: word.get_bits(12..=15),
            offset,
        };
    }

    ArmInstruction::Nop
}

impl From<u32> for ArmInstruction {
    #[allow(clippy::too_many_lines)]
    fn from(word: u32) -> Self {
        let condition = Condition::from(word.get_bits(28..=31) as u8);
        let reserved = condition == Condition::NV;

        if !reserved && word.get_bits(25..=27) == 0b000 && !word.get_bit(4) {
            if is_miscellaneous(word) {
                return Self::Nop;
            }
            Self::DataProcessingShiftImm {
                condition,
                op: AluOp::from(word.get_bits(21..=24)),
                set_flags: word.get_bit(20),
                rn: word.get_bits(16..=19),
                rd: word.get_bits(12..=15),
                shift_amount: word.get_bits(7..=11),
                shift_kind: ShiftKind::from(word.get_bits(5..=6)),
                rm: word.get_bits(0..=3),
            }
        } else if !reserved
            && word.get_bits(25..=27) == 0b000
            && word.get_bit(4)
            && !word.get_bit(7)
        {
            if word.get_bits(4..=27) == BRANCH_EXCHANGE_PATTERN {
                return Self::BranchExchange {
                    condition,
                    rm: word.get_bits(0..=3),
                };
            }
            if is_miscellaneous(word) {
                return Self::Nop;
            }
            Self::DataProcessingShiftReg {
                condition,
                op: AluOp::from(word.get_bits(21..=24)),
                set_flags: word.get_bit(20),
                rn: word.get_bits(16..=19),
                rd: word.get_bits(12..=15),
                rs: word.get_bits(8..=11),
                shift_kind: ShiftKind::from(word.get_bits(5..=6)),
                rm: word.get_bits(0..=3),
            }
        } else if !reserved
            && word.get_bits(25..=27) == 0b000
            && word.get_bit(4)
            && word.get_bit(7)
        {
            decode_extra_load_store(word, condition)
        } else if !reserved && word.get_bits(25..=27) == 0b001 {
            let op = AluOp::from(word.get_bits(21..=24));
            let set_flags = word.get_bit(20);

            if !set_flags && word.get_bits(23..=24) == 0b10 {
                // compare/test opcode without S: either the undefined
                // carve-out (10x0) or MSR-immediate (10x1)
                return if word.get_bit(21) {
                    Self::MoveImmToStatus {
                        condition,
                        mask: word.get_bits(16..=19),
                        rotate: word.get_bits(8..=11),
                        immediate: word.get_bits(0..=7),
                    }
                } else {
                    Self::Undefined
                };
            }

            Self::DataProcessingImm {
                condition,
                op,
                set_flags,
                rn: word.get_bits(16..=19),
                rd: word.get_bits(12..=15),
                rotate: word.get_bits(8..=11),
                immediate: word.get_bits(0..=7),
            }
        } else if !reserved && word.get_bits(25..=27) == 0b010 {
            Self::SingleTransferImm {
                condition,
                indexing: Indexing::from(word.get_bit(24)),
                offsetting: Offsetting::from(word.get_bit(23)),
                quantity: ReadWriteKind::from(word.get_bit(22)),
                write_back: word.get_bit(21),
                kind: LoadStoreKind::from(word.get_bit(20)),
                rn: word.get_bits(16..=19),
                rd: word.get_bits(12..=15),
                offset: word.get_bits(0..=11),
            }
        } else if !reserved && word.get_bits(25..=27) == 0b011 {
            if word.get_bit(4) {
                // media and architecturally-undefined space
                return Self::Nop;
            }
            Self::SingleTransferReg {
                condition,
                indexing: Indexing::from(word.get_bit(24)),
                offsetting: Offsetting::from(word.get_bit(23)),
                quantity: ReadWriteKind::from(word.get_bit(22)),
                write_back: word.get_bit(21),
                kind: LoadStoreKind::from(word.get_bit(20)),
                rn: word.get_bits(16..=19),
                rd: word.get_bits(12..=15),
                shift_amount: word.get_bits(7..=11),
                shift_kind: ShiftKind::from(word.get_bits(5..=6)),
                rm: word.get_bits(0..=3),
            }
        } else if !reserved && word.get_bits(25..=27) == 0b100 {
            Self::BlockTransfer {
                condition,
                indexing: Indexing::from(word.get_bit(24)),
                offsetting: Offsetting::from(word.get_bit(23)),
                load_psr: word.get_bit(22),
                write_back: word.get_bit(21),
                kind: LoadStoreKind::from(word.get_bit(20)),
                rn: word.get_bits(16..=19),
                register_list: word.get_bits(0..=15),
            }
        } else if !reserved && word.get_bits(25..=27) == 0b101 {
            Self::Branch {
                condition,
                link: word.get_bit(24),
                offset: word.get_bits(0..=23),
            }
        } else if word.get_bits(25..=27) == 0b110 {
            Self::CoprocessorTransfer {
                condition,
                rn: word.get_bits(16..=19),
                offset: word.get_bits(0..=7),
            }
        } else if word.get_bits(24..=27) == 0b1110 {
            if word.get_bit(4) {
                Self::CoprocessorRegisterTransfer { condition }
            } else {
                Self::CoprocessorDataOperation { condition }
            }
        } else if !reserved && word.get_bits(24..=27) == 0b1111 {
            Self::SoftwareInterrupt {
                condition,
                comment: word.get_bits(0..=23),
            }
        } else if reserved {
            Self::Unconditional
        } else {
            Self::Nop
        }
    }
}

impl std::fmt::Display for ArmInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataProcessingShiftImm {
                condition,
                op,
                set_flags,
                rn,
                rd,
                shift_kind,
                shift_amount,
                rm,
            } => {
                let s = if *set_flags { "S" } else { "" };
                write!(
                    f,
                    "{op}{condition}{s} R{rd}, R{rn}, R{rm}, {shift_kind} #{shift_amount}"
                )
            }
            Self::DataProcessingShiftReg {
                condition,
                op,
                set_flags,
                rn,
                rd,
                rs,
                shift_kind,
                rm,
            } => {
                let s = if *set_flags { "S" } else { "" };
                write!(
                    f,
                    "{op}{condition}{s} R{rd}, R{rn}, R{rm}, {shift_kind} R{rs}"
                )
            }
            Self::DataProcessingImm {
                condition,
                op,
                set_flags,
                rn,
                rd,
                rotate,
                immediate,
            } => {
                let s = if *set_flags { "S" } else { "" };
                let value = immediate.rotate_right(rotate * 2);
                write!(f, "{op}{condition}{s} R{rd}, R{rn}, #0x{value:X}")
            }
            Self::MoveImmToStatus {
                condition,
                mask,
                rotate,
                immediate,
            } => {
                let value = immediate.rotate_right(rotate * 2);
                write!(f, "MSR{condition} (mask 0b{mask:04b}), #0x{value:X}")
            }
            Self::BranchExchange { condition, rm } => write!(f, "BX{condition} R{rm}"),
            Self::Swap {
                condition,
                quantity,
                rn,
                rd,
                rm,
            } => {
                let b = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };
                write!(f, "SWP{condition}{b} R{rd}, R{rm}, [R{rn}]")
            }
            Self::HalfwordTransfer {
                condition,
                kind,
                rn,
                rd,
                offset,
                ..
            } => {
                let op = match kind {
                    LoadStoreKind::Load => "LDR",
                    LoadStoreKind::Store => "STR",
                };
                match offset {
                    HalfwordOffset::Immediate { offset } => {
                        write!(f, "{op}{condition}H R{rd}, [R{rn}, #{offset}]")
                    }
                    HalfwordOffset::Register { rm } => {
                        write!(f, "{op}{condition}H R{rd}, [R{rn}, R{rm}]")
                    }
                }
            }
            Self::SingleTransferImm {
                condition,
                quantity,
                kind,
                rn,
                rd,
                offset,
                ..
            } => {
                let op = match kind {
                    LoadStoreKind::Load => "LDR",
                    LoadStoreKind::Store => "STR",
                };
                let b = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };
                write!(f, "{op}{condition}{b} R{rd}, [R{rn}, #{offset}]")
            }
            Self::SingleTransferReg {
                condition,
                quantity,
                kind,
                rn,
                rd,
                shift_kind,
                shift_amount,
                rm,
                ..
            } => {
                let op = match kind {
                    LoadStoreKind::Load => "LDR",
                    LoadStoreKind::Store => "STR",
                };
                let b = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };
                write!(
                    f,
                    "{op}{condition}{b} R{rd}, [R{rn}, R{rm}, {shift_kind} #{shift_amount}]"
                )
            }
            Self::BlockTransfer {
                condition,
                kind,
                write_back,
                load_psr,
                rn,
                register_list,
                ..
            } => {
                let op = match kind {
                    LoadStoreKind::Load => "LDM",
                    LoadStoreKind::Store => "STM",
                };
                let mut regs = Vec::new();
                for i in 0..=15 {
                    if register_list.get_bit(i) {
                        regs.push(format!("R{i}"));
                    }
                }
                let w = if *write_back { "!" } else { "" };
                let s = if *load_psr { "^" } else { "" };
                write!(f, "{op}{condition} R{rn}{w}, {{{}}}{s}", regs.join(","))
            }
            Self::Branch {
                condition,
                link,
                offset,
            } => {
                let l = if *link { "L" } else { "" };
                let words = offset.sign_extended(24) as i32;
                write!(f, "B{l}{condition} #{}", words * 4)
            }
            Self::CoprocessorTransfer { condition, rn, offset } => {
                write!(f, "LDC/STC{condition} [R{rn}, #{offset}]")
            }
            Self::CoprocessorDataOperation { condition } => write!(f, "CDP{condition}"),
            Self::CoprocessorRegisterTransfer { condition } => write!(f, "MRC/MCR{condition}"),
            Self::SoftwareInterrupt { condition, comment } => {
                write!(f, "SWI{condition} #0x{comment:X}")
            }
            Self::Unconditional => f.write_str("(unconditional space)"),
            Self::Undefined => f.write_str("(undefined)"),
            Self::Nop => f.write_str("(nop)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_branch() {
        let output = ArmInstruction::from(0b1110_1010_0000_0000_0000_0000_0111_1111);
        assert_eq!(
            ArmInstruction::Branch {
                condition: Condition::AL,
                link: false,
                offset: 127,
            },
            output
        );
        assert_eq!("B #508", output.to_string());

        let output = ArmInstruction::from(0b0000_1011_0000_0000_0000_0000_0111_1111);
        assert_eq!(
            ArmInstruction::Branch {
                condition: Condition::EQ,
                link: true,
                offset: 127,
            },
            output
        );
        assert_eq!("BLEQ #508", output.to_string());

        // backwards self-loop: offset -2
        let output = ArmInstruction::from(0xEAFF_FFFE);
        assert_eq!(
            ArmInstruction::Branch {
                condition: Condition::AL,
                link: false,
                offset: 0xFF_FFFE,
            },
            output
        );
        assert_eq!("B #-8", output.to_string());
    }

    #[test]
    fn decode_branch_exchange() {
        let output = ArmInstruction::from(0xE12F_FF10);
        assert_eq!(
            ArmInstruction::BranchExchange {
                condition: Condition::AL,
                rm: 0,
            },
            output
        );
        assert_eq!("BX R0", output.to_string());

        let output = ArmInstruction::from(0b0001_0001_0010_1111_1111_1111_0001_0011);
        assert_eq!(
            ArmInstruction::BranchExchange {
                condition: Condition::NE,
                rm: 3,
            },
            output
        );
    }

    #[test]
    fn decode_data_processing_imm() {
        // MOV R0, #0x02000000 (0x02 rotated right by 2*4)
        let output = ArmInstruction::from(0xE3A0_0402);
        assert_eq!(
            ArmInstruction::DataProcessingImm {
                condition: Condition::AL,
                op: AluOp::Mov,
                set_flags: false,
                rn: 0,
                rd: 0,
                rotate: 4,
                immediate: 0x02,
            },
            output
        );
        assert_eq!("MOV R0, R0, #0x2000000", output.to_string());

        // ADDS R1, R2, #1
        let output = ArmInstruction::from(0b1110_0010_1001_0010_0001_0000_0000_0001);
        assert_eq!(
            ArmInstruction::DataProcessingImm {
                condition: Condition::AL,
                op: AluOp::Add,
                set_flags: true,
                rn: 2,
                rd: 1,
                rotate: 0,
                immediate: 1,
            },
            output
        );
    }

    #[test]
    fn decode_data_processing_shifts() {
        // MOV R0, R0 (LSL #0) - the canonical ARM no-op
        let output = ArmInstruction::from(0xE1A0_0000);
        assert_eq!(
            ArmInstruction::DataProcessingShiftImm {
                condition: Condition::AL,
                op: AluOp::Mov,
                set_flags: false,
                rn: 0,
                rd: 0,
                shift_kind: ShiftKind::Lsl,
                shift_amount: 0,
                rm: 0,
            },
            output
        );

        // ADD R0, R1, R2, LSL R3
        let output = ArmInstruction::from(0b1110_0000_1000_0001_0000_0011_0001_0010);
        assert_eq!(
            ArmInstruction::DataProcessingShiftReg {
                condition: Condition::AL,
                op: AluOp::Add,
                set_flags: false,
                rn: 1,
                rd: 0,
                rs: 3,
                shift_kind: ShiftKind::Lsl,
                rm: 2,
            },
            output
        );
    }

    #[test]
    fn miscellaneous_space_is_a_nop() {
        // MRS R0, CPSR: TST encoding without S, bit4 clear
        let output = ArmInstruction::from(0b1110_0001_0000_1111_0000_0000_0000_0000);
        assert_eq!(ArmInstruction::Nop, output);
    }

    #[test]
    fn rotated_immediate_carve_outs() {
        // MSR CPSR_flg, #0xF0000000: opcode 10x1 without S
        let output = ArmInstruction::from(0b1110_0011_0010_1000_1111_0010_0000_1111);
        assert_eq!(
            ArmInstruction::MoveImmToStatus {
                condition: Condition::AL,
                mask: 0b1000,
                rotate: 0b0010,
                immediate: 0x0F,
            },
            output
        );

        // opcode 10x0 without S is the undefined carve-out
        let output = ArmInstruction::from(0b1110_0011_0000_0000_0000_0000_0000_0000);
        assert_eq!(ArmInstruction::Undefined, output);
    }

    #[test]
    fn decode_single_transfer() {
        // STR R0, [R1, #4]
        let output = ArmInstruction::from(0b1110_0101_1000_0001_0000_0000_0000_0100);
        assert_eq!(
            ArmInstruction::SingleTransferImm {
                condition: Condition::AL,
                indexing: Indexing::Pre,
                offsetting: Offsetting::Up,
                quantity: ReadWriteKind::Word,
                write_back: false,
                kind: LoadStoreKind::Store,
                rn: 1,
                rd: 0,
                offset: 4,
            },
            output
        );

        // LDRB R5, [R1, -R12, LSL #0]
        let output = ArmInstruction::from(0b1110_0111_0101_0001_0101_0000_0000_1100);
        assert_eq!(
            ArmInstruction::SingleTransferReg {
                condition: Condition::AL,
                indexing: Indexing::Pre,
                offsetting: Offsetting::Down,
                quantity: ReadWriteKind::Byte,
                write_back: false,
                kind: LoadStoreKind::Load,
                rn: 1,
                rd: 5,
                shift_kind: ShiftKind::Lsl,
                shift_amount: 0,
                rm: 12,
            },
            output
        );
    }

    #[test]
    fn media_space_is_a_nop() {
        // register-offset space with bit 4 set
        let output = ArmInstruction::from(0b1110_0111_0101_0001_0101_0000_0001_1100);
        assert_eq!(ArmInstruction::Nop, output);
    }

    #[test]
    fn decode_block_transfer() {
        // LDMIA R13!, {R1, R5, R7}
        let output = ArmInstruction::from(0b1110_1000_1011_1101_0000_0000_1010_0010);
        assert_eq!(
            ArmInstruction::BlockTransfer {
                condition: Condition::AL,
                indexing: Indexing::Post,
                offsetting: Offsetting::Up,
                load_psr: false,
                write_back: true,
                kind: LoadStoreKind::Load,
                rn: 13,
                register_list: 0b0000_0000_1010_0010,
            },
            output
        );
    }

    #[test]
    fn decode_swap_vs_halfword() {
        // SWP R1, R2, [R3]
        let output = ArmInstruction::from(0b1110_0001_0000_0011_0001_0000_1001_0010);
        assert_eq!(
            ArmInstruction::Swap {
                condition: Condition::AL,
                quantity: ReadWriteKind::Word,
                rn: 3,
                rd: 1,
                rm: 2,
            },
            output
        );

        // SWPB R4, R5, [R6]
        let output = ArmInstruction::from(0b1110_0001_0100_0110_0100_0000_1001_0101);
        assert_eq!(
            ArmInstruction::Swap {
                condition: Condition::AL,
                quantity: ReadWriteKind::Byte,
                rn: 6,
                rd: 4,
                rm: 5,
            },
            output
        );

        // STRH R0, [R1] (immediate offset 0)
        let output = ArmInstruction::from(0b1110_0001_1100_0001_0000_0000_1011_0000);
        assert_eq!(
            ArmInstruction::HalfwordTransfer {
                condition: Condition::AL,
                indexing: Indexing::Pre,
                offsetting: Offsetting::Up,
                write_back: false,
                kind: LoadStoreKind::Store,
                rn: 1,
                rd: 0,
                offset: HalfwordOffset::Immediate { offset: 0 },
            },
            output
        );

        // STRH R0, [R2, R1]
        let output = ArmInstruction::from(0b1110_0001_1000_0010_0000_0000_1011_0001);
        assert_eq!(
            ArmInstruction::HalfwordTransfer {
                condition: Condition::AL,
                indexing: Indexing::Pre,
                offsetting: Offsetting::Up,
                write_back: false,
                kind: LoadStoreKind::Store,
                rn: 2,
                rd: 0,
                offset: HalfwordOffset::Register { rm: 1 },
            },
            output
        );
    }

    #[test]
    fn multiplies_decode_as_nops() {
        // MUL R0, R1, R2
        let output = ArmInstruction::from(0b1110_0000_0000_0000_0000_0010_1001_0001);
        assert_eq!(ArmInstruction::Nop, output);
    }

    #[test]
    fn decode_stub_families() {
        // SWI 0x123456
        let output = ArmInstruction::from(0b1110_1111_0001_0010_0011_0100_0101_0110);
        assert_eq!(
            ArmInstruction::SoftwareInterrupt {
                condition: Condition::AL,
                comment: 0x12_3456,
            },
            output
        );

        // LDC p1, c0, [R2]
        let output = ArmInstruction::from(0b1110_1101_1001_0010_0000_0001_0000_0000);
        assert_eq!(
            ArmInstruction::CoprocessorTransfer {
                condition: Condition::AL,
                rn: 2,
                offset: 0,
            },
            output
        );

        // CDP and MRC
        let output = ArmInstruction::from(0b1110_1110_0000_0000_0000_0000_0000_0000);
        assert_eq!(
            ArmInstruction::CoprocessorDataOperation {
                condition: Condition::AL
            },
            output
        );
        let output = ArmInstruction::from(0b1110_1110_0000_0000_0000_0000_0001_0000);
        assert_eq!(
            ArmInstruction::CoprocessorRegisterTransfer {
                condition: Condition::AL
            },
            output
        );
    }

    #[test]
    fn reserved_condition_routes_to_the_unconditional_space() {
        // would be a data-processing word if the condition were usable
        let output = ArmInstruction::from(0b1111_0010_1000_0001_0000_0000_0000_0001);
        assert_eq!(ArmInstruction::Unconditional, output);

        // would be a branch
        let output = ArmInstruction::from(0b1111_1010_0000_0000_0000_0000_0000_0001);
        assert_eq!(ArmInstruction::Unconditional, output);
    }
}
