//! # Banked Register File
//!
//! The 16 general registers plus the mode-private shadows:
//!
//! - FIQ banks R8-R14 (seven registers) and an SPSR
//! - Supervisor, Abort, IRQ and Undefined bank R13-R14 and an SPSR
//! - User and System share the unbanked set and have no SPSR
//!
//! Banking is resolved on every access from the mode in the live CPSR,
//! so the visible R13 in Supervisor mode and the visible R13 in FIQ mode
//! are different storage. R0-R7 and R15 are never banked.

use serde::{Deserialize, Serialize};

use crate::cpu::error::CpuError;
use crate::cpu::modes::Mode;
use crate::cpu::psr::Psr;

/// Stack pointer, by convention.
pub const REG_SP: u32 = 13;

/// Link register, by convention.
pub const REG_LR: u32 = 14;

/// Program counter.
pub const REG_PC: u32 = 15;

/// One core's complete register state: general registers, the per-mode
/// shadows, the live CPSR and the saved status registers.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterFile {
    general: [u32; 16],

    /// R8-R14 while in FIQ mode.
    fiq: [u32; 7],
    /// R13-R14 while in Supervisor mode.
    svc: [u32; 2],
    /// R13-R14 while in Abort mode.
    abt: [u32; 2],
    /// R13-R14 while in IRQ mode.
    irq: [u32; 2],
    /// R13-R14 while in Undefined mode.
    und: [u32; 2],

    /// Live status register.
    pub cpsr: Psr,

    spsr_fiq: Psr,
    spsr_svc: Psr,
    spsr_abt: Psr,
    spsr_irq: Psr,
    spsr_und: Psr,

    /// Raised by [`Self::set_pc`]; sequential fetch state is invalid and
    /// the next cycle restarts from the new address.
    pipeline_flushed: bool,
}

impl RegisterFile {
    /// Startup policy: Supervisor mode, both interrupts masked, ARM state,
    /// every register zero.
    #[must_use]
    pub fn new() -> Self {
        let mut cpsr = Psr::from(Mode::Supervisor);
        cpsr.set_irq_disable(true);
        cpsr.set_fiq_disable(true);

        Self {
            cpsr,
            ..Self::default()
        }
    }

    /// Reads a logical register through the current mode's banking.
    ///
    /// # Errors
    ///
    /// Contract violations: index outside 0-15, unrecognized mode bits.
    pub fn get(&self, reg: u32) -> Result<u32, CpuError> {
        let mode = self.cpsr.mode()?;
        self.get_in_mode(reg, mode)
    }

    /// Reads a logical register as seen from an explicit mode (the block
    /// transfer "force user-bank access" path).
    pub fn get_in_mode(&self, reg: u32, mode: Mode) -> Result<u32, CpuError> {
        if reg > 15 {
            return Err(CpuError::RegisterOutOfRange(reg));
        }
        let r = reg as usize;

        if reg < 8 || reg == REG_PC {
            return Ok(self.general[r]);
        }
        // reg is 8-14 from here on

        if mode == Mode::Fiq {
            return Ok(self.fiq[r - 8]);
        }

        if reg != REG_SP && reg != REG_LR {
            return Ok(self.general[r]);
        }

        Ok(match mode {
            Mode::User | Mode::System => self.general[r],
            Mode::Supervisor => self.svc[r - 13],
            Mode::Abort => self.abt[r - 13],
            Mode::Irq => self.irq[r - 13],
            Mode::Undefined => self.und[r - 13],
            Mode::Fiq => unreachable!("FIQ handled above"),
        })
    }

    /// Writes a logical register through the current mode's banking.
    /// Register 15 takes the [`Self::set_pc`] path.
    ///
    /// # Errors
    ///
    /// Contract violations: index outside 0-15, unrecognized mode bits.
    pub fn set(&mut self, reg: u32, value: u32) -> Result<(), CpuError> {
        let mode = self.cpsr.mode()?;
        self.set_in_mode(reg, value, mode)
    }

    /// Writes a logical register as seen from an explicit mode.
    pub fn set_in_mode(&mut self, reg: u32, value: u32, mode: Mode) -> Result<(), CpuError> {
        if reg > 15 {
            return Err(CpuError::RegisterOutOfRange(reg));
        }
        if reg == REG_PC {
            self.set_pc(value);
            return Ok(());
        }

        tracing::trace!("r{reg} := 0x{value:08X}");
        let r = reg as usize;

        if reg < 8 {
            self.general[r] = value;
            return Ok(());
        }
        // reg is 8-14 from here on

        if mode == Mode::Fiq {
            self.fiq[r - 8] = value;
            return Ok(());
        }

        if reg != REG_SP && reg != REG_LR {
            self.general[r] = value;
            return Ok(());
        }

        match mode {
            Mode::User | Mode::System => self.general[r] = value,
            Mode::Supervisor => self.svc[r - 13] = value,
            Mode::Abort => self.abt[r - 13] = value,
            Mode::Irq => self.irq[r - 13] = value,
            Mode::Undefined => self.und[r - 13] = value,
            Mode::Fiq => unreachable!("FIQ handled above"),
        }
        Ok(())
    }

    /// R15 never banks. Writing it invalidates sequential fetch state.
    pub fn set_pc(&mut self, value: u32) {
        tracing::trace!("pc := 0x{value:08X}");
        self.general[15] = value;
        self.pipeline_flushed = true;
    }

    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.general[15]
    }

    #[must_use]
    pub const fn pipeline_flushed(&self) -> bool {
        self.pipeline_flushed
    }

    /// Word-aligns the PC, clears the flush signal and advances past the
    /// instruction about to be fetched. Returns the fetch address.
    pub(crate) fn begin_fetch(&mut self) -> u32 {
        let fetch_pc = self.general[15] & !0b11;
        self.general[15] = fetch_pc.wrapping_add(4);
        self.pipeline_flushed = false;
        fetch_pc
    }

    /// The current mode's saved status register.
    ///
    /// # Errors
    ///
    /// [`CpuError::SpsrUnavailable`] in User/System mode, which have none.
    pub fn spsr(&self) -> Result<Psr, CpuError> {
        match self.cpsr.mode()? {
            mode @ (Mode::User | Mode::System) => Err(CpuError::SpsrUnavailable(mode)),
            Mode::Fiq => Ok(self.spsr_fiq),
            Mode::Supervisor => Ok(self.spsr_svc),
            Mode::Abort => Ok(self.spsr_abt),
            Mode::Irq => Ok(self.spsr_irq),
            Mode::Undefined => Ok(self.spsr_und),
        }
    }

    /// Snapshots the CPSR into the current mode's SPSR (mode entry).
    ///
    /// # Errors
    ///
    /// [`CpuError::SpsrUnavailable`] in User/System mode.
    pub fn save_cpsr(&mut self) -> Result<(), CpuError> {
        let slot = match self.cpsr.mode()? {
            mode @ (Mode::User | Mode::System) => return Err(CpuError::SpsrUnavailable(mode)),
            Mode::Fiq => &mut self.spsr_fiq,
            Mode::Supervisor => &mut self.spsr_svc,
            Mode::Abort => &mut self.spsr_abt,
            Mode::Irq => &mut self.spsr_irq,
            Mode::Undefined => &mut self.spsr_und,
        };
        *slot = self.cpsr;
        Ok(())
    }

    /// Restores the CPSR from the current mode's SPSR (mode return).
    ///
    /// # Errors
    ///
    /// [`CpuError::SpsrUnavailable`] in User/System mode.
    pub fn restore_cpsr(&mut self) -> Result<(), CpuError> {
        self.cpsr = self.spsr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sp_is_banked_per_mode() {
        let mut regs = RegisterFile::new();

        regs.cpsr.set_mode(Mode::Fiq);
        regs.set(13, 0xF1F1_F1F1).unwrap();

        regs.cpsr.set_mode(Mode::Supervisor);
        regs.set(13, 0x5050_5050).unwrap();
        assert_eq!(regs.get(13), Ok(0x5050_5050));

        regs.cpsr.set_mode(Mode::Fiq);
        assert_eq!(regs.get(13), Ok(0xF1F1_F1F1));
    }

    #[test]
    fn fiq_banks_r8_to_r12_too() {
        let mut regs = RegisterFile::new();

        regs.cpsr.set_mode(Mode::System);
        regs.set(10, 1).unwrap();

        regs.cpsr.set_mode(Mode::Fiq);
        assert_eq!(regs.get(10), Ok(0));
        regs.set(10, 2).unwrap();

        // IRQ mode banks only R13-R14, so R10 falls through to the shared
        // storage written in System mode.
        regs.cpsr.set_mode(Mode::Irq);
        assert_eq!(regs.get(10), Ok(1));
    }

    #[test]
    fn low_registers_and_pc_are_mode_invariant() {
        let mut regs = RegisterFile::new();

        for reg in 0..8 {
            regs.set(reg, reg + 100).unwrap();
        }
        regs.set(15, 0x0200_0000).unwrap();

        for mode in [Mode::User, Mode::Fiq, Mode::Irq, Mode::Abort] {
            regs.cpsr.set_mode(mode);
            for reg in 0..8 {
                assert_eq!(regs.get(reg), Ok(reg + 100));
            }
            assert_eq!(regs.get(15), Ok(0x0200_0000));
        }
    }

    #[test]
    fn explicit_mode_override() {
        let mut regs = RegisterFile::new();

        regs.cpsr.set_mode(Mode::User);
        regs.set(13, 0xAAAA_0000).unwrap();

        regs.cpsr.set_mode(Mode::Irq);
        regs.set(13, 0xBBBB_0000).unwrap();

        // Force user-bank access while IRQ is the live mode.
        assert_eq!(regs.get_in_mode(13, Mode::User), Ok(0xAAAA_0000));
        regs.set_in_mode(13, 0xCCCC_0000, Mode::User).unwrap();
        assert_eq!(regs.get(13), Ok(0xBBBB_0000));

        regs.cpsr.set_mode(Mode::User);
        assert_eq!(regs.get(13), Ok(0xCCCC_0000));
    }

    #[test]
    fn spsr_round_trip_in_privileged_modes() {
        for mode in [
            Mode::Fiq,
            Mode::Irq,
            Mode::Supervisor,
            Mode::Abort,
            Mode::Undefined,
        ] {
            let mut regs = RegisterFile::new();
            regs.cpsr.set_mode(mode);
            regs.cpsr.set_carry_flag(true);
            regs.cpsr.set_zero_flag(true);
            let saved = regs.cpsr;

            regs.save_cpsr().unwrap();

            // corrupt every flag, then come back
            regs.cpsr.set_carry_flag(false);
            regs.cpsr.set_zero_flag(false);
            regs.cpsr.set_sign_flag(true);
            regs.cpsr.set_overflow_flag(true);

            regs.restore_cpsr().unwrap();
            assert_eq!(regs.cpsr, saved, "round trip failed in {mode:?}");
        }
    }

    #[test]
    fn spsr_is_illegal_in_user_and_system() {
        for mode in [Mode::User, Mode::System] {
            let mut regs = RegisterFile::new();
            regs.cpsr.set_mode(mode);

            assert_eq!(regs.save_cpsr(), Err(CpuError::SpsrUnavailable(mode)));
            assert_eq!(regs.restore_cpsr(), Err(CpuError::SpsrUnavailable(mode)));
            assert!(!regs.save_cpsr().unwrap_err().is_fatal());
        }
    }

    #[test]
    fn register_index_is_checked() {
        let mut regs = RegisterFile::new();
        assert_eq!(regs.get(16), Err(CpuError::RegisterOutOfRange(16)));
        assert_eq!(regs.set(42, 0), Err(CpuError::RegisterOutOfRange(42)));
    }

    #[test]
    fn corrupt_mode_fails_banked_access() {
        let mut regs = RegisterFile::new();
        regs.cpsr.set_mode_raw(0b00100);

        assert_eq!(regs.get(13), Err(CpuError::UnknownMode(0b00100)));
        assert_eq!(regs.set(14, 1), Err(CpuError::UnknownMode(0b00100)));
    }

    #[test]
    fn writing_pc_flushes_the_pipeline() {
        let mut regs = RegisterFile::new();
        assert!(!regs.pipeline_flushed());

        regs.set(15, 0x0200_0000).unwrap();
        assert!(regs.pipeline_flushed());
        assert_eq!(regs.pc(), 0x0200_0000);

        // fetching consumes the signal and advances past the instruction
        assert_eq!(regs.begin_fetch(), 0x0200_0000);
        assert!(!regs.pipeline_flushed());
        assert_eq!(regs.pc(), 0x0200_0004);
    }
}
