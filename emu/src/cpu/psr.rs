//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27 26      8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──┬────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │Q │Reserved│I│F│T│Mode │
//! └──┴──┴──┴──┴──┴────────┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: tested by [`condition`](super::condition) codes
//! - **Q (27)**: sticky overflow, never cleared implicitly
//! - **I/F (7-6)**: IRQ/FIQ disable
//! - **T (5)**: ARM (0) or Thumb (1) state
//! - **Mode (0-4)**: see [`modes`](super::modes)
//!
//! Each privileged mode banks an SPSR holding the CPSR snapshot taken on
//! mode entry; see [`register_file`](super::register_file).

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::condition::Condition;
use crate::cpu::error::CpuError;
use crate::cpu::modes::Mode;

/// Program status register (CPSR or SPSR).
///
/// Wraps the raw `u32` and provides type-safe accessors for each field.
/// Mode extraction is fallible on purpose: corrupt mode bits mean the
/// register file can no longer resolve banking and the pipeline has to
/// stop with a diagnosable error instead of guessing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    /// Evaluates an instruction's condition field against the flags.
    #[must_use]
    pub fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL => true,
            NV => false, // reserved, only reachable through non-conditional decode paths
        }
    }

    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// Q => Bit 27, sticky overflow
    #[must_use]
    pub fn sticky_overflow(self) -> bool {
        self.0.get_bit(27)
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// M4-M0 => Bits 4-0.
    ///
    /// # Errors
    ///
    /// [`CpuError::UnknownMode`] when the bit pattern is not one of the
    /// seven defined modes.
    pub fn mode(self) -> Result<Mode, CpuError> {
        Mode::try_from(self.0.get_bits(0..=4))
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    pub fn set_sticky_overflow(&mut self, value: bool) {
        self.0.set_bit(27, value);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(5, value);
    }

    /// Writes raw mode bits without validation. Meant for tests and for
    /// guest values that are checked on the next banked access.
    pub const fn set_mode_raw(&mut self, m: u32) {
        self.0 &= !0b11111;
        self.0 |= m & 0b11111;
    }

    pub const fn set_mode(&mut self, m: Mode) {
        self.0 &= !0b11111;
        self.0 |= m as u32;
    }

    #[must_use]
    pub fn cpu_state(self) -> CpuState {
        self.state_bit().into()
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.set_state_bit(state.into());
    }
}

impl From<Mode> for Psr {
    fn from(m: Mode) -> Self {
        let mut s = Self(0);

        s.set_mode(m);

        s
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}

/// The CPU execution state (ARM or Thumb), controlled by the T bit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CpuState {
    /// Thumb: 16-bit instructions. Decode stub only in this core.
    Thumb,
    /// ARM: 32-bit instructions.
    Arm,
}

impl From<CpuState> for bool {
    fn from(state: CpuState) -> Self {
        match state {
            CpuState::Arm => false,
            CpuState::Thumb => true,
        }
    }
}

impl From<bool> for CpuState {
    fn from(state: bool) -> Self {
        if state { Self::Thumb } else { Self::Arm }
    }
}
