//! One virtual CPU core: the fetch-decode-execute pipeline over a banked
//! register file and an address-space backend.

use crate::bus::Bus;
use crate::cpu::arm::instructions::ArmInstruction;
use crate::cpu::error::CpuError;
use crate::cpu::psr::CpuState;
use crate::cpu::register_file::RegisterFile;

/// A single ARM9/ARM7-class core. The two cores of the console are two
/// independent instances over different bus layouts.
pub struct Core<B: Bus> {
    pub bus: B,
    pub regs: RegisterFile,

    boot_address: u32,
    started: bool,
    retired: u64,
}

impl<B: Bus> Core<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            regs: RegisterFile::new(),
            boot_address: 0,
            started: false,
            retired: 0,
        }
    }

    /// Remembers the boot address for `reset` and points the PC at it.
    /// Returns `false` once execution has started; the address is still
    /// remembered for the next reset.
    pub fn set_boot_addr(&mut self, boot_addr: u32) -> bool {
        self.boot_address = boot_addr;

        if self.started {
            return false;
        }
        self.regs.set_pc(boot_addr);
        true
    }

    /// Back to the startup state: every register zero, Supervisor mode
    /// with interrupts masked, PC at the boot address.
    pub fn reset(&mut self) {
        self.regs = RegisterFile::new();
        self.regs.set_pc(self.boot_address);
        self.started = false;
        self.retired = 0;
    }

    /// One synchronous fetch-decode-execute cycle.
    ///
    /// # Errors
    ///
    /// Any [`CpuError`] aborts the cycle; see its `kind` for whether the
    /// core state is still trustworthy.
    pub fn step(&mut self) -> Result<(), CpuError> {
        self.started = true;

        if self.regs.cpsr.cpu_state() == CpuState::Thumb {
            return Err(CpuError::ThumbState);
        }

        let word = self.fetch()?;
        let instruction = ArmInstruction::from(word);
        tracing::trace!("0x{word:08X}: {instruction}");
        self.execute(instruction)?;

        self.retired += 1;
        Ok(())
    }

    fn fetch(&mut self) -> Result<u32, CpuError> {
        let fetch_pc = self.regs.begin_fetch();
        Ok(self.bus.read_word(fetch_pc)?)
    }

    #[must_use]
    pub fn pc(&self) -> u32 {
        self.regs.pc()
    }

    /// Console surface: read one register through current-mode banking.
    ///
    /// # Errors
    ///
    /// Contract violations, like any banked access.
    pub fn reg(&self, id: u32) -> Result<u32, CpuError> {
        self.regs.get(id)
    }

    /// Instructions executed since construction or the last reset.
    #[must_use]
    pub const fn retired(&self) -> u64 {
        self.retired
    }
}
