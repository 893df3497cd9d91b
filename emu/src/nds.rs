use std::error::Error;
use std::sync::Arc;

use crate::bus::{
    shared_ram, Arm7Bus, Arm9Bus, UnmappedAccess, ARM7_BIOS_BASE, ARM9_BIOS_BASE, MAIN_RAM_BASE,
    MAIN_RAM_SIZE, SHARED_WRAM_SIZE,
};
use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::core::Core;

/// The ARM9-class core over its address-space layout.
pub type Arm9Core = Core<Arm9Bus>;

/// The ARM7-class core over its address-space layout.
pub type Arm7Core = Core<Arm7Bus>;

/// The console: two independent cores whose address spaces overlap only
/// on main RAM and the shared work RAM.
pub struct Nds {
    pub arm9: Arm9Core,
    pub arm7: Arm7Core,
}

impl Nds {
    #[must_use]
    pub fn new() -> Self {
        let main_ram = shared_ram(MAIN_RAM_SIZE);
        let shared_wram = shared_ram(SHARED_WRAM_SIZE);

        let arm9 = Core::new(Arm9Bus::new(Arc::clone(&main_ram), Arc::clone(&shared_wram)));
        let arm7 = Core::new(Arm7Bus::new(main_ram, shared_wram));

        Self { arm9, arm7 }
    }

    /// Copies both program images into the address spaces and points each
    /// core's boot address at its entry.
    ///
    /// # Errors
    ///
    /// Image descriptors outside the ROM data, or entry regions the buses
    /// cannot map.
    pub fn load_cartridge(&mut self, cartridge: &Cartridge) -> Result<(), Box<dyn Error>> {
        cartridge.load_arm9_program(&mut self.arm9.bus)?;
        cartridge.load_arm7_program(&mut self.arm7.bus)?;

        self.arm9.set_boot_addr(cartridge.header().arm9_entry_address());
        self.arm7.set_boot_addr(cartridge.header().arm7_entry_address());
        Ok(())
    }

    /// Bring-up program used when no cartridge is given: the ARM9 BIOS
    /// loads R0 with the main-RAM base and branch-exchanges there, where
    /// a branch-to-self idles; the ARM7 idles in its own BIOS.
    ///
    /// # Errors
    ///
    /// Only if a BIOS or main-RAM region is unmapped, which would be a
    /// layout bug.
    pub fn load_demo_program(&mut self) -> Result<(), UnmappedAccess> {
        self.arm9.bus.write_word(MAIN_RAM_BASE, 0xEAFF_FFFE)?;
        self.arm9.bus.write_word(ARM9_BIOS_BASE, 0xE3A0_0402)?;
        self.arm9.bus.write_word(ARM9_BIOS_BASE + 4, 0xE12F_FF10)?;
        self.arm9.set_boot_addr(ARM9_BIOS_BASE);

        self.arm7.bus.write_word(ARM7_BIOS_BASE, 0xEAFF_FFFE)?;
        self.arm7.set_boot_addr(ARM7_BIOS_BASE);
        Ok(())
    }
}

impl Default for Nds {
    fn default() -> Self {
        Self::new()
    }
}
