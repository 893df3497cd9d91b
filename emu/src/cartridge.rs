use std::{error::Error, fs::File, io::Read};

use crate::bus::Bus;

/// The fixed little-endian cartridge header: identification plus the two
/// program descriptors (one per core), each giving where the image sits
/// in the ROM, where it boots and how big it is.
pub struct CartridgeHeader {
    game_title: String,
    game_code: String,
    maker_code: String,
    unit_code: u8,
    device_capacity: u8,

    arm9_rom_offset: u32,
    arm9_entry_address: u32,
    arm9_ram_address: u32,
    arm9_size: u32,

    arm7_rom_offset: u32,
    arm7_entry_address: u32,
    arm7_ram_address: u32,
    arm7_size: u32,
}

/// Everything the header describes sits inside the first 0x170 bytes.
const HEADER_LEN: usize = 0x170;

impl CartridgeHeader {
    /// Parses the header from the start of a ROM image.
    ///
    /// # Errors
    ///
    /// Truncated data or non-ASCII identification fields.
    pub fn new(data: &[u8]) -> Result<Self, Box<dyn Error>> {
        if data.len() < HEADER_LEN {
            return Err("cartridge image is shorter than its header".into());
        }

        let game_title = into_ascii_str(&data[0x000..0x00C])?;
        let game_code = into_ascii_str(&data[0x00C..0x010])?;
        let maker_code = into_ascii_str(&data[0x010..0x012])?;
        let unit_code = data[0x012];
        let device_capacity = data[0x014];

        let arm9_rom_offset = read_u32(data, 0x020);
        let arm9_entry_address = read_u32(data, 0x024);
        let arm9_ram_address = read_u32(data, 0x028);
        let arm9_size = read_u32(data, 0x02C);

        let arm7_rom_offset = read_u32(data, 0x030);
        let arm7_entry_address = read_u32(data, 0x034);
        let arm7_ram_address = read_u32(data, 0x038);
        let arm7_size = read_u32(data, 0x03C);

        Ok(Self {
            game_title,
            game_code,
            maker_code,
            unit_code,
            device_capacity,
            arm9_rom_offset,
            arm9_entry_address,
            arm9_ram_address,
            arm9_size,
            arm7_rom_offset,
            arm7_entry_address,
            arm7_ram_address,
            arm7_size,
        })
    }

    pub fn game_title(&self) -> &str {
        self.game_title.as_str()
    }

    pub fn game_code(&self) -> &str {
        self.game_code.as_str()
    }

    pub fn maker_code(&self) -> &str {
        self.maker_code.as_str()
    }

    /// 0x00 for the base handheld, 0x02/0x03 for later revisions.
    #[must_use]
    pub const fn unit_code(&self) -> u8 {
        self.unit_code
    }

    /// Chip size = 128KB << capacity.
    #[must_use]
    pub const fn device_capacity(&self) -> u8 {
        self.device_capacity
    }

    #[must_use]
    pub const fn arm9_entry_address(&self) -> u32 {
        self.arm9_entry_address
    }

    #[must_use]
    pub const fn arm9_ram_address(&self) -> u32 {
        self.arm9_ram_address
    }

    #[must_use]
    pub const fn arm7_entry_address(&self) -> u32 {
        self.arm7_entry_address
    }

    #[must_use]
    pub const fn arm7_ram_address(&self) -> u32 {
        self.arm7_ram_address
    }
}

/// A loaded ROM image: the parsed header plus the raw bytes the program
/// images are copied out of.
pub struct Cartridge {
    header: CartridgeHeader,
    data: Vec<u8>,
}

impl Cartridge {
    /// # Errors
    ///
    /// Header parse failures.
    pub fn new(data: Vec<u8>) -> Result<Self, Box<dyn Error>> {
        let header = CartridgeHeader::new(&data)?;
        Ok(Self { header, data })
    }

    /// # Errors
    ///
    /// I/O failures and header parse failures.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::new(data)
    }

    #[must_use]
    pub const fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    /// Copies the ARM9 program image to its entry region.
    ///
    /// # Errors
    ///
    /// An image descriptor pointing outside the ROM data, or an entry
    /// region the bus cannot map.
    pub fn load_arm9_program(&self, bus: &mut impl Bus) -> Result<(), Box<dyn Error>> {
        copy_image(
            bus,
            &self.data,
            self.header.arm9_rom_offset,
            self.header.arm9_entry_address,
            self.header.arm9_size,
        )
    }

    /// Copies the ARM7 program image to its entry region.
    ///
    /// # Errors
    ///
    /// Same conditions as the ARM9 image.
    pub fn load_arm7_program(&self, bus: &mut impl Bus) -> Result<(), Box<dyn Error>> {
        copy_image(
            bus,
            &self.data,
            self.header.arm7_rom_offset,
            self.header.arm7_entry_address,
            self.header.arm7_size,
        )
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
}

fn into_ascii_str(data: &[u8]) -> Result<String, Box<dyn Error>> {
    // identification fields are zero padded
    let trimmed: Vec<u8> = data.iter().copied().take_while(|&b| b != 0).collect();
    let string = String::from_utf8(trimmed)?;

    for chr in string.chars() {
        if !chr.is_ascii() {
            return Err("not a valid ASCII sequence".into());
        }
    }

    Ok(string)
}

fn copy_image(
    bus: &mut impl Bus,
    data: &[u8],
    rom_offset: u32,
    destination: u32,
    size: u32,
) -> Result<(), Box<dyn Error>> {
    let start = rom_offset as usize;
    let end = start
        .checked_add(size as usize)
        .filter(|&end| end <= data.len())
        .ok_or("program image lies outside the cartridge data")?;

    for (i, &byte) in data[start..end].iter().enumerate() {
        bus.write_byte(destination.wrapping_add(i as u32), byte)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Arm9Bus, Bus, MAIN_RAM_BASE};
    use pretty_assertions::assert_eq;

    fn rom_with_program() -> Vec<u8> {
        let mut data = vec![0_u8; 0x200];
        data[0x000..0x005].copy_from_slice(b"DEMO\0");
        data[0x00C..0x010].copy_from_slice(b"ABCD");
        data[0x010..0x012].copy_from_slice(b"01");
        data[0x012] = 0;
        data[0x014] = 7;

        // ARM9 image: 8 bytes at ROM offset 0x180, boots at main RAM
        data[0x020..0x024].copy_from_slice(&0x0000_0180_u32.to_le_bytes());
        data[0x024..0x028].copy_from_slice(&MAIN_RAM_BASE.to_le_bytes());
        data[0x028..0x02C].copy_from_slice(&MAIN_RAM_BASE.to_le_bytes());
        data[0x02C..0x030].copy_from_slice(&8_u32.to_le_bytes());

        // ARM7 image: 4 bytes at ROM offset 0x188
        data[0x030..0x034].copy_from_slice(&0x0000_0188_u32.to_le_bytes());
        data[0x034..0x038].copy_from_slice(&(MAIN_RAM_BASE + 0x100).to_le_bytes());
        data[0x038..0x03C].copy_from_slice(&(MAIN_RAM_BASE + 0x100).to_le_bytes());
        data[0x03C..0x040].copy_from_slice(&4_u32.to_le_bytes());

        data[0x180..0x184].copy_from_slice(&0xE3A0_0402_u32.to_le_bytes());
        data[0x184..0x188].copy_from_slice(&0xE12F_FF10_u32.to_le_bytes());
        data[0x188..0x18C].copy_from_slice(&0xEAFF_FFFE_u32.to_le_bytes());
        data
    }

    #[test]
    fn parses_the_header() {
        let cartridge = Cartridge::new(rom_with_program()).unwrap();
        let header = cartridge.header();

        assert_eq!(header.game_title(), "DEMO");
        assert_eq!(header.game_code(), "ABCD");
        assert_eq!(header.maker_code(), "01");
        assert_eq!(header.unit_code(), 0);
        assert_eq!(header.device_capacity(), 7);
        assert_eq!(header.arm9_entry_address(), MAIN_RAM_BASE);
        assert_eq!(header.arm7_entry_address(), MAIN_RAM_BASE + 0x100);
    }

    #[test]
    fn truncated_data_is_rejected() {
        assert!(Cartridge::new(vec![0; 0x10]).is_err());
    }

    #[test]
    fn loads_program_images_into_the_bus() {
        let cartridge = Cartridge::new(rom_with_program()).unwrap();
        let mut bus = Arm9Bus::default();

        cartridge.load_arm9_program(&mut bus).unwrap();
        assert_eq!(bus.read_word(MAIN_RAM_BASE), Ok(0xE3A0_0402));
        assert_eq!(bus.read_word(MAIN_RAM_BASE + 4), Ok(0xE12F_FF10));

        cartridge.load_arm7_program(&mut bus).unwrap();
        assert_eq!(bus.read_word(MAIN_RAM_BASE + 0x100), Ok(0xEAFF_FFFE));
    }

    #[test]
    fn image_outside_the_rom_is_rejected() {
        let mut data = rom_with_program();
        // ARM9 size larger than the ROM
        data[0x02C..0x030].copy_from_slice(&0x1000_u32.to_le_bytes());
        let cartridge = Cartridge::new(data).unwrap();

        let mut bus = Arm9Bus::default();
        assert!(cartridge.load_arm9_program(&mut bus).is_err());
    }
}
