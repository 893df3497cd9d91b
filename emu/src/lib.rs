#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

#[allow(clippy::missing_panics_doc)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::unreadable_literal)]
pub mod bus;

#[allow(clippy::similar_names)]
#[allow(clippy::missing_panics_doc)]
pub mod cartridge;

pub mod cpu;
pub mod nds;
