use thiserror::Error;

use crate::bus::UnmappedAccess;
use crate::cpu::modes::Mode;

/// What a [`CpuError`] means for the caller.
///
/// Contract violations indicate a decoder or caller bug and must stop the
/// pipeline; the other kinds are conditions a real CPU would turn into an
/// architectural exception, which this core does not model, so they surface
/// as errors the caller can report instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// A core-internal invariant was broken.
    Contract,
    /// A guest-visible illegal operation.
    Illegal,
    /// The address space backend could not map the address.
    Access,
    /// The guest entered a state this core does not implement.
    Unsupported,
}

/// Everything that can abort an instruction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    #[error("register index {0} is out of range")]
    RegisterOutOfRange(u32),

    #[error("unrecognized mode bits 0b{0:05b} in status register")]
    UnknownMode(u32),

    #[error("no saved status register exists in {0:?} mode")]
    SpsrUnavailable(Mode),

    #[error("R15 may not be used as a transfer offset register")]
    PcUsedAsOffset,

    #[error(transparent)]
    Memory(#[from] UnmappedAccess),

    #[error("the Thumb instruction set is not implemented")]
    ThumbState,
}

impl CpuError {
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::RegisterOutOfRange(_) | Self::UnknownMode(_) => FaultKind::Contract,
            Self::SpsrUnavailable(_) | Self::PcUsedAsOffset => FaultKind::Illegal,
            Self::Memory(_) => FaultKind::Access,
            Self::ThumbState => FaultKind::Unsupported,
        }
    }

    /// Illegal operations are recoverable from the caller's point of view;
    /// everything else means the core state can no longer be trusted.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self.kind(), FaultKind::Illegal)
    }
}
