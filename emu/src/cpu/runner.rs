//! # Run Loop
//!
//! Drives one core through {Stopped, Stepping, Running}. Single steps and
//! resets run synchronously on the calling thread; continuous execution
//! runs on the core's single owned thread, which re-checks a stop flag
//! and the breakpoint predicate at every instruction boundary. The thread
//! is always joined, never detached.
//!
//! The caller (the console, in practice) serializes stepping against
//! running; the runner only ignores a step that races a live run thread.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::bus::Bus;
use crate::cpu::breakpoints::Breakpoints;
use crate::cpu::core::Core;
use crate::cpu::error::CpuError;

/// Externally observable execution state of one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped = 0,
    Stepping = 1,
    Running = 2,
}

impl RunState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Stopped,
            1 => Self::Stepping,
            2 => Self::Running,
            _ => unreachable!(),
        }
    }
}

/// Owns one core, its breakpoint registry and its run thread.
pub struct Runner<B: Bus> {
    core: Arc<Mutex<Core<B>>>,
    breakpoints: Arc<Mutex<Breakpoints>>,
    state: Arc<AtomicU8>,
    handle: Option<JoinHandle<()>>,
}

impl<B: Bus> Runner<B> {
    pub fn new(core: Core<B>) -> Self {
        Self {
            core: Arc::new(Mutex::new(core)),
            breakpoints: Arc::new(Mutex::new(Breakpoints::new())),
            state: Arc::new(AtomicU8::new(RunState::Stopped as u8)),
            handle: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        RunState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// The registry shared with the run thread.
    #[must_use]
    pub fn breakpoints(&self) -> Arc<Mutex<Breakpoints>> {
        Arc::clone(&self.breakpoints)
    }

    /// Runs a closure against the core. Used by the console for register
    /// dumps, memory peeks and boot-address setup.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut Core<B>) -> R) -> R {
        f(&mut self.core.lock().unwrap())
    }

    /// One synchronous cycle from the calling thread.
    ///
    /// # Errors
    ///
    /// Whatever the cycle reports; the core stays stopped either way.
    pub fn step(&mut self) -> Result<(), CpuError> {
        if self.state() == RunState::Running {
            tracing::warn!("step ignored: core is running");
            return Ok(());
        }
        self.reap();

        self.state
            .store(RunState::Stepping as u8, Ordering::Release);
        let result = self.core.lock().unwrap().step();
        self.state.store(RunState::Stopped as u8, Ordering::Release);
        result
    }

    /// Requests a stop at the next instruction boundary and joins the run
    /// thread. The instruction in flight always completes.
    pub fn stop(&mut self) {
        let _ = self.state.compare_exchange(
            RunState::Running as u8,
            RunState::Stopped as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.reap();
    }

    /// Reset is legal in any state and does not stop a running loop;
    /// stopping first is the caller's call.
    pub fn reset(&mut self) {
        self.core.lock().unwrap().reset();
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl<B: Bus + Send + 'static> Runner<B> {
    /// Starts continuous execution on the core's owned thread. Before
    /// each cycle the loop observes stop requests, then the breakpoint
    /// predicate against the current PC; a hit stops the loop without
    /// executing that cycle. Any execution error halts the loop.
    pub fn run(&mut self) {
        if self.state() == RunState::Running {
            return;
        }
        self.reap();
        self.state.store(RunState::Running as u8, Ordering::Release);

        let core = Arc::clone(&self.core);
        let breakpoints = Arc::clone(&self.breakpoints);
        let state = Arc::clone(&self.state);

        self.handle = Some(std::thread::spawn(move || {
            while state.load(Ordering::Acquire) == RunState::Running as u8 {
                let mut core = core.lock().unwrap();

                let pc = core.pc();
                if breakpoints.lock().unwrap().check(pc) {
                    tracing::info!("breakpoint hit at 0x{pc:08X}");
                    state.store(RunState::Stopped as u8, Ordering::Release);
                    break;
                }

                if let Err(error) = core.step() {
                    tracing::error!("execution halted at 0x{pc:08X}: {error}");
                    state.store(RunState::Stopped as u8, Ordering::Release);
                    break;
                }
            }
        }));
    }
}

impl<B: Bus> Drop for Runner<B> {
    fn drop(&mut self) {
        let _ = self.state.compare_exchange(
            RunState::Running as u8,
            RunState::Stopped as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.reap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Arm9Bus, Bus, MAIN_RAM_BASE, MAIN_RAM_SIZE};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const MOV_R0_R0: u32 = 0xE1A0_0000;

    fn wait_until_stopped(runner: &mut Runner<Arm9Bus>) {
        for _ in 0..2000 {
            if runner.state() == RunState::Stopped {
                runner.stop(); // join the finished thread
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("run loop did not stop in time");
    }

    #[test]
    fn step_is_synchronous() {
        let mut bus = Arm9Bus::default();
        bus.write_word(MAIN_RAM_BASE, MOV_R0_R0).unwrap();
        let mut core = Core::new(bus);
        core.set_boot_addr(MAIN_RAM_BASE);

        let mut runner = Runner::new(core);
        assert_eq!(runner.state(), RunState::Stopped);
        runner.step().unwrap();
        assert_eq!(runner.state(), RunState::Stopped);
        assert_eq!(runner.with_core(|core| core.pc()), MAIN_RAM_BASE + 4);
    }

    #[test]
    fn step_reports_execution_errors() {
        let mut core = Core::new(Arm9Bus::default());
        core.set_boot_addr(0xDEAD_0000);

        let mut runner = Runner::new(core);
        assert!(runner.step().is_err());
        assert_eq!(runner.state(), RunState::Stopped);
    }

    // a breakpoint at B, reached after N instructions, stops the loop
    // exactly at B without executing it, and auto-deactivates
    #[test]
    fn breakpoint_halts_continuous_run() {
        // four no-ops, the breakpoint target, then four more no-ops
        // running into the end of main RAM
        let program_base = MAIN_RAM_BASE + MAIN_RAM_SIZE as u32 - 0x20;
        let target = program_base + 0x10;

        let mut bus = Arm9Bus::default();
        for i in 0..8 {
            bus.write_word(program_base + i * 4, MOV_R0_R0).unwrap();
        }
        let mut core = Core::new(bus);
        core.set_boot_addr(program_base);

        let mut runner = Runner::new(core);
        runner.breakpoints().lock().unwrap().add(target);

        runner.run();
        wait_until_stopped(&mut runner);

        assert_eq!(runner.with_core(|core| core.pc()), target);
        assert_eq!(runner.with_core(|core| core.retired()), 4);
        assert!(!runner.breakpoints().lock().unwrap().list()[0].active);

        // re-running does not re-trigger the spent breakpoint: the loop
        // continues past the target until it falls off mapped memory
        runner.run();
        wait_until_stopped(&mut runner);

        assert_ne!(runner.with_core(|core| core.pc()), target);
        assert_eq!(runner.with_core(|core| core.retired()), 8);
    }

    #[test]
    fn stop_halts_a_self_loop() {
        let mut bus = Arm9Bus::default();
        // branch-to-self: runs forever until stopped
        bus.write_word(MAIN_RAM_BASE, 0xEAFF_FFFE).unwrap();
        let mut core = Core::new(bus);
        core.set_boot_addr(MAIN_RAM_BASE);

        let mut runner = Runner::new(core);
        runner.run();
        assert_eq!(runner.state(), RunState::Running);
        std::thread::sleep(Duration::from_millis(10));

        runner.stop();
        assert_eq!(runner.state(), RunState::Stopped);
        assert_eq!(runner.with_core(|core| core.pc()), MAIN_RAM_BASE);
        assert!(runner.with_core(|core| core.retired()) > 0);
    }
}
