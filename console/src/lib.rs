//! Interactive debug console: a thin line loop issuing step, run/stop,
//! reset and breakpoint commands against the two cores. Guest errors are
//! printed and the prompt survives; only `q` (or EOF) ends the session.

use std::io::{self, BufRead, Write};

use emu::bus::{Arm7Bus, Arm9Bus, Bus};
use emu::cpu::runner::{RunState, Runner};
use emu::nds::Nds;

/// Which core the single-letter commands address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selected {
    Arm9,
    Arm7,
}

impl std::fmt::Display for Selected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arm9 => f.write_str("arm9"),
            Self::Arm7 => f.write_str("arm7"),
        }
    }
}

pub struct Console {
    arm9: Runner<Arm9Bus>,
    arm7: Runner<Arm7Bus>,
    selected: Selected,
    echo_registers: bool,
}

impl Console {
    #[must_use]
    pub fn new(nds: Nds) -> Self {
        Self {
            arm9: Runner::new(nds.arm9),
            arm7: Runner::new(nds.arm7),
            selected: Selected::Arm9,
            echo_registers: false,
        }
    }

    /// Reads commands from stdin until `q` or EOF. Both run loops are
    /// stopped and joined before returning.
    pub fn run(&mut self) {
        print_help();

        let stdin = io::stdin();
        loop {
            print!("{}> ", self.selected);
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if !self.handle_command(line.trim()) {
                break;
            }
        }

        self.arm9.stop();
        self.arm7.stop();
    }

    /// Dispatches one command line. Returns `false` when the session
    /// should end.
    pub fn handle_command(&mut self, line: &str) -> bool {
        tracing::debug!("command: {line}");
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let arguments: Vec<&str> = parts.collect();

        match command {
            "" => {}
            "s" => match self.selected {
                Selected::Arm9 => step(&mut self.arm9, self.echo_registers),
                Selected::Arm7 => step(&mut self.arm7, self.echo_registers),
            },
            "r" => match self.selected {
                Selected::Arm9 => toggle_run(&mut self.arm9),
                Selected::Arm7 => toggle_run(&mut self.arm7),
            },
            "x" => {
                match self.selected {
                    Selected::Arm9 => self.arm9.reset(),
                    Selected::Arm7 => self.arm7.reset(),
                }
                println!("{} reset", self.selected);
            }
            "m" => match self.selected {
                Selected::Arm9 => peek(&self.arm9, &arguments),
                Selected::Arm7 => peek(&self.arm7, &arguments),
            },
            "d" => match self.selected {
                Selected::Arm9 => dump_registers(&self.arm9),
                Selected::Arm7 => dump_registers(&self.arm7),
            },
            "b" => match self.selected {
                Selected::Arm9 => breakpoint_command(&self.arm9, &arguments),
                Selected::Arm7 => breakpoint_command(&self.arm7, &arguments),
            },
            "c" => {
                self.selected = match self.selected {
                    Selected::Arm9 => Selected::Arm7,
                    Selected::Arm7 => Selected::Arm9,
                };
                println!("selected core: {}", self.selected);
            }
            "v" => {
                self.echo_registers = !self.echo_registers;
                println!(
                    "register echo {}",
                    if self.echo_registers { "on" } else { "off" }
                );
            }
            "h" => print_help(),
            "q" => return false,
            unknown => println!("unknown command '{unknown}' (h for help)"),
        }
        true
    }
}

fn print_help() {
    println!("commands:");
    println!("  s          step one instruction");
    println!("  r          run / stop");
    println!("  x          reset the selected core");
    println!("  m <addr>   peek a word of memory (hex address)");
    println!("  d          dump registers");
    println!("  b a <addr> add a breakpoint");
    println!("  b r <idx>  remove a breakpoint");
    println!("  b t <idx>  toggle a breakpoint");
    println!("  b l        list breakpoints");
    println!("  c          switch between the two cores");
    println!("  v          toggle per-step register echo");
    println!("  h          this help");
    println!("  q          quit");
}

fn parse_hex(text: &str) -> Option<u32> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).ok()
}

fn step<B: Bus>(runner: &mut Runner<B>, echo_registers: bool) {
    if runner.state() == RunState::Running {
        println!("core is running; stop it first");
        return;
    }
    match runner.step() {
        Ok(()) => {
            if echo_registers {
                dump_registers(runner);
            } else {
                println!("pc = 0x{:08X}", runner.with_core(|core| core.pc()));
            }
        }
        Err(error) => println!("error: {error}"),
    }
}

fn toggle_run<B: Bus + Send + 'static>(runner: &mut Runner<B>) {
    if runner.state() == RunState::Running {
        runner.stop();
        println!("stopped at pc = 0x{:08X}", runner.with_core(|core| core.pc()));
    } else {
        runner.run();
        println!("running");
    }
}

fn peek<B: Bus>(runner: &Runner<B>, arguments: &[&str]) {
    let Some(address) = arguments.first().copied().and_then(parse_hex) else {
        println!("usage: m <hex address>");
        return;
    };
    match runner.with_core(|core| core.bus.read_word(address)) {
        Ok(word) => println!("[0x{address:08X}] = 0x{word:08X}"),
        Err(error) => println!("error: {error}"),
    }
}

fn dump_registers<B: Bus>(runner: &Runner<B>) {
    runner.with_core(|core| {
        for id in 0..16 {
            match core.reg(id) {
                Ok(value) => println!("R{id:<2} = 0x{value:08X} ({value})"),
                Err(error) => {
                    println!("error: {error}");
                    return;
                }
            }
        }
        println!("cpsr = 0x{:08X}", u32::from(core.regs.cpsr));
        println!("retired = {}", core.retired());
    });
}

fn breakpoint_command<B: Bus>(runner: &Runner<B>, arguments: &[&str]) {
    let registry = runner.breakpoints();
    let mut registry = registry.lock().unwrap();

    match arguments {
        ["a", address] => match parse_hex(address) {
            Some(address) => {
                registry.add(address);
                println!("breakpoint armed at 0x{address:08X}");
            }
            None => println!("usage: b a <hex address>"),
        },
        ["r", index] => match index.parse::<usize>() {
            Ok(index) if registry.remove(index) => println!("breakpoint {index} removed"),
            _ => println!("no breakpoint {index}"),
        },
        ["t", index] => match index.parse::<usize>() {
            Ok(index) if registry.toggle(index) => println!("breakpoint {index} toggled"),
            _ => println!("no breakpoint {index}"),
        },
        [] | ["l"] => {
            if registry.is_empty() {
                println!("no breakpoints");
            }
            for (index, breakpoint) in registry.list().iter().enumerate() {
                let state = if breakpoint.active { "armed" } else { "spent" };
                println!("{index}: 0x{:08X} ({state})", breakpoint.address);
            }
        }
        _ => println!("usage: b [a <addr> | r <idx> | t <idx> | l]"),
    }
}
