use crate::builtins;
use crate::context::Context;
use crate::error::MachineError;
use crate::memory::Memory;
use crate::options::MachineOptions;
use crate::registry::{OpcodeEntry, OpcodeRegistry};
use crate::stack::{OperationStack, TickResult};
use crate::system::Collaborators;
use itertools::Itertools;
use vn_bytecode::{Instruction, ParsedParameters, Script, TokenStream};
use vn_core::{malformed_ensure, InputEvent, KeyCode, MouseButton, Point};

/// Result of trying to execute one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction ran and the program counter moved on.
    Advanced,
    /// The instruction pushed an operation; advancing waits until the stack drains.
    Suspended,
    /// An operation is pending; nothing was executed.
    Waiting,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// The per-tick instruction budget ran out with work left.
    Running,
    Waiting,
    Halted,
}

pub struct Machine {
    script: Script,
    registry: OpcodeRegistry,
    memory: Memory,
    system: Collaborators,
    options: MachineOptions,
    stack: OperationStack,
    compiled: Vec<Option<ParsedParameters>>,
    pc: usize,
    clock: u64,
    pending_advance: bool,
    halted: bool,
}

impl Machine {
    pub fn new(
        script: Script,
        registry: OpcodeRegistry,
        system: Collaborators,
        options: MachineOptions,
    ) -> Self {
        Self {
            script,
            registry,
            memory: Memory::new(),
            system,
            options,
            stack: OperationStack::new(),
            compiled: Vec::new(),
            pc: 0,
            clock: 0,
            pending_advance: false,
            halted: false,
        }
    }

    /// A machine with the builtin opcode set, precompiled if the options ask for it.
    pub fn with_builtins(
        script: Script,
        system: Collaborators,
        options: MachineOptions,
    ) -> Result<Self, MachineError> {
        let precompile = options.precompile;
        let mut machine = Self::new(script, builtins::registry()?, system, options);
        if precompile {
            machine.precompile()?;
        }
        Ok(machine)
    }

    /// Parse every instruction's parameters once. Evaluation still happens
    /// on each dispatch.
    pub fn precompile(&mut self) -> Result<usize, MachineError> {
        let mut compiled = Vec::with_capacity(self.script.instructions.len());
        for (pc, instruction) in self.script.instructions.iter().enumerate() {
            let key = instruction.key;
            let system_error = |source| MachineError::System { pc, key, source };
            let entry = self.registry.lookup(key).map_err(system_error)?;
            compiled.push(Some(parse_instruction(entry, instruction).map_err(system_error)?));
        }
        let count = compiled.len();
        self.compiled = compiled;
        vn_core::debug!("precompiled {} instructions of {}", count, self.script.name);
        Ok(count)
    }

    /// Fetch, decode and execute the instruction at the program counter.
    pub fn step(&mut self) -> Result<StepOutcome, MachineError> {
        if self.halted {
            return Ok(StepOutcome::Halted);
        }
        if !self.stack.is_empty() {
            return Ok(StepOutcome::Waiting);
        }
        if self.pending_advance {
            self.pending_advance = false;
            self.pc += 1;
        }
        let pc = self.pc;
        let Some(instruction) = self.script.instructions.get(pc) else {
            vn_core::debug!("{} ran off the end at {}", self.script.name, pc);
            self.halted = true;
            return Ok(StepOutcome::Halted);
        };
        let key = instruction.key;
        let system_error = |source| MachineError::System { pc, key, source };

        let entry = self.registry.lookup(key).map_err(system_error)?;
        vn_core::trace!("{:>5} {} {}", pc, key, entry.name);
        let values = match self.compiled.get(pc).and_then(Option::as_ref) {
            Some(parsed) => entry.params.evaluate(parsed, &self.memory),
            None => parse_instruction(entry, instruction)
                .and_then(|parsed| entry.params.evaluate(&parsed, &self.memory)),
        }
        .map_err(system_error)?;
        if vn_core::config::trace_params() {
            vn_core::debug!("{} ({}) <- [{}]", entry.name, key, values.iter().join(", "));
        }

        let mut ctx = Context::new(self.clock, &mut self.memory, &mut self.system, &self.options);
        entry.call(&mut ctx, values).map_err(system_error)?;
        let halted = ctx.is_halted();
        let pushed = ctx.take_pushed();

        if halted {
            vn_core::debug!("halted by {} at {}", entry.name, pc);
            self.halted = true;
        }
        if pushed.is_empty() {
            if halted {
                return Ok(StepOutcome::Halted);
            }
            self.pc += 1;
            return Ok(StepOutcome::Advanced);
        }
        for entry in pushed {
            self.stack.push(entry);
        }
        self.pending_advance = true;
        Ok(if halted {
            StepOutcome::Halted
        } else {
            StepOutcome::Suspended
        })
    }

    /// Execute instructions until an operation is pending, the machine halts
    /// or the per-tick budget is spent.
    pub fn run_until_blocked(&mut self) -> Result<MachineState, MachineError> {
        let limit = self.options.max_instructions_per_tick;
        let mut executed = 0usize;
        loop {
            match self.step()? {
                StepOutcome::Advanced => {
                    executed += 1;
                    if limit != 0 && executed >= limit {
                        return Ok(MachineState::Running);
                    }
                }
                StepOutcome::Suspended | StepOutcome::Waiting => return Ok(MachineState::Waiting),
                StepOutcome::Halted => return Ok(MachineState::Halted),
            }
        }
    }

    /// Advance the clock by one frame, resume the active operation and, once
    /// the stack is empty, carry on executing in the same frame.
    pub fn tick(&mut self, elapsed_ms: u64) -> Result<MachineState, MachineError> {
        if self.halted {
            return Ok(MachineState::Halted);
        }
        self.clock = self.clock.saturating_add(elapsed_ms);
        if !self.stack.is_empty() {
            let name = self.stack.top_name().unwrap_or_default().to_string();
            let mut ctx =
                Context::new(self.clock, &mut self.memory, &mut self.system, &self.options);
            let result = self.stack.tick(&mut ctx);
            let halted = ctx.is_halted();
            let result = result.map_err(|source| MachineError::Operation { name, source })?;
            if let TickResult::Completed { name } = result {
                vn_core::trace!("{} finished at {} ms", name, self.clock);
            }
            if halted {
                self.halted = true;
                return Ok(MachineState::Halted);
            }
            if !self.stack.is_empty() {
                return Ok(MachineState::Waiting);
            }
        }
        self.run_until_blocked()
    }

    /// Offer an input event to the active operation. Returns whether it was
    /// consumed; unconsumed events are dropped.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        let consumed = self.stack.dispatch_event(&event);
        if !consumed {
            vn_core::trace!("dropped {:?}", event);
        }
        consumed
    }

    pub fn pointer_moved(&mut self, position: Point) -> bool {
        self.handle_event(InputEvent::PointerMoved(position))
    }

    pub fn button_state_changed(&mut self, button: MouseButton, pressed: bool) -> bool {
        self.handle_event(InputEvent::ButtonStateChanged { button, pressed })
    }

    pub fn key_state_changed(&mut self, key: KeyCode, pressed: bool) -> bool {
        self.handle_event(InputEvent::KeyStateChanged { key, pressed })
    }

    /// Drop every pending operation without running completion hooks.
    /// The deferred advance still happens on the next step.
    pub fn discard_operations(&mut self) -> usize {
        self.stack.discard_all()
    }

    /// Discard all operations, clear memory and rewind to the first instruction.
    pub fn hard_reset(&mut self) {
        self.stack.discard_all();
        self.memory.clear();
        self.pc = 0;
        self.pending_advance = false;
        self.halted = false;
        vn_core::debug!("hard reset of {}", self.script.name);
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn stack(&self) -> &OperationStack {
        &self.stack
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn system_mut(&mut self) -> &mut Collaborators {
        &mut self.system
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn registry(&self) -> &OpcodeRegistry {
        &self.registry
    }
}

/// Parse an instruction's tokens against its signature. Tokens left over
/// after the last parameter make the instruction malformed.
fn parse_instruction(
    entry: &OpcodeEntry,
    instruction: &Instruction,
) -> vn_core::Result<ParsedParameters> {
    let mut stream = TokenStream::new(&instruction.params);
    let parsed = entry.params.parse(&mut stream)?;
    malformed_ensure!(
        stream.is_exhausted(),
        "{}{} takes {} tokens but the instruction carries {}",
        entry.name,
        entry.params.describe(),
        stream.consumed(),
        instruction.params.len()
    );
    Ok(parsed)
}
