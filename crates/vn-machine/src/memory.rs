use vn_bytecode::{IntBank, IntLocation, LiveState, StrBank};
use vn_core::{eval_bail, Result};

/// Slots in every integer and string bank.
pub const BANK_SIZE: usize = 2000;

const INT_BANKS: usize = 7;
const STR_BANKS: usize = 2;

/// Interpreter-visible variables: integer banks A-F and Z, string banks S
/// and M, and the store register.
#[derive(Debug, Clone)]
pub struct Memory {
    ints: Vec<Vec<i32>>,
    strs: Vec<Vec<String>>,
    store: i32,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            ints: vec![vec![0; BANK_SIZE]; INT_BANKS],
            strs: vec![vec![String::new(); BANK_SIZE]; STR_BANKS],
            store: 0,
        }
    }

    pub fn int(&self, bank: IntBank, index: i32) -> Result<i32> {
        let slot = slot(bank, index)?;
        Ok(self.ints[int_bank_index(bank)][slot])
    }

    pub fn set_int(&mut self, bank: IntBank, index: i32, value: i32) -> Result<()> {
        let slot = slot(bank, index)?;
        self.ints[int_bank_index(bank)][slot] = value;
        Ok(())
    }

    pub fn int_at(&self, location: IntLocation) -> Result<i32> {
        self.int(location.bank, location.index)
    }

    pub fn set_int_at(&mut self, location: IntLocation, value: i32) -> Result<()> {
        self.set_int(location.bank, location.index, value)
    }

    pub fn str(&self, bank: StrBank, index: i32) -> Result<&str> {
        let slot = slot(bank, index)?;
        Ok(&self.strs[str_bank_index(bank)][slot])
    }

    pub fn set_str(&mut self, bank: StrBank, index: i32, value: impl Into<String>) -> Result<()> {
        let slot = slot(bank, index)?;
        self.strs[str_bank_index(bank)][slot] = value.into();
        Ok(())
    }

    pub fn store(&self) -> i32 {
        self.store
    }

    pub fn set_store(&mut self, value: i32) {
        self.store = value;
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl LiveState for Memory {
    fn read_int(&self, bank: IntBank, index: i32) -> Result<i32> {
        self.int(bank, index)
    }

    fn read_str(&self, bank: StrBank, index: i32) -> Result<String> {
        self.str(bank, index).map(str::to_string)
    }

    fn store(&self) -> i32 {
        self.store
    }
}

fn slot(bank: impl std::fmt::Display, index: i32) -> Result<usize> {
    match usize::try_from(index) {
        Ok(slot) if slot < BANK_SIZE => Ok(slot),
        _ => eval_bail!("{}[{}] is out of range 0..{}", bank, index, BANK_SIZE),
    }
}

fn int_bank_index(bank: IntBank) -> usize {
    match bank {
        IntBank::A => 0,
        IntBank::B => 1,
        IntBank::C => 2,
        IntBank::D => 3,
        IntBank::E => 4,
        IntBank::F => 5,
        IntBank::Z => 6,
    }
}

fn str_bank_index(bank: StrBank) -> usize {
    match bank {
        StrBank::S => 0,
        StrBank::M => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vn_bytecode::parse_expression;

    #[test]
    fn banks_are_independent() {
        let mut memory = Memory::new();
        memory.set_int(IntBank::A, 3, 7).unwrap();
        memory.set_int(IntBank::Z, 3, 9).unwrap();
        assert_eq!(memory.int(IntBank::A, 3).unwrap(), 7);
        assert_eq!(memory.int(IntBank::Z, 3).unwrap(), 9);
        assert_eq!(memory.int(IntBank::B, 3).unwrap(), 0);
    }

    #[test]
    fn out_of_range_is_an_evaluation_error() {
        let memory = Memory::new();
        let err = memory.int(IntBank::C, 2000).unwrap_err();
        assert!(matches!(err, vn_core::Error::Evaluation { .. }));
        assert!(err.to_string().contains("intC[2000]"));
        assert!(memory.str(StrBank::S, -1).is_err());
    }

    #[test]
    fn expressions_read_live_values() {
        let mut memory = Memory::new();
        memory.set_int(IntBank::A, 0, 5).unwrap();
        memory.set_str(StrBank::M, 1, "Nagisa").unwrap();
        memory.set_store(2);
        let sum = parse_expression("intA[0] * store").unwrap();
        assert_eq!(sum.eval_int(&memory).unwrap(), 10);
        let name = parse_expression("strM[1]").unwrap();
        assert_eq!(name.eval_str(&memory).unwrap(), "Nagisa");
    }
}
