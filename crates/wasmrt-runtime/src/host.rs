//! Host embedding hooks
//!
//! The host supplies output and the indirect-call table. [`StdHost`] writes
//! to stdout; [`CaptureHost`] records output for inspection.

use crate::error::{RuntimeError, RuntimeResult};
use parking_lot::Mutex;
use std::sync::Arc;
use wasmrt_core::{Address, LinearMemory};

/// Output services provided by the embedding
pub trait Host {
    /// Emit a raw diagnostic word
    fn print(&mut self, value: i32);

    /// Emit a decimal integer
    fn print_int(&mut self, value: i32);

    /// Emit a decoded string
    fn print_string(&mut self, text: &str);

    /// Report heap exhaustion
    fn print_out_of_memory(&mut self);
}

/// Host that writes to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdHost;

impl Host for StdHost {
    fn print(&mut self, value: i32) {
        print!("{value}");
    }

    fn print_int(&mut self, value: i32) {
        println!("{value}");
    }

    fn print_string(&mut self, text: &str) {
        print!("{text}");
    }

    fn print_out_of_memory(&mut self) {
        eprintln!("Out of memory");
    }
}

/// Host that records everything it is asked to print
///
/// Clones share the same buffer, so a test can keep one handle and move
/// another into the runtime.
#[derive(Debug, Default, Clone)]
pub struct CaptureHost {
    output: Arc<Mutex<Vec<String>>>,
}

impl CaptureHost {
    /// Create an empty capture
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines
    pub fn lines(&self) -> Vec<String> {
        self.output.lock().clone()
    }

    /// Drop recorded output
    pub fn clear(&self) {
        self.output.lock().clear();
    }

    fn push(&self, line: String) {
        self.output.lock().push(line);
    }
}

impl Host for CaptureHost {
    fn print(&mut self, value: i32) {
        self.push(format!("{value:#x}"));
    }

    fn print_int(&mut self, value: i32) {
        self.push(value.to_string());
    }

    fn print_string(&mut self, text: &str) {
        self.push(text.to_string());
    }

    fn print_out_of_memory(&mut self) {
        self.push("Out of memory".to_string());
    }
}

/// Host function callable through the table: `(memory, instance)`
pub type TableFunction = Box<dyn FnMut(&mut LinearMemory, Address) + Send>;

/// Indirect-call table
///
/// Generated code calls functions by table index, passing the receiving
/// object's address.
#[derive(Default)]
pub struct FunctionTable {
    functions: Vec<Option<TableFunction>>,
}

impl FunctionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a function and return its index
    pub fn register(&mut self, function: TableFunction) -> i32 {
        self.functions.push(Some(function));
        (self.functions.len() - 1) as i32
    }

    /// Put `function` at `index`, growing the table with empty slots
    pub fn set(&mut self, index: i32, function: TableFunction) -> RuntimeResult<()> {
        let slot = usize::try_from(index).map_err(|_| RuntimeError::UnknownFunction(index))?;
        if slot >= self.functions.len() {
            self.functions.resize_with(slot + 1, || None);
        }
        self.functions[slot] = Some(function);
        Ok(())
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check for an empty table
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Call the function at `index`
    pub fn call(&mut self, memory: &mut LinearMemory, index: i32, instance: Address) -> RuntimeResult<()> {
        let function = usize::try_from(index)
            .ok()
            .and_then(|slot| self.functions.get_mut(slot))
            .and_then(Option::as_mut)
            .ok_or(RuntimeError::UnknownFunction(index))?;
        function(memory, instance);
        Ok(())
    }
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTable")
            .field("len", &self.functions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_host_shares_buffer() {
        let capture = CaptureHost::new();
        let mut host = capture.clone();
        host.print_int(-5);
        host.print_string("hi");
        host.print(255);
        host.print_out_of_memory();
        assert_eq!(capture.lines(), vec!["-5", "hi", "0xff", "Out of memory"]);
        capture.clear();
        assert!(capture.lines().is_empty());
    }

    #[test]
    fn test_function_table_dispatch() {
        let mut memory = LinearMemory::new(64);
        let mut table = FunctionTable::new();
        let index = table.register(Box::new(|mem: &mut LinearMemory, instance: Address| {
            mem.put_word(instance, 42);
        }));
        assert_eq!(index, 0);
        table.call(&mut memory, index, Address::new(8)).unwrap();
        assert_eq!(memory.get_word(Address::new(8)), 42);
    }

    #[test]
    fn test_function_table_unknown_index() {
        let mut memory = LinearMemory::new(16);
        let mut table = FunctionTable::new();
        table
            .set(
                3,
                Box::new(|mem: &mut LinearMemory, _: Address| mem.put_word(Address::new(0), 1)),
            )
            .unwrap();
        assert_eq!(table.len(), 4);
        assert!(matches!(
            table.call(&mut memory, 1, Address::NULL),
            Err(RuntimeError::UnknownFunction(1))
        ));
        assert!(matches!(
            table.call(&mut memory, -1, Address::NULL),
            Err(RuntimeError::UnknownFunction(-1))
        ));
        assert!(table.set(-2, Box::new(|_: &mut LinearMemory, _: Address| {})).is_err());
        table.call(&mut memory, 3, Address::NULL).unwrap();
        assert_eq!(memory.get_word(Address::new(0)), 1);
    }
}
