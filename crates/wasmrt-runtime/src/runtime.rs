//! Runtime instance

use crate::config::RuntimeConfig;
use crate::error::RuntimeResult;
use crate::heap::Heap;
use crate::host::{FunctionTable, Host, StdHost};
use wasmrt_core::{
    Address, LinearMemory, ResourceMap, ResourceMapWriter, StringView, write_string,
};
use wasmrt_gc::{RootSet, ShadowStack, StackMark, collect_roots};

/// A single isolated runtime instance
///
/// Owns its memory and stack context outright; nothing is global, so any
/// number of instances can coexist in one process.
pub struct Runtime<H: Host = StdHost> {
    config: RuntimeConfig,
    memory: LinearMemory,
    stack: ShadowStack,
    heap: Heap,
    table: FunctionTable,
    host: H,
}

impl Runtime<StdHost> {
    /// Create an instance that prints to stdout
    pub fn new(config: RuntimeConfig) -> RuntimeResult<Self> {
        Self::with_host(config, StdHost)
    }
}

impl<H: Host> Runtime<H> {
    /// Create an instance with a custom host
    pub fn with_host(config: RuntimeConfig, host: H) -> RuntimeResult<Self> {
        config.validate()?;
        let mut memory = LinearMemory::new(config.memory_size);
        let stack = ShadowStack::new(
            &mut memory,
            Address::new(config.stack_base),
            config.stack_size,
        )?;
        let heap = Heap::new(
            Address::new(config.heap_start()?),
            Address::new(config.memory_size),
            config.heap_alignment,
        )?;
        tracing::info!(
            target: "wasmrt::runtime",
            memory_size = config.memory_size,
            stack_base = config.stack_base,
            stack_size = config.stack_size,
            heap_start = %heap.start(),
            "runtime instance created"
        );
        Ok(Self {
            config,
            memory,
            stack,
            heap,
            table: FunctionTable::new(),
            host,
        })
    }

    /// Instance configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Linear memory
    pub fn memory(&self) -> &LinearMemory {
        &self.memory
    }

    /// Mutable linear memory
    pub fn memory_mut(&mut self) -> &mut LinearMemory {
        &mut self.memory
    }

    /// Shadow stack context
    pub fn stack(&self) -> &ShadowStack {
        &self.stack
    }

    /// Stack context together with the memory it lives in
    pub fn stack_and_memory(&mut self) -> (&mut ShadowStack, &mut LinearMemory) {
        (&mut self.stack, &mut self.memory)
    }

    /// Heap allocator state
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Host embedding
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Indirect-call table
    pub fn table_mut(&mut self) -> &mut FunctionTable {
        &mut self.table
    }

    // Shadow stack

    /// Push a frame with `root_count` roots, returning root slot 0
    pub fn acquire_frame(&mut self, root_count: u32) -> RuntimeResult<Address> {
        Ok(self.stack.acquire_frame(&mut self.memory, root_count)?)
    }

    /// Save the stack top, to be restored when the caller returns
    pub fn mark_stack(&self) -> StackMark {
        self.stack.mark()
    }

    /// Release every frame acquired since `mark`
    pub fn release_frames(&mut self, mark: StackMark) -> RuntimeResult<()> {
        Ok(self.stack.restore(mark)?)
    }

    /// Walk the shadow stack and collect its roots
    ///
    /// Must only run while generated code is stopped.
    pub fn collect_roots(&self) -> RootSet {
        collect_roots(&self.stack, &self.memory)
    }

    // Heap

    /// Allocate `size` zeroed bytes on the heap
    ///
    /// Exhaustion is reported to the host before the error is returned.
    pub fn alloc(&mut self, size: u32) -> RuntimeResult<Address> {
        match self.heap.allocate(size) {
            Ok(ptr) => {
                self.memory.fill(ptr, 0, size)?;
                Ok(ptr)
            }
            Err(err) => {
                tracing::warn!(
                    target: "wasmrt::runtime",
                    requested = size,
                    available = self.heap.available(),
                    "heap exhausted"
                );
                self.host.print_out_of_memory();
                Err(err)
            }
        }
    }

    /// Allocate a string object holding `text`
    pub fn alloc_string(&mut self, text: &str) -> RuntimeResult<Address> {
        let len = text.encode_utf16().count() as u32;
        let layout = self.config.string_layout;
        let object = self.alloc(layout.object_size(len))?;
        write_string(&mut self.memory, object, &layout, text);
        Ok(object)
    }

    /// View the string object at `object`
    pub fn string(&self, object: Address) -> StringView<'_> {
        StringView::new(&self.memory, object, &self.config.string_layout)
    }

    // Memory

    /// Set `count` bytes at `address` to `value`
    pub fn fill(&mut self, address: Address, value: u8, count: u32) -> RuntimeResult<()> {
        Ok(self.memory.fill(address, value, count)?)
    }

    /// Zero `count` bytes at `address`
    pub fn fill_zero(&mut self, address: Address, count: u32) -> RuntimeResult<()> {
        self.fill(address, 0, count)
    }

    // Resource maps

    /// Read-only view of the resource map at `map`
    pub fn resource_map(&self, map: Address) -> ResourceMap<'_> {
        ResourceMap::new(&self.memory, map, self.config.string_layout)
    }

    /// Allocate space for `writer`'s map and write it out
    pub fn install_resource_map(&mut self, writer: &ResourceMapWriter) -> RuntimeResult<Address> {
        let map = self.alloc(writer.byte_size())?;
        writer.write(&mut self.memory, map)?;
        Ok(map)
    }

    /// Build and install a content-hashed map from string keys
    pub fn install_string_map(
        &mut self,
        capacity: i32,
        entries: &[(&str, Address)],
    ) -> RuntimeResult<Address> {
        let mut writer = ResourceMapWriter::new(capacity)?;
        for &(key, value) in entries {
            let object = self.alloc_string(key)?;
            writer.insert_content(&self.memory, &self.config.string_layout, object, value)?;
        }
        self.install_resource_map(&writer)
    }

    /// Entry for the string object `key` in a content-hashed map
    pub fn lookup_resource(&self, map: Address, key: Address) -> Option<Address> {
        self.resource_map(map).lookup_by_content(&self.string(key))
    }

    /// Entry for the address `key` in an identity-hashed map
    pub fn lookup_resource_by_identity(&self, map: Address, key: Address) -> Option<Address> {
        self.resource_map(map).lookup_by_identity(key)
    }

    /// Every key of the map at `map`
    pub fn resource_map_keys(&self, map: Address) -> Vec<Address> {
        self.resource_map(map).keys()
    }

    // Host

    /// Emit a raw diagnostic word
    pub fn print(&mut self, value: i32) {
        self.host.print(value);
    }

    /// Emit a decimal integer
    pub fn print_int(&mut self, value: i32) {
        self.host.print_int(value);
    }

    /// Emit the string object at `object`
    pub fn print_string(&mut self, object: Address) {
        let text = self.string(object).to_string_lossy();
        self.host.print_string(&text);
    }

    /// Report heap exhaustion to the host
    pub fn print_out_of_memory(&mut self) {
        self.host.print_out_of_memory();
    }

    /// Call table entry `index` with `instance` as its receiver
    pub fn call_function_from_table(&mut self, index: i32, instance: Address) -> RuntimeResult<()> {
        self.table.call(&mut self.memory, index, instance).inspect_err(|_| {
            tracing::warn!(
                target: "wasmrt::runtime",
                index,
                "indirect call through empty table slot"
            );
        })
    }
}

impl<H: Host> std::fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("stack", &self.stack)
            .field("heap", &self.heap)
            .finish()
    }
}
