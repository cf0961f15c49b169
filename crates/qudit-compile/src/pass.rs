//! Pass trait, registry, and manager.

use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use qudit_ir::{Circuit, Instruction};

use crate::backend::Backend;
use crate::error::{CompileError, CompileResult};
use crate::passes::{AdaptivePass, QrPass, ZPropagation, ZRemoval};

/// A compilation pass over a circuit's instruction stream.
///
/// Passes may mutate the backend: decomposition commits level swaps and
/// frame phases to the targeted line's graph. A pass overrides either
/// [`CompilerPass::transpile`] (whole-stream rewrites) or
/// [`CompilerPass::transpile_gate`] (per-instruction expansion).
pub trait CompilerPass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Run the pass on the whole circuit.
    ///
    /// The default expands each instruction through
    /// [`CompilerPass::transpile_gate`] in stream order.
    fn transpile(&self, circuit: &Circuit, backend: &mut Backend) -> CompileResult<Circuit> {
        let mut out = Vec::with_capacity(circuit.len());
        for instruction in circuit {
            out.extend(self.transpile_gate(instruction, backend)?);
        }
        Ok(circuit.with_instructions(out))
    }

    /// Rewrite one instruction. The default is a passthrough.
    fn transpile_gate(
        &self,
        instruction: &Instruction,
        _backend: &mut Backend,
    ) -> CompileResult<Vec<Instruction>> {
        Ok(vec![instruction.clone()])
    }
}

/// Constructor for a registered pass.
pub type PassConstructor = fn() -> Box<dyn CompilerPass>;

/// Name-to-constructor registry of compilation passes.
pub struct PassRegistry {
    constructors: FxHashMap<String, PassConstructor>,
}

impl PassRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { constructors: FxHashMap::default() }
    }

    /// Registry pre-populated with the built-in passes.
    pub fn with_builtin_passes() -> Self {
        let mut registry = Self::new();
        registry.register("qr-decomposition", || Box::new(QrPass::new()));
        registry.register("adaptive-decomposition", || Box::new(AdaptivePass::new()));
        registry.register("z-propagation", || Box::new(ZPropagation::back()));
        registry.register("z-removal", || Box::new(ZRemoval));
        registry
    }

    /// Register a pass constructor under a name.
    pub fn register(&mut self, name: impl Into<String>, constructor: PassConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Construct the pass registered under `name`.
    pub fn build(&self, name: &str) -> CompileResult<Box<dyn CompilerPass>> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| CompileError::UnknownPass(name.to_string()))
    }

    /// Registered pass names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::with_builtin_passes()
    }
}

/// Executes an ordered sequence of compilation passes.
pub struct PassManager {
    passes: Vec<Box<dyn CompilerPass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Build a manager from registry names, in the given order.
    pub fn from_names(registry: &PassRegistry, names: &[&str]) -> CompileResult<Self> {
        let mut manager = Self::new();
        for name in names {
            manager.passes.push(registry.build(name)?);
        }
        Ok(manager)
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl CompilerPass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the circuit against the backend.
    #[instrument(skip(self, circuit, backend))]
    pub fn run(&self, circuit: &Circuit, backend: &mut Backend) -> CompileResult<Circuit> {
        info!(
            "Running pass manager with {} passes on circuit with {} lines",
            self.passes.len(),
            circuit.num_lines()
        );

        let mut current = circuit.clone();
        for pass in &self.passes {
            debug!("Running pass: {}", pass.name());
            current = pass.transpile(&current, backend)?;
            debug!("Pass {} completed, ops: {}", pass.name(), current.len());
        }

        info!("Pass manager completed, ops: {}", current.len());
        Ok(current)
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}
