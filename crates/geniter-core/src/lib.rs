//! # Geniter Core — Transformation Engine
//!
//! Compiles a Java class with a generator-style `generate` method — one that
//! produces its elements through statement-level `yield(e)` calls — into an
//! equivalent external iterator class exposing `hasNext()` / `next()`.
//!
//! Java has no native generators, so the transformation materializes the
//! generator's suspended state as object fields and its resumption points as
//! a `switch` over an integer program counter: a defunctionalized form of
//! the generator's continuation.
//!
//! ## Pipeline
//!
//! 1. **Parsing** ([`ast_bridge`]) — tree-sitter Java CST into the typed AST
//! 2. **Hoisting** ([`hoist`]) — generator locals become instance fields
//! 3. **Numbering** ([`yields`]) — each yield site gets a state id
//! 4. **Lowering** ([`lowering`]) — run-to-first-yield rewriting
//! 5. **Continuations** ([`continuations`]) — one resumption body per yield
//! 6. **Assembly** ([`assemble`]) — the output iterator class
//! 7. **Code generation** ([`codegen`]) — AST back to Java text
//!
//! ## Example
//!
//! ```rust
//! use geniter_core::GeniterPipeline;
//!
//! let source = r#"
//! class Numbers {
//!   Integer generate() {
//!     int x = 0;
//!     while (x < 3) {
//!       yield(x);
//!       x = x + 1;
//!     }
//!   }
//! }
//! "#;
//!
//! let pipeline = GeniterPipeline::new();
//! let java = pipeline.transpile(source).unwrap();
//! assert!(java.contains("public boolean hasNext()"));
//! ```

pub mod assemble;
pub mod ast;
pub mod ast_bridge;
pub mod codegen;
pub mod continuations;
pub mod error;
pub mod hoist;
pub mod lowering;
pub mod names;
pub mod yields;

use tracing::debug;

pub use ast::CompilationUnit;
pub use error::{Result, TranspileError};

/// The end-to-end transformation: parse, transform, print.
///
/// The pipeline is stateless; the fresh-name counter lives inside a single
/// transformation run, so independent runs produce identical output for
/// identical input.
#[derive(Debug, Clone, Default)]
pub struct GeniterPipeline;

impl GeniterPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Parse Java source into the typed AST without transforming it.
    pub fn parse(&self, source: &str) -> Result<CompilationUnit> {
        ast_bridge::parse_compilation_unit(source)
    }

    /// Transform the source and return the resulting compilation unit.
    pub fn transpile_to_unit(&self, source: &str) -> Result<CompilationUnit> {
        let unit = self.parse(source)?;
        debug!("parsed input unit");
        assemble::assemble(unit)
    }

    /// Transform the source and return the generated Java text.
    pub fn transpile(&self, source: &str) -> Result<String> {
        let unit = self.transpile_to_unit(source)?;
        debug!("assembled iterator class");
        Ok(codegen::emit_unit(&unit))
    }
}
