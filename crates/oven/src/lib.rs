//! Oven - A skeleton generator front end for WebIDL extension APIs.
//!
//! Parsing, semantic resolution, and emission context construction for the
//! WebIDL subset used to describe platform extension APIs. The resulting
//! [`EmissionContext`] is what the script stub and native skeleton templates
//! are rendered from.

pub mod artifact;
pub mod config;
pub mod resolve;

mod context;
mod error;

pub use oven_core::{ast, identifier, span, types};

pub use context::{
    ArgumentContext, AttributeContext, CallbackContext, ConstructorContext, DeclarationContext,
    EmissionContext, ExtendedAttributeContext, InterfaceContext, MemberContext, ModuleMeta,
    OperationContext, TypeContext, ValidationContext, title_case,
};
pub use error::OvenError;

use chrono::Datelike;
use log::{debug, info, trace};

use artifact::OutputKind;
use ast::Ast;
use config::AppConfig;
use resolve::{Resolution, ResolveError, Resolver};

/// Builder for turning WebIDL source into an emission context.
///
/// # Examples
///
/// ```rust,no_run
/// use oven::{SkeletonBuilder, artifact::OutputKind, config::AppConfig};
///
/// let source = "module badge { interface Badge { long getCount(); }; };";
///
/// let builder = SkeletonBuilder::new(AppConfig::default());
///
/// // Parse, then resolve against the module name
/// let ast = builder.parse(source).expect("Failed to parse");
/// let resolution = builder.prepare(&ast, "badge").expect("Failed to resolve");
/// assert!(!resolution.is_async());
///
/// // Or run the whole pipeline
/// let context = builder
///     .build_context(source, "badge", OutputKind::Both)
///     .expect("Failed to build context");
/// assert_eq!(context.module.upper, "BADGE");
/// ```
#[derive(Default)]
pub struct SkeletonBuilder {
    config: AppConfig,
    year: Option<i32>,
}

impl SkeletonBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config, year: None }
    }

    /// Pin the copyright year instead of reading the local clock.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Parse source code into a declaration tree.
    ///
    /// Lexical warnings are logged and do not fail the parse.
    ///
    /// # Errors
    ///
    /// Returns `OvenError::Parse` for fatal lexical errors and syntax errors.
    pub fn parse(&self, source: &str) -> Result<Ast, OvenError> {
        info!("Parsing source");

        let parsed = oven_parser::parse(source)
            .map_err(|err| OvenError::new_parse_error(err, source))?;

        debug!(
            nodes = parsed.ast.len(),
            warnings = parsed.warnings.len();
            "Source parsed successfully"
        );
        trace!(ast:? = parsed.ast; "Parsed tree");

        Ok(parsed.ast)
    }

    /// Resolve `ast` for `module`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when a type cannot be classified.
    pub fn prepare(&self, ast: &Ast, module: &str) -> Result<Resolution, ResolveError> {
        info!(module = module; "Resolving declarations");

        let resolution = Resolver::new(ast, self.config.resolve(), module).prepare()?;

        info!(
            commands = resolution.command_table().len(),
            exported = resolution.exported_interfaces().len(),
            is_async = resolution.is_async();
            "Declarations resolved"
        );
        Ok(resolution)
    }

    /// Run the full pipeline over `source` and snapshot the result.
    ///
    /// # Errors
    ///
    /// Returns the first parse or resolve error.
    pub fn build_context(
        &self,
        source: &str,
        module: &str,
        output: OutputKind,
    ) -> Result<EmissionContext, OvenError> {
        let ast = self.parse(source)?;
        let resolution = self
            .prepare(&ast, module)
            .map_err(|err| OvenError::new_resolve_error(err, source))?;
        Ok(EmissionContext::build(&ast, &resolution, output, self.year()))
    }

    fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }
}
