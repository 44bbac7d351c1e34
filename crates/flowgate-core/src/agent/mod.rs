//! Agent capability
//!
//! An agent is a pluggable unit of execution bound to workflow steps. The
//! engine resolves it by id, hands it an [`AgentContext`] and records the
//! returned [`AgentResult`].

mod context;
mod definition;

pub use context::AgentContext;
pub use definition::{AgentError, AgentIdentity, AgentResult, ImpactRecord, RiskTier};

use async_trait::async_trait;

/// A concrete agent implementation
///
/// # Example
///
/// ```ignore
/// struct Echo { identity: AgentIdentity }
///
/// #[async_trait]
/// impl Agent for Echo {
///     fn identity(&self) -> &AgentIdentity {
///         &self.identity
///     }
///
///     async fn execute(&self, ctx: &mut AgentContext<'_>) -> Result<AgentResult, AgentError> {
///         Ok(AgentResult::success(ctx.inputs.clone()))
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Identity used for registration and listing
    fn identity(&self) -> &AgentIdentity;

    /// Run the agent for one step
    ///
    /// Returning `Ok` with `succeeded == false` fails only the step. Returning
    /// `Err` is a fault that fails the whole workflow instance.
    async fn execute(&self, ctx: &mut AgentContext<'_>) -> Result<AgentResult, AgentError>;
}
