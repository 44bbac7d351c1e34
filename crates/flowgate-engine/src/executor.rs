//! Workflow execution
//!
//! The `WorkflowEngine` runs one workflow instance per `execute` call:
//! - Evaluates each step's condition against shared state
//! - Asks the policy engine before every step that runs and audits the decision
//! - Invokes the resolved agent with a context aliasing the instance's state
//! - Recovers a step's own timeout as a failed step; every other fault ends the run

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use flowgate_core::{
    AgentContext, AgentError, AgentResult, AuditEntry, AuditLog, AuditOutcome, PolicyAction,
    PolicyEngine, PolicyEvaluationContext, StateMap, StateMapExt, StepDefinition, StepExecution,
    StepStatus, WorkflowDefinition, WorkflowInstance, WorkflowStatus,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::EngineError;
use crate::registry::AgentRegistry;

/// How an agent invocation ended, short of a fault
enum Invocation {
    Finished(AgentResult, Duration),
    TimedOut(Duration),
}

/// Executes workflow definitions
///
/// Holds no per-instance state, so one engine can run many instances
/// concurrently.
///
/// # Example
///
/// ```ignore
/// let engine = WorkflowEngine::new(agents, policy_engine, audit_log);
/// let cancel = CancellationToken::new();
/// let instance = engine.execute(&definition, None, &cancel).await;
/// assert!(instance.status.is_terminal());
/// ```
#[derive(Clone)]
pub struct WorkflowEngine {
    agents: Arc<AgentRegistry>,
    policy_engine: Arc<dyn PolicyEngine>,
    audit_log: Arc<dyn AuditLog>,
}

impl WorkflowEngine {
    pub fn new(
        agents: Arc<AgentRegistry>,
        policy_engine: Arc<dyn PolicyEngine>,
        audit_log: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            agents,
            policy_engine,
            audit_log,
        }
    }

    /// Run `definition` to completion and return the finished instance
    ///
    /// Never fails: faults are reflected in the instance's status and
    /// failure reason.
    #[instrument(skip(self, definition, inputs, cancel), fields(workflow_id = %definition.id))]
    pub async fn execute(
        &self,
        definition: &WorkflowDefinition,
        inputs: Option<StateMap>,
        cancel: &CancellationToken,
    ) -> WorkflowInstance {
        let mut instance = WorkflowInstance::new(&definition.id, inputs.unwrap_or_default());
        instance.status = WorkflowStatus::Running;

        info!(instance_id = %instance.instance_id, "Starting workflow");

        match self.run_steps(definition, &mut instance, cancel).await {
            Ok(()) => {
                if instance.status == WorkflowStatus::Running {
                    instance.status = WorkflowStatus::Completed;
                }
            }
            Err(EngineError::Cancelled) => {
                instance.status = WorkflowStatus::Cancelled;
            }
            Err(e) => {
                error!(
                    instance_id = %instance.instance_id,
                    error = %e,
                    "Workflow failed unexpectedly"
                );
                instance.fail(e.to_string());
            }
        }

        instance.completed_at = Some(Utc::now());
        info!(
            instance_id = %instance.instance_id,
            status = %instance.status,
            "Workflow finished"
        );
        instance
    }

    async fn run_steps(
        &self,
        definition: &WorkflowDefinition,
        instance: &mut WorkflowInstance,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        for step in &definition.steps {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            if !condition_holds(step, &instance.state) {
                debug!(step_id = %step.id, "Condition false, skipping step");
                instance.step_executions.push(StepExecution::skipped(step));
                continue;
            }

            let execution = self.execute_step(definition, step, instance, cancel).await?;
            let failed = execution.status == StepStatus::Failed;
            let error_message = execution.error_message.clone();
            let outputs = execution.outputs.clone();
            instance.step_executions.push(execution);

            if failed {
                if let Some(target) = &step.on_failure_step_id {
                    warn!(
                        step_id = %step.id,
                        on_failure = %target,
                        "Step failed, routing to on-failure step"
                    );
                    continue;
                }
                instance.fail(error_message.unwrap_or_else(|| generic_failure(step)));
                break;
            }

            instance.state.merge_from(&outputs);
        }
        Ok(())
    }

    #[instrument(
        skip(self, definition, step, instance, cancel),
        fields(instance_id = %instance.instance_id, step_id = %step.id, agent_id = %step.agent_id)
    )]
    async fn execute_step(
        &self,
        definition: &WorkflowDefinition,
        step: &StepDefinition,
        instance: &mut WorkflowInstance,
        cancel: &CancellationToken,
    ) -> Result<StepExecution, EngineError> {
        let mut execution = StepExecution::start(step);
        info!("Executing step");

        let policy_context = PolicyEvaluationContext {
            agent_id: step.agent_id.clone(),
            workflow_instance_id: instance.instance_id.clone(),
            step_id: step.id.clone(),
            action: step.name.clone(),
            department: definition.department.clone(),
            parameters: instance.state.clone(),
        };
        let decision = self.policy_engine.evaluate(&policy_context).await?;

        self.audit_log
            .record(
                AuditEntry::new(
                    &instance.instance_id,
                    &step.id,
                    &step.agent_id,
                    &step.name,
                    outcome_for(decision.action),
                )
                .with_department(&definition.department)
                .with_policy(&decision.policy_id)
                .with_justification(&decision.reason),
            )
            .await?;

        if decision.action == PolicyAction::Deny {
            info!(policy_id = %decision.policy_id, "Step denied by policy");
            execution.fail(
                EngineError::PolicyDenied {
                    policy_id: decision.policy_id,
                    reason: decision.reason,
                }
                .to_string(),
            );
            execution.finish();
            return Ok(execution);
        }

        if decision.action == PolicyAction::RequireApproval || step.requires_approval {
            info!(policy_id = %decision.policy_id, "Step requires human approval");
            execution.status = StepStatus::AwaitingApproval;
            execution.finish();
            return Ok(execution);
        }

        let agent = self
            .agents
            .resolve(&step.agent_id)
            .map_err(EngineError::AgentUnregistered)?;

        let inputs = resolve_inputs(step, &instance.state);
        let instance_id = instance.instance_id.clone();
        let step_cancel = cancel.child_token();

        execution.status = StepStatus::Running;
        let invocation = {
            let mut ctx = AgentContext::new(
                instance_id.as_str(),
                step.id.as_str(),
                inputs,
                &mut instance.state,
                step_cancel.clone(),
            );
            let started = Instant::now();
            let call = agent.execute(&mut ctx);
            let deadline = async {
                match step.timeout {
                    Some(limit) => tokio::time::sleep(limit).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(EngineError::Cancelled),
                result = call => match result {
                    Ok(result) => Ok(Invocation::Finished(result, started.elapsed())),
                    Err(e) => Err(classify_fault(e, step, cancel, &step_cancel)),
                },
                _ = deadline => {
                    step_cancel.cancel();
                    Ok(Invocation::TimedOut(step.timeout.unwrap_or_default()))
                }
            }
        };

        match invocation? {
            Invocation::Finished(result, elapsed) => {
                execution.status = if result.succeeded {
                    StepStatus::Completed
                } else {
                    StepStatus::Failed
                };
                execution.error_message = match result.error {
                    Some(message) if !message.is_empty() => Some(message),
                    _ if !result.succeeded => Some(generic_failure(step)),
                    _ => None,
                };
                execution.outputs.merge_from(&result.outputs);
                execution.impact = result.impact;

                self.audit_log
                    .record(
                        AuditEntry::new(
                            &instance_id,
                            &step.id,
                            &step.agent_id,
                            format!("{}:completed", step.name),
                            if result.succeeded {
                                AuditOutcome::Allowed
                            } else {
                                AuditOutcome::Denied
                            },
                        )
                        .with_department(&definition.department)
                        .with_detail("duration_ms", elapsed.as_millis() as u64)
                        .with_detail("succeeded", result.succeeded),
                    )
                    .await?;
            }
            Invocation::TimedOut(limit) => {
                warn!(timeout = ?limit, "Step timed out");
                execution.fail(EngineError::StepTimedOut(limit).to_string());
            }
        }

        execution.finish();
        Ok(execution)
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("agents", &self.agents)
            .finish_non_exhaustive()
    }
}

/// Whether a step's condition allows it to run
fn condition_holds(step: &StepDefinition, state: &StateMap) -> bool {
    match step.condition.as_deref() {
        None | Some("") => true,
        Some(key) => state.is_truthy(key),
    }
}

/// Failure message for an agent that failed without saying why
fn generic_failure(step: &StepDefinition) -> String {
    format!("Step {} failed", step.id)
}

/// Copy mapped shared-state values into agent inputs, omitting absent sources
fn resolve_inputs(step: &StepDefinition, state: &StateMap) -> StateMap {
    step.input_mappings
        .iter()
        .filter_map(|(dest, source)| state.get(source).map(|v| (dest.clone(), v.clone())))
        .collect()
}

fn outcome_for(action: PolicyAction) -> AuditOutcome {
    match action {
        PolicyAction::Allow => AuditOutcome::Allowed,
        PolicyAction::Deny => AuditOutcome::Denied,
        PolicyAction::RequireApproval => AuditOutcome::EscalatedToHuman,
        PolicyAction::Audit | PolicyAction::Alert => AuditOutcome::AuditOnly,
    }
}

/// Map an agent-raised error onto the engine taxonomy
///
/// An agent that stops because it saw cancellation is reported as a run
/// cancellation when the caller cancelled, and as a step timeout when only
/// the step's own scope was cancelled.
fn classify_fault(
    error: AgentError,
    step: &StepDefinition,
    cancel: &CancellationToken,
    step_cancel: &CancellationToken,
) -> EngineError {
    match error {
        AgentError::Cancelled if cancel.is_cancelled() => EngineError::Cancelled,
        AgentError::Cancelled if step_cancel.is_cancelled() => {
            EngineError::StepTimedOut(step.timeout.unwrap_or_default())
        }
        source => EngineError::AgentFault {
            agent_id: step.agent_id.clone(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_holds() {
        let mut state = StateMap::new();
        state.insert("flag".into(), json!(true));
        state.insert("off".into(), json!(false));
        state.insert("blank".into(), json!(""));

        let step = |cond: Option<&str>| {
            let s = StepDefinition::new("s", "a", "S");
            match cond {
                Some(c) => s.with_condition(c),
                None => s,
            }
        };

        assert!(condition_holds(&step(None), &state));
        assert!(condition_holds(&step(Some("")), &state));
        assert!(condition_holds(&step(Some("flag")), &state));
        assert!(!condition_holds(&step(Some("off")), &state));
        assert!(!condition_holds(&step(Some("blank")), &state));
        assert!(!condition_holds(&step(Some("missing")), &state));
    }

    #[test]
    fn test_resolve_inputs_omits_absent_sources() {
        let mut state = StateMap::new();
        state.insert("Amount".into(), json!(1200));

        let step = StepDefinition::new("s", "a", "S")
            .with_input("DealValue", "Amount")
            .with_input("Customer", "CustomerName");

        let inputs = resolve_inputs(&step, &state);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs["DealValue"], json!(1200));
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(outcome_for(PolicyAction::Allow), AuditOutcome::Allowed);
        assert_eq!(outcome_for(PolicyAction::Deny), AuditOutcome::Denied);
        assert_eq!(
            outcome_for(PolicyAction::RequireApproval),
            AuditOutcome::EscalatedToHuman
        );
        assert_eq!(outcome_for(PolicyAction::Audit), AuditOutcome::AuditOnly);
        assert_eq!(outcome_for(PolicyAction::Alert), AuditOutcome::AuditOnly);
    }

    #[test]
    fn test_classify_fault() {
        let step = StepDefinition::new("s", "a", "S").with_timeout(Duration::from_secs(5));
        let cancel = CancellationToken::new();
        let step_cancel = cancel.child_token();

        let fault = classify_fault(AgentError::fault("boom"), &step, &cancel, &step_cancel);
        assert!(matches!(fault, EngineError::AgentFault { .. }));

        step_cancel.cancel();
        let timed_out = classify_fault(AgentError::Cancelled, &step, &cancel, &step_cancel);
        assert!(matches!(timed_out, EngineError::StepTimedOut(d) if d == Duration::from_secs(5)));

        cancel.cancel();
        let cancelled = classify_fault(AgentError::Cancelled, &step, &cancel, &step_cancel);
        assert!(matches!(cancelled, EngineError::Cancelled));
    }
}
