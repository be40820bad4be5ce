//! Agent Loop: the LangGraph-style state machine
//! that plans, executes, and replans natural-language UI test cases.

pub mod graph;

pub use graph::{
    agent_worker_node, AgentCase, AgentLoop, AgentState, CaseResult, CaseStatus, CaseStep,
    LoopOutcome, ReflectionDecision, ReflectionOutcome,
};
