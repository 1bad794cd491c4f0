pub(crate) mod agent_model;
pub(crate) mod run_stats;
