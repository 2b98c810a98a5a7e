use std::sync::Arc;

use viz_core::config::CollaboratorConfig;
use viz_core::config::CollaboratorMode;
use viz_core::RawVisualization;

use crate::contracts::DatasetInfo;
use crate::contracts::HealthReport;
use crate::contracts::InterpretRequest;
use crate::error::InterpretError;
use crate::http::HttpInterpreter;
use crate::simulated::SimulatedInterpreter;

/// The natural-language collaborator that turns a query into a visualization.
pub trait Interpreter: Send + Sync {
    fn name(&self) -> &'static str;

    fn interpret(&self, request: &InterpretRequest) -> Result<RawVisualization, InterpretError>;

    fn health(&self) -> Result<HealthReport, InterpretError>;

    fn dataset_info(&self) -> Result<DatasetInfo, InterpretError>;
}

pub fn build_interpreter(
    config: &CollaboratorConfig,
) -> Result<Arc<dyn Interpreter>, InterpretError> {
    match config.mode {
        CollaboratorMode::Http => Ok(Arc::new(HttpInterpreter::from_config(config)?)),
        CollaboratorMode::Simulated => Ok(Arc::new(SimulatedInterpreter::new())),
    }
}
