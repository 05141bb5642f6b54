mod categories;
mod ids;
pub(crate) mod lenient;
mod results;
mod rules;
mod window;

pub use categories::{CategoryRegistry, INVESTMENT, UNCATEGORIZED};
pub use ids::CategoryId;
pub use results::{CategorySeries, InvestmentProjection, SimulationResult, Transaction};
pub use rules::{
    CompiledRule, Direction, Effective, Escalation, EscalationUnit, Frequency, RawRule, RuleStatus,
};
pub use window::SimulationWindow;
