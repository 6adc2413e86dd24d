pub mod assembler;
pub mod settings;
pub mod types;

pub use assembler::{build_chart, ChartAssembler};
pub use settings::ChartOptions;
pub use types::{BodyPosition, ChartRuler, Field, NatalChart};
