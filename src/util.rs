/* standard use */
use std::fmt;

/* external crate */
use strum_macros::{EnumString, EnumVariantNames};

/// Chart kinds the batch renderer and the dashboard know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumVariantNames)]
#[strum(serialize_all = "kebab-case")]
pub enum ChartType {
    RuntimeVsNodes,
    RuntimeVsDensity,
    MemoryVsRuntime,
    MaxflowFlowVsRuntime,
}

impl ChartType {
    pub fn all() -> [ChartType; 4] {
        [
            ChartType::RuntimeVsNodes,
            ChartType::RuntimeVsDensity,
            ChartType::MemoryVsRuntime,
            ChartType::MaxflowFlowVsRuntime,
        ]
    }

    /// File stem used for the static image output.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartType::RuntimeVsNodes => "runtime_vs_nodes",
            ChartType::RuntimeVsDensity => "runtime_vs_density",
            ChartType::MemoryVsRuntime => "memory_vs_runtime",
            ChartType::MaxflowFlowVsRuntime => "maxflow_flow_vs_runtime",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                ChartType::RuntimeVsNodes => "runtime-vs-nodes",
                ChartType::RuntimeVsDensity => "runtime-vs-density",
                ChartType::MemoryVsRuntime => "memory-vs-runtime",
                ChartType::MaxflowFlowVsRuntime => "maxflow-flow-vs-runtime",
            }
        )
    }
}

/// Independent variable for runtime aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumVariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum GroupKey {
    Nodes,
    Density,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                GroupKey::Nodes => "nodes",
                GroupKey::Density => "density",
            }
        )
    }
}
