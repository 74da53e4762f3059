use std::fmt;
use std::str::FromStr;

/// The four reductions supported over a discovered numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Sum,
    Average,
    Min,
    Max,
}

impl FromStr for AggregateOp {
    type Err = InvalidOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(AggregateOp::Sum),
            "average" => Ok(AggregateOp::Average),
            "min" => Ok(AggregateOp::Min),
            "max" => Ok(AggregateOp::Max),
            other => Err(InvalidOperation(other.to_string())),
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateOp::Sum => "sum",
            AggregateOp::Average => "average",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid operation: {0}")]
pub struct InvalidOperation(pub String);

/// Reduce the fetched values with the requested operation.
///
/// An empty input reduces to 0 for every operation. Results are rounded to
/// two decimal places.
pub fn reduce(op: AggregateOp, values: &[f64]) -> f64 {
    let result = match op {
        AggregateOp::Sum => values.iter().sum(),
        AggregateOp::Average => {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
        AggregateOp::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateOp::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };

    // Min/max of an empty list fold to +/- infinity
    let result = if values.is_empty() { 0.0 } else { result };

    (result * 100.0).round() / 100.0
}
