use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::class_index::{ClassIndex, ClassLabel};

/// How per-class statistics are collapsed into one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Averaging {
    /// Statistic of the positive class only.
    Binary,
    /// Pool TP/FP/FN counts across classes, then compute the rate.
    Micro,
    /// Unweighted mean of per-class rates. Only used when a generator asks for it.
    Macro,
}

impl Averaging {
    pub fn as_str(self) -> &'static str {
        match self {
            Averaging::Binary => "binary",
            Averaging::Micro => "micro",
            Averaging::Macro => "macro",
        }
    }
}

impl fmt::Display for Averaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Averaging {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "binary" => Ok(Averaging::Binary),
            "micro" => Ok(Averaging::Micro),
            "macro" => Ok(Averaging::Macro),
            other => Err(format!(
                "Unknown averaging \"{other}\" (expected binary, micro or macro)"
            )),
        }
    }
}

/// Binary for two or fewer classes, micro-averaging otherwise.
pub fn select_strategy<L: ClassLabel>(class_index: &ClassIndex<L>) -> Averaging {
    if class_index.len() <= 2 {
        Averaging::Binary
    } else {
        Averaging::Micro
    }
}
