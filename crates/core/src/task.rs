use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Rule applied when the computed output path already has a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    #[default]
    Skip,
    Overwrite,
    Rename,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Rename => "rename",
        };
        f.write_str(name)
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            "rename" => Ok(Self::Rename),
            other => Err(format!(
                "unknown conflict policy: {other} (expected skip, overwrite or rename)"
            )),
        }
    }
}

/// One unit of work, built during the scan and consumed exactly once by a
/// worker. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub source_path: PathBuf,
    pub output_root: PathBuf,
    pub template: String,
    pub conflict: ConflictPolicy,
    pub input_root: PathBuf,
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { message: String },
    SkippedExisting { message: String },
    Failure { message: String },
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message }
            | Self::SkippedExisting { message }
            | Self::Failure { message } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::ConflictPolicy;
    use std::str::FromStr;

    #[test]
    fn conflict_policy_round_trips_through_str() {
        for policy in [
            ConflictPolicy::Skip,
            ConflictPolicy::Overwrite,
            ConflictPolicy::Rename,
        ] {
            let parsed = ConflictPolicy::from_str(&policy.to_string()).expect("must parse");
            assert_eq!(parsed, policy);
        }
    }

    #[test]
    fn conflict_policy_rejects_unknown_names() {
        let err = ConflictPolicy::from_str("ask").expect_err("must fail");
        assert!(err.contains("unknown conflict policy"));
    }
}
