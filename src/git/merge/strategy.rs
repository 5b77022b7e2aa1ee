use git2::{FileFavor, MergeOptions};
use serde::{Deserialize, Serialize};

/// How overlapping edits are settled while integrating remote history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Overlapping text hunks keep the local side. Conflicts that cannot be
    /// settled by picking a side, such as modify/delete, still stop.
    #[default]
    PreferLocal,
    /// Every conflict stops and is reported.
    Manual,
}

impl MergeStrategy {
    /// libgit2 favour for a rebase, where "ours" is the upstream being
    /// rebased onto and "theirs" is the local commit being replayed.
    fn file_favor(self) -> FileFavor {
        match self {
            MergeStrategy::PreferLocal => FileFavor::Theirs,
            MergeStrategy::Manual => FileFavor::Normal,
        }
    }

    pub(crate) fn merge_options(self) -> MergeOptions {
        let mut options = MergeOptions::new();
        options.find_renames(true).file_favor(self.file_favor());
        options
    }
}

#[cfg(test)]
mod tests {
    use super::MergeStrategy;

    #[test]
    fn strategies_parse_from_config_names() {
        let strategy: MergeStrategy = serde_json::from_str("\"prefer-local\"").unwrap();
        assert_eq!(strategy, MergeStrategy::PreferLocal);

        let strategy: MergeStrategy = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(strategy, MergeStrategy::Manual);

        assert_eq!(MergeStrategy::default(), MergeStrategy::PreferLocal);
    }
}
