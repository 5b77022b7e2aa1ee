//! Git-backed synchronization engine for a local-first notes folder.
//!
//! [`git::GitRepo`] owns one on-disk repository and exposes commit, history,
//! merge, rebase and remote operations; [`git::GitRepo::sync`] runs a full
//! fetch, rebase and push round.

pub mod config;
pub mod git;
pub mod logging;

#[cfg(test)]
mod test_utils;
