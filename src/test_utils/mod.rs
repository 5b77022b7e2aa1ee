#[cfg(test)]
pub mod repo_extensions;

#[cfg(test)]
pub use repo_extensions::{
    create_test_bare_repo, create_test_repo, RepoAssertions, RepoTestOperations,
};
