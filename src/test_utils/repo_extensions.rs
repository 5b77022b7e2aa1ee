use crate::git::{Commit, GitRepo};
use anyhow::{bail, Context, Error};

/// Create a new temporary repository for testing with user config set up
#[cfg(test)]
pub fn create_test_repo() -> (assert_fs::TempDir, GitRepo) {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let path = temp_dir.path();
    let mut repo = GitRepo::open(path).unwrap();
    repo.set_user_config("Test User", "test@example.com")
        .unwrap();
    (temp_dir, repo)
}

/// Create a new temporary bare repository for testing, usable as a remote
#[cfg(test)]
pub fn create_test_bare_repo() -> (assert_fs::TempDir, GitRepo) {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let path = temp_dir.path();
    let mut repo = GitRepo::init_bare(path).unwrap();
    repo.set_user_config("Test User", "test@example.com")
        .unwrap();
    (temp_dir, repo)
}

/// Test-only trait that adds assertion methods to GitRepo
#[cfg(test)]
pub trait RepoAssertions {
    /// Assert that HEAD's symbolic target matches the expected value
    fn assert_head_symbolic_target(&self, expected_target: &str) -> &Self;

    /// Assert that the current branch matches the expected branch name
    fn assert_current_branch(&self, branch_name: &str) -> &Self;

    /// Assert that a file exists in the working tree
    fn assert_file_exists(&self, filename: &str) -> &Self;

    /// Assert that a file does not exist in the working tree
    fn assert_file_not_exists(&self, filename: &str) -> &Self;

    /// Assert the exact content of a file in the working tree
    fn assert_file_content(&self, filename: &str, expected: &str) -> &Self;

    /// Assert that commit summaries match the expected order (newest first)
    fn assert_commit_messages(&self, expected_messages: &[&str]) -> &Self;
}

/// Test-only trait that adds test helper operations to GitRepo
#[cfg(test)]
pub trait RepoTestOperations {
    /// Write a file with content, creating parent directories (fluent)
    fn add_file(&self, filename: &str, content: &str) -> Result<&Self, Error>;

    /// Delete a file from the working tree (fluent)
    fn remove_file(&self, filename: &str) -> Result<&Self, Error>;

    /// Write a file and commit every change in one operation (fluent)
    fn add_file_and_commit(
        &mut self,
        filename: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<&mut Self, Error>;

    /// Add a remote pointing to another local GitRepo
    fn add_local_remote(&mut self, name: &str, other_repo: &GitRepo) -> Result<(), Error>;

    /// Create a branch at HEAD and switch to it (fluent)
    fn create_and_checkout_branch(&mut self, branch_name: &str) -> Result<&mut Self, Error>;

    /// Switch to an existing branch, overwriting the working tree (fluent)
    fn checkout_branch(&mut self, branch_name: &str) -> Result<&mut Self, Error>;

    /// Create a two-parent merge commit of `branch_name` into HEAD
    fn merge_branch_into_head(&mut self, branch_name: &str) -> Result<Commit, Error>;
}

#[cfg(test)]
impl RepoAssertions for GitRepo {
    fn assert_head_symbolic_target(&self, expected_target: &str) -> &Self {
        let head = match self.repo().find_reference("HEAD") {
            Ok(head) => head,
            Err(e) => panic!("Failed to read HEAD: {e}"),
        };
        match head.symbolic_target() {
            Some(actual_target) => {
                if actual_target != expected_target {
                    panic!(
                        "HEAD symbolic target mismatch. Expected: '{expected_target}', Found: '{actual_target}'"
                    );
                }
            }
            None => panic!("HEAD is detached, expected '{expected_target}'"),
        }
        self
    }

    fn assert_current_branch(&self, branch_name: &str) -> &Self {
        let expected_target = format!("refs/heads/{branch_name}");
        self.assert_head_symbolic_target(&expected_target);
        self
    }

    fn assert_file_exists(&self, filename: &str) -> &Self {
        let file_path = self.path().join(filename);
        if !file_path.exists() {
            panic!("Expected file '{filename}' to exist at path: {file_path:?}");
        }
        self
    }

    fn assert_file_not_exists(&self, filename: &str) -> &Self {
        let file_path = self.path().join(filename);
        if file_path.exists() {
            panic!("Expected file '{filename}' to not exist at path: {file_path:?}");
        }
        self
    }

    fn assert_file_content(&self, filename: &str, expected: &str) -> &Self {
        let file_path = self.path().join(filename);
        match std::fs::read_to_string(&file_path) {
            Ok(actual) => {
                if actual != expected {
                    panic!(
                        "Content mismatch in '{filename}'. Expected: {expected:?}, Found: {actual:?}"
                    );
                }
            }
            Err(e) => panic!("Failed to read '{filename}': {e}"),
        }
        self
    }

    fn assert_commit_messages(&self, expected_messages: &[&str]) -> &Self {
        let commits = self.list_commits().unwrap_or_else(|_| Vec::new());

        if commits.len() != expected_messages.len() {
            panic!(
                "Expected {} commits, but found {}. Commits: {:?}",
                expected_messages.len(),
                commits.len(),
                commits.iter().map(|c| c.summary()).collect::<Vec<_>>()
            );
        }

        for (i, (commit, expected)) in commits.iter().zip(expected_messages.iter()).enumerate() {
            if commit.summary() != *expected {
                panic!(
                    "Commit {} message mismatch. Expected: '{}', Found: '{}'",
                    i,
                    expected,
                    commit.summary()
                );
            }
        }

        self
    }
}

#[cfg(test)]
impl RepoTestOperations for GitRepo {
    fn add_file(&self, filename: &str, content: &str) -> Result<&Self, Error> {
        let file_path = self.path().join(filename);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(file_path, content)?;
        Ok(self)
    }

    fn remove_file(&self, filename: &str) -> Result<&Self, Error> {
        let file_path = self.path().join(filename);
        std::fs::remove_file(&file_path)
            .context(format!("Failed to remove file '{filename}'"))?;
        Ok(self)
    }

    fn add_file_and_commit(
        &mut self,
        filename: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<&mut Self, Error> {
        self.add_file(filename, content)?;
        self.commit_all(commit_message, None, None, false)?;
        Ok(self)
    }

    fn add_local_remote(&mut self, name: &str, other_repo: &GitRepo) -> Result<(), Error> {
        let remote_path = other_repo
            .path()
            .to_str()
            .context("Failed to convert remote repository path to string")?;

        self.add_remote(name, remote_path)?;
        Ok(())
    }

    fn create_and_checkout_branch(&mut self, branch_name: &str) -> Result<&mut Self, Error> {
        {
            let head = self.repo().head()?.peel_to_commit()?;
            let branch = self.repo().branch(branch_name, &head, false)?;
            let refname = branch
                .get()
                .name()
                .context("Branch reference name is not valid UTF-8")?
                .to_string();
            self.repo().set_head(&refname)?;
        }
        Ok(self)
    }

    fn checkout_branch(&mut self, branch_name: &str) -> Result<&mut Self, Error> {
        let refname = format!("refs/heads/{branch_name}");
        {
            let target = self.repo().find_reference(&refname)?.peel_to_commit()?;

            let mut checkout = git2::build::CheckoutBuilder::new();
            checkout.force();
            self.repo()
                .checkout_tree(target.as_object(), Some(&mut checkout))?;
        }
        self.repo().set_head(&refname)?;
        Ok(self)
    }

    fn merge_branch_into_head(&mut self, branch_name: &str) -> Result<Commit, Error> {
        let ours = self.repo().head()?.peel_to_commit()?;
        let theirs = self
            .repo()
            .find_reference(&format!("refs/heads/{branch_name}"))?
            .peel_to_commit()?;

        let mut index = self.repo().merge_commits(&ours, &theirs, None)?;
        if index.has_conflicts() {
            bail!("Merging '{branch_name}' into HEAD conflicts");
        }
        let tree_id = index.write_tree_to(self.repo())?;
        let tree = self.repo().find_tree(tree_id)?;

        let signature = self.repo().signature()?;
        let merge_id = self.repo().commit(
            Some("HEAD"),
            &signature,
            &signature,
            &format!("Merge branch '{branch_name}'"),
            &tree,
            &[&ours, &theirs],
        )?;

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo().checkout_head(Some(&mut checkout))?;

        Ok(Commit::from_git2(&self.repo().find_commit(merge_id)?))
    }
}
