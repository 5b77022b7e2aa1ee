use git2::{CertificateCheckStatus, Cred, CredentialType, Error, RemoteCallbacks};
use tracing::debug;

use crate::git::types::SshPrivateKey;

const DEFAULT_SSH_USER: &str = "git";

/// Callbacks for one network call.
///
/// Credentials come only from the injected key; agents and `~/.ssh` are
/// never consulted. Host keys are accepted without verification, the deploy
/// key being the trust anchor.
pub(crate) fn session_callbacks(key: Option<&SshPrivateKey>) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username, allowed| {
        if !allowed.contains(CredentialType::SSH_KEY) {
            return Err(Error::from_str(&format!(
                "remote {url} asked for unsupported credentials {allowed:?}"
            )));
        }
        let key = key.ok_or_else(|| Error::from_str("no SSH private key configured"))?;
        let user = username.unwrap_or(DEFAULT_SSH_USER);
        debug!(%url, user, "supplying in-memory ssh key");
        Cred::ssh_key_from_memory(user, None, key.expose(), None)
    });

    callbacks.certificate_check(|_cert, host| {
        debug!(host, "skipping host key verification");
        Ok(CertificateCheckStatus::CertificateOk)
    });

    callbacks
}
