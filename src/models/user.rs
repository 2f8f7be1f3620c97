//! Admin credentials stored in `user.json`.

use serde::{Deserialize, Serialize};

/// A plaintext username/password pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Layout of `user.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFile {
    #[serde(default)]
    pub users: Vec<Credential>,
}
