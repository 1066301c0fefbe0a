/// User profile document
use serde::{Deserialize, Serialize};

/// Document shape in the `users` collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,

    /// Usernames following this user
    #[serde(default)]
    pub followers: Vec<String>,

    /// Notification wall, newest last
    #[serde(default)]
    pub messages: Vec<String>,
}
