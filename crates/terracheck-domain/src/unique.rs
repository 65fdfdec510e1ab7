use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::types::ResourceName;

const SUFFIX_LEN: usize = 6;

/// A short random alphanumeric identifier. 62^6 possible values is enough
/// to keep concurrently running scenarios in the same account from
/// colliding. Never blocks, never fails.
pub fn unique_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

/// `{prefix}-{unique_id()}` as a [`ResourceName`].
pub fn unique_name(prefix: &str) -> ResourceName {
    ResourceName::new(format!("{}-{}", prefix, unique_id()))
}
