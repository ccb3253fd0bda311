/// Prefix that turns a message into a summary lookup. Case-sensitive and
/// must include the trailing space.
pub const WIKI_PREFIX: &str = "/wiki ";

/// Topic of a `/wiki <topic>` message: everything after the first space,
/// verbatim. `None` when the body is not a lookup command.
pub fn wiki_topic(body: &str) -> Option<&str> {
    body.strip_prefix(WIKI_PREFIX)
}
