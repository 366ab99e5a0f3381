//! Error pattern taxonomy
//!
//! An ordered, immutable table of classification rules. The first line of
//! an error message is matched against the rules in declaration order;
//! earlier rules win on overlap. Each rule owns a stable numeric id, a
//! matcher and a short/long canonical description. The `${...}` tokens in
//! descriptions illustrate where variables appeared in the original
//! message; they are documentation only and never substituted.
//!
//! Most rules require the whole head line to match, keeping whatever
//! anchoring the rule was written with. A few legacy rules deliberately
//! match as a substring to catch markers wrapped in framework boilerplate;
//! their semantics are preserved as-is rather than normalized.

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchMode {
    /// The matcher must cover the entire head line.
    Full,
    /// The matcher may hit anywhere inside the head line.
    Search,
}

/// One rule of the fixed classification taxonomy.
#[derive(Debug)]
pub struct LogPatternRule {
    pub id: u32,
    pub short_msg: &'static str,
    pub long_msg: &'static str,
    pattern: Regex,
    mode: MatchMode,
}

impl LogPatternRule {
    fn full(id: u32, pattern: &str, short_msg: &'static str, long_msg: &'static str) -> Self {
        Self {
            id,
            short_msg,
            long_msg,
            pattern: Regex::new(pattern).expect("builtin pattern must compile"),
            mode: MatchMode::Full,
        }
    }

    fn search(id: u32, pattern: &str, short_msg: &'static str, long_msg: &'static str) -> Self {
        Self {
            id,
            short_msg,
            long_msg,
            pattern: Regex::new(pattern).expect("builtin pattern must compile"),
            mode: MatchMode::Search,
        }
    }

    /// True when this rule classifies the given head line.
    pub fn matches(&self, head: &str) -> bool {
        match self.mode {
            MatchMode::Full => self
                .pattern
                .find(head)
                .is_some_and(|m| m.start() == 0 && m.end() == head.len()),
            MatchMode::Search => self.pattern.is_match(head),
        }
    }
}

lazy_static! {
    /// The builtin taxonomy, in priority order.
    pub static ref PATTERNS: Vec<LogPatternRule> = vec![
        LogPatternRule::full(
            1,
            r"^Project (.*) not found.$",
            "Project ${id} not found",
            "Project ${id} not found",
        ),
        LogPatternRule::full(
            2,
            r"^(.*)Cannot call sendError\(\) after the response has been committed$",
            "Response has been committed",
            "Cannot call sendError() after the response has been committed",
        ),
        LogPatternRule::full(
            3,
            r"^Could not verify if early access is enabled for project (.*)$",
            "Cannot verify early access",
            "Could not verify if early access is enabled for project ${id}",
        ),
        LogPatternRule::full(
            4,
            r"^Failed to parse registry from (.*)$",
            "Failed to parse registry",
            "Failed to parse registry from ${json}",
        ),
        LogPatternRule::full(
            5,
            r"^java.io.IOException: On requestURL:(.*)$",
            "IOException on requestURL",
            "java.io.IOException: On requestURL: ${url}",
        ),
        LogPatternRule::full(
            6,
            r"^No such project (.*)$",
            "No such project",
            "No such project ${id}",
        ),
        LogPatternRule::full(
            7,
            r"^The version file should be created for the branch (.*)$",
            "Incorrect version file",
            "The version file should be created for the branch ${name}",
        ),
        LogPatternRule::full(
            8,
            r"^Authentication has failed. Credentials may be incorrect (.*)",
            "Authentication failed",
            "Authentication has failed. Credentials may be incorrect",
        ),
        LogPatternRule::full(
            9,
            r"^(.*)Unhandled error was caught by the Filter$",
            "Unhandled error",
            "Unhandled error was caught by the Filter",
        ),
        LogPatternRule::full(
            10,
            r"^Validation failed for feature '(.*)'$",
            "Validation failed for feature",
            "Validation failed for feature ${id}",
        ),
        LogPatternRule::full(
            11,
            r"^Error occurred creating ManagedConnection for handle: (.*)$",
            "Error occurred creating ManagedConnection",
            "Error occurred creating ManagedConnection for handle: ${info}",
        ),
        LogPatternRule::full(
            12,
            r"^Service ticket \[(.*)] with service \[(.*)] does not match supplied service \[(.*)]$",
            "Service ticket mismatched",
            "Service ticket ${ticket} with service ${service} does not match supplied service ${suppliedService}",
        ),
        LogPatternRule::full(
            13,
            r"^Couldn't find StudioProject for ConnectProject with id (.*)$",
            "StudioProject for ConnectProject",
            "Couldn't find StudioProject for ConnectProject with id ${projectId}",
        ),
        LogPatternRule::full(
            14,
            r"^(.*)Invalid ref name(.*)$",
            "Invalid ref name",
            "Invalid ref name: ${ref}",
        ),
        LogPatternRule::full(
            15,
            r"^Internal error during receive-pack to (.*)$",
            "Receive-pack error",
            "Internal error during receive-pack to ${gitPath}",
        ),
        LogPatternRule::full(
            16,
            r"^Internal error during upload-pack from (.*)$",
            "Upload-pack error",
            "Internal error during upload-pack from ${gitPath}",
        ),
        LogPatternRule::full(
            17,
            r"^(.*)Exception caught while accessing pack file (.*)$",
            "Exception caught while accessing pack file ${pack}",
            "Exception caught while accessing pack file ${pack}",
        ),
        LogPatternRule::full(
            18,
            r"^Failed to clone remote repository for project: (.*)$",
            "Failed to clone repository",
            "Failed to clone remote repository for project: ${id}",
        ),
        LogPatternRule::full(
            19,
            r"^Service @login not found for object: (.*) of type pkg$",
            "Service @login not found",
            "Service @login not found for object: ${pkgPath} of type pkg",
        ),
        LogPatternRule::full(
            20,
            r"^Failed to resetOnHead: (.*)$",
            "ResetOnHead failed",
            "Failed to resetOnHead: ${gitPath}",
        ),
        // Sometimes the message carries the project id, sometimes not.
        LogPatternRule::full(
            21,
            r"^Failed to initialize project(.*)$",
            "Failed to initialize project",
            "Failed to initialize project",
        ),
        LogPatternRule::full(
            22,
            r"^Unable to get registries for (.*)$",
            "Unable to get registries",
            "Unable to get registries for package/platform ${id}",
        ),
        LogPatternRule::full(
            23,
            r"Cannot forward to error page for request (.*) as the response has already been committed.(.*)",
            "Cannot forward to error page for request",
            "Cannot forward to error page for request ${path} as the response has already been committed.",
        ),
        LogPatternRule::full(
            24,
            r"^Error executing FreeMarker template$",
            "Error executing FreeMarker template",
            "Error executing FreeMarker template",
        ),
        LogPatternRule::full(
            25,
            r"^Bad status when performing REST request to Jira: 400$",
            "REST request to Jira: 400",
            "Bad status when performing REST request to Jira: 400",
        ),
        LogPatternRule::full(
            26,
            r"^Error while fetching status$",
            "Error while fetching status",
            "Error while fetching status",
        ),
        LogPatternRule::full(
            27,
            r"^(.*): Could not pull WIP branch (.) because it has WIP commit$",
            "Could not pull WIP branch",
            "Could not pull WIP branch ${ref} because it has WIP commit",
        ),
        LogPatternRule::full(
            28,
            r"^(.*): (.*): Stream closed\.$",
            "${gitPath}: Stream closed.",
            "${gitPath}: Stream closed.",
        ),
        LogPatternRule::full(
            29,
            r"^Uncaught error on thread (.*)$",
            "Uncaught error on thread ${thread}",
            "Uncaught error on thread ${thread}",
        ),
        LogPatternRule::full(
            30,
            r"^No studio current snapshot The branch (.*) was not found for the current project$",
            "The branch ${branch} was not found for the current project",
            "The branch ${branch} was not found for the current project",
        ),
        LogPatternRule::full(
            31,
            r"^Unlocking LockFile '(.*/gc\.log\.lock)' failed$",
            "Unlocking LockFile ${path/to/gc.log.lock} failed",
            "Unlocking LockFile ${path/to/gc.log.lock} failed",
        ),
        LogPatternRule::full(
            32,
            r"^Killed handle: org.tranql.connector.jdbc.ConnectionHandle@(.*)ManagedConnectionInfo(.*)$",
            "Killed handle: org.tranql.connector.jdbc.ConnectionHandle...",
            "Killed handle: org.tranql.connector.jdbc.ConnectionHandle...",
        ),
        LogPatternRule::full(
            33,
            r"^Unexpected exception committing org\.apache\.geronimo\.connector\.outbound\.LocalXAResource@(.*); continuing to commit other RMs$",
            "Unexpected exception committing org.apache.geronimo.connector.outbound.LocalXAResource",
            "Unexpected exception committing org.apache.geronimo.connector.outbound.LocalXAResource; continuing to commit other RMs",
        ),
        LogPatternRule::full(
            34,
            r"^Failed to create repository for request=GitRepositoryCreate(.*)$",
            "Failed to create repository",
            "Failed to create repository for request=GitRepositoryCreate{...}",
        ),
        LogPatternRule::full(
            35,
            r"^Failed to delete repository (.*)$",
            "Failed to delete repository",
            "Failed to delete repository ${projectId}",
        ),
        LogPatternRule::full(
            36,
            r"^Unable to replace the owner id by its name \[(.*)]$",
            "Unable to replace the owner id by its name",
            "Unable to replace the owner id by its name ${detail}",
        ),
        LogPatternRule::full(
            37,
            r"^studioRpc: An IncompatibleRemoteServiceException was thrown while processing this call\.$",
            "studioRpc: IncompatibleRemoteServiceException",
            "studioRpc: An IncompatibleRemoteServiceException was thrown while processing this call.",
        ),
        LogPatternRule::full(
            38,
            r"^Error while fetching download$",
            "Error while fetching download",
            "Error while fetching download",
        ),
        LogPatternRule::full(
            39,
            r"^Cannot forward to error page: response is already committed$",
            "Cannot forward to error page",
            "Cannot forward to error page: response is already committed",
        ),
        LogPatternRule::full(
            40,
            r"^Request Processing Error$",
            "Request Processing Error",
            "Request Processing Error",
        ),
        LogPatternRule::full(
            41,
            r"^Failed to execute async event null on listener segmentIOEventListener$",
            "Failed to execute async event on segmentIOEventListener",
            "Failed to execute async event null on listener segmentIOEventListener",
        ),
        LogPatternRule::full(
            42,
            r"^Exception during work: ListenerWork\(Listener segmentIOEventListener.*$",
            "Exception during work: segmentIOEventListener",
            "Exception during work: ListenerWork(Listener segmentIOEventListener ...)",
        ),
        LogPatternRule::search(
            43,
            r"(?m)^Request Attributes.*$",
            "Request Attributes (response has been committed)",
            "Request Attributes (response has been committed)",
        ),
        LogPatternRule::full(
            44,
            r"^Exception during projectRemovalListener sync listener execution.*",
            "Exception during projectRemovalListener sync listener execution",
            "Exception during projectRemovalListener sync listener execution",
        ),
        LogPatternRule::full(
            45,
            r"^java.lang.IllegalStateException: unknown connection org.nuxeo.ecm.core.storage.sql.ra.ConnectionImpl.*$",
            "unknown connection org.nuxeo.ecm.core.storage.sql.ra.ConnectionImpl",
            "unknown connection org.nuxeo.ecm.core.storage.sql.ra.ConnectionImpl",
        ),
        LogPatternRule::full(
            46,
            r"^Killed handle: org.nuxeo.ecm.core.storage.sql.ra.ConnectionImpl.*$",
            "Killed handle: org.nuxeo.ecm.core.storage.sql.ra.ConnectionImpl",
            "Killed handle: org.nuxeo.ecm.core.storage.sql.ra.ConnectionImpl",
        ),
        LogPatternRule::full(
            47,
            r"^.*Unable to commit/rollback.*$",
            "Unable to commit/rollback",
            "Unable to commit/rollback",
        ),
    ];
}

/// First line of a message: everything before the first `\r` or `\n`,
/// or the whole message when it is single-line.
pub fn head(message: &str) -> &str {
    match message.find(['\r', '\n']) {
        Some(i) => &message[..i],
        None => message,
    }
}

/// Finds the first rule classifying the message's head line.
pub fn find_pattern(message: &str) -> Option<&'static LogPatternRule> {
    let head = head(message);
    PATTERNS.iter().find(|rule| rule.matches(head))
}

/// Canonical one-line summary for a message: the matching rule's long
/// description tagged with its id, or the raw head tagged as
/// unclassified.
pub fn create_summary(message: &str) -> String {
    match find_pattern(message) {
        Some(rule) => format!("[P{:02}] {}", rule.id, rule.long_msg),
        None => format!("[   ] {}", head(message)),
    }
}
