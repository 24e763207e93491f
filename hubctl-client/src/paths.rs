//! Stack instance resource paths

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Stack instances collection, relative to the API root
pub const INSTANCES_RESOURCE: &str = "hub/api/v1/instances";

/// Characters left alone when escaping: RFC 3986 unreserved
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn escape(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// `{base}/{id}`
pub fn instance(id: &str) -> String {
    format!("{}/{}", INSTANCES_RESOURCE, escape(id))
}

/// `{base}?domain={domain}`, or the whole collection for an empty domain
pub fn by_domain(domain: &str) -> String {
    if domain.is_empty() {
        INSTANCES_RESOURCE.to_string()
    } else {
        format!("{}?domain={}", INSTANCES_RESOURCE, escape(domain))
    }
}

/// `{base}/{id}/{verb}[?dryRun=1]`
pub fn command(id: &str, verb: &str, dry_run: bool) -> String {
    let maybe_dry_run = if dry_run { "?dryRun=1" } else { "" };
    format!("{}/{}{}", instance(id), verb, maybe_dry_run)
}

/// `{base}/{id}[?replace=1]`
pub fn patch(id: &str, replace: bool) -> String {
    let maybe_replace = if replace { "?replace=1" } else { "" };
    format!("{}{}", instance(id), maybe_replace)
}

/// `{base}/{id}/config`
pub fn kubeconfig(id: &str) -> String {
    format!("{}/config", instance(id))
}

/// `{resource}/secrets/{ref}`
pub fn secret(resource: &str, secret_ref: &str) -> String {
    format!("{}/secrets/{}", resource, escape(secret_ref))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_paths() {
        assert_eq!(instance("42"), "hub/api/v1/instances/42");
        assert_eq!(kubeconfig("42"), "hub/api/v1/instances/42/config");
        assert_eq!(patch("42", false), "hub/api/v1/instances/42");
        assert_eq!(patch("42", true), "hub/api/v1/instances/42?replace=1");
    }

    #[test]
    fn test_command_paths() {
        assert_eq!(command("7", "deploy", false), "hub/api/v1/instances/7/deploy");
        assert_eq!(
            command("7", "undeploy", true),
            "hub/api/v1/instances/7/undeploy?dryRun=1"
        );
    }

    #[test]
    fn test_domain_query_is_escaped() {
        assert_eq!(by_domain("my.app.com"), "hub/api/v1/instances?domain=my.app.com");
        assert_eq!(by_domain("a b&c"), "hub/api/v1/instances?domain=a%20b%26c");
        assert_eq!(by_domain(""), "hub/api/v1/instances");
    }

    #[test]
    fn test_secret_path() {
        assert_eq!(
            secret(&instance("42"), "db/pass"),
            "hub/api/v1/instances/42/secrets/db%2Fpass"
        );
    }
}
