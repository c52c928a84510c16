//! Host and path resolution for ingress rules

use crane_common::Error;

use crate::intent::DeployIntent;

/// Path every generated rule routes
pub const ROOT_PATH: &str = "/";

/// Path type for the root rule; matching is left to the controller
pub const PATH_TYPE: &str = "ImplementationSpecific";

/// Externally routable host and the backend it points at
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Fully-qualified host
    pub host: String,
    /// Routed path, always [`ROOT_PATH`]
    pub path: String,
    /// Backend service name
    pub backend_name: String,
    /// Backend service port
    pub backend_port: u16,
}

/// Pick the routing root: explicit ingress host first, then the configured root domain
pub fn routing_root<'a>(
    ingress_host: Option<&'a str>,
    root_domain: Option<&'a str>,
    container: &str,
) -> Result<&'a str, Error> {
    ingress_host
        .filter(|h| !h.is_empty())
        .or_else(|| root_domain.filter(|d| !d.is_empty()))
        .ok_or_else(|| Error::missing_domain(container))
}

/// Join the host labels for an ingress
///
/// `ingress_name.root` when a name is given, otherwise
/// `container.namespace.root` so identical containers in different
/// namespaces never share a host.
pub fn resolve_host(
    ingress_host: Option<&str>,
    ingress_name: Option<&str>,
    container: &str,
    namespace: &str,
    root_domain: Option<&str>,
) -> Result<String, Error> {
    let root = routing_root(ingress_host, root_domain, container)?;
    let host = match ingress_name.filter(|n| !n.is_empty()) {
        Some(name) => [name, root].join("."),
        None => [container, namespace, root].join("."),
    };
    Ok(host)
}

/// Resolve the route for an intent
///
/// Empty ports are rejected before the domain is looked at.
pub fn resolve_route(
    intent: &DeployIntent,
    root_domain: Option<&str>,
) -> Result<ResolvedRoute, Error> {
    let backend_port = intent.backend_port()?;
    let host = resolve_host(
        intent.ingress_host(),
        intent.ingress_name(),
        &intent.container_name,
        &intent.namespace,
        root_domain,
    )?;

    Ok(ResolvedRoute {
        host,
        path: ROOT_PATH.to_string(),
        backend_name: intent.container_name.clone(),
        backend_port,
    })
}
