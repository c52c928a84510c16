//! TLS block for generated ingresses
//!
//! Certificates are issued by cert-manager from annotations; this only names
//! the secret the certificate lands in.

/// Hosts covered by a certificate and the secret holding it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsBinding {
    /// Hosts the certificate is valid for
    pub hosts: Vec<String>,
    /// Secret name, always `{container}-tls`
    pub secret_name: String,
}

/// Secret name for a container's certificate
pub fn tls_secret_name(container: &str) -> String {
    format!("{}-tls", container)
}

/// Build the TLS binding for a host, or `None` when TLS is disabled
pub fn tls_binding(host: &str, container: &str, enabled: bool) -> Option<TlsBinding> {
    enabled.then(|| TlsBinding {
        hosts: vec![host.to_string()],
        secret_name: tls_secret_name(container),
    })
}
