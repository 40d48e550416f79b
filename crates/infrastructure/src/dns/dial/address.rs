use dnscache_domain::ResolveError;

/// Splits `host:port` or `[ipv6]:port` into its host and numeric port.
pub fn split_host_port(address: &str) -> Result<(&str, u16), ResolveError> {
    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| ResolveError::malformed(address, "missing ']' in address"))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| ResolveError::malformed(address, "missing port in address"))?;
        (host, port)
    } else {
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| ResolveError::malformed(address, "missing port in address"))?;
        if host.contains(':') {
            return Err(ResolveError::malformed(address, "too many colons in address"));
        }
        (host, port)
    };

    if host.is_empty() {
        return Err(ResolveError::malformed(address, "missing host in address"));
    }

    let port = port
        .parse::<u16>()
        .map_err(|_| ResolveError::malformed(address, format!("invalid port {:?}", port)))?;

    Ok((host, port))
}

/// Inverse of [`split_host_port`]; IPv6 hosts are bracketed.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
