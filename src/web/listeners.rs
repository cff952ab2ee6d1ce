use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;

// Binds the server socket. A host of "*" asks for a wildcard bind: IPv6
// dual-stack when the system supports it, plain IPv4 otherwise.
pub async fn create_listener(
    host: &str,
    port: u16,
) -> std::io::Result<(String, tokio::net::TcpListener)> {
    if host == "*" {
        return create_wildcard_listener(port);
    }

    let addr = format!("{}:{}", host, port);
    tracing::info!("Attempting to bind server to {}...", addr);

    let tokio_listener = tokio::net::TcpListener::bind(&addr).await?;

    Ok((addr, tokio_listener))
}

fn create_wildcard_listener(port: u16) -> std::io::Result<(String, tokio::net::TcpListener)> {
    match create_dual_stack_listener(port) {
        Ok(bound) => Ok(bound),
        Err(_) => {
            tracing::warn!("Failed to bind IPv6 listener. Attempting IPv4 only.");
            let str_addr = format!("0.0.0.0:{}", port);
            let addr: SocketAddr = str_addr.parse().expect("valid IPv4 wildcard address");

            tracing::info!("Attempting to bind server to {}... (IPv4)", str_addr);

            let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
            finish_bind(socket, addr.into(), str_addr)
        }
    }
}

fn create_dual_stack_listener(port: u16) -> std::io::Result<(String, tokio::net::TcpListener)> {
    let str_addr = format!("[::]:{}", port);
    let addr: SocketAddr = str_addr.parse().expect("valid IPv6 wildcard address");

    tracing::info!(
        "Attempting to bind server to {}... (IPv6 + IPv4 dual-stack)",
        str_addr
    );

    let socket = Socket::new(Domain::IPV6, Type::STREAM, Some(Protocol::TCP))?;

    // Dual-stack mode can fail on some systems; a v6-only bind still works.
    if let Err(e) = socket.set_only_v6(false) {
        tracing::warn!(
            "Failed to set dual-stack mode for IPv6 socket: {}. Continuing anyway.",
            e
        );
    }

    finish_bind(socket, addr.into(), str_addr)
}

fn finish_bind(
    socket: Socket,
    addr: socket2::SockAddr,
    str_addr: String,
) -> std::io::Result<(String, tokio::net::TcpListener)> {
    socket.set_reuse_address(true)?;
    socket.bind(&addr)?;
    socket.listen(1024)?;

    // Tokio requires the socket in non-blocking mode.
    socket.set_nonblocking(true)?;

    let std_listener: std::net::TcpListener = socket.into();
    let tokio_listener = tokio::net::TcpListener::from_std(std_listener)?;

    Ok((str_addr, tokio_listener))
}
